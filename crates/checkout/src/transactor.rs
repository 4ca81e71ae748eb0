//! The stock reservation transaction.

use std::time::{Duration, Instant};

use chrono::Utc;
use inventory_store::{
    InventoryStore, OrderId, OrderRecord, StockMovement, StockTransaction, StoreError,
};

use crate::draft::OrderDraft;
use crate::error::{ReservationError, StockConflict};
use crate::reservation::reserve;

/// Upper bound on one reservation transaction, queueing included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reserves stock and writes the order in a single serializable transaction.
///
/// Either every line is reserved, the order with its items is written and
/// one `OUT` movement per line is recorded, or nothing changes at all.
#[derive(Clone)]
pub struct StockReservationTransactor<S: InventoryStore> {
    store: S,
    timeout: Duration,
}

impl<S: InventoryStore> StockReservationTransactor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reserves every line of `draft` and creates the order.
    ///
    /// Lines are processed in order and the first failing line aborts the
    /// whole transaction. Conflicts with concurrent writers and exceeding the
    /// deadline both surface as [`ReservationError::Retryable`].
    #[tracing::instrument(skip(self, draft), fields(lines = draft.lines.len(), email = %draft.email))]
    pub async fn place_order(&self, draft: OrderDraft) -> Result<OrderRecord, ReservationError> {
        if draft.lines.is_empty() {
            return Err(ReservationError::NoLines);
        }

        let started = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.run(draft)).await {
            Ok(result) => result,
            Err(_) => Err(ReservationError::Retryable(StoreError::Timeout)),
        };
        metrics::histogram!("checkout_reservation_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        match &result {
            Ok(order) => {
                metrics::counter!("checkout_orders_created_total").increment(1);
                tracing::info!(
                    order_id = %order.id,
                    total = %order.total,
                    "Stock reserved and order created"
                );
            }
            Err(e) => {
                metrics::counter!("checkout_reservation_failures_total", "reason" => e.reason())
                    .increment(1);
                tracing::warn!(reason = e.reason(), error = %e, "Stock reservation failed");
            }
        }

        result
    }

    async fn run(&self, draft: OrderDraft) -> Result<OrderRecord, ReservationError> {
        let mut tx = self.store.begin().await?;

        match reserve_and_write(&mut tx, draft).await {
            Ok(order) => {
                tx.commit().await?;
                Ok(order)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(
                        error = %rollback_err,
                        "Rollback after failed reservation failed"
                    );
                }
                Err(e)
            }
        }
    }
}

async fn reserve_and_write<T: StockTransaction>(
    tx: &mut T,
    draft: OrderDraft,
) -> Result<OrderRecord, ReservationError> {
    let order_id = OrderId::new();
    let mut movements = Vec::with_capacity(draft.lines.len());

    for line in &draft.lines {
        let sku = tx
            .load_sku(line.sku_id)
            .await?
            .ok_or_else(|| StockConflict::SkuNotFound {
                sku_code: line.sku_code.clone(),
            })?;

        let reservation = reserve(&sku, line.grams)?;
        tx.save_stock(&reservation.updated).await?;

        tracing::debug!(sku = %sku.code, grams = reservation.grams, "Line reserved");
        movements.push(StockMovement::outbound(
            sku.id,
            reservation.grams,
            order_id,
            format!("Order {order_id}: {} {} g", sku.code, reservation.grams),
        ));
    }

    let order = draft.into_record(order_id, Utc::now());
    tx.insert_order(&order).await?;
    for movement in &movements {
        tx.insert_movement(movement).await?;
    }

    Ok(order)
}
