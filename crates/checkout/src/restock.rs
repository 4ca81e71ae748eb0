//! Putting stock back on sale.

use std::time::Duration;

use inventory_store::{
    InventoryStore, SaleMode, Sku, SkuId, StockMovement, StockTransaction, StoreError,
};

use crate::error::RestockError;
use crate::transactor::DEFAULT_TIMEOUT;

/// Adds inbound stock under the same isolation as reservations.
#[derive(Clone)]
pub struct Restocker<S: InventoryStore> {
    store: S,
    timeout: Duration,
}

impl<S: InventoryStore> Restocker<S> {
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

    /// Restocks a SKU and records an `IN` movement.
    ///
    /// Bulk SKUs gain `grams`. A sold-out piece is put back on sale at its
    /// full weight and `grams` is ignored.
    #[tracing::instrument(skip(self, note))]
    pub async fn restock(
        &self,
        sku_id: SkuId,
        grams: i64,
        note: &str,
    ) -> Result<Sku, RestockError> {
        let result = tokio::time::timeout(self.timeout, self.run(sku_id, grams, note))
            .await
            .unwrap_or(Err(RestockError::Store(StoreError::Timeout)));

        if let Ok(sku) = &result {
            tracing::info!(sku = %sku.code, available_grams = sku.available_grams, "SKU restocked");
        }
        result
    }

    async fn run(&self, sku_id: SkuId, grams: i64, note: &str) -> Result<Sku, RestockError> {
        let mut tx = self.store.begin().await?;

        match restock_in(&mut tx, sku_id, grams, note).await {
            Ok(sku) => {
                tx.commit().await?;
                Ok(sku)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback after failed restock failed");
                }
                Err(e)
            }
        }
    }
}

async fn restock_in<T: StockTransaction>(
    tx: &mut T,
    sku_id: SkuId,
    grams: i64,
    note: &str,
) -> Result<Sku, RestockError> {
    let sku = tx
        .load_sku(sku_id)
        .await?
        .ok_or(RestockError::SkuNotFound(sku_id))?;

    let (updated, moved) = match sku.sale_mode {
        SaleMode::BulkGrams => {
            if grams <= 0 {
                return Err(RestockError::InvalidGrams(grams));
            }
            let available_grams = sku
                .available_grams
                .checked_add(grams)
                .ok_or(RestockError::InvalidGrams(grams))?;
            let updated = Sku {
                available_grams,
                in_stock: true,
                ..sku.clone()
            };
            (updated, grams)
        }
        SaleMode::PieceByWeight => {
            if !sku.sold_out && sku.in_stock {
                return Err(RestockError::PieceInStock(sku.code));
            }
            let updated = Sku {
                sold_out: false,
                in_stock: true,
                ..sku.clone()
            };
            (updated, sku.weight_grams.unwrap_or(grams))
        }
    };

    tx.save_stock(&updated).await?;
    tx.insert_movement(&StockMovement::inbound(sku.id, moved, note))
        .await?;

    Ok(updated)
}
