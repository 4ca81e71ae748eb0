//! Checkout orchestration.

use std::time::Duration;

use domain::{CheckoutRequest, QuoteError, QuoteService, ShippingRates, ValidationErrors};
use inventory_store::{InventoryStore, OrderRecord};

use crate::draft::OrderDraft;
use crate::error::CheckoutError;
use crate::services::coupon::CouponService;
use crate::services::notification::OrderNotifier;
use crate::transactor::StockReservationTransactor;

/// Places orders: validate, quote, reserve, then best-effort follow-ups.
pub struct CheckoutService<S, Q, C, N>
where
    S: InventoryStore,
    Q: QuoteService,
    C: CouponService,
    N: OrderNotifier,
{
    store: S,
    quotes: Q,
    transactor: StockReservationTransactor<S>,
    coupons: C,
    notifier: N,
    rates: ShippingRates,
}

impl<S, Q, C, N> CheckoutService<S, Q, C, N>
where
    S: InventoryStore + Clone,
    Q: QuoteService,
    C: CouponService,
    N: OrderNotifier,
{
    pub fn new(store: S, quotes: Q, coupons: C, notifier: N) -> Self {
        Self {
            transactor: StockReservationTransactor::new(store.clone()),
            store,
            quotes,
            coupons,
            notifier,
            rates: ShippingRates::default(),
        }
    }

    pub fn with_rates(mut self, rates: ShippingRates) -> Self {
        self.rates = rates;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.transactor = self.transactor.with_timeout(timeout);
        self
    }

    pub fn coupons(&self) -> &C {
        &self.coupons
    }

    /// Creates an order from a storefront request.
    ///
    /// Once the reservation transaction commits the order exists, whatever
    /// happens to coupon redemption or notifications afterwards. The
    /// returned record reflects a discount only if the coupon was applied.
    #[tracing::instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn place_order(
        &self,
        request: CheckoutRequest,
    ) -> Result<OrderRecord, CheckoutError> {
        let checkout = request.validate()?;
        let quote = self
            .quotes
            .quote(&checkout.lines)
            .await
            .map_err(quote_error_to_checkout)?;

        let draft = OrderDraft::new(checkout.email, checkout.shipping, quote, &self.rates);
        let mut order = self.transactor.place_order(draft).await?;

        if let Some(code) = checkout.coupon_code.as_deref() {
            match self.redeem_coupon(&order, code).await {
                Ok(discounted) => order = discounted,
                Err(message) => {
                    metrics::counter!("checkout_post_commit_failures_total", "step" => "coupon")
                        .increment(1);
                    tracing::warn!(
                        order_id = %order.id,
                        coupon = code,
                        error = %message,
                        "Coupon not applied"
                    );
                }
            }
        }

        self.notify(&order).await;
        Ok(order)
    }

    async fn redeem_coupon(&self, order: &OrderRecord, code: &str) -> Result<OrderRecord, String> {
        let discount = self
            .coupons
            .redeem(code, order)
            .await
            .map_err(|e| e.to_string())?;
        self.store
            .apply_discount(order.id, code, discount)
            .await
            .map_err(|e| e.to_string())
    }

    async fn notify(&self, order: &OrderRecord) {
        if let Err(e) = self.notifier.send_confirmation(order).await {
            metrics::counter!("checkout_post_commit_failures_total", "step" => "confirmation_email")
                .increment(1);
            tracing::warn!(order_id = %order.id, error = %e, "Order confirmation not sent");
        }
        if let Err(e) = self.notifier.send_admin_notification(order).await {
            metrics::counter!("checkout_post_commit_failures_total", "step" => "admin_email")
                .increment(1);
            tracing::warn!(order_id = %order.id, error = %e, "Admin notification not sent");
        }
    }
}

/// Quantity problems found while pricing are reported like other field errors.
fn quote_error_to_checkout(err: QuoteError) -> CheckoutError {
    match err.field_error() {
        Some(field) => CheckoutError::Validation(ValidationErrors(vec![field])),
        None => CheckoutError::Quote(err),
    }
}
