//! Order drafts: everything needed to write an order except its stock.

use chrono::{DateTime, Utc};
use domain::{Quote, QuotedLine, ShippingRates};
use inventory_store::{
    DeliveryStatus, Money, OrderId, OrderItemRecord, OrderRecord, OrderStatus, PaymentStatus,
    ShippingInfo,
};

/// A priced order that has not been written yet.
///
/// Totals are fixed when the draft is built from a fresh quote. The discount
/// starts at zero; coupons are applied after commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub email: String,
    pub shipping: ShippingInfo,
    pub lines: Vec<QuotedLine>,
    pub subtotal: Money,
    pub shipping_cost: Money,
}

impl OrderDraft {
    pub fn new(email: String, shipping: ShippingInfo, quote: Quote, rates: &ShippingRates) -> Self {
        let shipping_cost = rates.cost_for(shipping.delivery_method, quote.subtotal);
        Self {
            email,
            shipping,
            lines: quote.items,
            subtotal: quote.subtotal,
            shipping_cost,
        }
    }

    pub fn total(&self) -> Money {
        OrderRecord::total_with_discount(self.subtotal, self.shipping_cost, Money::zero())
    }

    /// Freezes the draft into a pending, unpaid order with item snapshots.
    pub fn into_record(self, id: OrderId, now: DateTime<Utc>) -> OrderRecord {
        let total = self.total();
        let items = self
            .lines
            .into_iter()
            .map(|line| OrderItemRecord {
                sku_id: line.sku_id,
                sku_code: line.sku_code,
                name: line.snapshot_name,
                ending: line.ending.as_str().to_string(),
                grams: line.grams,
                price_per_gram: line.price_per_gram,
                line_total: line.line_total,
                assembly_fee: line.assembly_fee,
                line_grand_total: line.line_grand_total,
            })
            .collect();

        OrderRecord {
            id,
            email: self.email,
            shipping: self.shipping,
            coupon_code: None,
            order_status: OrderStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            delivery_status: DeliveryStatus::NotShipped,
            subtotal: self.subtotal,
            shipping_cost: self.shipping_cost,
            discount: Money::zero(),
            total,
            items,
            created_at: now,
            updated_at: now,
        }
    }
}
