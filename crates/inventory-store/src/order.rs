use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Money, OrderId, SkuId};

text_enum!(
    /// Lifecycle of an order. Advanced by payment and fulfillment, never by checkout.
    OrderStatus {
        Pending => "PENDING",
        Paid => "PAID",
        Shipped => "SHIPPED",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
);

text_enum!(
    PaymentStatus {
        Unpaid => "UNPAID",
        Paid => "PAID",
        Refunded => "REFUNDED",
    }
);

text_enum!(
    DeliveryStatus {
        NotShipped => "NOT_SHIPPED",
        Shipped => "SHIPPED",
        Delivered => "DELIVERED",
    }
);

text_enum!(
    /// How the parcel reaches the customer.
    DeliveryMethod {
        /// Parcel-locker / pickup-point network.
        PickupPoint => "PICKUP_POINT",
        Courier => "COURIER",
        /// Collected in person at the shop.
        PersonalPickup => "PERSONAL_PICKUP",
    }
);

/// A pickup point selected from the parcel network's widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupPoint {
    pub id: String,
    pub name: String,
}

/// Where and how an order is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub name: String,
    pub phone: Option<String>,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub delivery_method: DeliveryMethod,
    pub pickup_point: Option<PickupPoint>,
}

/// One purchased line, snapshotted at purchase time.
///
/// Later catalog or price edits never touch these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemRecord {
    pub sku_id: SkuId,
    pub sku_code: String,
    pub name: String,
    pub ending: String,
    pub grams: i64,
    pub price_per_gram: Money,
    pub line_total: Money,
    pub assembly_fee: Money,
    pub line_grand_total: Money,
}

/// A placed order with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub email: String,
    pub shipping: ShippingInfo,
    pub coupon_code: Option<String>,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub discount: Money,
    pub total: Money,
    pub items: Vec<OrderItemRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Grand total for the given discount, never below zero.
    pub fn total_with_discount(subtotal: Money, shipping_cost: Money, discount: Money) -> Money {
        subtotal.saturating_add(shipping_cost).saturating_sub(discount)
    }

    /// Records a redeemed coupon and recomputes the total.
    pub fn apply_discount(&mut self, coupon_code: &str, discount: Money, now: DateTime<Utc>) {
        self.coupon_code = Some(coupon_code.to_string());
        self.discount = discount;
        self.total = Self::total_with_discount(self.subtotal, self.shipping_cost, discount);
        self.updated_at = now;
    }
}
