use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MovementId, OrderId, SkuId};

text_enum!(
    /// Direction of a stock change.
    MovementDirection {
        In => "IN",
        Out => "OUT",
    }
);

/// An append-only stock ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub sku_id: SkuId,
    pub direction: MovementDirection,
    pub grams: i64,
    pub note: String,
    /// Set for reservations, empty for restocks.
    pub order_id: Option<OrderId>,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    /// Stock leaving the shelf for an order.
    pub fn outbound(sku_id: SkuId, grams: i64, order_id: OrderId, note: impl Into<String>) -> Self {
        Self {
            id: MovementId::new(),
            sku_id,
            direction: MovementDirection::Out,
            grams,
            note: note.into(),
            order_id: Some(order_id),
            created_at: Utc::now(),
        }
    }

    /// Stock added by a restock.
    pub fn inbound(sku_id: SkuId, grams: i64, note: impl Into<String>) -> Self {
        Self {
            id: MovementId::new(),
            sku_id,
            direction: MovementDirection::In,
            grams,
            note: note.into(),
            order_id: None,
            created_at: Utc::now(),
        }
    }
}
