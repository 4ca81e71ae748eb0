use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Money, SkuId};

text_enum!(
    /// How a SKU is sold.
    SaleMode {
        /// One indivisible physical unit with a fixed total weight.
        PieceByWeight => "PIECE_BY_WEIGHT",
        /// Divisible stock measured in grams.
        BulkGrams => "BULK_G",
    }
);

/// A catalog item and its stock fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sku {
    pub id: SkuId,
    /// Unique human-readable code.
    pub code: String,
    pub name: String,
    pub sale_mode: SaleMode,
    /// Price per gram. Read by pricing only, never changed by reservations.
    pub price_per_gram: Money,
    /// Total weight of a piece. `None` for bulk stock.
    pub weight_grams: Option<i64>,
    pub in_stock: bool,
    /// Only meaningful for [`SaleMode::PieceByWeight`].
    pub sold_out: bool,
    /// Only meaningful for [`SaleMode::BulkGrams`].
    pub available_grams: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sku {
    /// Checks the stock-field invariants for the SKU's sale mode.
    ///
    /// Bulk stock: grams never negative and `in_stock` mirrors `available_grams > 0`.
    /// Pieces: a sold-out piece is never in stock.
    pub fn is_consistent(&self) -> bool {
        match self.sale_mode {
            SaleMode::BulkGrams => {
                self.available_grams >= 0 && self.in_stock == (self.available_grams > 0)
            }
            SaleMode::PieceByWeight => !(self.sold_out && self.in_stock),
        }
    }
}

/// Input for creating a catalog item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSku {
    pub code: String,
    pub name: String,
    pub sale_mode: SaleMode,
    pub price_per_gram: Money,
    /// Required for pieces.
    #[serde(default)]
    pub weight_grams: Option<i64>,
    /// Initial bulk stock. Ignored for pieces.
    #[serde(default)]
    pub available_grams: i64,
}

impl NewSku {
    /// A single piece, in stock.
    pub fn piece(
        code: impl Into<String>,
        name: impl Into<String>,
        weight_grams: i64,
        price_per_gram: Money,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            sale_mode: SaleMode::PieceByWeight,
            price_per_gram,
            weight_grams: Some(weight_grams),
            available_grams: 0,
        }
    }

    /// Bulk stock with `available_grams` on hand.
    pub fn bulk(
        code: impl Into<String>,
        name: impl Into<String>,
        available_grams: i64,
        price_per_gram: Money,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            sale_mode: SaleMode::BulkGrams,
            price_per_gram,
            weight_grams: None,
            available_grams,
        }
    }

    /// Builds the initial record with stock fields derived from the sale mode.
    pub fn into_sku(self, now: DateTime<Utc>) -> Sku {
        let (in_stock, available_grams) = match self.sale_mode {
            SaleMode::PieceByWeight => (true, 0),
            SaleMode::BulkGrams => {
                let grams = self.available_grams.max(0);
                (grams > 0, grams)
            }
        };

        Sku {
            id: SkuId::new(),
            code: self.code,
            name: self.name,
            sale_mode: self.sale_mode,
            price_per_gram: self.price_per_gram,
            weight_grams: self.weight_grams,
            in_stock,
            sold_out: false,
            available_grams,
            created_at: now,
            updated_at: now,
        }
    }
}
