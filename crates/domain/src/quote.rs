//! Authoritative pricing of cart lines.
//!
//! Prices are always recomputed from the catalog. Client-supplied prices are
//! never part of a [`CartLine`], and stock fields are not consulted here: the
//! reservation step re-reads them inside its own transaction.

use async_trait::async_trait;
use common::{Money, SkuId};
use inventory_store::{InventoryStore, SaleMode};
use serde::{Deserialize, Serialize};

use crate::ending::{AssemblyFeeSchedule, Ending};
use crate::error::QuoteError;

/// Largest quantity a single line may request (10 kg).
pub const MAX_LINE_GRAMS: i64 = 10_000;

/// A raw cart line as submitted by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub sku_code: String,
    /// Desired grams. Ignored for pieces, which always sell whole.
    #[serde(default)]
    pub grams: i64,
    #[serde(default)]
    pub ending: Ending,
}

impl CartLine {
    pub fn new(sku_code: impl Into<String>, grams: i64, ending: Ending) -> Self {
        Self {
            sku_code: sku_code.into(),
            grams,
            ending,
        }
    }
}

/// A priced cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedLine {
    pub sku_id: SkuId,
    pub sku_code: String,
    pub sale_mode: SaleMode,
    /// Name shown on the order, frozen at purchase time.
    pub snapshot_name: String,
    /// Grams to reserve. For pieces this is the piece's full weight.
    pub grams: i64,
    pub price_per_gram: Money,
    pub line_total: Money,
    pub assembly_fee: Money,
    pub line_grand_total: Money,
    pub ending: Ending,
}

/// Priced lines plus their sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub items: Vec<QuotedLine>,
    pub subtotal: Money,
}

/// Turns cart lines into priced line items.
#[async_trait]
pub trait QuoteService: Send + Sync {
    /// Prices every line. Must be called fresh for each checkout.
    async fn quote(&self, lines: &[CartLine]) -> Result<Quote, QuoteError>;
}

/// Quote service backed by the catalog's current pricing fields.
#[derive(Clone)]
pub struct CatalogQuoteService<S: InventoryStore> {
    store: S,
    fees: AssemblyFeeSchedule,
}

impl<S: InventoryStore> CatalogQuoteService<S> {
    /// Creates a quote service with the default assembly fees.
    pub fn new(store: S) -> Self {
        Self {
            store,
            fees: AssemblyFeeSchedule::default(),
        }
    }

    pub fn with_fees(mut self, fees: AssemblyFeeSchedule) -> Self {
        self.fees = fees;
        self
    }
}

#[async_trait]
impl<S: InventoryStore> QuoteService for CatalogQuoteService<S> {
    #[tracing::instrument(skip(self, lines), fields(lines = lines.len()))]
    async fn quote(&self, lines: &[CartLine]) -> Result<Quote, QuoteError> {
        let mut items = Vec::with_capacity(lines.len());

        for (index, line) in lines.iter().enumerate() {
            let sku = self
                .store
                .get_sku_by_code(&line.sku_code)
                .await?
                .ok_or_else(|| QuoteError::UnknownSku(line.sku_code.clone()))?;

            let grams = match sku.sale_mode {
                SaleMode::PieceByWeight => sku.weight_grams.unwrap_or_default(),
                SaleMode::BulkGrams => line.grams,
            };
            if !(1..=MAX_LINE_GRAMS).contains(&grams) {
                return Err(QuoteError::InvalidGrams {
                    line: index,
                    sku_code: sku.code,
                    grams,
                });
            }

            let line_total = sku
                .price_per_gram
                .times(grams)
                .ok_or(QuoteError::AmountOutOfRange)?;
            let assembly_fee = self
                .fees
                .fee(line.ending, grams)
                .ok_or(QuoteError::AmountOutOfRange)?;
            let line_grand_total = line_total
                .checked_add(assembly_fee)
                .ok_or(QuoteError::AmountOutOfRange)?;

            items.push(QuotedLine {
                sku_id: sku.id,
                sku_code: sku.code,
                sale_mode: sku.sale_mode,
                snapshot_name: sku.name,
                grams,
                price_per_gram: sku.price_per_gram,
                line_total,
                assembly_fee,
                line_grand_total,
                ending: line.ending,
            });
        }

        let subtotal = items
            .iter()
            .try_fold(Money::zero(), |acc, i| acc.checked_add(i.line_grand_total))
            .ok_or(QuoteError::AmountOutOfRange)?;
        Ok(Quote { items, subtotal })
    }
}
