use async_trait::async_trait;

use crate::{Money, NewSku, OrderId, OrderRecord, Result, Sku, SkuId, StockMovement};

/// Core trait for inventory store implementations.
///
/// Non-transactional reads serve pricing and display. Every write to stock
/// fields happens inside a [`StockTransaction`] obtained from [`begin`].
///
/// [`begin`]: InventoryStore::begin
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// The unit of work type handed out by [`InventoryStore::begin`].
    type Tx: StockTransaction;

    /// Opens a unit of work at the strongest isolation the backend offers.
    ///
    /// Dropping the returned transaction without committing discards it.
    async fn begin(&self) -> Result<Self::Tx>;

    /// Creates a catalog item. Fails with `DuplicateSku` if the code is taken.
    async fn create_sku(&self, sku: NewSku) -> Result<Sku>;

    async fn get_sku(&self, id: SkuId) -> Result<Option<Sku>>;

    async fn get_sku_by_code(&self, code: &str) -> Result<Option<Sku>>;

    /// Loads an order with its items in purchase order.
    async fn get_order(&self, id: OrderId) -> Result<Option<OrderRecord>>;

    /// Returns the ledger for a SKU, newest first.
    async fn movements_for_sku(&self, id: SkuId) -> Result<Vec<StockMovement>>;

    /// Returns every ledger entry that references an order.
    async fn movements_for_order(&self, id: OrderId) -> Result<Vec<StockMovement>>;

    /// Records a redeemed coupon on a committed order and recomputes its total.
    async fn apply_discount(
        &self,
        id: OrderId,
        coupon_code: &str,
        discount: Money,
    ) -> Result<OrderRecord>;
}

/// A transactional unit of work over stock, ledger and order rows.
///
/// Either everything written through it becomes visible on [`commit`], or
/// nothing does.
///
/// [`commit`]: StockTransaction::commit
#[async_trait]
pub trait StockTransaction: Send {
    /// Reads the current persisted state of a SKU, including writes made
    /// earlier in this transaction.
    async fn load_sku(&mut self, id: SkuId) -> Result<Option<Sku>>;

    /// Writes the stock fields (`in_stock`, `sold_out`, `available_grams`).
    async fn save_stock(&mut self, sku: &Sku) -> Result<()>;

    /// Inserts an order row together with its items.
    async fn insert_order(&mut self, order: &OrderRecord) -> Result<()>;

    /// Appends a ledger entry.
    async fn insert_movement(&mut self, movement: &StockMovement) -> Result<()>;

    async fn commit(self) -> Result<()>;

    async fn rollback(self) -> Result<()>;
}
