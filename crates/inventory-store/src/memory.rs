use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    Money, NewSku, OrderId, OrderRecord, Result, Sku, SkuId, StockMovement, StoreError,
    store::{InventoryStore, StockTransaction},
};

#[derive(Debug, Default)]
struct Tables {
    skus: HashMap<SkuId, Sku>,
    orders: HashMap<OrderId, OrderRecord>,
    movements: Vec<StockMovement>,
}

/// In-memory inventory store for tests and local development.
///
/// A transaction holds the table lock from `begin` until it is committed or
/// dropped, so transactions are fully serialized. Writes are staged and only
/// applied on commit.
#[derive(Clone, Default)]
pub struct InMemoryInventoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_next_commit: Arc<AtomicBool>,
}

impl InMemoryInventoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next commit fail with a serialization conflict, as a
    /// concurrent PostgreSQL transaction would.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Returns the total number of ledger entries.
    pub async fn movement_count(&self) -> usize {
        self.tables.lock().await.movements.len()
    }

    /// Returns the total number of orders.
    pub async fn order_count(&self) -> usize {
        self.tables.lock().await.orders.len()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    type Tx = InMemoryTransaction;

    async fn begin(&self) -> Result<InMemoryTransaction> {
        let guard = self.tables.clone().lock_owned().await;
        Ok(InMemoryTransaction {
            guard,
            fail_next_commit: self.fail_next_commit.clone(),
            staged_skus: HashMap::new(),
            staged_orders: Vec::new(),
            staged_movements: Vec::new(),
        })
    }

    async fn create_sku(&self, sku: NewSku) -> Result<Sku> {
        let mut tables = self.tables.lock().await;
        if tables.skus.values().any(|s| s.code == sku.code) {
            return Err(StoreError::DuplicateSku(sku.code));
        }
        let sku = sku.into_sku(Utc::now());
        tables.skus.insert(sku.id, sku.clone());
        Ok(sku)
    }

    async fn get_sku(&self, id: SkuId) -> Result<Option<Sku>> {
        Ok(self.tables.lock().await.skus.get(&id).cloned())
    }

    async fn get_sku_by_code(&self, code: &str) -> Result<Option<Sku>> {
        let tables = self.tables.lock().await;
        Ok(tables.skus.values().find(|s| s.code == code).cloned())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        Ok(self.tables.lock().await.orders.get(&id).cloned())
    }

    async fn movements_for_sku(&self, id: SkuId) -> Result<Vec<StockMovement>> {
        let tables = self.tables.lock().await;
        let mut movements: Vec<_> = tables
            .movements
            .iter()
            .filter(|m| m.sku_id == id)
            .cloned()
            .collect();
        movements.reverse();
        Ok(movements)
    }

    async fn movements_for_order(&self, id: OrderId) -> Result<Vec<StockMovement>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .movements
            .iter()
            .filter(|m| m.order_id == Some(id))
            .cloned()
            .collect())
    }

    async fn apply_discount(
        &self,
        id: OrderId,
        coupon_code: &str,
        discount: Money,
    ) -> Result<OrderRecord> {
        let mut tables = self.tables.lock().await;
        let order = tables
            .orders
            .get_mut(&id)
            .ok_or(StoreError::OrderNotFound(id))?;
        order.apply_discount(coupon_code, discount, Utc::now());
        Ok(order.clone())
    }
}

/// Unit of work over the in-memory tables.
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    fail_next_commit: Arc<AtomicBool>,
    staged_skus: HashMap<SkuId, Sku>,
    staged_orders: Vec<OrderRecord>,
    staged_movements: Vec<StockMovement>,
}

#[async_trait]
impl StockTransaction for InMemoryTransaction {
    async fn load_sku(&mut self, id: SkuId) -> Result<Option<Sku>> {
        if let Some(sku) = self.staged_skus.get(&id) {
            return Ok(Some(sku.clone()));
        }
        Ok(self.guard.skus.get(&id).cloned())
    }

    async fn save_stock(&mut self, sku: &Sku) -> Result<()> {
        let current = match self.staged_skus.get(&sku.id) {
            Some(staged) => staged.clone(),
            None => self
                .guard
                .skus
                .get(&sku.id)
                .cloned()
                .ok_or_else(|| StoreError::Corrupt(format!("SKU {} vanished", sku.id)))?,
        };

        if sku.available_grams < 0 {
            return Err(StoreError::Corrupt(format!(
                "SKU {} would have negative stock",
                sku.code
            )));
        }

        let updated = Sku {
            in_stock: sku.in_stock,
            sold_out: sku.sold_out,
            available_grams: sku.available_grams,
            updated_at: Utc::now(),
            ..current
        };
        self.staged_skus.insert(sku.id, updated);
        Ok(())
    }

    async fn insert_order(&mut self, order: &OrderRecord) -> Result<()> {
        self.staged_orders.push(order.clone());
        Ok(())
    }

    async fn insert_movement(&mut self, movement: &StockMovement) -> Result<()> {
        let known = self.staged_skus.contains_key(&movement.sku_id)
            || self.guard.skus.contains_key(&movement.sku_id);
        if !known {
            return Err(StoreError::Corrupt(format!(
                "movement references unknown SKU {}",
                movement.sku_id
            )));
        }
        self.staged_movements.push(movement.clone());
        Ok(())
    }

    async fn commit(mut self) -> Result<()> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::SerializationConflict);
        }

        let tables = &mut *self.guard;
        for (id, sku) in self.staged_skus.drain() {
            tables.skus.insert(id, sku);
        }
        for order in self.staged_orders.drain(..) {
            tables.orders.insert(order.id, order);
        }
        tables.movements.append(&mut self.staged_movements);
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MovementDirection;

    async fn store_with_bulk(grams: i64) -> (InMemoryInventoryStore, Sku) {
        let store = InMemoryInventoryStore::new();
        let sku = store
            .create_sku(NewSku::bulk("BULK-1", "Bulk hair", grams, Money::from_minor(1_000)))
            .await
            .unwrap();
        (store, sku)
    }

    #[tokio::test]
    async fn duplicate_codes_are_rejected() {
        let (store, _) = store_with_bulk(10).await;
        let result = store
            .create_sku(NewSku::bulk("BULK-1", "Again", 5, Money::from_minor(1)))
            .await;
        assert!(matches!(result, Err(StoreError::DuplicateSku(code)) if code == "BULK-1"));
    }

    #[tokio::test]
    async fn committed_writes_become_visible() {
        let (store, sku) = store_with_bulk(100).await;

        let mut tx = store.begin().await.unwrap();
        let mut loaded = tx.load_sku(sku.id).await.unwrap().unwrap();
        loaded.available_grams = 40;
        tx.save_stock(&loaded).await.unwrap();
        tx.insert_movement(&StockMovement::inbound(sku.id, 5, "test"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let after = store.get_sku(sku.id).await.unwrap().unwrap();
        assert_eq!(after.available_grams, 40);
        assert_eq!(store.movement_count().await, 1);
    }

    #[tokio::test]
    async fn dropped_transaction_leaves_no_trace() {
        let (store, sku) = store_with_bulk(100).await;

        {
            let mut tx = store.begin().await.unwrap();
            let mut loaded = tx.load_sku(sku.id).await.unwrap().unwrap();
            loaded.available_grams = 0;
            loaded.in_stock = false;
            tx.save_stock(&loaded).await.unwrap();
            tx.insert_movement(&StockMovement::inbound(sku.id, 5, "test"))
                .await
                .unwrap();
        }

        let after = store.get_sku(sku.id).await.unwrap().unwrap();
        assert_eq!(after.available_grams, 100);
        assert_eq!(store.movement_count().await, 0);
    }

    #[tokio::test]
    async fn reads_inside_transaction_see_staged_writes() {
        let (store, sku) = store_with_bulk(100).await;

        let mut tx = store.begin().await.unwrap();
        let mut loaded = tx.load_sku(sku.id).await.unwrap().unwrap();
        loaded.available_grams = 70;
        tx.save_stock(&loaded).await.unwrap();

        let reread = tx.load_sku(sku.id).await.unwrap().unwrap();
        assert_eq!(reread.available_grams, 70);
        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn injected_commit_failure_discards_writes() {
        let (store, sku) = store_with_bulk(100).await;
        store.fail_next_commit();

        let mut tx = store.begin().await.unwrap();
        tx.insert_movement(&StockMovement::inbound(sku.id, 5, "test"))
            .await
            .unwrap();
        let result = tx.commit().await;

        assert!(matches!(result, Err(StoreError::SerializationConflict)));
        assert_eq!(store.movement_count().await, 0);

        // Only the next commit fails.
        let tx = store.begin().await.unwrap();
        assert!(tx.commit().await.is_ok());
    }

    #[tokio::test]
    async fn movements_are_listed_newest_first() {
        let (store, sku) = store_with_bulk(100).await;

        let mut tx = store.begin().await.unwrap();
        tx.insert_movement(&StockMovement::inbound(sku.id, 1, "first"))
            .await
            .unwrap();
        tx.insert_movement(&StockMovement::outbound(sku.id, 2, OrderId::new(), "second"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let movements = store.movements_for_sku(sku.id).await.unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].note, "second");
        assert_eq!(movements[0].direction, MovementDirection::Out);
        assert_eq!(movements[1].direction, MovementDirection::In);
    }

    #[tokio::test]
    async fn apply_discount_on_missing_order_fails() {
        let store = InMemoryInventoryStore::new();
        let id = OrderId::new();
        let result = store.apply_discount(id, "SPRING", Money::from_major(10)).await;
        assert!(matches!(result, Err(StoreError::OrderNotFound(missing)) if missing == id));
    }
}
