use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{
    DeliveryMethod, Money, MovementId, NewSku, OrderId, OrderItemRecord, OrderRecord, PickupPoint,
    Result, ShippingInfo, Sku, SkuId, StockMovement, StoreError,
    store::{InventoryStore, StockTransaction},
};

const SKU_COLUMNS: &str = "id, code, name, sale_mode, price_per_gram, weight_grams, in_stock, sold_out, available_grams, created_at, updated_at";

const ORDER_COLUMNS: &str = "id, email, customer_name, phone, street, city, postal_code, country, delivery_method, pickup_point_id, pickup_point_name, coupon_code, order_status, payment_status, delivery_status, subtotal, shipping_cost, discount, total, created_at, updated_at";

const MOVEMENT_COLUMNS: &str = "id, sku_id, direction, grams, note, order_id, created_at";

/// PostgreSQL-backed inventory store.
#[derive(Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PostgresInventoryStore {
    /// Creates a new store. Transactions get a 10 second statement timeout.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            statement_timeout: Duration::from_secs(10),
        }
    }

    /// Overrides the per-statement timeout applied inside transactions.
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn load_items(&self, order_id: OrderId) -> Result<Vec<OrderItemRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT sku_id, sku_code, name, ending, grams, price_per_gram, line_total, assembly_fee, line_grand_total
            FROM order_items
            WHERE order_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_item).collect()
    }
}

fn row_to_sku(row: PgRow) -> Result<Sku> {
    Ok(Sku {
        id: SkuId::from_uuid(row.try_get::<Uuid, _>("id")?),
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        sale_mode: row.try_get::<String, _>("sale_mode")?.parse()?,
        price_per_gram: Money::from_minor(row.try_get("price_per_gram")?),
        weight_grams: row.try_get("weight_grams")?,
        in_stock: row.try_get("in_stock")?,
        sold_out: row.try_get("sold_out")?,
        available_grams: row.try_get("available_grams")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_item(row: PgRow) -> Result<OrderItemRecord> {
    Ok(OrderItemRecord {
        sku_id: SkuId::from_uuid(row.try_get::<Uuid, _>("sku_id")?),
        sku_code: row.try_get("sku_code")?,
        name: row.try_get("name")?,
        ending: row.try_get("ending")?,
        grams: row.try_get("grams")?,
        price_per_gram: Money::from_minor(row.try_get("price_per_gram")?),
        line_total: Money::from_minor(row.try_get("line_total")?),
        assembly_fee: Money::from_minor(row.try_get("assembly_fee")?),
        line_grand_total: Money::from_minor(row.try_get("line_grand_total")?),
    })
}

fn row_to_order(row: PgRow, items: Vec<OrderItemRecord>) -> Result<OrderRecord> {
    let pickup_id: Option<String> = row.try_get("pickup_point_id")?;
    let pickup_name: Option<String> = row.try_get("pickup_point_name")?;
    let pickup_point = match (pickup_id, pickup_name) {
        (Some(id), Some(name)) => Some(PickupPoint { id, name }),
        _ => None,
    };

    Ok(OrderRecord {
        id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
        email: row.try_get("email")?,
        shipping: ShippingInfo {
            name: row.try_get("customer_name")?,
            phone: row.try_get("phone")?,
            street: row.try_get("street")?,
            city: row.try_get("city")?,
            postal_code: row.try_get("postal_code")?,
            country: row.try_get("country")?,
            delivery_method: row
                .try_get::<String, _>("delivery_method")?
                .parse::<DeliveryMethod>()?,
            pickup_point,
        },
        coupon_code: row.try_get("coupon_code")?,
        order_status: row.try_get::<String, _>("order_status")?.parse()?,
        payment_status: row.try_get::<String, _>("payment_status")?.parse()?,
        delivery_status: row.try_get::<String, _>("delivery_status")?.parse()?,
        subtotal: Money::from_minor(row.try_get("subtotal")?),
        shipping_cost: Money::from_minor(row.try_get("shipping_cost")?),
        discount: Money::from_minor(row.try_get("discount")?),
        total: Money::from_minor(row.try_get("total")?),
        items,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_movement(row: PgRow) -> Result<StockMovement> {
    Ok(StockMovement {
        id: MovementId::from_uuid(row.try_get::<Uuid, _>("id")?),
        sku_id: SkuId::from_uuid(row.try_get::<Uuid, _>("sku_id")?),
        direction: row.try_get::<String, _>("direction")?.parse()?,
        grams: row.try_get("grams")?,
        note: row.try_get("note")?,
        order_id: row.try_get::<Option<Uuid>, _>("order_id")?.map(OrderId::from_uuid),
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    type Tx = PostgresTransaction;

    #[tracing::instrument(skip(self))]
    async fn begin(&self) -> Result<PostgresTransaction> {
        let mut tx = self.pool.begin().await?;

        // Must precede any other statement in the transaction.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await?;

        let timeout = format!(
            "SET LOCAL statement_timeout = {}",
            self.statement_timeout.as_millis()
        );
        sqlx::query(&timeout).execute(&mut *tx).await?;

        Ok(PostgresTransaction { tx })
    }

    #[tracing::instrument(skip(self, sku), fields(code = %sku.code))]
    async fn create_sku(&self, sku: NewSku) -> Result<Sku> {
        let code = sku.code.clone();
        let sku = sku.into_sku(Utc::now());

        sqlx::query(
            r#"
            INSERT INTO skus (id, code, name, sale_mode, price_per_gram, weight_grams, in_stock, sold_out, available_grams, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(sku.id.as_uuid())
        .bind(&sku.code)
        .bind(&sku.name)
        .bind(sku.sale_mode.as_str())
        .bind(sku.price_per_gram.minor())
        .bind(sku.weight_grams)
        .bind(sku.in_stock)
        .bind(sku.sold_out)
        .bind(sku.available_grams)
        .bind(sku.created_at)
        .bind(sku.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("skus_code_key")
            {
                return StoreError::DuplicateSku(code.clone());
            }
            StoreError::from(e)
        })?;

        Ok(sku)
    }

    async fn get_sku(&self, id: SkuId) -> Result<Option<Sku>> {
        let sql = format!("SELECT {SKU_COLUMNS} FROM skus WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_sku).transpose()
    }

    async fn get_sku_by_code(&self, code: &str) -> Result<Option<Sku>> {
        let sql = format!("SELECT {SKU_COLUMNS} FROM skus WHERE code = $1");
        let row = sqlx::query(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_sku).transpose()
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let items = self.load_items(id).await?;
                Ok(Some(row_to_order(row, items)?))
            }
            None => Ok(None),
        }
    }

    async fn movements_for_sku(&self, id: SkuId) -> Result<Vec<StockMovement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE sku_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_movement).collect()
    }

    async fn movements_for_order(&self, id: OrderId) -> Result<Vec<StockMovement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE order_id = $1 ORDER BY created_at ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_movement).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn apply_discount(
        &self,
        id: OrderId,
        coupon_code: &str,
        discount: Money,
    ) -> Result<OrderRecord> {
        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET coupon_code = $2,
                discount = $3,
                total = GREATEST(subtotal + shipping_cost - $3, 0),
                updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(coupon_code)
        .bind(discount.minor())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound(id));
        }

        self.get_order(id).await?.ok_or(StoreError::OrderNotFound(id))
    }
}

/// A `SERIALIZABLE` PostgreSQL transaction.
///
/// Dropping it without calling `commit` rolls back.
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StockTransaction for PostgresTransaction {
    async fn load_sku(&mut self, id: SkuId) -> Result<Option<Sku>> {
        let sql = format!("SELECT {SKU_COLUMNS} FROM skus WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(row_to_sku).transpose()
    }

    async fn save_stock(&mut self, sku: &Sku) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE skus
            SET in_stock = $2, sold_out = $3, available_grams = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(sku.id.as_uuid())
        .bind(sku.in_stock)
        .bind(sku.sold_out)
        .bind(sku.available_grams)
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_order(&mut self, order: &OrderRecord) -> Result<()> {
        let shipping = &order.shipping;
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, email, customer_name, phone, street, city, postal_code, country,
                delivery_method, pickup_point_id, pickup_point_name, coupon_code,
                order_status, payment_status, delivery_status,
                subtotal, shipping_cost, discount, total, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(&order.email)
        .bind(&shipping.name)
        .bind(&shipping.phone)
        .bind(&shipping.street)
        .bind(&shipping.city)
        .bind(&shipping.postal_code)
        .bind(&shipping.country)
        .bind(shipping.delivery_method.as_str())
        .bind(shipping.pickup_point.as_ref().map(|p| p.id.as_str()))
        .bind(shipping.pickup_point.as_ref().map(|p| p.name.as_str()))
        .bind(&order.coupon_code)
        .bind(order.order_status.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.delivery_status.as_str())
        .bind(order.subtotal.minor())
        .bind(order.shipping_cost.minor())
        .bind(order.discount.minor())
        .bind(order.total.minor())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *self.tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, position, sku_id, sku_code, name, ending, grams,
                    price_per_gram, line_total, assembly_fee, line_grand_total
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(order.id.as_uuid())
            .bind(position as i32)
            .bind(item.sku_id.as_uuid())
            .bind(&item.sku_code)
            .bind(&item.name)
            .bind(&item.ending)
            .bind(item.grams)
            .bind(item.price_per_gram.minor())
            .bind(item.line_total.minor())
            .bind(item.assembly_fee.minor())
            .bind(item.line_grand_total.minor())
            .execute(&mut *self.tx)
            .await?;
        }

        Ok(())
    }

    async fn insert_movement(&mut self, movement: &StockMovement) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_movements (id, sku_id, direction, grams, note, order_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(movement.id.as_uuid())
        .bind(movement.sku_id.as_uuid())
        .bind(movement.direction.as_str())
        .bind(movement.grams)
        .bind(&movement.note)
        .bind(movement.order_id.map(|id| id.as_uuid()))
        .bind(movement.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await.inspect_err(|e| {
            tracing::debug!(error = %e, "commit failed");
        })?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
