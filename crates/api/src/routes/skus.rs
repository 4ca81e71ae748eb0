//! Catalog and stock ledger endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use inventory_store::{InventoryStore, Money, Sku, StockMovement};
use serde::Serialize;

use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuResponse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub sale_mode: String,
    pub price_per_gram: Money,
    pub weight_grams: Option<i64>,
    pub in_stock: bool,
    pub sold_out: bool,
    pub available_grams: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<Sku> for SkuResponse {
    fn from(sku: Sku) -> Self {
        Self {
            id: sku.id.to_string(),
            code: sku.code,
            name: sku.name,
            sale_mode: sku.sale_mode.to_string(),
            price_per_gram: sku.price_per_gram,
            weight_grams: sku.weight_grams,
            in_stock: sku.in_stock,
            sold_out: sku.sold_out,
            available_grams: sku.available_grams,
            updated_at: sku.updated_at,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementResponse {
    pub id: String,
    pub direction: String,
    pub grams: i64,
    pub note: String,
    pub order_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<StockMovement> for MovementResponse {
    fn from(movement: StockMovement) -> Self {
        Self {
            id: movement.id.to_string(),
            direction: movement.direction.to_string(),
            grams: movement.grams,
            note: movement.note,
            order_id: movement.order_id.map(|id| id.to_string()),
            created_at: movement.created_at,
        }
    }
}

pub(crate) async fn find_sku<S: InventoryStore>(store: &S, code: &str) -> Result<Sku, ApiError> {
    store
        .get_sku_by_code(code)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("SKU {code} not found")))
}

/// GET /skus/{code} — current stock state of a SKU.
#[tracing::instrument(skip(state))]
pub async fn get<S: InventoryStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(code): Path<String>,
) -> Result<Json<SkuResponse>, ApiError> {
    let sku = find_sku(&state.store, &code).await?;
    Ok(Json(sku.into()))
}

/// GET /skus/{code}/movements — stock ledger, newest first.
#[tracing::instrument(skip(state))]
pub async fn movements<S: InventoryStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(code): Path<String>,
) -> Result<Json<Vec<MovementResponse>>, ApiError> {
    let sku = find_sku(&state.store, &code).await?;
    let movements = state.store.movements_for_sku(sku.id).await?;
    Ok(Json(movements.into_iter().map(Into::into).collect()))
}
