//! Catalog administration. Mounted behind [`crate::auth::require_admin`].

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use domain::ValidationErrors;
use inventory_store::{InventoryStore, Money, NewSku, SaleMode};
use serde::Deserialize;

use crate::error::ApiError;
use crate::routes::orders::AppState;
use crate::routes::skus::{SkuResponse, find_sku};

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSkuRequest {
    pub code: String,
    pub name: String,
    pub sale_mode: SaleMode,
    /// Minor currency units per gram.
    pub price_per_gram: i64,
    #[serde(default)]
    pub weight_grams: Option<i64>,
    #[serde(default)]
    pub available_grams: i64,
}

impl CreateSkuRequest {
    fn into_new_sku(self) -> Result<NewSku, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let code = self.code.trim().to_string();
        let name = self.name.trim().to_string();
        if code.is_empty() {
            errors.push("code", "Code is required");
        }
        if name.is_empty() {
            errors.push("name", "Name is required");
        }
        if self.price_per_gram < 0 {
            errors.push("pricePerGram", "Price cannot be negative");
        }
        let price = Money::from_minor(self.price_per_gram);

        let sku = match self.sale_mode {
            SaleMode::PieceByWeight => match self.weight_grams {
                Some(weight) if weight > 0 => Some(NewSku::piece(&code, &name, weight, price)),
                _ => {
                    errors.push("weightGrams", "Pieces need a positive weight");
                    None
                }
            },
            SaleMode::BulkGrams => {
                if self.available_grams < 0 {
                    errors.push("availableGrams", "Stock cannot be negative");
                }
                Some(NewSku::bulk(&code, &name, self.available_grams, price))
            }
        };

        match sku {
            Some(sku) if errors.is_empty() => Ok(sku),
            _ => Err(errors),
        }
    }
}

#[derive(Deserialize)]
pub struct RestockRequest {
    #[serde(default)]
    pub grams: i64,
    #[serde(default)]
    pub note: Option<String>,
}

// -- Handlers --

/// POST /admin/skus — add a SKU to the catalog.
#[tracing::instrument(skip(state, payload))]
pub async fn create_sku<S: InventoryStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateSkuRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SkuResponse>), ApiError> {
    let Json(request) = payload?;
    let sku = state.store.create_sku(request.into_new_sku()?).await?;
    tracing::info!(sku = %sku.code, sale_mode = %sku.sale_mode, "SKU created");
    Ok((StatusCode::CREATED, Json(sku.into())))
}

/// POST /admin/skus/{code}/restock — put stock back on sale.
#[tracing::instrument(skip(state, payload))]
pub async fn restock<S: InventoryStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(code): Path<String>,
    payload: Result<Json<RestockRequest>, JsonRejection>,
) -> Result<Json<SkuResponse>, ApiError> {
    let Json(request) = payload?;
    let sku = find_sku(&state.store, &code).await?;
    let note = request
        .note
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "Restock".to_string());

    let sku = state.restocker.restock(sku.id, request.grams, &note).await?;
    Ok(Json(sku.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(sale_mode: SaleMode) -> CreateSkuRequest {
        CreateSkuRequest {
            code: " BULK-60 ".to_string(),
            name: "Blond 60 cm".to_string(),
            sale_mode,
            price_per_gram: 3_000,
            weight_grams: None,
            available_grams: 500,
        }
    }

    #[test]
    fn bulk_request_becomes_bulk_sku() {
        let sku = request(SaleMode::BulkGrams).into_new_sku().unwrap();
        assert_eq!(sku.code, "BULK-60");
        assert_eq!(sku.available_grams, 500);
        assert_eq!(sku.price_per_gram, Money::from_minor(3_000));
    }

    #[test]
    fn piece_without_weight_is_rejected() {
        let errors = request(SaleMode::PieceByWeight).into_new_sku().unwrap_err();
        assert_eq!(errors.fields()[0].field, "weightGrams");
    }

    #[test]
    fn piece_with_weight_is_accepted() {
        let sku = CreateSkuRequest {
            weight_grams: Some(120),
            ..request(SaleMode::PieceByWeight)
        }
        .into_new_sku()
        .unwrap();
        assert_eq!(sku.weight_grams, Some(120));
    }

    #[test]
    fn negative_values_are_reported_together() {
        let errors = CreateSkuRequest {
            price_per_gram: -1,
            available_grams: -5,
            ..request(SaleMode::BulkGrams)
        }
        .into_new_sku()
        .unwrap_err();
        let fields: Vec<_> = errors.fields().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["pricePerGram", "availableGrams"]);
    }
}
