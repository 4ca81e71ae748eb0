//! Cart preview pricing.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use domain::{CartLine, QuoteService, QuotedLine, ValidationErrors, checkout::MAX_LINES};
use inventory_store::{DeliveryMethod, InventoryStore, Money};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::orders::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub delivery_method: Option<DeliveryMethod>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub items: Vec<QuotedLine>,
    pub subtotal: Money,
    /// Present when a delivery method was given.
    pub shipping_cost: Option<Money>,
    pub total: Money,
}

/// POST /quote — price a cart without touching stock.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: InventoryStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let Json(request) = payload?;

    let mut errors = ValidationErrors::default();
    if request.items.is_empty() {
        errors.push("items", "Cart is empty");
    } else if request.items.len() > MAX_LINES {
        errors.push("items", format!("At most {MAX_LINES} items per order"));
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let quote = state.quotes.quote(&request.items).await?;
    let shipping_cost = request
        .delivery_method
        .map(|method| state.shipping_rates.cost_for(method, quote.subtotal));

    Ok(Json(QuoteResponse {
        total: quote.subtotal + shipping_cost.unwrap_or_default(),
        subtotal: quote.subtotal,
        shipping_cost,
        items: quote.items,
    }))
}
