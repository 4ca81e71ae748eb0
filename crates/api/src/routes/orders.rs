//! Order placement and lookup endpoints.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::{CheckoutService, InMemoryCouponService, LogNotifier, Restocker};
use chrono::{DateTime, Utc};
use domain::{CatalogQuoteService, CheckoutRequest, ShippingRates};
use inventory_store::{
    InventoryStore, Money, OrderId, OrderItemRecord, OrderRecord, PickupPoint,
};
use serde::Serialize;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: InventoryStore> {
    pub store: S,
    pub checkout:
        CheckoutService<S, CatalogQuoteService<S>, InMemoryCouponService, LogNotifier>,
    pub quotes: CatalogQuoteService<S>,
    pub restocker: Restocker<S>,
    pub shipping_rates: ShippingRates,
}

// -- Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub sku_code: String,
    pub name: String,
    pub ending: String,
    pub grams: i64,
    pub price_per_gram: Money,
    pub line_total: Money,
    pub assembly_fee: Money,
    pub line_grand_total: Money,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        Self {
            sku_code: item.sku_code,
            name: item.name,
            ending: item.ending,
            grams: item.grams,
            price_per_gram: item.price_per_gram,
            line_total: item.line_total,
            assembly_fee: item.assembly_fee,
            line_grand_total: item.line_grand_total,
        }
    }
}

/// Body of a successful `POST /orders`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedResponse {
    pub order_id: String,
    pub email: String,
    pub total: Money,
    pub order_status: String,
    pub message: &'static str,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub delivery_method: String,
    pub pickup_point: Option<PickupPoint>,
    pub coupon_code: Option<String>,
    pub order_status: String,
    pub payment_status: String,
    pub delivery_status: String,
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub discount: Money,
    pub total: Money,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrderRecord> for OrderResponse {
    fn from(order: OrderRecord) -> Self {
        Self {
            id: order.id.to_string(),
            email: order.email,
            name: order.shipping.name,
            phone: order.shipping.phone,
            street: order.shipping.street,
            city: order.shipping.city,
            postal_code: order.shipping.postal_code,
            country: order.shipping.country,
            delivery_method: order.shipping.delivery_method.to_string(),
            pickup_point: order.shipping.pickup_point,
            coupon_code: order.coupon_code,
            order_status: order.order_status.to_string(),
            payment_status: order.payment_status.to_string(),
            delivery_status: order.delivery_status.to_string(),
            subtotal: order.subtotal,
            shipping_cost: order.shipping_cost,
            discount: order.discount,
            total: order.total,
            items: order.items.into_iter().map(Into::into).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

// -- Handlers --

/// POST /orders — validate, price, reserve stock and create the order.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: InventoryStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderCreatedResponse>), ApiError> {
    let Json(request) = payload?;
    let order = state.checkout.place_order(request).await?;

    let response = OrderCreatedResponse {
        order_id: order.id.to_string(),
        email: order.email,
        total: order.total,
        order_status: order.order_status.to_string(),
        message: "Order created successfully",
        items: order.items.into_iter().map(Into::into).collect(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /orders/{id} — load a stored order with its items.
#[tracing::instrument(skip(state))]
pub async fn get<S: InventoryStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = OrderId::from_str(&id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID: {e}")))?;
    let order = state
        .store
        .get_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    Ok(Json(order.into()))
}
