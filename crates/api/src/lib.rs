//! HTTP API for storefront checkout and stock administration.
//!
//! Provides order placement with atomic stock reservation, cart quotes,
//! catalog and ledger lookups, and token-protected restocking, with
//! structured logging (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use checkout::{CheckoutService, InMemoryCouponService, LogNotifier, Restocker};
use domain::{CatalogQuoteService, ShippingRates};
use inventory_store::InventoryStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::AdminAuth;
use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: InventoryStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    admin: AdminAuth,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let admin_router = Router::new()
        .route("/admin/skus", post(routes::admin::create_sku::<S>))
        .route(
            "/admin/skus/{code}/restock",
            post(routes::admin::restock::<S>),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            admin,
            auth::require_admin,
        ));

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<S>))
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/quote", post(routes::quote::create::<S>))
        .route("/skus/{code}", get(routes::skus::get::<S>))
        .route("/skus/{code}/movements", get(routes::skus::movements::<S>))
        .merge(admin_router)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over `store` with default pricing,
/// an empty coupon book and log-only notifications.
pub fn create_state<S: InventoryStore + Clone + 'static>(
    store: S,
    reservation_timeout: Duration,
) -> Arc<AppState<S>> {
    let quotes = CatalogQuoteService::new(store.clone());
    let shipping_rates = ShippingRates::default();
    let checkout = CheckoutService::new(
        store.clone(),
        quotes.clone(),
        InMemoryCouponService::new(),
        LogNotifier::default(),
    )
    .with_rates(shipping_rates)
    .with_timeout(reservation_timeout);
    let restocker = Restocker::new(store.clone()).with_timeout(reservation_timeout);

    Arc::new(AppState {
        store,
        checkout,
        quotes,
        restocker,
        shipping_rates,
    })
}
