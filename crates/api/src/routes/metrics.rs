//! Prometheus metrics endpoint and metric descriptions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use metrics::{Unit, describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusHandle;

/// Registers help text for the checkout metrics. Call once after installing
/// the recorder.
pub fn describe() {
    describe_counter!(
        "checkout_orders_created_total",
        "Orders whose stock reservation committed"
    );
    describe_counter!(
        "checkout_reservation_failures_total",
        "Reservation transactions rolled back, by reason"
    );
    describe_histogram!(
        "checkout_reservation_duration_seconds",
        Unit::Seconds,
        "Wall time of one reservation transaction"
    );
    describe_counter!(
        "checkout_post_commit_failures_total",
        "Coupon or e-mail steps that failed after an order committed, by step"
    );
}

/// GET /metrics — returns Prometheus-formatted metrics.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        handle.render(),
    )
}
