//! API error types with HTTP response mapping.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{CheckoutError, RETRY_MESSAGE, ReservationError, RestockError};
use domain::{FieldError, QuoteError, ValidationErrors};
use inventory_store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Missing or wrong admin token.
    Unauthorized,
    /// Request fields failed validation.
    Validation(ValidationErrors),
    /// Order placement failed.
    Checkout(CheckoutError),
    /// Restocking failed.
    Restock(RestockError),
    /// Storage failure outside checkout.
    Store(StoreError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid bearer token".to_string(),
                None,
            ),
            ApiError::Validation(errors) => validation_response(errors),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Restock(err) => restock_error_to_response(err),
            ApiError::Store(err) => store_error_to_response(err),
            ApiError::Internal(msg) => internal(msg, "Internal server error"),
        };

        let body = match details {
            Some(details) => serde_json::json!({ "error": message, "details": details }),
            None => serde_json::json!({ "error": message }),
        };
        (status, axum::Json(body)).into_response()
    }
}

type Parts = (StatusCode, String, Option<Vec<FieldError>>);

/// Logs `detail` and answers with a message that reveals nothing about it.
fn internal(detail: String, public: &str) -> Parts {
    tracing::error!(error = %detail, "internal server error");
    (StatusCode::INTERNAL_SERVER_ERROR, public.to_string(), None)
}

fn validation_response(errors: ValidationErrors) -> Parts {
    (
        StatusCode::BAD_REQUEST,
        "Validation failed".to_string(),
        Some(errors.0),
    )
}

fn checkout_error_to_response(err: CheckoutError) -> Parts {
    match err {
        CheckoutError::Validation(errors) => validation_response(errors),
        CheckoutError::Quote(QuoteError::Store(e)) => {
            internal(format!("pricing failed: {e}"), "Failed to price order")
        }
        CheckoutError::Quote(e) => match e.field_error() {
            Some(field) => validation_response(ValidationErrors(vec![field])),
            None => (StatusCode::BAD_REQUEST, e.to_string(), None),
        },
        CheckoutError::Reservation(ReservationError::Stock(conflict)) => {
            (StatusCode::BAD_REQUEST, conflict.to_string(), None)
        }
        CheckoutError::Reservation(ReservationError::Retryable(_)) => {
            (StatusCode::BAD_REQUEST, RETRY_MESSAGE.to_string(), None)
        }
        CheckoutError::Reservation(ReservationError::NoLines) => {
            (StatusCode::BAD_REQUEST, "Order has no items".to_string(), None)
        }
        CheckoutError::Reservation(ReservationError::Store(e)) => {
            internal(format!("order creation failed: {e}"), "Failed to create order")
        }
    }
}

fn restock_error_to_response(err: RestockError) -> Parts {
    match err {
        RestockError::SkuNotFound(_) => (StatusCode::NOT_FOUND, err.to_string(), None),
        RestockError::InvalidGrams(_) | RestockError::PieceInStock(_) => {
            (StatusCode::BAD_REQUEST, err.to_string(), None)
        }
        RestockError::Store(e) => store_error_to_response(e),
    }
}

fn store_error_to_response(err: StoreError) -> Parts {
    match err {
        StoreError::DuplicateSku(_) => (StatusCode::CONFLICT, err.to_string(), None),
        StoreError::OrderNotFound(_) => (StatusCode::NOT_FOUND, err.to_string(), None),
        e if e.is_retryable() => (
            StatusCode::CONFLICT,
            "Concurrent update, please try again".to_string(),
            None,
        ),
        e => internal(e.to_string(), "Internal server error"),
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<RestockError> for ApiError {
    fn from(err: RestockError) -> Self {
        ApiError::Restock(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<QuoteError> for ApiError {
    fn from(err: QuoteError) -> Self {
        ApiError::Checkout(CheckoutError::Quote(err))
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::Validation(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn database_failures_do_not_leak_details() {
        let err = StoreError::Database(sqlx::Error::Protocol("password=hunter2".to_string()));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn catalog_failures_during_pricing_do_not_leak_details() {
        let err = QuoteError::Store(StoreError::Database(sqlx::Error::PoolTimedOut));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to price order");
    }

    #[tokio::test]
    async fn invalid_line_quantity_is_a_field_error() {
        let err = QuoteError::InvalidGrams {
            line: 1,
            sku_code: "X".to_string(),
            grams: 0,
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Validation failed");
        assert_eq!(json["details"][0]["field"], "items[1].grams");
    }
}
