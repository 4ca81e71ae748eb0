//! Checkout error types.

use domain::{QuoteError, ValidationErrors};
use inventory_store::{SkuId, StoreError};
use thiserror::Error;

/// Message shown when a transaction lost a race or ran out of time.
///
/// Deliberately the same wording as a stock shortage: the customer's remedy
/// is identical either way.
pub const RETRY_MESSAGE: &str = "Insufficient stock, please try again";

/// A line could not be reserved. The message is shown to the customer as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockConflict {
    #[error("Product {sku_code} is no longer available")]
    SkuNotFound { sku_code: String },

    #[error("Product {sku_code} is out of stock")]
    OutOfStock { sku_code: String },

    #[error("Product {sku_code} has already been sold")]
    AlreadySold { sku_code: String },

    #[error("Product {sku_code}: only {available}g available, {requested}g requested")]
    InsufficientGrams {
        sku_code: String,
        available: i64,
        requested: i64,
    },
}

/// Errors that abort the reservation transaction.
#[derive(Debug, Error)]
pub enum ReservationError {
    /// Stock checks failed for a specific line.
    #[error(transparent)]
    Stock(#[from] StockConflict),

    /// Serialization conflict or deadline exceeded. Safe to resubmit.
    #[error("{RETRY_MESSAGE}")]
    Retryable(#[source] StoreError),

    /// Any other storage failure.
    #[error("Storage error: {0}")]
    Store(StoreError),

    #[error("Order has no lines")]
    NoLines,
}

impl ReservationError {
    /// Short label used for failure metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            ReservationError::Stock(_) => "stock",
            ReservationError::Retryable(StoreError::Timeout) => "timeout",
            ReservationError::Retryable(_) => "conflict",
            ReservationError::Store(_) => "store",
            ReservationError::NoLines => "no_lines",
        }
    }
}

impl From<StoreError> for ReservationError {
    fn from(err: StoreError) -> Self {
        if err.is_retryable() {
            ReservationError::Retryable(err)
        } else {
            ReservationError::Store(err)
        }
    }
}

/// Errors surfaced by [`CheckoutService::place_order`].
///
/// [`CheckoutService::place_order`]: crate::CheckoutService::place_order
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Quote(#[from] QuoteError),

    #[error(transparent)]
    Reservation(#[from] ReservationError),
}

/// Errors from restocking a SKU.
#[derive(Debug, Error)]
pub enum RestockError {
    #[error("SKU not found: {0}")]
    SkuNotFound(SkuId),

    #[error("Restock quantity {0} g is not valid")]
    InvalidGrams(i64),

    #[error("Piece {0} is already in stock")]
    PieceInStock(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
