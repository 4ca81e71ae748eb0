//! Domain error types.

use inventory_store::StoreError;
use serde::Serialize;
use thiserror::Error;

use crate::quote::MAX_LINE_GRAMS;

/// Errors that can occur while pricing cart lines.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// No catalog item has this code.
    #[error("Product {0} does not exist")]
    UnknownSku(String),

    /// A bulk line asked for no stock, or for more than one line may hold.
    #[error("Product {sku_code}: quantity must be between 1 and {max} g (got {grams} g)", max = MAX_LINE_GRAMS)]
    InvalidGrams {
        /// Position of the offending line in the cart.
        line: usize,
        sku_code: String,
        grams: i64,
    },

    /// A line or the order total does not fit in the money type.
    #[error("Order amount is out of range")]
    AmountOutOfRange,

    /// The catalog could not be read.
    #[error("Catalog unavailable: {0}")]
    Store(#[from] StoreError),
}

impl QuoteError {
    /// The request field this error points at, for errors caused by one line.
    pub fn field_error(&self) -> Option<FieldError> {
        match self {
            QuoteError::InvalidGrams { line, .. } => {
                Some(FieldError::new(format!("items[{line}].grams"), self.to_string()))
            }
            _ => None,
        }
    }
}

/// A single rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every problem found in a checkout request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("Validation failed: {}", summarize(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_grams_points_at_its_line() {
        let err = QuoteError::InvalidGrams {
            line: 2,
            sku_code: "X".to_string(),
            grams: 0,
        };
        let field = err.field_error().unwrap();
        assert_eq!(field.field, "items[2].grams");
        assert_eq!(
            field.message,
            format!("Product X: quantity must be between 1 and {MAX_LINE_GRAMS} g (got 0 g)")
        );
        assert_eq!(QuoteError::UnknownSku("X".to_string()).field_error(), None);
    }

    #[test]
    fn validation_message_lists_every_field() {
        let mut errors = ValidationErrors::default();
        errors.push("email", "is required");
        errors.push("items", "must not be empty");

        assert_eq!(
            errors.to_string(),
            "Validation failed: email: is required; items: must not be empty"
        );
    }
}
