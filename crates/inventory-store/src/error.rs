use thiserror::Error;

use crate::OrderId;

/// SQLSTATE codes PostgreSQL raises when a serializable transaction loses a race.
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
/// Raised when `statement_timeout` cancels a statement.
const QUERY_CANCELED: &str = "57014";

/// Errors that can occur when interacting with the inventory store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The transaction could not be serialized against a concurrent one and
    /// was rolled back. Safe to retry.
    #[error("Transaction aborted by a concurrent update")]
    SerializationConflict,

    /// The transaction exceeded its time budget and was rolled back.
    #[error("Transaction timed out")]
    Timeout,

    /// A SKU with this code already exists.
    #[error("SKU code already exists: {0}")]
    DuplicateSku(String),

    /// The order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// A persisted value could not be decoded.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Returns true if the failure came from transaction isolation or the
    /// transaction deadline rather than from the data itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::SerializationConflict | StoreError::Timeout)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && let Some(code) = db_err.code()
        {
            match code.as_ref() {
                SERIALIZATION_FAILURE | DEADLOCK_DETECTED => {
                    return StoreError::SerializationConflict;
                }
                QUERY_CANCELED => return StoreError::Timeout,
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// Result type for inventory store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_isolation_failures_are_retryable() {
        assert!(StoreError::SerializationConflict.is_retryable());
        assert!(StoreError::Timeout.is_retryable());
        assert!(!StoreError::DuplicateSku("X".into()).is_retryable());
        assert!(!StoreError::Database(sqlx::Error::RowNotFound).is_retryable());
    }

    #[test]
    fn non_database_sqlx_errors_stay_database_errors() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Database(sqlx::Error::PoolTimedOut)));
    }
}
