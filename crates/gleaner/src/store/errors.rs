use sea_orm::DbErr;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Invalid input data, rejected before any database call.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl StoreError {
    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Check if this error is a transient deadlock that warrants retrying
    /// the whole upsert transaction.
    ///
    /// Postgres reports upsert-order conflicts as "deadlock detected"
    /// (SQLSTATE 40P01); SQLite's equivalent lock contention surfaces as
    /// "database is locked" when the busy timeout expires.
    pub fn is_deadlock(&self) -> bool {
        match self {
            StoreError::Database(db_err) => {
                let message = db_err.to_string().to_lowercase();
                message.contains("deadlock detected") || message.contains("database is locked")
            }
            StoreError::InvalidInput { .. } => false,
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
