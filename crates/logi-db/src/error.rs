//! # Database Errors
//!
//! Error type for every logi-db operation.
//!
//! ## Error Classes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Connectivity   ConnectionFailed, PoolExhausted, Io                     │
//! │                 → rate reads fall back to defaults                      │
//! │                 → record reads/writes surface to the caller             │
//! │                                                                         │
//! │  NotFound       only raised by update(); reads return Option and       │
//! │                 deletes report 0 rows instead                           │
//! │                                                                         │
//! │  Constraint     CHECK / NOT NULL / append-only trigger violations      │
//! │                                                                         │
//! │  No operation is retried automatically.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Updating an operation id that doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Constraint violation (CHECK, NOT NULL, append-only trigger).
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created or opened
    /// - File permissions issue
    /// - Pool already closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// I/O failure talking to the database file.
    #[error("Database I/O failed: {0}")]
    Io(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A filter or argument was rejected before reaching SQL.
    #[error("Invalid input: {0}")]
    Validation(#[from] logi_core::ValidationError),

    /// A stored row could not be decoded.
    #[error("Malformed row: {0}")]
    MalformedRow(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// True when the store could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_) | DbError::PoolExhausted | DbError::Io(_)
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound      → DbError::NotFound
/// sqlx::Error::Database         → constraint or query failure
/// sqlx::Error::PoolTimedOut     → DbError::PoolExhausted
/// sqlx::Error::PoolClosed       → DbError::ConnectionFailed
/// sqlx::Error::Io               → DbError::Io
/// sqlx::Error::ColumnDecode     → DbError::MalformedRow
/// Other                         → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "CHECK constraint failed: ...", "NOT NULL constraint failed: ..."
                // RAISE(ABORT, ...) from the append-only triggers
                if msg.contains("constraint failed") || msg.contains("append-only") {
                    DbError::ConstraintViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::Io(e.to_string()),

            sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) => {
                DbError::MalformedRow(err.to_string())
            }

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_connectivity() {
        assert!(DbError::from(sqlx::Error::PoolClosed).is_connectivity());
        assert!(DbError::from(sqlx::Error::PoolTimedOut).is_connectivity());
        assert!(!DbError::not_found("Operation", 7).is_connectivity());
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            DbError::not_found("Operation", 7).to_string(),
            "Operation not found: 7"
        );
    }
}
