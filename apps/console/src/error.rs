//! # Console Error Type
//!
//! Unified error type for console commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cli::parse ───── bad flag / missing value ─────────► Usage            │
//! │  AppConfig ────── ConfigError::InvalidValue ────────► Usage            │
//! │  commands ─────── ValidationError / CoreError ──────► ValidationError  │
//! │           ─────── DbError::NotFound ────────────────► NotFound         │
//! │           ─────── DbError (connectivity, query) ────► DatabaseError    │
//! │           ─────── admin key mismatch ───────────────► Forbidden        │
//! │  receipt files ── std::io::Error ───────────────────► Io               │
//! │                                                                         │
//! │  main prints "[CODE] message" to stderr and exits non-zero.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::config::ConfigError;
use logi_core::{CoreError, ValidationError};
use logi_db::DbError;

/// Error returned by every console command.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Operation not found: 42"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for console failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record or receipt not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Rate administration refused
    Forbidden,

    /// Reading or writing a receipt file failed
    Io,

    /// Bad command line or environment
    Usage,

    /// Anything else
    Internal,
}

impl ErrorCode {
    /// Process exit status for this error class.
    pub fn exit_status(self) -> u8 {
        match self {
            ErrorCode::Usage => 2,
            _ => 1,
        }
    }
}

impl AppError {
    /// Creates a new console error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        AppError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Forbidden, message)
    }

    /// Creates a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Usage, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to console errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(&entity, id),
            DbError::Validation(e) => AppError::validation(e.to_string()),
            DbError::ConstraintViolation { message } => {
                tracing::error!("Constraint violation: {}", message);
                AppError::validation("Rejected by the database constraints")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::Io(e) => {
                tracing::error!("Database I/O failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database unavailable")
            }
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::QueryFailed(e) | DbError::MalformedRow(e) | DbError::Internal(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", e);
                AppError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to console errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::OperationNotFound(id) => AppError::not_found("Operation", id),
            err @ CoreError::EmptyPatch(_) => AppError::validation(err.to_string()),
            CoreError::Validation(e) => AppError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::usage(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::new(ErrorCode::Io, err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::internal(format!("JSON encoding failed: {}", err))
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

/// Result type for console commands.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_not_found_maps_to_not_found() {
        let err = AppError::from(DbError::not_found("Operation", 9));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Operation not found: 9");
    }

    #[test]
    fn test_connectivity_maps_to_database_error() {
        let err = AppError::from(DbError::PoolExhausted);
        assert_eq!(err.code, ErrorCode::DatabaseError);
    }

    #[test]
    fn test_empty_patch_is_validation() {
        let err = AppError::from(CoreError::EmptyPatch(3));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains('3'));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(AppError::forbidden("nope")).unwrap();
        assert_eq!(json["code"], "FORBIDDEN");
        assert_eq!(json["message"], "nope");
    }

    #[test]
    fn test_usage_exit_status() {
        assert_eq!(ErrorCode::Usage.exit_status(), 2);
        assert_eq!(ErrorCode::NotFound.exit_status(), 1);
    }
}
