//! # API Error Type
//!
//! Unified error type for dashboard commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Dashboard                          │
//! │                                                                         │
//! │  record_payment("INV-002", $20,000)                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Storage Error? ──── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Business rule? ──── CoreError::Overpayment ───── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "PAYMENT_ERROR",                                            │
//! │    "message": "Payment of 2000000 exceeds outstanding balance ..." }   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use oakline_core::{CoreError, ValidationError};
use oakline_db::DbError;
use serde::Serialize;

use crate::state::ConfigError;

/// API error returned from dashboard commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Invoice not found: INV-404"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Record not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Storage operation failed (500)
    DatabaseError,

    /// Business rule rejected the change (422)
    BusinessLogic,

    /// Journal entry debits and credits differ
    UnbalancedEntry,

    /// Payment above the outstanding balance
    PaymentError,

    /// Charge above the available credit
    CreditLimitExceeded,

    /// Insufficient stock
    InsufficientStock,

    /// Bad environment configuration
    ConfigError,

    /// Internal error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts storage errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::Core(e) => ApiError::from(e),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Serialization(e) => {
                tracing::error!("Stored document could not be decoded: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Stored record is unreadable")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        let code = match &err {
            CoreError::RecordNotFound { .. } => ErrorCode::NotFound,
            CoreError::UnbalancedEntry { .. } => ErrorCode::UnbalancedEntry,
            CoreError::UnknownAccount(_) => ErrorCode::ValidationError,
            CoreError::InvalidStatus { .. } => ErrorCode::BusinessLogic,
            CoreError::Overpayment { .. } => ErrorCode::PaymentError,
            CoreError::CreditLimitExceeded { .. } => ErrorCode::CreditLimitExceeded,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::InvariantViolation { .. } => {
                tracing::error!("{}", message);
                ErrorCode::BusinessLogic
            }
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };
        ApiError::new(code, message)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use oakline_core::Money;

    #[test]
    fn test_core_errors_map_to_codes() {
        let err: ApiError = CoreError::Overpayment {
            invoice_id: "INV-002".to_string(),
            amount: Money::from_major(20_000).cents(),
            balance: Money::from_major(13_840).cents(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::PaymentError);
        assert!(err.message.contains("INV-002"));
    }

    #[test]
    fn test_db_wrapped_core_error_keeps_its_code() {
        let core = CoreError::CreditLimitExceeded {
            account_id: "CRED-003".to_string(),
            available: 180_000,
            requested: 500_000,
        };
        let err: ApiError = DbError::Core(core).into();
        assert_eq!(err.code, ErrorCode::CreditLimitExceeded);
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::not_found("Invoice", "INV-404");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Invoice not found: INV-404");
    }
}
