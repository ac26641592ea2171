//! # Error Types
//!
//! Domain-specific error types for oakline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  oakline-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations in patches/posting    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  oakline-db errors (separate crate)                                    │
//! │  └── DbError          - Storage failures (wraps CoreError)             │
//! │                                                                         │
//! │  Dashboard errors (in app)                                             │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Read-only list operations (filter, sort, aggregate) never produce these.
//! Only state-changing operations can fail.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record referenced by id does not exist in the collection.
    #[error("{kind} not found: {id}")]
    RecordNotFound { kind: String, id: String },

    /// Journal entry debits and credits differ.
    ///
    /// ## When This Occurs
    /// ```text
    /// JE-005: Dr 5100 Salaries  $1,000.00
    ///         Cr 1000 Cash        $900.00
    ///      │
    ///      ▼
    /// UnbalancedEntry { entry_id: "JE-005", debits: 100000, credits: 90000 }
    /// ```
    #[error("Journal entry {entry_id} is unbalanced: debits {debits}, credits {credits}")]
    UnbalancedEntry {
        entry_id: String,
        debits: i64,
        credits: i64,
    },

    /// A journal line refers to an account code missing from the chart.
    #[error("Unknown account code: {0}")]
    UnknownAccount(String),

    /// The record is not in a state that allows the requested operation.
    #[error("{kind} {id} is {current_status}, cannot {operation}")]
    InvalidStatus {
        kind: String,
        id: String,
        current_status: String,
        operation: String,
    },

    /// Payment exceeds the outstanding balance.
    #[error("Payment of {amount} exceeds outstanding balance {balance} on {invoice_id}")]
    Overpayment {
        invoice_id: String,
        amount: i64,
        balance: i64,
    },

    /// Charge exceeds the customer's available credit.
    #[error("Charge of {requested} exceeds available credit {available} on {account_id}")]
    CreditLimitExceeded {
        account_id: String,
        available: i64,
        requested: i64,
    },

    /// Not enough stock to move, reserve or release.
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// A derived field disagrees with the fields it is derived from.
    #[error("Invariant violated on {id}: {rule}")]
    InvariantViolation { id: String, rule: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a RecordNotFound error.
    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::RecordNotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates an InvalidStatus error.
    pub fn invalid_status(
        kind: impl Into<String>,
        id: impl Into<String>,
        current_status: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        CoreError::InvalidStatus {
            kind: kind.into(),
            id: id.into(),
            current_status: current_status.into(),
            operation: operation.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed account code, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., two accounts sharing a code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::CreditLimitExceeded {
            account_id: "CRED-003".to_string(),
            available: 180_000,
            requested: 500_000,
        };
        assert_eq!(
            err.to_string(),
            "Charge of 500000 exceeds available credit 180000 on CRED-003"
        );

        let err = CoreError::invalid_status("Invoice", "INV-003", "Paid", "cancel");
        assert_eq!(err.to_string(), "Invoice INV-003 is Paid, cannot cancel");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        };
        assert_eq!(err.to_string(), "search must be at most 100 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
