//! # Validation Module
//!
//! Input validation for patches and new records.
//!
//! ## Where Checks Happen
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Command (dashboard app)                                      │
//! │  ├── Type validation (clap / serde)                                    │
//! │  └── ListSpec::validate_query for list queries                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Record::apply_patch (domain modules)                         │
//! │  ├── THIS MODULE: field rules                                          │
//! │  └── check_invariant: derived fields agree after the patch             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storage (SQLite)                                             │
//! │  └── UNIQUE (kind, id)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use oakline_core::validation::{validate_account_code, validate_sku};
//!
//! assert!(validate_account_code("1100").is_ok());
//! assert!(validate_sku("OAK-DT-001").is_ok());
//! ```

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{Money, Rate};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest name or description accepted on any record.
pub const MAX_NAME_LENGTH: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a chart-of-accounts code.
///
/// ## Rules
/// - Exactly four ASCII digits
///
/// ```rust
/// use oakline_core::validation::validate_account_code;
///
/// assert!(validate_account_code("4000").is_ok());
/// assert!(validate_account_code("40").is_err());
/// assert!(validate_account_code("40A0").is_err());
/// ```
pub fn validate_account_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "account".to_string(),
        });
    }
    if code.len() != 4 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "account".to_string(),
            reason: "must be four digits".to_string(),
        });
    }
    Ok(())
}

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, hyphens and underscores only
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a required display name and returns it trimmed.
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(value.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Amount must be greater than zero (payments, charges, line prices).
pub fn validate_positive_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Amount may be zero but not negative (costs, limits).
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Quantity must be at least one.
pub fn validate_quantity(field: &str, quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Rate must lie within 0% ..= 100%.
pub fn validate_rate(field: &str, rate: Rate) -> ValidationResult<()> {
    if !(0..=10_000).contains(&rate.bps()) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10_000,
        });
    }
    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// The later date may not precede the earlier one.
pub fn validate_date_order(
    field: &str,
    earlier: NaiveDate,
    later: NaiveDate,
) -> ValidationResult<()> {
    if later < earlier {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("{} is before {}", later, earlier),
        });
    }
    Ok(())
}

// =============================================================================
// Invariants
// =============================================================================

/// Fails with `InvariantViolation` when `holds` is false.
///
/// Records call this at the end of `apply_patch` and from their
/// `check_invariants` so a derived field can never silently drift.
pub fn check_invariant(id: &str, holds: bool, rule: impl FnOnce() -> String) -> CoreResult<()> {
    if holds {
        Ok(())
    } else {
        Err(CoreError::InvariantViolation {
            id: id.to_string(),
            rule: rule(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
