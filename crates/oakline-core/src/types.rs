//! # Shared Types
//!
//! Small types used by more than one domain module.
//!
//! ## Dual-Key Identity
//! Dashboard records are identified by their business id (`INV-002`,
//! `CRED-001`). Storage-only rows such as [`RecordChange`] use UUID v4.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Payment Method
// =============================================================================

/// How a customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    CreditCard,
    Check,
    Cash,
}

impl PaymentMethod {
    /// Dropdown label.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::Check => "Check",
            PaymentMethod::Cash => "Cash",
        }
    }
}

// =============================================================================
// Record Change
// =============================================================================

/// One committed patch, as recorded by a persistent store.
///
/// The change log is append-only: a row is written in the same transaction
/// as the record update it describes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RecordChange {
    pub id: String,
    /// Record kind: "Invoice", "CreditAccount", ...
    pub kind: String,
    pub record_id: String,
    /// The patch as JSON.
    pub patch: String,
    /// Record version after this change.
    pub version: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}
