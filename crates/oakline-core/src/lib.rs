//! # oakline-core: Pure Business Logic for the Oakline Dashboard
//!
//! This crate holds every computation behind the furniture-business admin
//! dashboard: accounting, billing, credit, inventory, orders, pricing, tax and
//! analytics. All of it is pure functions over in-memory records.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Oakline Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Dashboard frontend (React)                       │   │
//! │  │   Search box ──► Status dropdown ──► Table ──► Detail modal    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 Dashboard commands (apps/dashboard)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ oakline-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐         │   │
//! │  │   │   list   │ │accounting│ │ billing  │ │inventory │  ...    │   │
//! │  │   │ ListSpec │ │  Trial   │ │  Aging   │ │  Alerts  │         │   │
//! │  │   │ Selection│ │  Balance │ │ Payments │ │ Movements│         │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               oakline-db (Repository Layer)                     │   │
//! │  │        fixture memory store, SQLite document store              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`list`] - The filterable, aggregated, paginated list every screen uses
//! - [`record`] - The `Record` trait tying entities to storage and lists
//! - [`money`] - Integer-cent `Money` and basis-point `Rate`
//! - [`accounting`], [`billing`], [`credit`], [`inventory`], [`orders`],
//!   [`pricing`], [`tax`] - Domain records and their rules
//! - [`analytics`], [`report`] - Derived views across record sets
//! - [`fixtures`] - The seeded dashboard data
//! - [`validation`] - Input validation and invariant checks
//!
//! ## Example Usage
//!
//! ```rust
//! use oakline_core::fixtures;
//! use oakline_core::list::{CategorySelection, ListQuery};
//! use oakline_core::record::Record;
//! use oakline_core::billing::Invoice;
//!
//! let invoices = fixtures::invoices();
//! let query = ListQuery::search("Elite").with_category("status", CategorySelection::only("Partial"));
//!
//! let matches = Invoice::list_spec().apply_filters(&invoices, &query);
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].id, "INV-002");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod accounting;
pub mod analytics;
pub mod billing;
pub mod credit;
pub mod error;
pub mod fixtures;
pub mod inventory;
pub mod list;
pub mod money;
pub mod orders;
pub mod pricing;
pub mod record;
pub mod report;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use list::{AggregateValue, CategorySelection, ListPage, ListQuery, ListSpec, Selection};
pub use money::{Money, Rate};
pub use record::{NoPatch, Record};
pub use types::RecordChange;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Sentinel value a categorical dropdown uses for "no filter".
pub const ALL_SENTINEL: &str = "All";

/// Default number of rows per dashboard table page.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Longest search string accepted from a dashboard search box.
pub const MAX_SEARCH_LENGTH: usize = 100;
