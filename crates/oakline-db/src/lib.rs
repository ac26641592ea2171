//! # oakline-db: Storage Layer for the Oakline Dashboard
//!
//! Every dashboard screen reads and patches its records through a
//! [`Repository`]. Two implementations exist: a fixture-backed memory store
//! for demos and tests, and a SQLite document store that keeps a change log.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Oakline Data Flow                                │
//! │                                                                         │
//! │  Dashboard command (record_payment)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   oakline-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repository<T> │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ MemoryRepo<T>  │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SqliteRepo<T>  │   │ 001_records  │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   records (JSON documents)  +  record_changes (patch log)      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation, configuration and fixture seeding
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - The `Repository` trait and its two stores
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oakline_core::billing::{Invoice, InvoiceAction};
//! use oakline_db::{Database, DbConfig, Repository};
//!
//! let db = Database::new(DbConfig::new("oakline.db")).await?;
//! db.seed_fixtures().await?;
//!
//! let invoices = db.repository::<Invoice>();
//! let paid = invoices
//!     .update("INV-002", InvoiceAction::RecordPayment { amount })
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, SeedReport};

pub use repository::memory::MemoryRepository;
pub use repository::sqlite::SqliteRepository;
pub use repository::Repository;
