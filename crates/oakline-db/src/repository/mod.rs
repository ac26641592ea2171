//! # Repository Module
//!
//! The storage interface every dashboard screen reads and patches through.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Interface, Two Stores                            │
//! │                                                                         │
//! │  Dashboard command                                                     │
//! │       │                                                                 │
//! │       │  repo.update("CRED-003", CreditAction::Charge { amount })      │
//! │       ▼                                                                 │
//! │  Repository<T: Record>                                                 │
//! │  ├── all()            insertion order                                  │
//! │  ├── list(query)      through T::list_spec()                           │
//! │  ├── get(id)                                                           │
//! │  ├── insert(record)                                                    │
//! │  ├── update(id, patch)  → Record::apply_patch, then persist            │
//! │  └── count()                                                           │
//! │       │                                                                 │
//! │       ├──────────────────────────┐                                     │
//! │       ▼                          ▼                                      │
//! │  MemoryRepository<T>       SqliteRepository<T>                         │
//! │  RwLock<Vec<T>>            records + record_changes                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected patch leaves the stored record untouched in both stores.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use oakline_core::{ListQuery, Record};

use crate::error::DbResult;

/// Storage for one record kind.
#[async_trait]
pub trait Repository<T: Record>: Send + Sync {
    /// Every record, in insertion order.
    async fn all(&self) -> DbResult<Vec<T>>;

    /// Records matching `query`, filtered and sorted by the record's list
    /// spec. Pagination and aggregates are left to the caller.
    async fn list(&self, query: &ListQuery) -> DbResult<Vec<T>> {
        let items = self.all().await?;
        Ok(T::list_spec().filter_owned(items, query))
    }

    /// One record by business id, or `DbError::NotFound`.
    async fn get(&self, id: &str) -> DbResult<T>;

    /// Stores a new record. A duplicate id gives `DbError::UniqueViolation`.
    async fn insert(&self, record: T) -> DbResult<T>;

    /// Applies `patch` through `Record::apply_patch` and persists the result.
    async fn update(&self, id: &str, patch: T::Patch) -> DbResult<T>;

    async fn count(&self) -> DbResult<usize>;
}
