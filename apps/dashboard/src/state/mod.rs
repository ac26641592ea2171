//! # State Module
//!
//! Dashboard state, split into focused types so each command takes only
//! what it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │   StoreState     │  │ DashboardConfig  │  │   SelectionState     │  │
//! │  │                  │  │                  │  │                      │  │
//! │  │  Arc<dyn Repo<T>>│  │  currency        │  │  Arc<Mutex<          │  │
//! │  │  per record kind │  │  tax rate, as-of │  │    kind → Selection  │  │
//! │  │  (memory/sqlite) │  │  page size       │  │  >>                  │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • StoreState: repositories lock or pool internally                    │
//! │  • DashboardConfig: read-only after startup                            │
//! │  • SelectionState: Mutex for exclusive access                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod selection;
mod store;

pub use config::{ConfigError, DashboardConfig, StorageKind};
pub use selection::SelectionState;
pub use store::StoreState;
