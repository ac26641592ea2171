//! # Oakline Dashboard Library
//!
//! Screen commands for the Oakline ERP dashboard. The binary in `main.rs`
//! exposes each command as a CLI subcommand that prints JSON.
//!
//! ## Module Organization
//! ```text
//! oakline_dashboard/
//! ├── lib.rs          ◄─── You are here (tracing setup)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── Business settings from the environment
//! │   ├── store.rs    ◄─── One repository per record kind
//! │   └── selection.rs◄─── Open detail overlays
//! ├── commands/       ◄─── One module per screen
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## State Management
//! Commands take only the state they need:
//!
//! ```text
//! ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐
//! │   StoreState     │ │  SelectionState  │ │   DashboardConfig    │
//! │                  │ │                  │ │                      │
//! │  • Repositories  │ │  • Open record   │ │  • Business name     │
//! │  • Database      │ │    per screen    │ │  • Currency, tax     │
//! │                  │ │                  │ │  • Reporting date    │
//! └──────────────────┘ └──────────────────┘ └──────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so command output on stdout stays valid JSON.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=oakline=trace` - Show trace for oakline crates only
/// - Default: INFO, DEBUG for oakline crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,oakline=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
