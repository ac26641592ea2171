//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite, plus loading the
//! fixture collections into a fresh database.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  Dashboard startup (storage = sqlite)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) ← Configure pool settings                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + run migrations            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.seed_fixtures() ← only when the store is empty                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.repository::<Invoice>()  db.repository::<CreditAccount>()  ...     │
//! │  (each repository shares the same SqlitePool)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! File databases run in WAL mode so list reads don't block patch writes.
//! In-memory databases keep SQLite's default journal.

use oakline_core::fixtures;
use oakline_core::Record;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::sqlite::{insert_document, SqliteRepository};

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/oakline.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for the database file at `path`. The file is
    /// created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the idle timeout.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for tests).
    ///
    /// An in-memory database lives and dies with its one connection, so the
    /// pool is pinned to a single connection that never idles out.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(24 * 60 * 60),
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY_PATH)
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        if self.is_in_memory() {
            return SqliteConnectOptions::from_str("sqlite::memory:")
                .map(|options| options.foreign_keys(true))
                .map_err(|e| DbError::ConnectionFailed(e.to_string()));
        }

        let connect_url = format!("sqlite://{}?mode=rwc", self.database_path.display());
        let options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite ships with foreign keys off
            .foreign_keys(true)
            .create_if_missing(true);
        Ok(options)
    }
}

// =============================================================================
// Seeding
// =============================================================================

/// How many records of each kind `seed_fixtures` wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub inserted: Vec<(String, usize)>,
    /// True when the store already held records and nothing was written.
    pub skipped: bool,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.inserted.iter().map(|(_, n)| n).sum()
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// ## Usage in Dashboard Commands
/// ```rust,ignore
/// let invoices = db.repository::<Invoice>();
/// let page = Invoice::list_spec().view(&invoices.all().await?, &query);
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Creates a new connection pool and, if enabled, runs migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing database connection"
        );

        let connect_options = config.connect_options()?;
        debug!(in_memory = config.is_in_memory(), "Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Runs database migrations. Safe to call more than once.
    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("Running database migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("Migrations complete");
        Ok(())
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the document repository for one record kind.
    pub fn repository<T: Record>(&self) -> SqliteRepository<T> {
        SqliteRepository::new(self.pool.clone())
    }

    /// Total records across every kind.
    pub async fn record_count(&self) -> DbResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    /// Loads every fixture collection into an empty store.
    ///
    /// Does nothing if any record already exists, so re-running is harmless.
    pub async fn seed_fixtures(&self) -> DbResult<SeedReport> {
        let existing = self.record_count().await?;
        if existing > 0 {
            info!(existing, "Store already seeded, skipping fixtures");
            return Ok(SeedReport {
                inserted: Vec::new(),
                skipped: true,
            });
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        // A failure on any kind drops `tx` and leaves the store empty.
        let mut report = SeedReport::default();
        seed(&mut tx, &mut report, fixtures::accounts()).await?;
        seed(&mut tx, &mut report, fixtures::journal_entries()).await?;
        seed(&mut tx, &mut report, fixtures::invoices()).await?;
        seed(&mut tx, &mut report, fixtures::statements()).await?;
        seed(&mut tx, &mut report, fixtures::payment_transactions()).await?;
        seed(&mut tx, &mut report, fixtures::credit_accounts()).await?;
        seed(&mut tx, &mut report, fixtures::inventory_items()).await?;
        seed(&mut tx, &mut report, fixtures::sales_orders()).await?;
        seed(&mut tx, &mut report, fixtures::price_list()).await?;
        seed(&mut tx, &mut report, fixtures::tax_filings()).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(total = report.total(), "Fixtures seeded");
        Ok(report)
    }

    /// Closes the connection pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks that the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

async fn seed<T: Record>(
    tx: &mut Transaction<'_, Sqlite>,
    report: &mut SeedReport,
    items: Vec<T>,
) -> DbResult<()> {
    let count = items.len();
    for item in &items {
        insert_document(&mut **tx, item).await?;
    }
    debug!(kind = T::KIND, count, "Seeded kind");
    report.inserted.push((T::KIND.to_string(), count));
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::migration_status;
    use crate::repository::Repository;
    use oakline_core::billing::Invoice;
    use oakline_core::tax::TaxFiling;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_seed_fixtures_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = db.seed_fixtures().await.unwrap();
        assert!(!first.skipped);
        assert_eq!(first.inserted.len(), 10);
        assert_eq!(db.record_count().await.unwrap(), first.total());

        let invoices = db.repository::<Invoice>();
        assert_eq!(invoices.count().await.unwrap(), fixtures::invoices().len());

        let second = db.seed_fixtures().await.unwrap();
        assert!(second.skipped);
        assert_eq!(db.record_count().await.unwrap(), first.total());
    }

    #[tokio::test]
    async fn test_failed_seed_writes_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        // tax filings are seeded last
        let block = format!(
            "CREATE TRIGGER block_tax BEFORE INSERT ON records WHEN NEW.kind = '{}' \
             BEGIN SELECT RAISE(ABORT, 'blocked'); END",
            TaxFiling::KIND
        );
        sqlx::query(&block).execute(db.pool()).await.unwrap();

        assert!(db.seed_fixtures().await.is_err());
        assert_eq!(db.record_count().await.unwrap(), 0);

        sqlx::query("DROP TRIGGER block_tax").execute(db.pool()).await.unwrap();
        let report = db.seed_fixtures().await.unwrap();
        assert!(!report.skipped);
        assert_eq!(db.record_count().await.unwrap(), report.total());
    }
}
