//! # Store State
//!
//! One repository per record kind, all backed by the same storage.
//!
//! ## Thread Safety
//! Each repository is an `Arc<dyn Repository<T>>`. The memory store guards
//! its rows with a `RwLock`; the SQLite store shares one connection pool.
//! Commands can run concurrently without extra locking.

use std::sync::Arc;

use oakline_core::accounting::{Account, JournalEntry};
use oakline_core::billing::{Invoice, PaymentTransaction, Statement};
use oakline_core::credit::CreditAccount;
use oakline_core::fixtures;
use oakline_core::inventory::InventoryItem;
use oakline_core::orders::SalesOrder;
use oakline_core::pricing::PriceListItem;
use oakline_core::tax::TaxFiling;
use oakline_db::{Database, DbConfig, DbResult, MemoryRepository, Repository};
use tracing::info;

use super::config::{DashboardConfig, StorageKind};

type Repo<T> = Arc<dyn Repository<T>>;

/// Repositories for every dashboard screen.
#[derive(Clone)]
pub struct StoreState {
    pub accounts: Repo<Account>,
    pub journal: Repo<JournalEntry>,
    pub invoices: Repo<Invoice>,
    pub statements: Repo<Statement>,
    pub payments: Repo<PaymentTransaction>,
    pub credit: Repo<CreditAccount>,
    pub inventory: Repo<InventoryItem>,
    pub orders: Repo<SalesOrder>,
    pub prices: Repo<PriceListItem>,
    pub tax_filings: Repo<TaxFiling>,
    db: Option<Database>,
}

impl std::fmt::Debug for StoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreState")
            .field("sqlite", &self.db.is_some())
            .finish_non_exhaustive()
    }
}

impl StoreState {
    /// Fixture collections held in memory.
    pub fn in_memory() -> Self {
        fn repo<T: oakline_core::Record>(items: Vec<T>) -> Repo<T> {
            Arc::new(MemoryRepository::with_items(items))
        }

        StoreState {
            accounts: repo(fixtures::accounts()),
            journal: repo(fixtures::journal_entries()),
            invoices: repo(fixtures::invoices()),
            statements: repo(fixtures::statements()),
            payments: repo(fixtures::payment_transactions()),
            credit: repo(fixtures::credit_accounts()),
            inventory: repo(fixtures::inventory_items()),
            orders: repo(fixtures::sales_orders()),
            prices: repo(fixtures::price_list()),
            tax_filings: repo(fixtures::tax_filings()),
            db: None,
        }
    }

    /// SQLite-backed repositories. An empty database is seeded from the
    /// fixtures first.
    pub async fn sqlite(db: Database) -> DbResult<Self> {
        let report = db.seed_fixtures().await?;
        if !report.skipped {
            info!(records = report.total(), "Seeded empty database");
        }

        Ok(StoreState {
            accounts: Arc::new(db.repository::<Account>()),
            journal: Arc::new(db.repository::<JournalEntry>()),
            invoices: Arc::new(db.repository::<Invoice>()),
            statements: Arc::new(db.repository::<Statement>()),
            payments: Arc::new(db.repository::<PaymentTransaction>()),
            credit: Arc::new(db.repository::<CreditAccount>()),
            inventory: Arc::new(db.repository::<InventoryItem>()),
            orders: Arc::new(db.repository::<SalesOrder>()),
            prices: Arc::new(db.repository::<PriceListItem>()),
            tax_filings: Arc::new(db.repository::<TaxFiling>()),
            db: Some(db),
        })
    }

    /// Opens whichever storage the configuration names.
    pub async fn open(config: &DashboardConfig) -> DbResult<Self> {
        match config.storage {
            StorageKind::Memory => {
                info!("Using in-memory fixture storage");
                Ok(StoreState::in_memory())
            }
            StorageKind::Sqlite => {
                if let Some(parent) = config.database_path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent).map_err(|e| {
                            oakline_db::DbError::ConnectionFailed(e.to_string())
                        })?;
                    }
                }
                let db = Database::new(DbConfig::new(&config.database_path)).await?;
                StoreState::sqlite(db).await
            }
        }
    }

    /// Releases the connection pool, if any.
    pub async fn close(&self) {
        if let Some(db) = &self.db {
            db.close().await;
        }
    }
}
