//! # SQLite Repository
//!
//! Stores each record as a JSON document in `records`, keyed by
//! `(kind, id)`. Updates go through a transaction that also appends the
//! patch to `record_changes`.
//!
//! ## Update Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   SINGLE TRANSACTION                                    │
//! │                                                                         │
//! │  1. SELECT payload, version FROM records WHERE kind = ? AND id = ?     │
//! │  2. deserialize → Record::apply_patch(patch) → serialize               │
//! │       (a rejected patch rolls back here; nothing was written)          │
//! │  3. UPDATE records SET payload = ?, version = version + 1              │
//! │  4. INSERT INTO record_changes (id, kind, record_id, patch, version)   │
//! │                                                                         │
//! │  COMMIT ← the document and its change row land together                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use oakline_core::{Record, RecordChange};
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::marker::PhantomData;
use tracing::{debug, info};
use uuid::Uuid;

use super::Repository;
use crate::error::{DbError, DbResult};

/// Document store for one record kind.
#[derive(Debug)]
pub struct SqliteRepository<T> {
    pool: SqlitePool,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for SqliteRepository<T> {
    fn clone(&self) -> Self {
        SqliteRepository {
            pool: self.pool.clone(),
            _kind: PhantomData,
        }
    }
}

impl<T: Record> SqliteRepository<T> {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteRepository {
            pool,
            _kind: PhantomData,
        }
    }

    /// The change log of one record, oldest first.
    pub async fn changes(&self, id: &str) -> DbResult<Vec<RecordChange>> {
        let changes = sqlx::query_as::<_, RecordChange>(
            r#"
            SELECT id, kind, record_id, patch, version, created_at
            FROM record_changes
            WHERE kind = ?1 AND record_id = ?2
            ORDER BY version
            "#,
        )
        .bind(T::KIND)
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(changes)
    }

    /// Stored version of a record; starts at 1 and grows by one per update.
    pub async fn version(&self, id: &str) -> DbResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT version FROM records WHERE kind = ?1 AND id = ?2")
            .bind(T::KIND)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found(T::KIND, id))
    }
}

#[async_trait]
impl<T: Record> Repository<T> for SqliteRepository<T> {
    async fn all(&self) -> DbResult<Vec<T>> {
        let payloads: Vec<String> =
            sqlx::query_scalar("SELECT payload FROM records WHERE kind = ?1 ORDER BY seq")
                .bind(T::KIND)
                .fetch_all(&self.pool)
                .await?;

        payloads
            .iter()
            .map(|payload| serde_json::from_str(payload).map_err(DbError::from))
            .collect()
    }

    async fn get(&self, id: &str) -> DbResult<T> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM records WHERE kind = ?1 AND id = ?2")
                .bind(T::KIND)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let payload = payload.ok_or_else(|| DbError::not_found(T::KIND, id))?;
        Ok(serde_json::from_str(&payload)?)
    }

    async fn insert(&self, record: T) -> DbResult<T> {
        let mut conn = self.pool.acquire().await?;
        insert_document(&mut *conn, &record).await?;
        Ok(record)
    }

    async fn update(&self, id: &str, patch: T::Patch) -> DbResult<T> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let row = sqlx::query("SELECT payload, version FROM records WHERE kind = ?1 AND id = ?2")
            .bind(T::KIND)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found(T::KIND, id))?;

        let payload: String = row.try_get("payload")?;
        let version: i64 = row.try_get("version")?;

        let mut record: T = serde_json::from_str(&payload)?;
        let patch_json = serde_json::to_string(&patch)?;
        // Dropping `tx` on this error path rolls back.
        record.apply_patch(patch)?;

        let next_version = version + 1;
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE records
            SET payload = ?1, version = ?2, updated_at = ?3
            WHERE kind = ?4 AND id = ?5
            "#,
        )
        .bind(serde_json::to_string(&record)?)
        .bind(next_version)
        .bind(now)
        .bind(T::KIND)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO record_changes (id, kind, record_id, patch, version, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(T::KIND)
        .bind(id)
        .bind(&patch_json)
        .bind(next_version)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(kind = T::KIND, id = %id, version = next_version, "Record updated");
        Ok(record)
    }

    async fn count(&self) -> DbResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records WHERE kind = ?1")
            .bind(T::KIND)
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}

/// Writes a new document at version 1 on `conn`, which may be a
/// transaction.
pub(crate) async fn insert_document<T: Record>(
    conn: &mut SqliteConnection,
    record: &T,
) -> DbResult<()> {
    let payload = serde_json::to_string(record)?;
    let now = Utc::now();

    debug!(kind = T::KIND, id = %record.id(), "Inserting record");

    let result = sqlx::query(
        r#"
        INSERT INTO records (kind, id, payload, version, created_at, updated_at)
        VALUES (?1, ?2, ?3, 1, ?4, ?4)
        "#,
    )
    .bind(T::KIND)
    .bind(record.id())
    .bind(&payload)
    .bind(now)
    .execute(&mut *conn)
    .await;

    match result.map_err(DbError::from) {
        Ok(_) => Ok(()),
        Err(DbError::UniqueViolation { .. }) => Err(DbError::duplicate("id", record.id())),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use oakline_core::billing::{Invoice, InvoiceAction, InvoiceStatus};
    use oakline_core::{fixtures, CoreError, ListQuery, Money};

    async fn seeded() -> (Database, SqliteRepository<Invoice>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.repository::<Invoice>();
        for invoice in fixtures::invoices() {
            repo.insert(invoice).await.unwrap();
        }
        (db, repo)
    }

    #[tokio::test]
    async fn test_round_trips_fixtures_in_order() {
        let (_db, repo) = seeded().await;
        let stored = repo.all().await.unwrap();
        assert_eq!(stored, fixtures::invoices());
        assert_eq!(repo.count().await.unwrap(), stored.len());
    }

    #[tokio::test]
    async fn test_update_persists_and_logs_change() {
        let (_db, repo) = seeded().await;

        let updated = repo
            .update(
                "INV-002",
                InvoiceAction::RecordPayment {
                    amount: Money::from_major(3_840),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.balance, Money::from_major(10_000));

        let stored = repo.get("INV-002").await.unwrap();
        assert_eq!(stored, updated);
        assert_eq!(repo.version("INV-002").await.unwrap(), 2);

        let changes = repo.changes("INV-002").await.unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, "Invoice");
        assert_eq!(changes[0].version, 2);
        assert!(changes[0].patch.contains("recordPayment"));
    }

    #[tokio::test]
    async fn test_rejected_patch_writes_nothing() {
        let (_db, repo) = seeded().await;
        let before = repo.get("INV-002").await.unwrap();

        let err = repo
            .update(
                "INV-002",
                InvoiceAction::RecordPayment {
                    amount: Money::from_major(1_000_000),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Overpayment { .. })));

        assert_eq!(repo.get("INV-002").await.unwrap(), before);
        assert_eq!(repo.version("INV-002").await.unwrap(), 1);
        assert!(repo.changes("INV-002").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_and_missing_ids() {
        let (_db, repo) = seeded().await;
        let existing = repo.get("INV-001").await.unwrap();

        let err = repo.insert(existing).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "INV-001"));

        assert!(matches!(
            repo.get("INV-404").await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            repo.update("INV-404", InvoiceAction::Send).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_filters_stored_documents() {
        let (_db, repo) = seeded().await;
        let query = ListQuery::search("Elite").with_category(
            "status",
            oakline_core::CategorySelection::only(InvoiceStatus::Partial.label()),
        );
        let hits = repo.list(&query).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["INV-002"]);
    }
}
