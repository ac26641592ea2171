//! # Memory Repository
//!
//! A fixture-backed store. Records live in a `Vec` behind a tokio `RwLock`,
//! so concurrent list reads never block each other and a patch is applied
//! to a clone before it replaces the stored record.

use async_trait::async_trait;
use oakline_core::Record;
use tokio::sync::RwLock;
use tracing::debug;

use super::Repository;
use crate::error::{DbError, DbResult};

#[derive(Debug, Default)]
pub struct MemoryRepository<T> {
    items: RwLock<Vec<T>>,
}

impl<T: Record> MemoryRepository<T> {
    pub fn new() -> Self {
        MemoryRepository {
            items: RwLock::new(Vec::new()),
        }
    }

    /// A store pre-loaded with `items`, typically a fixture collection.
    pub fn with_items(items: Vec<T>) -> Self {
        MemoryRepository {
            items: RwLock::new(items),
        }
    }
}

#[async_trait]
impl<T: Record> Repository<T> for MemoryRepository<T> {
    async fn all(&self) -> DbResult<Vec<T>> {
        Ok(self.items.read().await.clone())
    }

    async fn get(&self, id: &str) -> DbResult<T> {
        self.items
            .read()
            .await
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or_else(|| DbError::not_found(T::KIND, id))
    }

    async fn insert(&self, record: T) -> DbResult<T> {
        let mut items = self.items.write().await;
        if items.iter().any(|item| item.id() == record.id()) {
            return Err(DbError::duplicate("id", record.id()));
        }
        debug!(kind = T::KIND, id = %record.id(), "Inserting record");
        items.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, patch: T::Patch) -> DbResult<T> {
        let mut items = self.items.write().await;
        let slot = items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or_else(|| DbError::not_found(T::KIND, id))?;

        let mut updated = slot.clone();
        updated.apply_patch(patch)?;
        *slot = updated.clone();

        debug!(kind = T::KIND, id = %id, "Record updated");
        Ok(updated)
    }

    async fn count(&self) -> DbResult<usize> {
        Ok(self.items.read().await.len())
    }
}
