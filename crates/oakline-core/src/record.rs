//! # Record Trait
//!
//! Ties a domain entity to the two things every screen needs from it: a
//! stable identity for selection and storage, and a `ListSpec` describing
//! how its table is searched, filtered and summarised.
//!
//! ## Patches
//! Each record declares a typed `Patch`, the set of state changes its
//! detail overlay can make (record a payment, reserve stock, file a tax
//! return). `apply_patch` is the single place those changes happen, and it
//! re-derives every dependent field, so invariants such as
//! `balance = total - paid` or `available = current - reserved` hold after
//! every update.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::error::CoreResult;
use crate::list::ListSpec;

/// A storable, listable dashboard entity.
pub trait Record: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Storage discriminator and error label, e.g. `"Invoice"`.
    const KIND: &'static str;

    /// The state changes this record accepts.
    type Patch: Clone + Debug + Serialize + DeserializeOwned + Send + Sync;

    /// Business identifier (`INV-002`, `CRED-001`, ...).
    fn id(&self) -> &str;

    /// Applies a patch, keeping derived fields consistent.
    fn apply_patch(&mut self, patch: Self::Patch) -> CoreResult<()>;

    /// Search, filter, sort and aggregation definitions for this record's table.
    fn list_spec() -> ListSpec<Self>;
}

/// Patch type for read-only records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NoPatch {}

/// Finds a record by id.
pub fn find_by_id<'a, T: Record>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}
