//! # Selection State
//!
//! Which record each screen's detail overlay has open.
//!
//! ```text
//!   invoices:  open(INV-002)
//!   credit:    closed
//!   inventory: open(INV-004)
//! ```
//!
//! One [`Selection`] per record kind, behind an `Arc<Mutex<_>>` so
//! concurrent commands see a consistent overlay state.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use oakline_core::Selection;

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    overlays: Arc<Mutex<BTreeMap<&'static str, Selection>>>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<&'static str, Selection>> {
        // A panic mid-update can't leave a Selection half-written.
        self.overlays.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens the overlay for `kind` on `id`, replacing any previous one.
    pub fn select(&self, kind: &'static str, id: impl Into<String>) {
        self.lock().entry(kind).or_default().select(id);
    }

    /// Closes the overlay for `kind`.
    pub fn clear(&self, kind: &'static str) {
        if let Some(selection) = self.lock().get_mut(kind) {
            selection.clear();
        }
    }

    /// Snapshot of the overlay for `kind`.
    pub fn get(&self, kind: &'static str) -> Selection {
        self.lock().get(kind).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlays_are_independent_per_kind() {
        let state = SelectionState::new();
        state.select("Invoice", "INV-002");
        state.select("CreditAccount", "CRED-001");
        state.select("Invoice", "INV-003");

        assert_eq!(state.get("Invoice").selected_id(), Some("INV-003"));
        assert_eq!(state.get("CreditAccount").selected_id(), Some("CRED-001"));

        state.clear("Invoice");
        assert!(!state.get("Invoice").is_open());
        assert!(state.get("CreditAccount").is_open());
        assert!(!state.get("InventoryItem").is_open());
    }
}
