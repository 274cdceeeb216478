use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use stacker_types::EntityId;

/// Per-user exclusive scopes.
///
/// Holds one mutex per user id while someone is using it. Entries are created
/// on demand and dropped once the last holder leaves, so the table only grows
/// with the number of users being written concurrently.
#[derive(Debug, Default)]
pub struct OwnerLocks {
    slots: Mutex<HashMap<EntityId, Arc<Mutex<()>>>>,
}

impl OwnerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the exclusive scope of `owner`.
    pub fn with_owner<T>(&self, owner: &EntityId, f: impl FnOnce() -> T) -> T {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(slots.entry(owner.clone()).or_default())
        };

        let result = {
            // The guarded value is `()`, so a poisoned lock carries no broken state.
            let _guard = slot.lock().unwrap_or_else(|e| e.into_inner());
            f()
        };

        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        // One reference in the table plus ours: nobody else is waiting.
        if Arc::strong_count(&slot) == 2 {
            slots.remove(owner);
        }
        result
    }

    /// Number of users with an active scope.
    pub fn active(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
