//! In-memory consent gate.
//!
//! Process-lifetime mapping from patient id to a granted/denied flag.
//! Entries are created or overwritten by an explicit call and never
//! expire; nothing is persisted. The route layer consults this store
//! before any snapshot is built — the builder itself never does.

use std::collections::HashMap;
use std::sync::RwLock;

/// Errors from consent store operations.
#[derive(Debug, thiserror::Error)]
pub enum ConsentError {
    #[error("Internal lock error")]
    LockPoisoned,
}

/// Thread-safe consent flags, owned by the application state and
/// shared with the route layer.
pub struct ConsentStore {
    grants: RwLock<HashMap<i64, bool>>,
}

impl ConsentStore {
    /// Create an empty store; every patient starts denied.
    pub fn new() -> Self {
        Self {
            grants: RwLock::new(HashMap::new()),
        }
    }

    /// Whether data access is currently granted. Unknown patients are
    /// denied.
    pub fn is_granted(&self, patient_id: i64) -> bool {
        self.grants
            .read()
            .map(|grants| grants.get(&patient_id).copied().unwrap_or(false))
            .unwrap_or(false)
    }

    /// Record or overwrite a patient's consent flag.
    pub fn set(&self, patient_id: i64, granted: bool) -> Result<(), ConsentError> {
        let mut grants = self.grants.write().map_err(|_| ConsentError::LockPoisoned)?;
        grants.insert(patient_id, granted);
        Ok(())
    }
}

impl Default for ConsentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_patient_is_denied() {
        let store = ConsentStore::new();
        assert!(!store.is_granted(7));
    }

    #[test]
    fn grant_then_check() {
        let store = ConsentStore::new();
        store.set(7, true).unwrap();
        assert!(store.is_granted(7));
    }

    #[test]
    fn revoke_overwrites_grant() {
        let store = ConsentStore::new();
        store.set(7, true).unwrap();
        store.set(7, false).unwrap();
        assert!(!store.is_granted(7));
    }

    #[test]
    fn explicit_denial_is_recorded() {
        let store = ConsentStore::new();
        store.set(7, false).unwrap();
        assert!(!store.is_granted(7));
    }

    #[test]
    fn grants_are_per_patient() {
        let store = ConsentStore::new();
        store.set(7, true).unwrap();
        assert!(store.is_granted(7));
        assert!(!store.is_granted(8));
    }

    #[test]
    fn concurrent_reads_do_not_block() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(ConsentStore::new());
        store.set(7, true).unwrap();

        let mut handles = vec![];
        for _ in 0..10 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                assert!(store.is_granted(7));
                assert!(!store.is_granted(8));
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
