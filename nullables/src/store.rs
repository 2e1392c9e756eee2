//! Nullable store: thread-safe in-memory state store for testing.

use adsettle_store::{
    validate_reads, HistoryEntry, HistoryIter, ReadGuard, StateKey, StateStore, StoreError, WriteOp,
};
use adsettle_types::Timestamp;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    latest: HashMap<StateKey, Vec<u8>>,
    history: HashMap<StateKey, Vec<HistoryEntry>>,
    commits: u64,
}

/// An in-memory state store with per-key history.
///
/// Thread-safe; a batch is validated and applied under a single lock so it is
/// atomic with respect to concurrent transactions. `fail_next_commit` lets
/// tests simulate a ledger rejecting a transaction.
#[derive(Default)]
pub struct NullStateStore {
    inner: Mutex<Inner>,
    fail_next: Mutex<bool>,
}

impl NullStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `apply` fail without writing anything.
    pub fn fail_next_commit(&self) {
        *self.fail_next.lock().unwrap() = true;
    }

    /// Number of batches committed.
    pub fn commit_count(&self) -> u64 {
        self.inner.lock().unwrap().commits
    }

    /// Overwrite a value directly, bypassing transactions and history.
    /// Used by tests that tamper with stored records.
    pub fn force_put(&self, key: StateKey, value: Vec<u8>) {
        self.inner.lock().unwrap().latest.insert(key, value);
    }

    /// Every key currently holding a value.
    pub fn keys(&self) -> Vec<StateKey> {
        let mut keys: Vec<_> = self.inner.lock().unwrap().latest.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl StateStore for NullStateStore {
    fn get(&self, key: &StateKey) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.inner.lock().unwrap().latest.get(key).cloned())
    }

    fn history(&self, key: &StateKey) -> Result<HistoryIter<'_>, StoreError> {
        let entries = self
            .inner
            .lock()
            .unwrap()
            .history
            .get(key)
            .cloned()
            .unwrap_or_default();
        Ok(Box::new(entries.into_iter().map(Ok)))
    }

    fn apply(
        &self,
        reads: &[ReadGuard],
        writes: &[(StateKey, WriteOp)],
        timestamp: Timestamp,
    ) -> Result<(), StoreError> {
        {
            let mut fail = self.fail_next.lock().unwrap();
            if *fail {
                *fail = false;
                return Err(StoreError::Backend("injected commit failure".into()));
            }
        }

        let mut inner = self.inner.lock().unwrap();
        validate_reads(reads, |key| Ok(inner.latest.get(key).cloned()))?;
        for (key, op) in writes {
            let entry = match op {
                WriteOp::Put(value) => {
                    inner.latest.insert(key.clone(), value.clone());
                    HistoryEntry {
                        value: value.clone(),
                        timestamp,
                        is_delete: false,
                    }
                }
                WriteOp::Delete => {
                    inner.latest.remove(key);
                    HistoryEntry {
                        value: Vec::new(),
                        timestamp,
                        is_delete: true,
                    }
                }
            };
            inner.history.entry(key.clone()).or_default().push(entry);
        }
        inner.commits += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adsettle_store::{ContractKey, Transaction};
    use adsettle_types::PartyId;

    fn log_index(id: &str) -> StateKey {
        StateKey::LogIndex(PartyId::parse(id).unwrap())
    }

    #[test]
    fn history_accumulates_in_commit_order() {
        let store = NullStateStore::new();
        for (i, ts) in [(1u8, 10u64), (2, 20)] {
            let mut txn = Transaction::begin(&store);
            txn.put(log_index("ac1"), vec![i]);
            txn.commit(Timestamp::new(ts)).unwrap();
        }
        let entries: Vec<_> = store
            .history(&log_index("ac1"))
            .unwrap()
            .map(|e| e.unwrap())
            .collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].value, vec![1]);
        assert_eq!(entries[1].timestamp, Timestamp::new(20));
        assert_eq!(store.commit_count(), 2);
    }

    #[test]
    fn injected_failure_writes_nothing() {
        let store = NullStateStore::new();
        store.fail_next_commit();
        let key = StateKey::Freeze(ContractKey::parse("c").unwrap());
        let mut txn = Transaction::begin(&store);
        txn.put(key.clone(), vec![1]);
        txn.put(log_index("ac1"), vec![2]);
        assert!(txn.commit(Timestamp::new(1)).is_err());
        assert!(store.keys().is_empty());
        assert_eq!(store.history(&key).unwrap().count(), 0);
    }

    #[test]
    fn unknown_key_has_empty_history() {
        let store = NullStateStore::new();
        assert_eq!(store.history(&log_index("nobody")).unwrap().count(), 0);
        assert_eq!(store.get(&log_index("nobody")).unwrap(), None);
    }

    #[test]
    fn stale_read_rejects_the_whole_batch() {
        let store = NullStateStore::new();
        let key = StateKey::Freeze(ContractKey::parse("c").unwrap());
        store.force_put(key.clone(), b"frozen".to_vec());

        let mut first = Transaction::begin(&store);
        let mut second = Transaction::begin(&store);
        assert!(first.exists(&key).unwrap());
        assert!(second.exists(&key).unwrap());
        first.delete(key.clone());
        second.delete(key.clone());
        second.put(log_index("media"), vec![1]);

        first.commit(Timestamp::new(1)).unwrap();
        let err = second.commit(Timestamp::new(2)).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.get(&log_index("media")).unwrap(), None);
        assert_eq!(store.commit_count(), 1);
    }
}
