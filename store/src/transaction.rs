//! Read-modify-write transactions over a [`StateStore`].
//!
//! A transaction buffers every write in memory; reads see the buffered
//! writes first, then the store. Nothing reaches the store until
//! [`Transaction::commit`], which hands the whole batch to
//! [`StateStore::apply`]. Dropping a transaction without committing discards
//! every buffered write.
//!
//! The first store read of each key is remembered. At commit the store checks
//! those keys again and refuses the batch if another transaction changed any
//! of them in between.

use crate::{HistoryIter, ReadGuard, StateKey, StateStore, StoreError, WriteOp};
use adsettle_types::Timestamp;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;

pub struct Transaction<'a> {
    store: &'a dyn StateStore,
    reads: RefCell<BTreeMap<StateKey, Option<Vec<u8>>>>,
    writes: BTreeMap<StateKey, WriteOp>,
}

impl<'a> Transaction<'a> {
    pub fn begin(store: &'a dyn StateStore) -> Self {
        Self {
            store,
            reads: RefCell::new(BTreeMap::new()),
            writes: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &StateKey) -> Result<Option<Vec<u8>>, StoreError> {
        match self.writes.get(key) {
            Some(WriteOp::Put(value)) => Ok(Some(value.clone())),
            Some(WriteOp::Delete) => Ok(None),
            None => {
                if let Some(seen) = self.reads.borrow().get(key) {
                    return Ok(seen.clone());
                }
                let value = self.store.get(key)?;
                self.reads.borrow_mut().insert(key.clone(), value.clone());
                Ok(value)
            }
        }
    }

    pub fn exists(&self, key: &StateKey) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Read and decode a JSON record, `None` if absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &StateKey) -> Result<Option<T>, StoreError> {
        match self.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Read and decode a JSON record that must exist.
    pub fn require_json<T: DeserializeOwned>(&self, key: &StateKey) -> Result<T, StoreError> {
        self.get_json(key)?
            .ok_or_else(|| StoreError::NotFound(key.encode()))
    }

    pub fn put(&mut self, key: StateKey, value: Vec<u8>) {
        self.writes.insert(key, WriteOp::Put(value));
    }

    pub fn put_json<T: Serialize>(&mut self, key: StateKey, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value)?;
        self.put(key, bytes);
        Ok(())
    }

    pub fn delete(&mut self, key: StateKey) {
        self.writes.insert(key, WriteOp::Delete);
    }

    /// Committed history of `key`. Buffered writes are not included.
    pub fn history(&self, key: &StateKey) -> Result<HistoryIter<'a>, StoreError> {
        self.store.history(key)
    }

    /// Number of distinct keys written so far.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Number of distinct keys read from the store so far.
    pub fn read_count(&self) -> usize {
        self.reads.borrow().len()
    }

    /// Apply every buffered write atomically under `timestamp`.
    ///
    /// Returns the number of keys written. A read-only transaction commits
    /// nothing and is never checked for conflicts.
    pub fn commit(self, timestamp: Timestamp) -> Result<usize, StoreError> {
        let batch: Vec<(StateKey, WriteOp)> = self.writes.into_iter().collect();
        if batch.is_empty() {
            return Ok(0);
        }
        let reads: Vec<ReadGuard> = self
            .reads
            .into_inner()
            .into_iter()
            .map(|(key, observed)| ReadGuard { key, observed })
            .collect();
        self.store.apply(&reads, &batch, timestamp)?;
        Ok(batch.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{validate_reads, ContractKey, HistoryEntry};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore {
        data: Mutex<HashMap<StateKey, Vec<u8>>>,
        batches: Mutex<usize>,
    }

    impl StateStore for MapStore {
        fn get(&self, key: &StateKey) -> Result<Option<Vec<u8>>, StoreError> {
            Ok(self.data.lock().unwrap().get(key).cloned())
        }

        fn history(&self, _key: &StateKey) -> Result<HistoryIter<'_>, StoreError> {
            Ok(Box::new(std::iter::empty::<Result<HistoryEntry, StoreError>>()))
        }

        fn apply(
            &self,
            reads: &[ReadGuard],
            writes: &[(StateKey, WriteOp)],
            _ts: Timestamp,
        ) -> Result<(), StoreError> {
            let mut data = self.data.lock().unwrap();
            validate_reads(reads, |key| Ok(data.get(key).cloned()))?;
            for (key, op) in writes {
                match op {
                    WriteOp::Put(v) => {
                        data.insert(key.clone(), v.clone());
                    }
                    WriteOp::Delete => {
                        data.remove(key);
                    }
                }
            }
            *self.batches.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn freeze_key() -> StateKey {
        StateKey::Freeze(ContractKey::parse("k1").unwrap())
    }

    #[test]
    fn reads_see_own_writes() {
        let store = MapStore::default();
        let mut txn = Transaction::begin(&store);
        txn.put(freeze_key(), b"v".to_vec());
        assert_eq!(txn.get(&freeze_key()).unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.get(&freeze_key()).unwrap(), None);
        txn.delete(freeze_key());
        assert!(!txn.exists(&freeze_key()).unwrap());
    }

    #[test]
    fn drop_without_commit_discards() {
        let store = MapStore::default();
        {
            let mut txn = Transaction::begin(&store);
            txn.put(freeze_key(), b"v".to_vec());
        }
        assert_eq!(store.get(&freeze_key()).unwrap(), None);
        assert_eq!(*store.batches.lock().unwrap(), 0);
    }

    #[test]
    fn commit_applies_one_batch() {
        let store = MapStore::default();
        let mut txn = Transaction::begin(&store);
        txn.put_json(freeze_key(), &42u32).unwrap();
        txn.put(StateKey::Settled(ContractKey::parse("k1").unwrap()), vec![1]);
        assert_eq!(txn.commit(Timestamp::new(5)).unwrap(), 2);
        assert_eq!(*store.batches.lock().unwrap(), 1);

        let txn = Transaction::begin(&store);
        let v: u32 = txn.require_json(&freeze_key()).unwrap();
        assert_eq!(v, 42);
    }

    #[test]
    fn require_json_reports_missing_key() {
        let store = MapStore::default();
        let txn = Transaction::begin(&store);
        let err = txn.require_json::<u32>(&freeze_key()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(k) if k == "freeze/k1"));
    }

    #[test]
    fn interleaved_writers_conflict() {
        let store = MapStore::default();
        let mut first = Transaction::begin(&store);
        let mut second = Transaction::begin(&store);
        assert_eq!(first.get(&freeze_key()).unwrap(), None);
        assert_eq!(second.get(&freeze_key()).unwrap(), None);

        first.put(freeze_key(), b"first".to_vec());
        second.put(freeze_key(), b"second".to_vec());
        first.commit(Timestamp::new(1)).unwrap();

        let err = second.commit(Timestamp::new(2)).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(k) if k == "freeze/k1"));
        assert_eq!(store.get(&freeze_key()).unwrap(), Some(b"first".to_vec()));
        assert_eq!(*store.batches.lock().unwrap(), 1);
    }

    #[test]
    fn unrelated_writes_do_not_conflict() {
        let store = MapStore::default();
        let settled = StateKey::Settled(ContractKey::parse("k1").unwrap());
        let mut first = Transaction::begin(&store);
        let mut second = Transaction::begin(&store);
        first.get(&freeze_key()).unwrap();
        second.get(&settled).unwrap();
        first.put(freeze_key(), vec![1]);
        second.put(settled, vec![2]);
        first.commit(Timestamp::new(1)).unwrap();
        assert_eq!(second.commit(Timestamp::new(2)).unwrap(), 1);
    }

    #[test]
    fn repeated_reads_keep_first_observation() {
        let store = MapStore::default();
        let txn = Transaction::begin(&store);
        assert_eq!(txn.get(&freeze_key()).unwrap(), None);
        store.data.lock().unwrap().insert(freeze_key(), b"late".to_vec());
        assert_eq!(txn.get(&freeze_key()).unwrap(), None);
        assert_eq!(txn.read_count(), 1);
    }
}
