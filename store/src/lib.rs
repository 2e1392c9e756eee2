//! Abstract state-store traits for adsettle.
//!
//! The contract engine never holds long-lived state of its own: every entity
//! lives in a key/value ledger that also keeps each key's version history.
//! Backends (LMDB, in-memory for testing) implement [`StateStore`]; the rest
//! of the codebase depends only on the trait and on [`Transaction`].

pub mod account;
pub mod error;
pub mod keys;
pub mod transaction;

pub use account::{Account, AccountStore};
pub use error::StoreError;
pub use keys::{ContractKey, StateKey};
pub use transaction::Transaction;

use adsettle_types::Timestamp;

/// One committed version of a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Value written by the commit (empty for deletes).
    pub value: Vec<u8>,
    /// Commit timestamp of the transaction that wrote it.
    pub timestamp: Timestamp,
    /// Whether this version removed the key.
    pub is_delete: bool,
}

/// Single-pass iterator over a key's history, oldest first.
pub type HistoryIter<'a> = Box<dyn Iterator<Item = Result<HistoryEntry, StoreError>> + 'a>;

/// A single buffered mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOp {
    Put(Vec<u8>),
    Delete,
}

/// A value a transaction read from the store, re-checked at commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadGuard {
    pub key: StateKey,
    /// Value seen at read time, `None` if the key was absent.
    pub observed: Option<Vec<u8>>,
}

/// Fail with [`StoreError::Conflict`] if any guarded key no longer holds the
/// value its transaction observed. `current` must read inside the same
/// critical section that applies the writes.
pub fn validate_reads<F>(reads: &[ReadGuard], mut current: F) -> Result<(), StoreError>
where
    F: FnMut(&StateKey) -> Result<Option<Vec<u8>>, StoreError>,
{
    for guard in reads {
        if current(&guard.key)? != guard.observed {
            return Err(StoreError::Conflict(guard.key.encode()));
        }
    }
    Ok(())
}

/// The ledger collaborator.
///
/// `apply` must be atomic: either every write in the batch becomes visible
/// (and is appended to history under `timestamp`) or none does. It rejects
/// the batch with [`StoreError::Conflict`] when a key in `reads` changed
/// after the transaction read it.
pub trait StateStore: Send + Sync {
    /// Latest value of `key`, `None` if absent or deleted.
    fn get(&self, key: &StateKey) -> Result<Option<Vec<u8>>, StoreError>;

    /// Committed versions of `key`, oldest to newest.
    fn history(&self, key: &StateKey) -> Result<HistoryIter<'_>, StoreError>;

    /// Validate `reads` and commit a batch of writes atomically.
    fn apply(
        &self,
        reads: &[ReadGuard],
        writes: &[(StateKey, WriteOp)],
        timestamp: Timestamp,
    ) -> Result<(), StoreError>;
}
