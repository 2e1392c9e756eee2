//! LMDB implementation of `StateStore`.
//!
//! History entries use composite keys `encoded_key ++ 0x00 ++ commit_seq_be`.
//! Encoded state keys never contain a NUL byte, and the commit sequence is a
//! single counter bumped once per batch, so a prefix scan over
//! `encoded_key ++ 0x00` yields one key's versions in commit order.
//!
//! LMDB admits one write transaction at a time across every process sharing
//! the environment, so read guards are checked inside the write txn.

use adsettle_store::{
    validate_reads, HistoryEntry, HistoryIter, ReadGuard, StateKey, StateStore, StoreError, WriteOp,
};
use adsettle_types::Timestamp;

use crate::{LmdbEnvironment, LmdbError};

const COMMIT_SEQ: &[u8] = b"commit_seq";
const HEADER_LEN: usize = 9;

pub struct LmdbStateStore {
    env: LmdbEnvironment,
}

impl LmdbStateStore {
    pub fn new(env: LmdbEnvironment) -> Self {
        Self { env }
    }

    /// Number of batches committed so far.
    pub fn commit_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.env.read_txn().map_err(LmdbError::from)?;
        let seq = self
            .env
            .meta_db
            .get(&rtxn, COMMIT_SEQ)
            .map_err(LmdbError::from)?
            .and_then(|b| <[u8; 8]>::try_from(b).ok())
            .map(u64::from_be_bytes)
            .unwrap_or(0);
        Ok(seq)
    }
}

fn history_prefix(key: &StateKey) -> Vec<u8> {
    let mut prefix = key.encode().into_bytes();
    prefix.push(0);
    prefix
}

fn encode_entry(timestamp: Timestamp, op: &WriteOp) -> Vec<u8> {
    let (flag, value): (u8, &[u8]) = match op {
        WriteOp::Put(v) => (0, v),
        WriteOp::Delete => (1, &[]),
    };
    let mut out = Vec::with_capacity(HEADER_LEN + value.len());
    out.extend_from_slice(&timestamp.as_secs().to_be_bytes());
    out.push(flag);
    out.extend_from_slice(value);
    out
}

fn decode_entry(key: &StateKey, raw: &[u8]) -> Result<HistoryEntry, LmdbError> {
    if raw.len() < HEADER_LEN {
        return Err(LmdbError::Corrupted(key.encode()));
    }
    let mut ts = [0u8; 8];
    ts.copy_from_slice(&raw[..8]);
    Ok(HistoryEntry {
        timestamp: Timestamp::new(u64::from_be_bytes(ts)),
        is_delete: raw[8] == 1,
        value: raw[HEADER_LEN..].to_vec(),
    })
}

impl StateStore for LmdbStateStore {
    fn get(&self, key: &StateKey) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.env.read_txn().map_err(LmdbError::from)?;
        let value = self
            .env
            .state_db
            .get(&rtxn, key.encode().as_bytes())
            .map_err(LmdbError::from)?
            .map(|b| b.to_vec());
        Ok(value)
    }

    fn history(&self, key: &StateKey) -> Result<HistoryIter<'_>, StoreError> {
        let rtxn = self.env.env.read_txn().map_err(LmdbError::from)?;
        let prefix = history_prefix(key);
        let mut entries = Vec::new();
        for item in self
            .env
            .history_db
            .prefix_iter(&rtxn, &prefix)
            .map_err(LmdbError::from)?
        {
            let (_k, raw) = item.map_err(LmdbError::from)?;
            entries.push(decode_entry(key, raw)?);
        }
        Ok(Box::new(entries.into_iter().map(Ok)))
    }

    fn apply(
        &self,
        reads: &[ReadGuard],
        writes: &[(StateKey, WriteOp)],
        timestamp: Timestamp,
    ) -> Result<(), StoreError> {
        let mut wtxn = self.env.env.write_txn().map_err(LmdbError::from)?;
        validate_reads(reads, |key| {
            let current = self
                .env
                .state_db
                .get(&wtxn, key.encode().as_bytes())
                .map_err(LmdbError::from)?
                .map(|b| b.to_vec());
            Ok(current)
        })?;
        let seq = self
            .env
            .meta_db
            .get(&wtxn, COMMIT_SEQ)
            .map_err(LmdbError::from)?
            .and_then(|b| <[u8; 8]>::try_from(b).ok())
            .map(u64::from_be_bytes)
            .unwrap_or(0)
            + 1;

        for (key, op) in writes {
            let encoded = key.encode();
            match op {
                WriteOp::Put(value) => {
                    self.env
                        .state_db
                        .put(&mut wtxn, encoded.as_bytes(), value)
                        .map_err(LmdbError::from)?;
                }
                WriteOp::Delete => {
                    self.env
                        .state_db
                        .delete(&mut wtxn, encoded.as_bytes())
                        .map_err(LmdbError::from)?;
                }
            }
            let mut hk = history_prefix(key);
            hk.extend_from_slice(&seq.to_be_bytes());
            self.env
                .history_db
                .put(&mut wtxn, &hk, &encode_entry(timestamp, op))
                .map_err(LmdbError::from)?;
        }

        self.env
            .meta_db
            .put(&mut wtxn, COMMIT_SEQ, &seq.to_be_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        tracing::trace!(seq, keys = writes.len(), "committed batch");
        Ok(())
    }
}
