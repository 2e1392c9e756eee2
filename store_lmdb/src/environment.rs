//! LMDB environment setup.

use std::fs;
use std::path::Path;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::LmdbError;

const MAX_DBS: u32 = 3;

/// Wraps the LMDB environment and all database handles.
#[derive(Clone)]
pub struct LmdbEnvironment {
    pub(crate) env: Env,
    /// Latest value per key.
    pub(crate) state_db: Database<Bytes, Bytes>,
    /// `key ++ 0x00 ++ seq_be` → `timestamp_be ++ delete_flag ++ value`.
    pub(crate) history_db: Database<Bytes, Bytes>,
    /// Bookkeeping counters (commit sequence).
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        fs::create_dir_all(path).map_err(|e| LmdbError::Heed(e.to_string()))?;
        // SAFETY: the environment is opened once per process for this path and
        // never concurrently mapped with incompatible flags.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let state_db = env.create_database(&mut wtxn, Some("state"))?;
        let history_db = env.create_database(&mut wtxn, Some("history"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(Self {
            env,
            state_db,
            history_db,
            meta_db,
        })
    }

    pub fn env(&self) -> &Env {
        &self.env
    }
}
