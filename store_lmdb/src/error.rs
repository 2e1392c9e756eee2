use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("corrupted history entry under {0}")]
    Corrupted(String),
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        LmdbError::Heed(e.to_string())
    }
}

impl From<LmdbError> for adsettle_store::StoreError {
    fn from(e: LmdbError) -> Self {
        match e {
            LmdbError::Corrupted(key) => adsettle_store::StoreError::Corruption(key),
            other => adsettle_store::StoreError::Backend(other.to_string()),
        }
    }
}
