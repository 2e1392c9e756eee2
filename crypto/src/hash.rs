//! Blake2b hashing.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Number of digest bytes kept in a fingerprint.
pub const FINGERPRINT_LEN: usize = 8;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Short hex fingerprint of a payload (first 8 digest bytes).
pub fn fingerprint(data: &[u8]) -> String {
    hex::encode(&blake2b_256(data)[..FINGERPRINT_LEN])
}
