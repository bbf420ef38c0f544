//! The fixed hash function used for OAEP, MGF1 and message digests.

use sha3::{Digest, Sha3_256};

/// Digest length of SHA3-256 in bytes.
pub const HASH_LEN: usize = 32;

/// SHA3-256 digest.
pub type Digest256 = [u8; HASH_LEN];

/// Hashes `data` with SHA3-256.
pub fn hash(data: &[u8]) -> Digest256 {
    Sha3_256::digest(data).into()
}

/// Hashes the concatenation of `parts` without allocating.
pub fn hash_parts(parts: &[&[u8]]) -> Digest256 {
    let mut hasher = Sha3_256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
