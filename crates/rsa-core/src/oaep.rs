//! OAEP encoding with SHA3-256 and MGF1.
//!
//! Block layout (`k` bytes):
//!
//! ```text
//! EM = 0x00 ‖ maskedSeed (hLen) ‖ maskedDB (k - hLen - 1)
//! DB = lHash ‖ PS ‖ 0x01 ‖ M
//! ```
//!
//! The padding string `PS` is made of ASCII `'0'` (0x30) bytes rather than
//! zero bytes. Decoding skips exactly that filler value, so blocks produced by
//! other OAEP implementations do not decode here.

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use tracing::{debug, trace};

use crate::error::{OaepFailure, RsaError};
use crate::hash::{hash, hash_parts, HASH_LEN};
use crate::keys::{decrypt, encrypt, to_fixed_bytes, KeyMaterial, PrivateKey, PublicKey};

/// Default block length in bytes (2048-bit modulus).
pub const DEFAULT_BLOCK_LEN: usize = 256;

/// Filler byte of the padding string.
pub const FILLER: u8 = b'0';

const SEPARATOR: u8 = 0x01;

/// MGF1 over SHA3-256: `H(seed ‖ C(0)) ‖ H(seed ‖ C(1)) ‖ …` truncated to `len`,
/// with `C(i)` the 4-byte big-endian counter.
pub fn mgf1(seed: &[u8], len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len.div_ceil(HASH_LEN) * HASH_LEN);
    let mut counter = 0u32;
    while out.len() < len {
        out.extend_from_slice(&hash_parts(&[seed, &counter.to_be_bytes()[..]]));
        counter = counter.wrapping_add(1);
    }
    out.truncate(len);
    out
}

fn xor_into(dst: &mut [u8], mask: &[u8]) {
    for (d, m) in dst.iter_mut().zip(mask.iter()) {
        *d ^= *m;
    }
}

/// OAEP encoder/decoder for a fixed block length and label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OaepCodec {
    block_len: usize,
    label: Vec<u8>,
}

impl Default for OaepCodec {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_LEN)
    }
}

impl OaepCodec {
    /// Codec for `block_len`-byte blocks with an empty label.
    pub fn new(block_len: usize) -> Self {
        Self {
            block_len,
            label: Vec::new(),
        }
    }

    /// Codec whose block length matches the modulus of `key`.
    pub fn for_key<K: KeyMaterial + ?Sized>(key: &K) -> Self {
        Self::new(key.size())
    }

    /// Replaces the label.
    pub fn with_label(mut self, label: impl Into<Vec<u8>>) -> Self {
        self.label = label.into();
        self
    }

    /// Block length `k` in bytes.
    pub fn block_len(&self) -> usize {
        self.block_len
    }

    /// Label bound into every block.
    pub fn label(&self) -> &[u8] {
        &self.label
    }

    /// Largest message this codec accepts: `k - 2·hLen - 2`.
    pub fn max_message_len(&self) -> Result<usize, RsaError> {
        self.block_len
            .checked_sub(2 * HASH_LEN + 2)
            .ok_or_else(|| RsaError::InvalidConfig {
                reason: format!(
                    "block of {} bytes cannot hold an OAEP encoding",
                    self.block_len
                ),
            })
    }

    /// Encodes `message` into a `k`-byte block with a fresh random seed.
    pub fn encode<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        message: &[u8],
    ) -> Result<Vec<u8>, RsaError> {
        let max = self.max_message_len()?;
        if message.len() > max {
            return Err(RsaError::MessageTooLong {
                len: message.len(),
                max,
            });
        }
        let db_len = self.block_len - HASH_LEN - 1;

        let mut db = Vec::with_capacity(db_len);
        db.extend_from_slice(&hash(&self.label));
        db.resize(HASH_LEN + (max - message.len()), FILLER);
        db.push(SEPARATOR);
        db.extend_from_slice(message);

        let mut seed = [0u8; HASH_LEN];
        rng.fill_bytes(&mut seed);

        xor_into(&mut db, &mgf1(&seed, db_len));
        xor_into(&mut seed, &mgf1(&db, HASH_LEN));

        let mut em = Vec::with_capacity(self.block_len);
        em.push(0x00);
        em.extend_from_slice(&seed);
        em.extend_from_slice(&db);
        trace!(message_len = message.len(), block_len = self.block_len, "oaep encode");
        Ok(em)
    }

    /// Recovers the message from a `k`-byte block, checking structure and label.
    pub fn decode(&self, em: &[u8]) -> Result<Vec<u8>, RsaError> {
        self.max_message_len()?;
        if em.len() != self.block_len {
            return Err(RsaError::LengthMismatch {
                expected: self.block_len,
                actual: em.len(),
            });
        }
        if em[0] != 0x00 {
            return Err(OaepFailure::NonZeroTag.into());
        }
        let (masked_seed, masked_db) = em[1..].split_at(HASH_LEN);

        let mut seed = masked_seed.to_vec();
        xor_into(&mut seed, &mgf1(masked_db, HASH_LEN));
        let mut db = masked_db.to_vec();
        xor_into(&mut db, &mgf1(&seed, masked_db.len()));

        let (recovered_hash, rest) = db.split_at(HASH_LEN);
        let separator = rest
            .iter()
            .position(|&b| b != FILLER)
            .filter(|&i| rest[i] == SEPARATOR)
            .ok_or(OaepFailure::MissingSeparator)?;
        if recovered_hash != hash(&self.label).as_slice() {
            return Err(OaepFailure::LabelMismatch.into());
        }
        Ok(rest[separator + 1..].to_vec())
    }

    /// Encodes `message` and encrypts the block under `key`.
    ///
    /// The result is exactly `k` bytes.
    pub fn seal<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        message: &[u8],
        key: &PublicKey,
    ) -> Result<Vec<u8>, RsaError> {
        self.check_key(key)?;
        let em = self.encode(rng, message)?;
        let c = encrypt(&BigUint::from_bytes_be(&em), key)?;
        debug!(block_len = self.block_len, "sealed OAEP block");
        to_fixed_bytes(&c, self.block_len)
    }

    /// Decrypts a `k`-byte ciphertext under `key` and decodes the block.
    pub fn open(&self, ciphertext: &[u8], key: &PrivateKey) -> Result<Vec<u8>, RsaError> {
        self.check_key(key)?;
        if ciphertext.len() != self.block_len {
            return Err(RsaError::LengthMismatch {
                expected: self.block_len,
                actual: ciphertext.len(),
            });
        }
        let m = decrypt(&BigUint::from_bytes_be(ciphertext), key)?;
        self.decode(&to_fixed_bytes(&m, self.block_len)?)
    }

    fn check_key<K: KeyMaterial + ?Sized>(&self, key: &K) -> Result<(), RsaError> {
        let bits = key.modulus().bits();
        if bits <= 8 * (self.block_len as u64).saturating_sub(1) || key.size() != self.block_len {
            return Err(RsaError::ModulusTooSmall {
                bits,
                block_len: self.block_len,
            });
        }
        Ok(())
    }
}
