//! AES-128 in counter mode with block padding.
//!
//! The message is padded to a whole number of blocks before encryption, so a
//! ciphertext is always `⌈(len + 1) / 16⌉ × 16` bytes. Encryption and
//! decryption share one keystream path: the forward cipher runs on the
//! counter, never on the data.
//!
//! A (key, nonce) pair must never be reused for two different messages.

use rand::{CryptoRng, RngCore};
use tracing::trace;

use crate::block::{xor_in_place, Block, BLOCK_LEN};
use crate::cipher::{encrypt_block, expand_key};
use crate::error::CtrError;
use crate::key::{Aes128Key, RoundKeys};

/// CTR counter block: a 128-bit big-endian unsigned integer.
///
/// Incrementing past `2^128 - 1` wraps to zero; the counter width never
/// changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Counter(pub Block);

impl Counter {
    /// Draws a fresh random nonce.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut block = [0u8; BLOCK_LEN];
        rng.fill_bytes(&mut block);
        Self(block)
    }

    /// Builds a counter from exactly 16 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let block: Block = bytes.try_into().ok()?;
        Some(Self(block))
    }

    /// Adds one, wrapping modulo 2^128.
    pub fn increment(&mut self) {
        let value = u128::from_be_bytes(self.0).wrapping_add(1);
        self.0 = value.to_be_bytes();
    }

    /// Returns the counter advanced by `n` blocks.
    pub fn offset(&self, n: u128) -> Self {
        Self(u128::from_be_bytes(self.0).wrapping_add(n).to_be_bytes())
    }

    /// Counter bytes.
    pub fn as_bytes(&self) -> &Block {
        &self.0
    }
}

impl From<Block> for Counter {
    fn from(value: Block) -> Self {
        Self(value)
    }
}

/// Appends `N` bytes of value `N`, where `N = 16 - len % 16` (1..=16).
pub fn pad(msg: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_LEN - msg.len() % BLOCK_LEN;
    let mut out = Vec::with_capacity(msg.len() + pad_len);
    out.extend_from_slice(msg);
    out.resize(msg.len() + pad_len, pad_len as u8);
    out
}

/// Strips the padding added by [`pad`].
///
/// The final byte gives the pad length; it must be in 1..=16 and every
/// stripped byte must carry the same value.
pub fn unpad(msg: &[u8]) -> Result<&[u8], CtrError> {
    if msg.is_empty() || msg.len() % BLOCK_LEN != 0 {
        return Err(CtrError::InvalidLength { len: msg.len() });
    }
    let value = msg[msg.len() - 1];
    let pad_len = value as usize;
    if pad_len == 0 || pad_len > BLOCK_LEN {
        return Err(CtrError::InvalidPadding { value });
    }
    let (body, padding) = msg.split_at(msg.len() - pad_len);
    if padding.iter().any(|&b| b != value) {
        return Err(CtrError::InvalidPadding { value });
    }
    Ok(body)
}

/// CTR-mode cipher with cached round keys.
#[derive(Clone, Debug)]
pub struct CtrCipher {
    round_keys: RoundKeys,
}

impl CtrCipher {
    /// Expands `key` once for the lifetime of the cipher.
    pub fn new(key: &Aes128Key) -> Self {
        Self {
            round_keys: expand_key(key),
        }
    }

    /// XORs the keystream starting at `nonce` into whole blocks of `data`.
    fn apply_keystream(&self, data: &mut [u8], nonce: &Counter) {
        let mut counter = *nonce;
        for chunk in data.chunks_exact_mut(BLOCK_LEN) {
            let mut block: Block = [0u8; BLOCK_LEN];
            block.copy_from_slice(chunk);
            let keystream = encrypt_block(&counter.0, &self.round_keys);
            xor_in_place(&mut block, &keystream);
            chunk.copy_from_slice(&block);
            counter.increment();
        }
    }

    /// Pads and encrypts `plaintext`.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &Counter) -> Vec<u8> {
        let mut data = pad(plaintext);
        trace!(blocks = data.len() / BLOCK_LEN, "ctr encrypt");
        self.apply_keystream(&mut data, nonce);
        data
    }

    /// Decrypts and unpads `ciphertext`.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &Counter) -> Result<Vec<u8>, CtrError> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
            return Err(CtrError::InvalidLength {
                len: ciphertext.len(),
            });
        }
        let mut data = ciphertext.to_vec();
        trace!(blocks = data.len() / BLOCK_LEN, "ctr decrypt");
        self.apply_keystream(&mut data, nonce);
        let len = unpad(&data)?.len();
        data.truncate(len);
        Ok(data)
    }
}

/// One-shot CTR encryption.
pub fn encrypt(plaintext: &[u8], key: &Aes128Key, nonce: &Counter) -> Vec<u8> {
    CtrCipher::new(key).encrypt(plaintext, nonce)
}

/// One-shot CTR decryption.
pub fn decrypt(ciphertext: &[u8], key: &Aes128Key, nonce: &Counter) -> Result<Vec<u8>, CtrError> {
    CtrCipher::new(key).decrypt(ciphertext, nonce)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::encrypt as encrypt_one;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn pad_appends_full_block_on_boundary() {
        let padded = pad(&[0xaa; 16]);
        assert_eq!(padded.len(), 32);
        assert!(padded[16..].iter().all(|&b| b == 16));
        assert_eq!(pad(&[]), vec![16u8; 16]);
        assert_eq!(&pad(b"abc")[3..], &[13u8; 13]);
    }

    #[test]
    fn unpad_rejects_malformed_input() {
        assert_eq!(unpad(&[]), Err(CtrError::InvalidLength { len: 0 }));
        assert_eq!(unpad(&[1u8; 15]), Err(CtrError::InvalidLength { len: 15 }));
        assert_eq!(
            unpad(&[0u8; 16]),
            Err(CtrError::InvalidPadding { value: 0 })
        );
        assert_eq!(
            unpad(&[17u8; 16]),
            Err(CtrError::InvalidPadding { value: 17 })
        );
        let mut bad = pad(b"hello");
        bad[6] ^= 1;
        assert!(matches!(unpad(&bad), Err(CtrError::InvalidPadding { .. })));
    }

    #[test]
    fn counter_increment_is_big_endian_and_wraps() {
        let mut counter = Counter([0u8; 16]);
        counter.increment();
        assert_eq!(counter.0[15], 1);

        let mut carry = Counter([0u8; 16]);
        carry.0[15] = 0xff;
        carry.increment();
        assert_eq!(&carry.0[14..], &[1, 0]);

        let mut max = Counter([0xff; 16]);
        max.increment();
        assert_eq!(max, Counter([0u8; 16]));
        assert_eq!(Counter([0xff; 16]).offset(2).0[15], 1);
    }

    #[test]
    fn ciphertext_length_always_adds_padding() {
        let mut rng = ChaCha20Rng::from_seed([1u8; 32]);
        let key = Aes128Key::random(&mut rng);
        let nonce = Counter::random(&mut rng);
        for len in [0usize, 1, 15, 16, 17, 31, 32, 100] {
            let ct = encrypt(&vec![0x42; len], &key, &nonce);
            assert_eq!(ct.len(), (len + 1).div_ceil(16) * 16);
        }
    }

    #[test]
    fn keystream_is_forward_cipher_on_counter() {
        let key = Aes128Key::from([0x11; 16]);
        let nonce = Counter([0x22; 16]);
        // A 16-byte message yields two blocks: data, then a full pad block.
        let ct = encrypt(&[0u8; 16], &key, &nonce);
        assert_eq!(&ct[..16], &encrypt_one(&nonce.0, &key));
        let mut second = encrypt_one(&nonce.offset(1).0, &key);
        for b in second.iter_mut() {
            *b ^= 16;
        }
        assert_eq!(&ct[16..], &second);
    }

    #[test]
    fn round_trip_random_lengths() {
        let mut rng = ChaCha20Rng::from_seed([2u8; 32]);
        for len in 0..80 {
            let key = Aes128Key::random(&mut rng);
            let nonce = Counter::random(&mut rng);
            let mut msg = vec![0u8; len];
            rng.fill_bytes(&mut msg);
            let cipher = CtrCipher::new(&key);
            let ct = cipher.encrypt(&msg, &nonce);
            assert_eq!(cipher.decrypt(&ct, &nonce).as_deref(), Ok(msg.as_slice()));
        }
    }

    #[test]
    fn decrypt_rejects_partial_blocks() {
        let key = Aes128Key::from([0u8; 16]);
        let nonce = Counter([0u8; 16]);
        assert_eq!(
            decrypt(&[0u8; 20], &key, &nonce),
            Err(CtrError::InvalidLength { len: 20 })
        );
        assert_eq!(
            decrypt(&[], &key, &nonce),
            Err(CtrError::InvalidLength { len: 0 })
        );
    }
}
