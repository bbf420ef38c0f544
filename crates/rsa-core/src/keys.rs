//! RSA key material and the raw (unpadded) modular-exponentiation primitives.
//!
//! `encrypt` and `decrypt` are textbook RSA: deterministic and malleable. They
//! must not be applied directly to sensitive data; wrap data with
//! [`OaepCodec`](crate::OaepCodec) instead. Exponentiating a digest with the
//! private key (as the envelope protocol does to "sign" a hash) gives no
//! forgery resistance either.

use core::fmt;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

use crate::error::RsaError;

/// An (exponent, modulus) pair usable with [`encrypt`] and [`decrypt`].
pub trait KeyMaterial {
    /// Public or private exponent.
    fn exponent(&self) -> &BigUint;

    /// Modulus `n = p · q`.
    fn modulus(&self) -> &BigUint;

    /// Modulus length in bytes; the width of every serialized value under this key.
    fn size(&self) -> usize {
        (self.modulus().bits() as usize).div_ceil(8)
    }
}

/// Public key `(e, n)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    e: BigUint,
    n: BigUint,
}

/// Private key `(d, n)`.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    d: BigUint,
    n: BigUint,
}

/// A matching public/private key pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPair {
    /// Public half.
    pub public: PublicKey,
    /// Private half.
    pub private: PrivateKey,
}

impl PublicKey {
    /// Builds a key from its components.
    pub fn new(e: BigUint, n: BigUint) -> Self {
        Self { e, n }
    }

    /// Serializes as `e ‖ n`, each big-endian and `size()` bytes wide.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RsaError> {
        pair_to_bytes(&self.e, &self.n)
    }

    /// Parses the layout written by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RsaError> {
        let (e, n) = pair_from_bytes(bytes)?;
        Ok(Self { e, n })
    }
}

impl PrivateKey {
    /// Builds a key from its components.
    pub fn new(d: BigUint, n: BigUint) -> Self {
        Self { d, n }
    }

    /// Serializes as `d ‖ n`, each big-endian and `size()` bytes wide.
    pub fn to_bytes(&self) -> Result<Vec<u8>, RsaError> {
        pair_to_bytes(&self.d, &self.n)
    }

    /// Parses the layout written by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RsaError> {
        let (d, n) = pair_from_bytes(bytes)?;
        Ok(Self { d, n })
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("bits", &self.n.bits())
            .finish_non_exhaustive()
    }
}

impl KeyMaterial for PublicKey {
    fn exponent(&self) -> &BigUint {
        &self.e
    }

    fn modulus(&self) -> &BigUint {
        &self.n
    }
}

impl KeyMaterial for PrivateKey {
    fn exponent(&self) -> &BigUint {
        &self.d
    }

    fn modulus(&self) -> &BigUint {
        &self.n
    }
}

fn pair_to_bytes(exponent: &BigUint, modulus: &BigUint) -> Result<Vec<u8>, RsaError> {
    let width = (modulus.bits() as usize).div_ceil(8);
    let mut out = to_fixed_bytes(exponent, width)?;
    out.extend(to_fixed_bytes(modulus, width)?);
    Ok(out)
}

fn pair_from_bytes(bytes: &[u8]) -> Result<(BigUint, BigUint), RsaError> {
    if bytes.is_empty() || bytes.len() % 2 != 0 {
        return Err(RsaError::LengthMismatch {
            expected: bytes.len() + bytes.len() % 2,
            actual: bytes.len(),
        });
    }
    let (exponent, modulus) = bytes.split_at(bytes.len() / 2);
    let modulus = BigUint::from_bytes_be(modulus);
    let width = (modulus.bits() as usize).div_ceil(8);
    if width != exponent.len() {
        return Err(RsaError::LengthMismatch {
            expected: exponent.len(),
            actual: width,
        });
    }
    Ok((BigUint::from_bytes_be(exponent), modulus))
}

/// Encodes `value` big-endian into exactly `len` bytes, left-padded with zeros.
pub fn to_fixed_bytes(value: &BigUint, len: usize) -> Result<Vec<u8>, RsaError> {
    let raw = if value.is_zero() {
        Vec::new()
    } else {
        value.to_bytes_be()
    };
    if raw.len() > len {
        return Err(RsaError::LengthMismatch {
            expected: len,
            actual: raw.len(),
        });
    }
    let mut out = vec![0u8; len - raw.len()];
    out.extend_from_slice(&raw);
    Ok(out)
}

fn exponentiate<K: KeyMaterial + ?Sized>(value: &BigUint, key: &K) -> Result<BigUint, RsaError> {
    if value >= key.modulus() {
        return Err(RsaError::MessageOutOfRange);
    }
    Ok(value.modpow(key.exponent(), key.modulus()))
}

/// Raw RSA: `m^e mod n`. Requires `m < n`.
pub fn encrypt<K: KeyMaterial + ?Sized>(m: &BigUint, key: &K) -> Result<BigUint, RsaError> {
    exponentiate(m, key)
}

/// Raw RSA: `c^d mod n`. Requires `c < n`.
pub fn decrypt<K: KeyMaterial + ?Sized>(c: &BigUint, key: &K) -> Result<BigUint, RsaError> {
    exponentiate(c, key)
}

/// Inverse of `a` modulo `m` by the extended Euclidean algorithm.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    let m_int = BigInt::from(m.clone());
    let (mut old_r, mut r) = (BigInt::from(a.clone()) % &m_int, m_int.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    while !r.is_zero() {
        let quotient = old_r.div_floor(&r);
        let next_r = &old_r - &quotient * &r;
        old_r = core::mem::replace(&mut r, next_r);
        let next_s = &old_s - &quotient * &s;
        old_s = core::mem::replace(&mut s, next_s);
    }
    if !old_r.is_one() {
        return None;
    }
    old_s.mod_floor(&m_int).to_biguint()
}
