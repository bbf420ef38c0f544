//! Asymmetric primitives for the envelope protocol.
//!
//! This crate provides:
//! - Miller–Rabin primality testing and cancellable random prime search.
//! - RSA key generation and textbook modular-exponentiation encrypt/decrypt.
//! - OAEP encoding over SHA3-256 with MGF1, and RSA-OAEP sealing.
//!
//! Arithmetic is not constant-time and the raw RSA primitives are unpadded;
//! see the module docs of [`keys`] for the limits that implies.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
pub mod hash;
pub mod keygen;
pub mod keys;
pub mod oaep;
pub mod prime;

pub use crate::error::{OaepFailure, RsaError};
pub use crate::hash::{hash, Digest256, HASH_LEN};
pub use crate::keygen::{KeyGenConfig, KeyGenerator};
pub use crate::keys::{decrypt, encrypt, KeyMaterial, KeyPair, PrivateKey, PublicKey};
pub use crate::oaep::{mgf1, OaepCodec};
pub use crate::prime::{generate_prime, is_probable_prime, CancelToken, SearchLimits};
