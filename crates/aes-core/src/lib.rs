//! From-scratch AES-128 used by the envelope protocol.
//!
//! This crate provides:
//! - GF(2^8) multiplication restricted to the MixColumns coefficients.
//! - Key schedule for AES-128.
//! - Single-block forward encryption.
//! - CTR mode with block padding, covering both directions.
//!
//! The implementation aims for clarity and testability rather than constant-time
//! guarantees; it should not be treated as side-channel hardened.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod block;
mod cipher;
pub mod ctr;
mod error;
pub mod gf;
mod key;
pub mod round;
mod sbox;

pub use crate::block::{Block, BLOCK_LEN};
pub use crate::cipher::{encrypt, encrypt_block, expand_key, RCON, ROUNDS};
pub use crate::ctr::{pad, unpad, Counter, CtrCipher};
pub use crate::error::CtrError;
pub use crate::key::{Aes128Key, RoundKeys};
pub use crate::sbox::sbox;
