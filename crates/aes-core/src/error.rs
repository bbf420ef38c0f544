//! Errors raised by the CTR layer.

use thiserror::Error;

/// Errors from CTR decryption and unpadding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CtrError {
    /// Ciphertext (or padded message) is empty or not a whole number of blocks.
    #[error("invalid length {len}: expected a non-zero multiple of 16 bytes")]
    InvalidLength {
        /// Observed length in bytes
        len: usize,
    },

    /// Trailing padding is malformed.
    #[error("invalid padding byte 0x{value:02x}")]
    InvalidPadding {
        /// The pad value read from the final byte
        value: u8,
    },
}
