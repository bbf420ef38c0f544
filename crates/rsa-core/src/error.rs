//! Error types for RSA, OAEP and key generation.

use thiserror::Error;

/// Reason an OAEP block failed to decode.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OaepFailure {
    /// The leading byte of the encoded block is not 0x00.
    #[error("leading byte is not zero")]
    NonZeroTag,

    /// No 0x01 separator follows the filler bytes.
    #[error("separator byte not found")]
    MissingSeparator,

    /// Recovered label hash differs from the expected one.
    #[error("label hash mismatch")]
    LabelMismatch,
}

/// Errors from RSA primitives, OAEP and key generation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RsaError {
    /// OAEP input exceeds the block capacity.
    #[error("message of {len} bytes exceeds OAEP capacity of {max} bytes")]
    MessageTooLong {
        /// Message length in bytes
        len: usize,
        /// Largest accepted length
        max: usize,
    },

    /// Raw RSA input is not below the modulus.
    #[error("input is not below the modulus")]
    MessageOutOfRange,

    /// A byte string does not have the width the operation requires.
    #[error("length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Required width in bytes
        expected: usize,
        /// Observed width in bytes
        actual: usize,
    },

    /// Modulus cannot hold an OAEP block of the configured size.
    #[error("modulus of {bits} bits cannot hold a {block_len}-byte block")]
    ModulusTooSmall {
        /// Modulus bit length
        bits: u64,
        /// OAEP block length in bytes
        block_len: usize,
    },

    /// Parameters are outside the supported range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong
        reason: String,
    },

    /// OAEP block is structurally invalid or fails the label check.
    #[error("OAEP decoding failed: {0}")]
    Decoding(#[from] OaepFailure),

    /// No odd public exponent below phi(n) is coprime to it.
    #[error("no public exponent is coprime to phi(n)")]
    NoInvertibleExponent,

    /// Prime search was cancelled by the caller.
    #[error("prime search cancelled after {attempts} candidates")]
    Cancelled {
        /// Candidates drawn before cancellation
        attempts: u64,
    },

    /// Prime search ran past its deadline.
    #[error("prime search timed out after {attempts} candidates")]
    TimedOut {
        /// Candidates drawn before the deadline passed
        attempts: u64,
    },
}

impl RsaError {
    /// Returns true if the error reports tampered or mismatched content rather
    /// than malformed input.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::Decoding(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = RsaError::MessageTooLong { len: 200, max: 190 };
        assert_eq!(
            err.to_string(),
            "message of 200 bytes exceeds OAEP capacity of 190 bytes"
        );
        let err = RsaError::from(OaepFailure::LabelMismatch);
        assert_eq!(err.to_string(), "OAEP decoding failed: label hash mismatch");
    }

    #[test]
    fn only_decoding_failures_are_integrity_failures() {
        assert!(RsaError::Decoding(OaepFailure::MissingSeparator).is_integrity_failure());
        assert!(!RsaError::MessageOutOfRange.is_integrity_failure());
        assert!(!RsaError::Cancelled { attempts: 3 }.is_integrity_failure());
    }
}
