//! Envelope error types and their classification.

use aes_core::CtrError;
use rsa_core::RsaError;
use thiserror::Error;

/// Broad failure classes shared by every layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input is malformed: wrong length, bad encoding, oversized message, bad padding.
    Validation,
    /// Content decoded but does not match what was sent: tampering or wrong key.
    Integrity,
    /// No usable public exponent exists for the drawn primes.
    ArithmeticPrecondition,
    /// Prime search was cancelled or ran out of time.
    ResourceExhaustion,
}

impl From<&RsaError> for ErrorKind {
    fn from(err: &RsaError) -> Self {
        match err {
            RsaError::MessageTooLong { .. }
            | RsaError::MessageOutOfRange
            | RsaError::LengthMismatch { .. }
            | RsaError::ModulusTooSmall { .. }
            | RsaError::InvalidConfig { .. } => Self::Validation,
            RsaError::Decoding(_) => Self::Integrity,
            RsaError::NoInvertibleExponent => Self::ArithmeticPrecondition,
            RsaError::Cancelled { .. } | RsaError::TimedOut { .. } => Self::ResourceExhaustion,
        }
    }
}

/// Errors from sending or receiving an envelope.
///
/// No variant carries plaintext or key material.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// A wire field could not be decoded or has the wrong width.
    #[error("malformed {field}: {reason}")]
    Malformed {
        /// Which envelope field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// The payload ciphertext is not a valid CTR stream.
    #[error("payload decryption failed: {0}")]
    Payload(#[from] CtrError),

    /// Wrapping or unwrapping the session key failed.
    #[error("session key exchange failed: {0}")]
    KeyWrap(#[source] RsaError),

    /// Signing or recovering the message hash failed.
    #[error("hash signature failed: {0}")]
    Signature(#[source] RsaError),

    /// Key pair generation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(#[source] RsaError),

    /// A field decrypted to something no sender produces: a pad byte that
    /// does not describe the padding, an RSA value not below the modulus, or
    /// a session key of the wrong width.
    #[error("{field} failed to decrypt cleanly")]
    Tampered {
        /// Which envelope field
        field: &'static str,
    },

    /// The decrypted message does not hash to the signed digest.
    #[error("message hash does not match the signed hash")]
    HashMismatch,
}

impl EnvelopeError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Malformed { .. } | Self::Payload(_) => ErrorKind::Validation,
            Self::KeyWrap(err) | Self::Signature(err) | Self::KeyGeneration(err) => err.into(),
            Self::Tampered { .. } | Self::HashMismatch => ErrorKind::Integrity,
        }
    }

    /// Returns true when every layer decoded but the content is not authentic.
    ///
    /// False for failures where decoding itself broke down.
    pub fn is_inauthentic(&self) -> bool {
        matches!(self, Self::HashMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsa_core::OaepFailure;

    #[test]
    fn classification() {
        assert_eq!(EnvelopeError::HashMismatch.kind(), ErrorKind::Integrity);
        assert_eq!(
            EnvelopeError::KeyWrap(RsaError::Decoding(OaepFailure::LabelMismatch)).kind(),
            ErrorKind::Integrity
        );
        assert_eq!(
            EnvelopeError::KeyWrap(RsaError::MessageTooLong { len: 300, max: 190 }).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            EnvelopeError::KeyGeneration(RsaError::NoInvertibleExponent).kind(),
            ErrorKind::ArithmeticPrecondition
        );
        assert_eq!(
            EnvelopeError::KeyGeneration(RsaError::TimedOut { attempts: 9 }).kind(),
            ErrorKind::ResourceExhaustion
        );
        assert_eq!(
            EnvelopeError::from(CtrError::InvalidLength { len: 15 }).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            EnvelopeError::Tampered { field: "ciphertext" }.kind(),
            ErrorKind::Integrity
        );
    }

    #[test]
    fn only_hash_mismatch_is_inauthentic() {
        assert!(EnvelopeError::HashMismatch.is_inauthentic());
        assert!(!EnvelopeError::Tampered { field: "signed_hash" }.is_inauthentic());
        assert!(!EnvelopeError::KeyWrap(RsaError::Decoding(OaepFailure::NonZeroTag))
            .is_inauthentic());
    }

    #[test]
    fn error_display() {
        let err = EnvelopeError::Malformed {
            field: "ciphertext",
            reason: "invalid base64".to_string(),
        };
        assert_eq!(err.to_string(), "malformed ciphertext: invalid base64");
    }
}
