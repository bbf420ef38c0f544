//! Base64 transport form of an envelope.
//!
//! The three artifacts travel as separate fields; there is no framing that
//! would allow them to be concatenated.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::EnvelopeError;
use crate::protocol::Envelope;

/// An envelope with every field base64-encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEnvelope {
    /// Base64 of the signed message hash.
    pub signed_hash: String,
    /// Base64 of the CTR ciphertext.
    pub ciphertext: String,
    /// Base64 of the RSA-OAEP wrapped session key.
    pub wrapped_key: String,
}

fn decode_field(field: &'static str, value: &str) -> Result<Vec<u8>, EnvelopeError> {
    BASE64
        .decode(value.trim())
        .map_err(|err| EnvelopeError::Malformed {
            field,
            reason: err.to_string(),
        })
}

impl WireEnvelope {
    /// Decodes every field back to bytes.
    pub fn decode(&self) -> Result<Envelope, EnvelopeError> {
        Ok(Envelope {
            signed_hash: decode_field("signed_hash", &self.signed_hash)?,
            ciphertext: decode_field("ciphertext", &self.ciphertext)?,
            wrapped_key: decode_field("wrapped_key", &self.wrapped_key)?,
        })
    }
}

impl From<&Envelope> for WireEnvelope {
    fn from(envelope: &Envelope) -> Self {
        Self {
            signed_hash: BASE64.encode(&envelope.signed_hash),
            ciphertext: BASE64.encode(&envelope.ciphertext),
            wrapped_key: BASE64.encode(&envelope.wrapped_key),
        }
    }
}
