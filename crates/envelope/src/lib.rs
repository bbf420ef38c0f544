//! Hybrid envelope encryption built on `aes-core` and `rsa-core`.
//!
//! A message is encrypted with AES-128-CTR under a fresh session key, the key
//! is wrapped with RSA-OAEP, and the SHA3-256 digest of the message is
//! exponentiated with the RSA private key. The receiver unwraps the key,
//! decrypts, and accepts the message only if its digest matches.
//!
//! Randomness and transcript sinks are injected; nothing here touches the
//! filesystem.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod protocol;
mod transcript;
mod wire;

pub use crate::config::EnvelopeConfig;
pub use crate::error::{EnvelopeError, ErrorKind};
pub use crate::protocol::{receive, send, Envelope, EnvelopeProtocol};
pub use crate::transcript::{MemoryTranscript, NoopTranscript, Transcript};
pub use crate::wire::WireEnvelope;

pub use aes_core::Counter as Nonce;
