//! Sender and receiver sides of the envelope.
//!
//! Sending hashes the message, exponentiates the hash with the private key,
//! encrypts the message under a fresh AES-CTR session key, and wraps that key
//! with RSA-OAEP. Receiving reverses each step and accepts the message only if
//! its hash matches the recovered one.
//!
//! The hash "signature" is raw RSA over the digest. It is malleable and does
//! not resist forgery; it only binds the digest to the key pair. The nonce is
//! not part of the envelope: both sides must agree on it out of band, and it
//! must never be reused with the same session key.

use aes_core::{Aes128Key, Counter, CtrCipher, CtrError, BLOCK_LEN};
use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use rsa_core::keys::to_fixed_bytes;
use rsa_core::{hash, KeyGenerator, KeyMaterial, KeyPair, OaepCodec, RsaError, HASH_LEN};
use tracing::{debug, info, warn};
use zeroize::Zeroize;

use crate::config::EnvelopeConfig;
use crate::error::EnvelopeError;
use crate::transcript::{NoopTranscript, Transcript};

const KEY_LEN: usize = 16;

/// The three artifacts produced by [`EnvelopeProtocol::send`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// Message digest raised to the private exponent, modulus-width bytes.
    pub signed_hash: Vec<u8>,
    /// AES-CTR ciphertext of the padded message.
    pub ciphertext: Vec<u8>,
    /// RSA-OAEP encryption of the session key, modulus-width bytes.
    pub wrapped_key: Vec<u8>,
}

/// Runs both roles of the envelope exchange.
#[derive(Clone, Debug, Default)]
pub struct EnvelopeProtocol<T: Transcript = NoopTranscript> {
    config: EnvelopeConfig,
    transcript: T,
}

impl EnvelopeProtocol<NoopTranscript> {
    /// Creates a protocol runner that records nothing.
    pub fn new(config: EnvelopeConfig) -> Self {
        Self {
            config,
            transcript: NoopTranscript,
        }
    }
}

impl<T: Transcript> EnvelopeProtocol<T> {
    /// Replaces the transcript sink.
    pub fn with_transcript<U: Transcript>(self, transcript: U) -> EnvelopeProtocol<U> {
        EnvelopeProtocol {
            config: self.config,
            transcript,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &EnvelopeConfig {
        &self.config
    }

    /// The transcript sink.
    pub fn transcript(&self) -> &T {
        &self.transcript
    }

    /// Consumes the runner, returning its transcript.
    pub fn into_transcript(self) -> T {
        self.transcript
    }

    /// Generates a key pair with the configured parameters.
    pub fn generate_keypair<R: RngCore + CryptoRng>(
        &self,
        rng: R,
    ) -> Result<KeyPair, EnvelopeError> {
        KeyGenerator::with_config(rng, self.config.keygen.clone())
            .generate_keypair()
            .map_err(EnvelopeError::KeyGeneration)
    }

    fn codec(&self, keys: &KeyPair) -> OaepCodec {
        OaepCodec::for_key(&keys.public).with_label(self.config.label.clone())
    }

    /// Encrypts and signs `message` for the holder of `keys`.
    pub fn send<R: RngCore + CryptoRng>(
        &mut self,
        rng: &mut R,
        message: &[u8],
        keys: &KeyPair,
        nonce: &Counter,
    ) -> Result<Envelope, EnvelopeError> {
        let session_key = Aes128Key::random(rng);
        let message_hash = hash(message);

        let signed = rsa_core::encrypt(&BigUint::from_bytes_be(&message_hash), &keys.private)
            .map_err(EnvelopeError::Signature)?;
        let signed_hash =
            to_fixed_bytes(&signed, keys.private.size()).map_err(EnvelopeError::Signature)?;

        let ciphertext = CtrCipher::new(&session_key).encrypt(message, nonce);

        let wrapped_key = self
            .codec(keys)
            .seal(rng, session_key.as_bytes(), &keys.public)
            .map_err(EnvelopeError::KeyWrap)?;

        self.transcript.record("session_key", session_key.as_bytes());
        self.transcript.record("message_hash", &message_hash);
        self.transcript.record("signed_hash", &signed_hash);
        self.transcript.record("ciphertext", &ciphertext);
        self.transcript.record("wrapped_key", &wrapped_key);

        debug!(
            message_len = message.len(),
            ciphertext_len = ciphertext.len(),
            "envelope sealed"
        );
        Ok(Envelope {
            signed_hash,
            ciphertext,
            wrapped_key,
        })
    }

    /// Opens `envelope` and returns the message only if its hash verifies.
    pub fn receive(
        &mut self,
        envelope: &Envelope,
        keys: &KeyPair,
        nonce: &Counter,
    ) -> Result<Vec<u8>, EnvelopeError> {
        let width = keys.public.size();
        check_width("signed_hash", &envelope.signed_hash, width)?;
        check_width("wrapped_key", &envelope.wrapped_key, width)?;
        let ciphertext_len = envelope.ciphertext.len();
        if ciphertext_len == 0 || ciphertext_len % BLOCK_LEN != 0 {
            return Err(CtrError::InvalidLength {
                len: ciphertext_len,
            }
            .into());
        }

        let session_key = self.unwrap_session_key(&envelope.wrapped_key, keys)?;

        let recovered = rsa_core::decrypt(
            &BigUint::from_bytes_be(&envelope.signed_hash),
            &keys.public,
        )
        .map_err(|err| match err {
            RsaError::MessageOutOfRange => tampered("signed_hash"),
            other => EnvelopeError::Signature(other),
        })?;
        // A value wider than a digest cannot match any message hash.
        let Ok(message_hash) = to_fixed_bytes(&recovered, HASH_LEN) else {
            warn!("recovered hash is wider than a digest");
            return Err(EnvelopeError::HashMismatch);
        };

        let message = CtrCipher::new(&session_key)
            .decrypt(&envelope.ciphertext, nonce)
            .map_err(|err| match err {
                CtrError::InvalidPadding { .. } => tampered("ciphertext"),
                other => EnvelopeError::Payload(other),
            })?;
        let recomputed = hash(&message);

        self.transcript.record("session_key", session_key.as_bytes());
        self.transcript.record("message_hash", &message_hash);
        self.transcript.record("received_hash", &recomputed);

        if recomputed.as_slice() != message_hash.as_slice() {
            warn!(
                ciphertext_len = envelope.ciphertext.len(),
                "message hash mismatch"
            );
            return Err(EnvelopeError::HashMismatch);
        }

        self.transcript.record("message", &message);
        info!(message_len = message.len(), "envelope verified");
        Ok(message)
    }

    fn unwrap_session_key(
        &self,
        wrapped_key: &[u8],
        keys: &KeyPair,
    ) -> Result<Aes128Key, EnvelopeError> {
        let mut raw = self
            .codec(keys)
            .open(wrapped_key, &keys.private)
            .map_err(|err| match err {
                RsaError::MessageOutOfRange => tampered("wrapped_key"),
                other => EnvelopeError::KeyWrap(other),
            })?;
        if raw.len() != KEY_LEN {
            debug!(len = raw.len(), "unwrapped session key has the wrong width");
            raw.zeroize();
            return Err(tampered("wrapped_key"));
        }
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&raw);
        raw.zeroize();
        let key = Aes128Key::from(bytes);
        bytes.zeroize();
        Ok(key)
    }
}

fn tampered(field: &'static str) -> EnvelopeError {
    warn!(field, "field did not decrypt cleanly");
    EnvelopeError::Tampered { field }
}

fn check_width(field: &'static str, value: &[u8], width: usize) -> Result<(), EnvelopeError> {
    if value.len() != width {
        return Err(EnvelopeError::Malformed {
            field,
            reason: format!("expected {width} bytes, got {}", value.len()),
        });
    }
    Ok(())
}

/// Sends with default settings and no transcript.
pub fn send<R: RngCore + CryptoRng>(
    rng: &mut R,
    message: &[u8],
    keys: &KeyPair,
    nonce: &Counter,
) -> Result<Envelope, EnvelopeError> {
    EnvelopeProtocol::new(EnvelopeConfig::default()).send(rng, message, keys, nonce)
}

/// Receives with default settings and no transcript.
pub fn receive(
    envelope: &Envelope,
    keys: &KeyPair,
    nonce: &Counter,
) -> Result<Vec<u8>, EnvelopeError> {
    EnvelopeProtocol::new(EnvelopeConfig::default()).receive(envelope, keys, nonce)
}
