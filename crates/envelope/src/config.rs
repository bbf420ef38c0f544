//! Protocol configuration.

use rsa_core::KeyGenConfig;

/// Settings shared by sender and receiver.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvelopeConfig {
    /// OAEP label bound into the wrapped session key. Both sides must agree.
    pub label: Vec<u8>,
    /// Key generation parameters.
    pub keygen: KeyGenConfig,
}

impl EnvelopeConfig {
    /// Replaces the OAEP label.
    pub fn with_label(mut self, label: impl Into<Vec<u8>>) -> Self {
        self.label = label.into();
        self
    }
}
