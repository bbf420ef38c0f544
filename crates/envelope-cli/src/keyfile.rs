//! On-disk key pair format.

use anyhow::{bail, Context, Result};
use rsa_core::{KeyMaterial, KeyPair, PrivateKey, PublicKey};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

const FORMAT_VERSION: u8 = 1;

/// Both halves of a key pair in their fixed-width byte layouts, stored with `bincode`.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct KeyFile {
    version: u8,
    public: Vec<u8>,
    private: Vec<u8>,
}

impl KeyFile {
    pub fn from_pair(pair: &KeyPair) -> Result<Self> {
        Ok(Self {
            version: FORMAT_VERSION,
            public: pair.public.to_bytes().context("encode public key")?,
            private: pair.private.to_bytes().context("encode private key")?,
        })
    }

    pub fn to_pair(&self) -> Result<KeyPair> {
        if self.version != FORMAT_VERSION {
            bail!("unsupported key file version {}", self.version);
        }
        let public = PublicKey::from_bytes(&self.public).context("decode public key")?;
        let private = PrivateKey::from_bytes(&self.private).context("decode private key")?;
        if public.modulus() != private.modulus() {
            bail!("public and private keys have different moduli");
        }
        Ok(KeyPair { public, private })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}
