//! RSA key pair generation.

use std::time::{Duration, Instant};

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info};

use crate::error::RsaError;
use crate::keys::{mod_inverse, KeyPair, PrivateKey, PublicKey};
use crate::prime::{generate_prime, CancelToken, SearchLimits, DEFAULT_CERTAINTY};

/// Smallest prime size accepted by the generator.
pub const MIN_PRIME_BITS: u64 = 8;

/// Configuration for key generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyGenConfig {
    /// Bit length of each prime; the modulus is twice as long (1024 → 2048).
    pub prime_bits: u64,
    /// Miller–Rabin rounds per candidate.
    pub certainty: u32,
    /// Abort the whole generation after this long.
    pub timeout: Option<Duration>,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            prime_bits: 1024,
            certainty: DEFAULT_CERTAINTY,
            timeout: None,
        }
    }
}

impl KeyGenConfig {
    /// Byte length of the modulus every generated key fills: `2 · prime_bits / 8`.
    pub fn modulus_len(&self) -> usize {
        (2 * self.prime_bits as usize).div_ceil(8)
    }
}

/// Key pair generator parametrized by an RNG.
pub struct KeyGenerator<R: RngCore + CryptoRng> {
    rng: R,
    config: KeyGenConfig,
    cancel: Option<CancelToken>,
}

impl<R: RngCore + CryptoRng> KeyGenerator<R> {
    /// Creates a new generator with default configuration.
    pub fn new(rng: R) -> Self {
        Self::with_config(rng, KeyGenConfig::default())
    }

    /// Creates a generator with explicit configuration.
    pub fn with_config(rng: R, config: KeyGenConfig) -> Self {
        Self {
            rng,
            config,
            cancel: None,
        }
    }

    /// Attaches a token that aborts generation when cancelled.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns a mutable reference to the configuration.
    pub fn config_mut(&mut self) -> &mut KeyGenConfig {
        &mut self.config
    }

    /// Draws two distinct primes and derives `(e, n)` and `(d, n)`.
    ///
    /// Primes are redrawn until `n` fills [`KeyGenConfig::modulus_len`] bytes,
    /// so any OAEP block of that length (leading byte zero) is below `n`.
    pub fn generate_keypair(&mut self) -> Result<KeyPair, RsaError> {
        let bits = self.config.prime_bits;
        if bits < MIN_PRIME_BITS {
            return Err(RsaError::InvalidConfig {
                reason: format!("prime size {bits} is below {MIN_PRIME_BITS} bits"),
            });
        }
        let certainty = self.config.certainty;
        let limits = SearchLimits {
            deadline: self.config.timeout.map(|t| Instant::now() + t),
            cancel: self.cancel.clone(),
        };
        let min_modulus_bits = 8 * (self.config.modulus_len() as u64 - 1);

        let (p, q, n) = loop {
            let p = generate_prime(&mut self.rng, None, bits, certainty, &limits)?;
            let q = generate_prime(&mut self.rng, Some(&p), bits, certainty, &limits)?;
            let n = &p * &q;
            if n.bits() > min_modulus_bits {
                break (p, q, n);
            }
            debug!(modulus_bits = n.bits(), "modulus too short, redrawing primes");
        };

        let phi = (&p - 1u32) * (&q - 1u32);
        let e = smallest_coprime_exponent(&phi)?;
        let d = mod_inverse(&e, &phi).ok_or(RsaError::NoInvertibleExponent)?;
        info!(modulus_bits = n.bits(), exponent = %e, "generated RSA key pair");

        Ok(KeyPair {
            public: PublicKey::new(e, n.clone()),
            private: PrivateKey::new(d, n),
        })
    }
}

/// Returns the smallest odd `e ≥ 3` with `gcd(e, phi) = 1`.
pub fn smallest_coprime_exponent(phi: &BigUint) -> Result<BigUint, RsaError> {
    let mut e = BigUint::from(3u32);
    while !e.gcd(phi).is_one() {
        e += 2u32;
        if &e >= phi {
            return Err(RsaError::NoInvertibleExponent);
        }
    }
    Ok(e)
}
