//! Miller–Rabin primality testing and random prime search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use tracing::{debug, trace};

use crate::error::RsaError;

/// Default number of Miller–Rabin rounds (false positive rate ≤ 4^-15).
pub const DEFAULT_CERTAINTY: u32 = 15;

/// Shared flag that aborts a running prime search.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; every search holding a clone stops at its next candidate.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Bounds on an otherwise unbounded prime search.
#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    /// Give up once this instant has passed.
    pub deadline: Option<Instant>,
    /// Give up once this token is cancelled.
    pub cancel: Option<CancelToken>,
}

impl SearchLimits {
    fn check(&self, attempts: u64) -> Result<(), RsaError> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(RsaError::Cancelled { attempts });
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(RsaError::TimedOut { attempts });
        }
        Ok(())
    }
}

/// Writes `n_minus_one = d · 2^r` with `2^r` the largest power of two dividing it.
///
/// The power is found by doubling a probe from 2 while it does not exceed
/// `n_minus_one` and keeping the last probe that divides evenly. Returns `None`
/// when no probe divides, which happens for odd inputs and for 0.
pub fn split_power_of_two(n_minus_one: &BigUint) -> Option<(BigUint, u32)> {
    let mut probe = BigUint::from(2u32);
    let mut exponent = 1u32;
    let mut found: Option<(BigUint, u32)> = None;
    while &probe <= n_minus_one {
        if (n_minus_one % &probe).is_zero() {
            found = Some((probe.clone(), exponent));
        }
        probe <<= 1u32;
        exponent += 1;
    }
    found.map(|(pow2r, r)| (n_minus_one / pow2r, r))
}

/// Miller–Rabin test with `rounds` random witnesses.
///
/// Even inputs (including 2) are reported composite, as are 0 and 1. For 3 the
/// witness range `[2, n - 1)` is empty, so no witness can refute it and it is
/// reported probably prime.
pub fn is_probable_prime<R: RngCore + CryptoRng>(rng: &mut R, n: &BigUint, rounds: u32) -> bool {
    if n.is_even() {
        return false;
    }
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let n_minus_one = n - &one;
    let Some((d, r)) = split_power_of_two(&n_minus_one) else {
        return false;
    };
    if n_minus_one <= two {
        return true;
    }

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..r {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Samples uniform `bits`-bit integers until one is probably prime and differs
/// from `excluded`.
///
/// Candidates are not forced odd or to full bit length, so roughly half are
/// discarded by the parity check and the result may be shorter than `bits`.
pub fn generate_prime<R: RngCore + CryptoRng>(
    rng: &mut R,
    excluded: Option<&BigUint>,
    bits: u64,
    certainty: u32,
    limits: &SearchLimits,
) -> Result<BigUint, RsaError> {
    let mut attempts = 0u64;
    loop {
        limits.check(attempts)?;
        attempts += 1;
        let candidate = rng.gen_biguint(bits);
        if excluded == Some(&candidate) {
            continue;
        }
        if is_probable_prime(rng, &candidate, certainty) {
            debug!(bits, attempts, found_bits = candidate.bits(), "prime found");
            return Ok(candidate);
        }
        trace!(attempts, "candidate rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::time::Duration;

    fn odd_primes(count: usize) -> Vec<u32> {
        let limit = 10_000usize;
        let mut sieve = vec![true; limit];
        sieve[0] = false;
        sieve[1] = false;
        for i in 2..limit {
            if sieve[i] {
                let mut j = i * i;
                while j < limit {
                    sieve[j] = false;
                    j += i;
                }
            }
        }
        (3..limit)
            .filter(|&i| sieve[i])
            .map(|i| i as u32)
            .take(count)
            .collect()
    }

    #[test]
    fn split_matches_trailing_zeros() {
        assert_eq!(
            split_power_of_two(&BigUint::from(2046u32)),
            Some((BigUint::from(1023u32), 1))
        );
        assert_eq!(
            split_power_of_two(&BigUint::from(1024u32)),
            Some((BigUint::one(), 10))
        );
        assert_eq!(
            split_power_of_two(&BigUint::from(12u32)),
            Some((BigUint::from(3u32), 2))
        );
        assert_eq!(split_power_of_two(&BigUint::from(0u32)), None);
        assert_eq!(split_power_of_two(&BigUint::from(9u32)), None);
    }

    #[test]
    fn accepts_first_thousand_odd_primes() {
        let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
        for p in odd_primes(1000) {
            assert!(
                is_probable_prime(&mut rng, &BigUint::from(p), DEFAULT_CERTAINTY),
                "{p} rejected"
            );
        }
    }

    #[test]
    fn small_inputs() {
        let mut rng = ChaCha20Rng::from_seed([4u8; 32]);
        for n in [0u32, 1, 2, 4, 9, 15, 21] {
            assert!(!is_probable_prime(&mut rng, &BigUint::from(n), DEFAULT_CERTAINTY));
        }
        assert!(is_probable_prime(&mut rng, &BigUint::from(3u32), DEFAULT_CERTAINTY));
    }

    #[test]
    fn rejects_carmichael_and_strong_pseudoprimes() {
        let mut rng = ChaCha20Rng::from_seed([5u8; 32]);
        for n in [561u32, 1105, 1729, 2047, 3277, 4033, 4681, 8321] {
            assert!(!is_probable_prime(&mut rng, &BigUint::from(n), DEFAULT_CERTAINTY));
        }
    }

    #[test]
    fn single_round_false_positive_rate_is_bounded() {
        // 2047 = 23 · 89 is a strong pseudoprime to base 2.
        let mut rng = ChaCha20Rng::from_seed([6u8; 32]);
        let n = BigUint::from(2047u32);
        let trials = 2000;
        let passes = (0..trials)
            .filter(|_| is_probable_prime(&mut rng, &n, 1))
            .count();
        assert!(passes * 4 <= trials, "{passes} of {trials} passed");
    }

    #[test]
    fn large_known_values() {
        let mut rng = ChaCha20Rng::from_seed([7u8; 32]);
        let mersenne_127 = (BigUint::one() << 127u32) - 1u32;
        assert!(is_probable_prime(&mut rng, &mersenne_127, DEFAULT_CERTAINTY));
        let fermat_7 = (BigUint::one() << 128u32) + 1u32;
        assert!(!is_probable_prime(&mut rng, &fermat_7, DEFAULT_CERTAINTY));
    }

    #[test]
    fn generated_primes_respect_exclusion_and_width() {
        let mut rng = ChaCha20Rng::from_seed([8u8; 32]);
        let limits = SearchLimits::default();
        let p = generate_prime(&mut rng, None, 64, DEFAULT_CERTAINTY, &limits).expect("prime");
        let q = generate_prime(&mut rng, Some(&p), 64, DEFAULT_CERTAINTY, &limits).expect("prime");
        assert_ne!(p, q);
        assert!(p.bits() <= 64 && q.bits() <= 64);
        assert!(is_probable_prime(&mut rng, &p, DEFAULT_CERTAINTY));
        assert!(is_probable_prime(&mut rng, &q, DEFAULT_CERTAINTY));
    }

    #[test]
    fn candidates_are_not_width_forced() {
        let mut rng = ChaCha20Rng::from_seed([10u8; 32]);
        let limits = SearchLimits::default();
        let primes: Vec<u32> = (0..40)
            .map(|_| {
                let p = generate_prime(&mut rng, None, 4, DEFAULT_CERTAINTY, &limits)
                    .expect("prime");
                u32::try_from(&p).expect("small prime")
            })
            .collect();
        assert!(primes.iter().all(|p| [3, 5, 7, 11, 13].contains(p)));
        assert!(primes.iter().any(|&p| p < 8));
    }

    #[test]
    fn excluded_value_is_never_returned() {
        // With 2-bit candidates the only prime reachable is 3.
        let mut rng = ChaCha20Rng::from_seed([9u8; 32]);
        let three = BigUint::from(3u32);
        let limits = SearchLimits {
            deadline: Some(Instant::now() + Duration::from_millis(50)),
            cancel: None,
        };
        let result = generate_prime(&mut rng, Some(&three), 2, 4, &limits);
        assert!(matches!(result, Err(RsaError::TimedOut { .. })));
    }

    #[test]
    fn cancelled_search_stops_immediately() {
        let mut rng = ChaCha20Rng::from_seed([10u8; 32]);
        let token = CancelToken::new();
        token.cancel();
        let limits = SearchLimits {
            deadline: None,
            cancel: Some(token),
        };
        assert_eq!(
            generate_prime(&mut rng, None, 1024, DEFAULT_CERTAINTY, &limits),
            Err(RsaError::Cancelled { attempts: 0 })
        );
    }
}
