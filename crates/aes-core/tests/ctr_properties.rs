//! Property-based tests for padding and CTR mode.
//!
//! 1. **Padding round-trip**: unpad(pad(x)) == x
//! 2. **CTR round-trip**: decrypt(encrypt(p)) == p for any key, nonce and length
//! 3. **Nonce separation**: different nonces give different keystreams

use aes_core::ctr::{decrypt, encrypt};
use aes_core::{pad, unpad, Aes128Key, Counter};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_pad_round_trip(msg in prop::collection::vec(any::<u8>(), 0..1000)) {
        let padded = pad(&msg);
        prop_assert_eq!(padded.len() % 16, 0);
        prop_assert!(padded.len() > msg.len());
        prop_assert_eq!(unpad(&padded), Ok(msg.as_slice()));
    }

    #[test]
    fn prop_ctr_round_trip(
        key in any::<[u8; 16]>(),
        nonce in any::<[u8; 16]>(),
        msg in prop::collection::vec(any::<u8>(), 0..300),
    ) {
        let key = Aes128Key::from(key);
        let nonce = Counter::from(nonce);
        let ct = encrypt(&msg, &key, &nonce);
        prop_assert_eq!(ct.len(), (msg.len() + 1).div_ceil(16) * 16);
        prop_assert_eq!(decrypt(&ct, &key, &nonce), Ok(msg));
    }

    #[test]
    fn prop_distinct_nonces_change_ciphertext(
        key in any::<[u8; 16]>(),
        nonce in any::<[u8; 16]>(),
        msg in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        let key = Aes128Key::from(key);
        let first = Counter::from(nonce);
        let second = first.offset(1 << 64);
        prop_assert_ne!(encrypt(&msg, &key, &first), encrypt(&msg, &key, &second));
    }
}

#[test]
fn pad_round_trip_exhaustive_lengths() {
    for len in 0..=1000usize {
        let msg: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
        assert_eq!(unpad(&pad(&msg)), Ok(msg.as_slice()));
    }
}
