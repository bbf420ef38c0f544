//! AES-128 key schedule and forward block encryption.
//!
//! Only the forward direction exists. CTR mode derives its keystream by
//! encrypting counter blocks, so decrypting data never needs the inverse
//! cipher.

use crate::block::{column, set_column, Block};
use crate::key::{Aes128Key, RoundKeys};
use crate::round::{add_round_key, mix_columns, shift_rows, sub_bytes};
use crate::sbox::sbox;

/// Number of rounds for a 128-bit key.
pub const ROUNDS: usize = 10;

/// Round constants: the first byte of each is x^(i-1) in GF(2^8).
pub const RCON: [[u8; 4]; ROUNDS] = [
    [0x01, 0, 0, 0],
    [0x02, 0, 0, 0],
    [0x04, 0, 0, 0],
    [0x08, 0, 0, 0],
    [0x10, 0, 0, 0],
    [0x20, 0, 0, 0],
    [0x40, 0, 0, 0],
    [0x80, 0, 0, 0],
    [0x1b, 0, 0, 0],
    [0x36, 0, 0, 0],
];

fn rot_sub_column(col: [u8; 4]) -> [u8; 4] {
    [sbox(col[1]), sbox(col[2]), sbox(col[3]), sbox(col[0])]
}

fn xor_columns(a: [u8; 4], b: [u8; 4]) -> [u8; 4] {
    [a[0] ^ b[0], a[1] ^ b[1], a[2] ^ b[2], a[3] ^ b[3]]
}

/// Expands a 128-bit key into the master key plus 10 round keys.
pub fn expand_key(key: &Aes128Key) -> RoundKeys {
    let mut round_keys = [[0u8; 16]; ROUNDS + 1];
    round_keys[0] = key.0;

    for round in 1..=ROUNDS {
        let prev = round_keys[round - 1];
        let mut next: Block = [0u8; 16];

        let first = xor_columns(
            xor_columns(rot_sub_column(column(&prev, 3)), column(&prev, 0)),
            RCON[round - 1],
        );
        set_column(&mut next, 0, first);

        for col in 1..4 {
            let value = xor_columns(column(&prev, col), column(&next, col - 1));
            set_column(&mut next, col, value);
        }

        round_keys[round] = next;
    }

    RoundKeys(round_keys)
}

/// Encrypts a single 16-byte block with pre-expanded round keys.
pub fn encrypt_block(block: &Block, round_keys: &RoundKeys) -> Block {
    let mut state = *block;

    add_round_key(&mut state, round_keys.get(0));

    for round in 1..ROUNDS {
        sub_bytes(&mut state);
        shift_rows(&mut state);
        mix_columns(&mut state);
        add_round_key(&mut state, round_keys.get(round));
    }

    sub_bytes(&mut state);
    shift_rows(&mut state);
    add_round_key(&mut state, round_keys.get(ROUNDS));

    state
}

/// Expands `key` and encrypts one block. Prefer [`encrypt_block`] with cached
/// round keys when encrypting more than one block.
pub fn encrypt(block: &Block, key: &Aes128Key) -> Block {
    encrypt_block(block, &expand_key(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gf::{multiply, Coeff};
    use crate::key::Aes128Key;
    use rand::RngCore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    // FIPS-197 Appendix B.
    const APPENDIX_B_KEY: [u8; 16] = [
        0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f,
        0x3c,
    ];
    const APPENDIX_B_PLAIN: [u8; 16] = [
        0x32, 0x43, 0xf6, 0xa8, 0x88, 0x5a, 0x30, 0x8d, 0x31, 0x31, 0x98, 0xa2, 0xe0, 0x37, 0x07,
        0x34,
    ];
    const APPENDIX_B_CIPHER: [u8; 16] = [
        0x39, 0x25, 0x84, 0x1d, 0x02, 0xdc, 0x09, 0xfb, 0xdc, 0x11, 0x85, 0x97, 0x19, 0x6a, 0x0b,
        0x32,
    ];

    // FIPS-197 Appendix C.1.
    const NIST_KEY: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f,
    ];
    const NIST_PLAIN: [u8; 16] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee,
        0xff,
    ];
    const NIST_CIPHER: [u8; 16] = [
        0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5,
        0x5a,
    ];

    #[test]
    fn encrypt_matches_appendix_b_vector() {
        let key = Aes128Key::from(APPENDIX_B_KEY);
        assert_eq!(encrypt(&APPENDIX_B_PLAIN, &key), APPENDIX_B_CIPHER);
    }

    #[test]
    fn encrypt_matches_nist_vector() {
        let key = Aes128Key::from(NIST_KEY);
        let round_keys = expand_key(&key);
        let ct = encrypt_block(&NIST_PLAIN, &round_keys);
        assert_eq!(ct, NIST_CIPHER);
    }

    #[test]
    fn key_schedule_matches_appendix_a() {
        let round_keys = expand_key(&Aes128Key::from(APPENDIX_B_KEY));
        assert_eq!(round_keys.get(0), &APPENDIX_B_KEY);
        assert_eq!(
            round_keys.get(1),
            &[
                0xa0, 0xfa, 0xfe, 0x17, 0x88, 0x54, 0x2c, 0xb1, 0x23, 0xa3, 0x39, 0x39, 0x2a, 0x6c,
                0x76, 0x05
            ]
        );
        assert_eq!(
            round_keys.get(10),
            &[
                0xd0, 0x14, 0xf9, 0xa8, 0xc9, 0xee, 0x25, 0x89, 0xe1, 0x3f, 0x0c, 0xc8, 0xb6, 0x63,
                0x0c, 0xa6
            ]
        );
    }

    #[test]
    fn round_constants_double_each_round() {
        for i in 1..ROUNDS {
            assert_eq!(RCON[i][0], multiply(RCON[i - 1][0], Coeff::Two));
            assert_eq!(&RCON[i][1..], &[0, 0, 0]);
        }
    }

    #[test]
    fn distinct_keys_give_distinct_blocks() {
        let mut rng = ChaCha20Rng::from_seed([7u8; 32]);
        let mut block = [0u8; 16];
        rng.fill_bytes(&mut block);
        let a = encrypt(&block, &Aes128Key::random(&mut rng));
        let b = encrypt(&block, &Aes128Key::random(&mut rng));
        assert_ne!(a, b);
    }
}
