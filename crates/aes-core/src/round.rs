//! AES round transformations.
//!
//! Every transform mutates a caller-owned state buffer; the cipher copies the
//! input block into a local state before the first round, so there is exactly
//! one writer per state.

use crate::block::{column, set_column, xor_in_place, Block};
use crate::gf::{multiply, Coeff};
use crate::sbox::sbox;

use crate::gf::Coeff::{One as I, Three as T, Two as D};

/// Fixed MixColumns matrix over GF(2^8).
pub const MIX_MATRIX: [[Coeff; 4]; 4] = [
    [D, T, I, I],
    [I, D, T, I],
    [I, I, D, T],
    [T, I, I, D],
];

/// Applies SubBytes to the state in place.
#[inline]
pub fn sub_bytes(state: &mut Block) {
    for byte in state.iter_mut() {
        *byte = sbox(*byte);
    }
}

/// Performs ShiftRows in place: row `r` rotates left by `r` positions.
#[inline]
pub fn shift_rows(state: &mut Block) {
    let src = *state;
    for row in 1..4 {
        for col in 0..4 {
            state[col * 4 + row] = src[((col + row) % 4) * 4 + row];
        }
    }
}

fn mix_single_column(col: [u8; 4]) -> [u8; 4] {
    let mut out = [0u8; 4];
    for (row, coeffs) in MIX_MATRIX.iter().enumerate() {
        out[row] = coeffs
            .iter()
            .zip(col.iter())
            .fold(0u8, |acc, (&c, &byte)| acc ^ multiply(byte, c));
    }
    out
}

/// MixColumns over all four columns.
#[inline]
pub fn mix_columns(state: &mut Block) {
    for col in 0..4 {
        let mixed = mix_single_column(column(state, col));
        set_column(state, col, mixed);
    }
}

/// Adds (XORs) a round key into the state.
#[inline]
pub fn add_round_key(state: &mut Block, round_key: &Block) {
    xor_in_place(state, round_key);
}
