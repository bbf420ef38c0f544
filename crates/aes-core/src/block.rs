//! Block representation helpers.
//!
//! A block is the 4×4 AES state stored column-major: byte `i` sits at row
//! `i % 4` of column `i / 4`.

/// AES block of 16 bytes.
pub type Block = [u8; 16];

/// Size of an AES block in bytes.
pub const BLOCK_LEN: usize = 16;

/// XORs two blocks, writing the result into `dst`.
#[inline]
pub fn xor_in_place(dst: &mut Block, rhs: &Block) {
    for (d, r) in dst.iter_mut().zip(rhs.iter()) {
        *d ^= *r;
    }
}

/// Returns column `col` (0..4) of the state.
#[inline]
pub fn column(state: &Block, col: usize) -> [u8; 4] {
    let idx = col * 4;
    [state[idx], state[idx + 1], state[idx + 2], state[idx + 3]]
}

/// Overwrites column `col` (0..4) of the state.
#[inline]
pub fn set_column(state: &mut Block, col: usize, value: [u8; 4]) {
    let idx = col * 4;
    state[idx..idx + 4].copy_from_slice(&value);
}
