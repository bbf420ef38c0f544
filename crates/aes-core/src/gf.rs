//! Byte multiplication in GF(2^8) for the MixColumns coefficients.
//!
//! Only the multipliers that appear in the forward diffusion matrix are
//! supported. This is not a general-purpose field multiplier: the inverse
//! cipher (which would need 9, 11, 13 and 14) is never required because CTR
//! mode only runs the forward direction.

/// Reduction constant for the field polynomial x⁸ + x⁴ + x³ + x + 1.
const REDUCTION: u8 = 0x1b;

/// A coefficient of the fixed MixColumns matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coeff {
    /// Multiply by 1.
    One,
    /// Multiply by x (0x02).
    Two,
    /// Multiply by x + 1 (0x03).
    Three,
}

impl TryFrom<u8> for Coeff {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            other => Err(other),
        }
    }
}

/// Multiplies `a` by x, reducing modulo the AES polynomial.
#[inline]
pub const fn xtime(a: u8) -> u8 {
    let shifted = a << 1;
    if a & 0x80 != 0 {
        shifted ^ REDUCTION
    } else {
        shifted
    }
}

/// Multiplies `a` by one of the diffusion-matrix coefficients.
#[inline]
pub const fn multiply(a: u8, b: Coeff) -> u8 {
    match b {
        Coeff::One => a,
        Coeff::Two => xtime(a),
        Coeff::Three => xtime(a) ^ a,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Shift-and-add reference multiplier, valid for any pair of bytes.
    fn gmul(mut a: u8, mut b: u8) -> u8 {
        let mut product = 0u8;
        for _ in 0..8 {
            if b & 1 != 0 {
                product ^= a;
            }
            a = xtime(a);
            b >>= 1;
        }
        product
    }

    #[test]
    fn fips_197_examples() {
        // FIPS-197 §4.2.1: {57} • {02} = {ae}, {ae} • {02} = {47}, {47} • {02} = {8e}.
        assert_eq!(multiply(0x57, Coeff::Two), 0xae);
        assert_eq!(multiply(0xae, Coeff::Two), 0x47);
        assert_eq!(multiply(0x47, Coeff::Two), 0x8e);
        assert_eq!(multiply(0x57, Coeff::Three), 0xae ^ 0x57);
    }

    #[test]
    fn matches_reference_for_all_bytes() {
        for a in 0u8..=255 {
            assert_eq!(multiply(a, Coeff::One), gmul(a, 1));
            assert_eq!(multiply(a, Coeff::Two), gmul(a, 2));
            assert_eq!(multiply(a, Coeff::Three), gmul(a, 3));
        }
    }

    #[test]
    fn coefficients_outside_domain_are_rejected() {
        assert_eq!(Coeff::try_from(2), Ok(Coeff::Two));
        assert_eq!(Coeff::try_from(0), Err(0));
        assert_eq!(Coeff::try_from(9), Err(9));
    }
}
