// Copyright Kani Contributors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bit-vector bound arithmetic shared by the conversion and overflow checks.

use num::Signed;
use num::bigint::{BigInt, Sign};
use num_traits::Zero;

pub trait NumUtils {
    fn fits_in_bits(&self, width: u64, signed: bool) -> bool;
    fn two_complement(&self, width: u64) -> Self;
}

impl NumUtils for BigInt {
    fn fits_in_bits(&self, width: u64, signed: bool) -> bool {
        self <= &max_int(width, signed) && self >= &min_int(width, signed)
    }

    fn two_complement(&self, width: u64) -> Self {
        assert_eq!(self.sign(), Sign::Minus);
        let max = max_int(width, false);
        assert!(self.abs() < max);
        max - (self.abs() - 1)
    }
}

/// The largest value representable in a bit-vector of the given width.
pub fn max_int(width: u64, signed: bool) -> BigInt {
    let mut bi = BigInt::from(0);
    if signed {
        bi.set_bit(width - 1, true);
    } else {
        bi.set_bit(width, true);
    }
    bi - 1
}

/// The smallest value representable in a bit-vector of the given width.
pub fn min_int(width: u64, signed: bool) -> BigInt {
    if signed {
        let max = max_int(width, true);
        -max - 1
    } else {
        BigInt::zero()
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::NumUtils;
    use crate::utils::{max_int, min_int};
    use num::BigInt;

    #[test]
    fn test_fits_in_bits() {
        assert_eq!(BigInt::from(10).fits_in_bits(3, false), false);
        assert_eq!(BigInt::from(10).fits_in_bits(4, false), true);
        assert_eq!(BigInt::from(10).fits_in_bits(4, true), false);
        assert_eq!(BigInt::from(10).fits_in_bits(5, true), true);

        assert_eq!(BigInt::from(-10).fits_in_bits(5, false), false);
        assert_eq!(BigInt::from(-10).fits_in_bits(4, true), false);
        assert_eq!(BigInt::from(-10).fits_in_bits(5, true), true);
    }

    #[test]
    fn test_twos_complement() {
        assert_eq!(BigInt::from(-10).two_complement(8), BigInt::from(246));
    }

    #[test]
    fn test_max_min_int() {
        assert_eq!(max_int(8, false), BigInt::from(u8::MAX));
        assert_eq!(max_int(32, false), BigInt::from(u32::MAX));
        assert_eq!(max_int(8, true), BigInt::from(i8::MAX));
        assert_eq!(max_int(32, true), BigInt::from(i32::MAX));
        assert_eq!(min_int(32, false), BigInt::from(u32::MIN));
        assert_eq!(min_int(8, true), BigInt::from(i8::MIN));
        assert_eq!(min_int(32, true), BigInt::from(i32::MIN));
    }
}
