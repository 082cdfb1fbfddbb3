//! Integer-only arithmetic used throughout the decoder.
//!
//! Values are kept in Q formats (`Qn` has `n` fractional bits). Wide dynamic
//! range factors such as the block gain use [`Gain`], a normalized mantissa
//! with a binary exponent.

use std::cmp::Ordering;

use crate::tables::{
    COS_FINE_Q31, LOG2_10_OVER_20_Q32, POW2_FRAC_Q30, SIN_COARSE_Q31, SIN_FINE_Q31,
};

/// Signed fixed-point value with `FRAC` fractional bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Fixed<const FRAC: u32>(i32);

pub type Q31 = Fixed<31>;
pub type Q16 = Fixed<16>;

impl<const FRAC: u32> Fixed<FRAC> {
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }
}

#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn saturate_i32(value: i64) -> i32 {
    if value > i32::MAX as i64 {
        i32::MAX
    } else if value < i32::MIN as i64 {
        i32::MIN
    } else {
        value as i32
    }
}

/// `(a * b) >> 31` with saturation.
#[must_use]
pub const fn mul_q31(a: i32, b: i32) -> i32 {
    mul_shift(a, b, 31)
}

/// `(a * b) >> shift` computed in 64 bits with saturation.
#[must_use]
pub const fn mul_shift(a: i32, b: i32, shift: u32) -> i32 {
    saturate_i32(((a as i64) * (b as i64)) >> shift)
}

/// 64-bit multiply-accumulate.
#[must_use]
pub const fn mac64(acc: i64, a: i32, b: i32) -> i64 {
    acc + (a as i64) * (b as i64)
}

#[must_use]
pub const fn clz32(value: u32) -> u32 {
    value.leading_zeros()
}

/// `floor(log2(value))`, with `log2_floor(0) == 0`.
#[must_use]
pub const fn log2_floor(value: u32) -> u32 {
    if value == 0 { 0 } else { 31 - clz32(value) }
}

const INV_SEED_A_Q29: i64 = 1_515_870_810;
const INV_SEED_B_Q29: i64 = 1_010_580_540;
const NEWTON_ITERATIONS: usize = 5;

/// Reciprocal of a normalized value.
///
/// `x` is Q31 in `[0.5, 1.0)`, i.e. `2^30 <= x < 2^31`. The result is `1 / x`
/// in Q29, in `(1.0, 2.0]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn inv_r_normalized(x: u32) -> u32 {
    let x = x as i64;
    let two_q29 = 1_i64 << 30;

    let mut y = INV_SEED_A_Q29 - ((INV_SEED_B_Q29 * x) >> 31);
    let mut i = 0;
    while i < NEWTON_ITERATIONS {
        let err = two_q29 - ((x * y) >> 31);
        y = (y * err) >> 29;
        i += 1;
    }

    if y < 0 {
        0
    } else if y > two_q29 {
        two_q29 as u32
    } else {
        y as u32
    }
}

/// Integer square root, rounded down.
#[must_use]
pub const fn isqrt32(value: u32) -> u32 {
    let mut op = value;
    let mut res = 0_u32;
    let mut one = 1_u32 << 30;
    while one > op {
        one >>= 2;
    }
    while one != 0 {
        if op >= res + one {
            op -= res + one;
            res = (res >> 1) + one;
        } else {
            res >>= 1;
        }
        one >>= 2;
    }
    res
}

/// Integer square root of a 64-bit value, rounded down.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn isqrt64(value: u64) -> u32 {
    let mut op = value;
    let mut res = 0_u64;
    let mut one = 1_u64 << 62;
    while one > op {
        one >>= 2;
    }
    while one != 0 {
        if op >= res + one {
            op -= res + one;
            res = (res >> 1) + one;
        } else {
            res >>= 1;
        }
        one >>= 2;
    }
    res as u32
}

/// Angle units per full turn for [`sin_q31`] and [`cos_q31`].
pub const ANGLE_FULL: u32 = 32_768;
pub const ANGLE_HALF: u32 = ANGLE_FULL / 2;
pub const ANGLE_QUARTER: u32 = ANGLE_FULL / 4;

#[allow(clippy::cast_possible_truncation)]
const fn quarter_sin(angle: u32) -> i32 {
    let coarse = (angle >> 7) as usize;
    let fine = (angle & 127) as usize;
    if fine == 0 {
        return SIN_COARSE_Q31[coarse];
    }
    let value = (SIN_COARSE_Q31[coarse] as i64 * COS_FINE_Q31[fine] as i64
        + SIN_COARSE_Q31[64 - coarse] as i64 * SIN_FINE_Q31[fine] as i64)
        >> 31;
    saturate_i32(value)
}

/// `sin(2 * pi * angle / ANGLE_FULL)` in Q31.
#[must_use]
pub const fn sin_q31(angle: u32) -> Q31 {
    let mut angle = angle % ANGLE_FULL;
    let negative = angle >= ANGLE_HALF;
    if negative {
        angle -= ANGLE_HALF;
    }
    let value = if angle <= ANGLE_QUARTER {
        quarter_sin(angle)
    } else {
        quarter_sin(ANGLE_HALF - angle)
    };
    Fixed(if negative { -value } else { value })
}

/// `cos(2 * pi * angle / ANGLE_FULL)` in Q31.
#[must_use]
pub const fn cos_q31(angle: u32) -> Q31 {
    sin_q31(angle % ANGLE_FULL + ANGLE_QUARTER)
}

const MANTISSA_BITS: u32 = 30;

/// Positive pseudo-float: `mantissa / 2^30 * 2^exponent`.
///
/// The mantissa is kept in `[2^30, 2^31)` unless the value is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gain {
    mantissa: u32,
    exponent: i32,
}

impl Gain {
    pub const ZERO: Self = Self {
        mantissa: 0,
        exponent: 0,
    };

    pub const ONE: Self = Self {
        mantissa: 1 << MANTISSA_BITS,
        exponent: 0,
    };

    const MAX: Self = Self {
        mantissa: u32::MAX >> 1,
        exponent: 62,
    };

    /// Builds `raw / 2^frac_bits`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss
    )]
    pub const fn from_fraction(raw: u64, frac_bits: u32) -> Self {
        if raw == 0 {
            return Self::ZERO;
        }
        let msb = 63 - raw.leading_zeros() as i32;
        let shift = msb - MANTISSA_BITS as i32;
        let mantissa = if shift >= 0 {
            raw >> shift
        } else {
            raw << (-shift)
        };
        Self {
            mantissa: mantissa as u32,
            exponent: msb - frac_bits as i32,
        }
    }

    #[must_use]
    pub const fn from_int(value: u32) -> Self {
        Self::from_fraction(value as u64, 0)
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.mantissa == 0
    }

    #[must_use]
    pub const fn mantissa(self) -> u32 {
        self.mantissa
    }

    #[must_use]
    pub const fn exponent(self) -> i32 {
        self.exponent
    }

    /// Multiplies by `2^shift`.
    #[must_use]
    pub const fn scale_pow2(self, shift: i32) -> Self {
        if self.is_zero() {
            return self;
        }
        Self {
            mantissa: self.mantissa,
            exponent: self.exponent + shift,
        }
    }

    #[must_use]
    pub const fn mul_gain(self, other: Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::ZERO;
        }
        let product = (self.mantissa as u64) * (other.mantissa as u64);
        Self::from_fraction(product, 2 * MANTISSA_BITS).scale_pow2(self.exponent + other.exponent)
    }

    /// `1 / self`. Zero maps to the largest representable gain.
    #[must_use]
    pub const fn recip(self) -> Self {
        if self.is_zero() {
            return Self::MAX;
        }
        let inv = inv_r_normalized(self.mantissa);
        Self::from_fraction(inv as u64, MANTISSA_BITS).scale_pow2(-self.exponent)
    }

    #[must_use]
    pub const fn sqrt(self) -> Self {
        if self.is_zero() {
            return self;
        }
        let (mantissa, exponent) = if self.exponent & 1 == 0 {
            (self.mantissa as u64, self.exponent)
        } else {
            ((self.mantissa as u64) << 1, self.exponent - 1)
        };
        let root = isqrt64(mantissa << MANTISSA_BITS);
        Self::from_fraction(root as u64, MANTISSA_BITS).scale_pow2(exponent / 2)
    }

    /// `self^(-1/4)`.
    #[must_use]
    pub const fn pow_m1_4(self) -> Self {
        self.sqrt().sqrt().recip()
    }

    /// `2^x` for a Q16 exponent.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn pow2(x: Q16) -> Self {
        let raw = x.raw();
        let int_part = raw >> 16;
        let frac = (raw & 0xFFFF) as u32;
        let index = (frac >> 10) as usize;
        let rem = (frac & 1023) as u64;
        let lo = POW2_FRAC_Q30[index] as u64;
        let hi = POW2_FRAC_Q30[index + 1] as u64;
        let mantissa = lo + (((hi - lo) * rem) >> 10);
        Self::from_fraction(mantissa, MANTISSA_BITS).scale_pow2(int_part)
    }

    /// `10^(db / 20)`.
    #[must_use]
    pub const fn db20(db: i32) -> Self {
        let x = ((db as i64) * LOG2_10_OVER_20_Q32) >> 16;
        Self::pow2(Fixed(saturate_i32(x)))
    }

    /// `value / 2^frac_bits * self`, saturated to `i32`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn apply(self, value: i64, frac_bits: u32) -> i32 {
        if self.is_zero() || value == 0 {
            return 0;
        }
        let product = (value as i128) * (self.mantissa as i128);
        let shift = MANTISSA_BITS as i32 + frac_bits as i32 - self.exponent;
        let scaled = if shift >= 0 {
            if shift >= 127 {
                if product < 0 { -1 } else { 0 }
            } else {
                product >> shift
            }
        } else if product < 0 {
            i32::MIN as i128
        } else {
            i32::MAX as i128
        };
        if scaled > i32::MAX as i128 {
            i32::MAX
        } else if scaled < i32::MIN as i128 {
            i32::MIN
        } else {
            scaled as i32
        }
    }
}

impl PartialOrd for Gain {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Gain {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_zero(), other.is_zero()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self
                .exponent
                .cmp(&other.exponent)
                .then(self.mantissa.cmp(&other.mantissa)),
        }
    }
}
