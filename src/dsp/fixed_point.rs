use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Shr, ShrAssign, Sub};

/// Signed fixed-point number with 18 integer bits and 14 fractional bits.
///
/// Every gain, the sample rate and all derived delay coefficients use this
/// format. Raw arithmetic wraps in `i32` like the hardware registers do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Fixed18_14(i32);

/// Signed fixed-point number with 50 integer bits and 14 fractional bits.
///
/// The widened sample / accumulator format used inside the delay loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed50_14(i64);

/// Signed fixed-point number with 32 integer bits and 32 fractional bits.
///
/// Only used to size delay lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fixed32_32(i64);

impl Fixed18_14 {
    pub const FRAC_BITS: u32 = 14;
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1 << Self::FRAC_BITS);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> i32 {
        self.0
    }

    /// Convert from a float, truncating toward zero.
    pub fn from_f32(value: f32) -> Self {
        Self((value * Self::ONE.0 as f32) as i32)
    }

    pub const fn from_int(value: i32) -> Self {
        Self(value.wrapping_shl(Self::FRAC_BITS))
    }

    pub const fn to_int_floor(self) -> i32 {
        self.0 >> Self::FRAC_BITS
    }

    pub fn to_f32(self) -> f32 {
        self.0 as f32 / Self::ONE.0 as f32
    }

    /// Divide by an integer, truncating the raw value. Division by zero yields zero.
    pub fn div_int(self, divisor: i32) -> Self {
        if divisor == 0 {
            return Self::ZERO;
        }
        Self(self.0.wrapping_div(divisor))
    }

    /// Widen into the accumulator format without changing the value.
    pub const fn widen(self) -> Fixed50_14 {
        Fixed50_14(self.0 as i64)
    }
}

impl Mul for Fixed18_14 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(((self.0 as i64 * rhs.0 as i64) >> Self::FRAC_BITS) as i32)
    }
}

impl MulAssign for Fixed18_14 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Add for Fixed18_14 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl Sub for Fixed18_14 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }
}

impl Shr<u32> for Fixed18_14 {
    type Output = Self;

    fn shr(self, rhs: u32) -> Self {
        Self(self.0 >> rhs)
    }
}

impl ShrAssign<u32> for Fixed18_14 {
    fn shr_assign(&mut self, rhs: u32) {
        self.0 >>= rhs;
    }
}

// f64 holds every 18.14 value exactly, so the serde round trip is lossless.
impl From<f64> for Fixed18_14 {
    fn from(value: f64) -> Self {
        Self((value * Self::ONE.0 as f64) as i32)
    }
}

impl From<Fixed18_14> for f64 {
    fn from(value: Fixed18_14) -> Self {
        value.0 as f64 / Fixed18_14::ONE.0 as f64
    }
}

impl fmt::Display for Fixed18_14 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", f64::from(*self))
    }
}

impl Fixed50_14 {
    pub const FRAC_BITS: u32 = 14;
    pub const ZERO: Self = Self(0);

    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> i64 {
        self.0
    }

    pub const fn from_int(value: i64) -> Self {
        Self(value.wrapping_shl(Self::FRAC_BITS))
    }

    pub const fn to_int_floor(self) -> i64 {
        self.0 >> Self::FRAC_BITS
    }
}

impl Mul for Fixed50_14 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(((self.0 as i128 * rhs.0 as i128) >> Self::FRAC_BITS) as i64)
    }
}

impl Mul<Fixed18_14> for Fixed50_14 {
    type Output = Self;

    fn mul(self, rhs: Fixed18_14) -> Self {
        self * rhs.widen()
    }
}

impl Add for Fixed50_14 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }
}

impl AddAssign for Fixed50_14 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Fixed32_32 {
    pub const FRAC_BITS: u32 = 32;

    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> i64 {
        self.0
    }

    /// Convert from a float, truncating toward zero. The scaling happens in `f32`.
    pub fn from_f32(value: f32) -> Self {
        Self((value * (1u64 << Self::FRAC_BITS) as f32) as i64)
    }

    pub const fn to_int_floor(self) -> i64 {
        self.0 >> Self::FRAC_BITS
    }

    /// Multiply by an integer on the raw value.
    pub const fn mul_int(self, value: i64) -> Self {
        Self(self.0.wrapping_mul(value))
    }
}

impl From<Fixed18_14> for Fixed32_32 {
    fn from(value: Fixed18_14) -> Self {
        Self((value.to_raw() as i64) << (Self::FRAC_BITS - Fixed18_14::FRAC_BITS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_scale_is_exact() {
        let scale = Fixed18_14::from_f32(0.97998046875);
        assert_eq!(scale.to_raw(), 16056);
        assert_eq!(Fixed18_14::ONE * scale, scale);
    }

    #[test]
    fn test_multiply_floors_negative_products() {
        let minus_epsilon = Fixed18_14::from_raw(-1);
        let half = Fixed18_14::from_f32(0.5);
        assert_eq!((minus_epsilon * half).to_raw(), -1);

        let sample = Fixed50_14::from_raw(-3);
        assert_eq!((sample * half).to_raw(), -2);
    }

    #[test]
    fn test_to_int_floor_rounds_down() {
        assert_eq!(Fixed50_14::from_raw(-1).to_int_floor(), -1);
        assert_eq!(Fixed50_14::from_int(-5).to_int_floor(), -5);
        assert_eq!(Fixed18_14::from_f32(2.75).to_int_floor(), 2);
    }

    #[test]
    fn test_shift_halves_raw_value() {
        let spread = Fixed18_14::from_f32(0.5) >> 1;
        assert_eq!(spread, Fixed18_14::from_f32(0.25));
    }

    #[test]
    fn test_sizing_constant_matches_f32_literal() {
        assert_eq!(Fixed32_32::from_f32(0.064).to_raw(), 274_877_920);
    }

    #[test]
    fn test_widening_to_32_32_keeps_value() {
        let value = Fixed32_32::from(Fixed18_14::from_int(4800));
        assert_eq!(value.to_int_floor(), 4800);
    }

    #[test]
    fn test_serde_round_trip_is_lossless() {
        let value = Fixed18_14::from_raw(12345);
        let json = serde_json::to_string(&value).unwrap();
        let back: Fixed18_14 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
