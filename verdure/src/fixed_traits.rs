use super::fixedmath::Fix15;
use crate::Float;

/// Truncating arithmetic helpers for [Fix15].
///
/// The `fixed` crate provides rounding and overflow-checked operations; these
/// helpers instead reproduce plain integer semantics on the raw bits (widen,
/// operate, arithmetic shift, narrow) so that results are identical on every
/// target.  None of them saturate or detect overflow: callers keep values in
/// range (angles in degrees, coordinates within the canvas).
pub trait Fix15Ops: Copy {
    /// Multiply by widening to 64 bits and shifting the product right by 15
    fn mulfix(self, rhs: Self) -> Self;
    /// Divide by widening the numerator by 15 bits before the integer division.
    ///
    /// # Panics
    ///
    /// Panics if `rhs` is zero, like integer division
    fn divfix(self, rhs: Self) -> Self;
    /// Square root, computed in floating point
    fn sqrtfix(self) -> Self;
    /// Convert from a float, truncating toward zero
    fn from_float(value: f32) -> Self;
    /// Convert to a float
    fn to_float(self) -> f32;
    /// Convert from an integer by shifting left by 15
    fn from_int(value: i32) -> Self;
    /// Convert to an integer by arithmetic shift right by 15 (rounds toward
    /// negative infinity)
    fn to_int(self) -> i32;
}

const FRAC_BITS: u32 = 15;
const SCALE: f32 = (1u32 << FRAC_BITS) as f32;

impl Fix15Ops for Fix15 {
    fn mulfix(self, rhs: Self) -> Self {
        let wide = (self.to_bits() as i64) * (rhs.to_bits() as i64);
        Self::from_bits((wide >> FRAC_BITS) as i32)
    }
    fn divfix(self, rhs: Self) -> Self {
        let num = (self.to_bits() as i64) << FRAC_BITS;
        Self::from_bits((num / rhs.to_bits() as i64) as i32)
    }
    fn sqrtfix(self) -> Self {
        Self::from_float(self.to_float().fsqrt())
    }
    fn from_float(value: f32) -> Self {
        Self::from_bits((value * SCALE) as i32)
    }
    fn to_float(self) -> f32 {
        (self.to_bits() as f32) / SCALE
    }
    fn from_int(value: i32) -> Self {
        Self::from_bits(value.wrapping_shl(FRAC_BITS))
    }
    fn to_int(self) -> i32 {
        self.to_bits() >> FRAC_BITS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiply_truncates_toward_negative_infinity() {
        let a = Fix15::from_bits(3);
        let half = Fix15::from_float(0.5);
        assert_eq!(a.mulfix(half).to_bits(), 1);
        assert_eq!((-a).mulfix(half).to_bits(), -2);
        let x = Fix15::from_int(7);
        let y = Fix15::from_float(-1.5);
        assert_eq!(x.mulfix(y), Fix15::from_float(-10.5));
    }
    #[test]
    fn float_conversion_truncates_toward_zero() {
        // 0.82 * 32768 = 26869.76
        assert_eq!(Fix15::from_float(0.82).to_bits(), 26869);
        assert_eq!(Fix15::from_float(-0.82).to_bits(), -26869);
        assert_eq!(Fix15::from_float(1.6).to_float(), 52428.0 / 32768.0);
    }
    #[test]
    fn integer_round_trip() {
        for i in [-300, -1, 0, 1, 5, 639, 65535] {
            assert_eq!(Fix15::from_int(i).to_int(), i);
        }
        // the shift floors, it does not truncate toward zero
        assert_eq!(Fix15::from_float(-0.25).to_int(), -1);
        assert_eq!(Fix15::from_float(2.75).to_int(), 2);
    }
    #[test]
    fn division() {
        let a = Fix15::from_int(3);
        let b = Fix15::from_int(4);
        assert_eq!(a.divfix(b), Fix15::from_float(0.75));
        assert_eq!((-a).divfix(b), Fix15::from_float(-0.75));
        // 1/3 truncates
        let third = Fix15::from_int(1).divfix(Fix15::from_int(3));
        assert_eq!(third.to_bits(), 10922);
    }
    #[test]
    fn square_root() {
        let four = Fix15::from_int(16).sqrtfix().to_float();
        assert!((four - 4.0).abs() < 1e-3);
        let two = Fix15::from_int(2).sqrtfix().to_float();
        assert!((two - core::f32::consts::SQRT_2).abs() < 1e-4);
        assert_eq!(Fix15::ZERO.sqrtfix(), Fix15::ZERO);
    }
}
