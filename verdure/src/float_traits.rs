#[cfg(not(feature = "libm"))]
use num_traits::float::FloatCore as NumTraitsFloat;
#[cfg(feature = "libm")]
use num_traits::Float as NumTraitsFloat;

/// Floating point operations needed outside of the fixed-point hot paths
/// (table generation, turtle headings, and pacing).  Only `f32` is
/// implemented, as that is the widest type with hardware support on the
/// targets of interest.
pub trait Float: NumTraitsFloat + Default + Copy {
    /// 0
    const ZERO: Self;
    /// 1
    const ONE: Self;
    /// 2
    const TWO: Self;
    /// 1/2
    const ONE_HALF: Self;
    /// pi / 2
    const FRAC_PI_2: Self;
    /// pi
    const PI: Self;
    /// 2*pi
    const TAU: Self;
    /// A full turn, in degrees
    const FULL_TURN: Self;
    /// Returns the sine of self
    fn fsin(self) -> Self;
    /// Returns the cosine of self
    fn fcos(self) -> Self;
    /// Returns the square root of self (zero for negative inputs)
    fn fsqrt(self) -> Self;
    /// Returns the absolute value of self
    fn fabs(self) -> Self {
        NumTraitsFloat::abs(self)
    }
    /// Rounds half-way cases away from zero
    fn fround(self) -> Self {
        NumTraitsFloat::round(self)
    }
    /// Converts degrees to radians
    fn deg_to_rad(self) -> Self {
        self * (Self::PI / (Self::FULL_TURN / Self::TWO))
    }
    /// Wrap an angle in degrees into `[0, 360)`
    fn wrap_degrees(self) -> Self {
        let angle = self % Self::FULL_TURN;
        let angle = if angle < Self::ZERO {
            angle + Self::FULL_TURN
        } else {
            angle
        };
        // a tiny negative remainder can round up to a full turn
        if angle >= Self::FULL_TURN {
            Self::ZERO
        } else {
            angle
        }
    }
}

impl Float for f32 {
    const ZERO: f32 = 0.0f32;
    const ONE: f32 = 1.0f32;
    const TWO: f32 = 2.0f32;
    const ONE_HALF: f32 = 0.5f32;
    const FRAC_PI_2: f32 = core::f32::consts::FRAC_PI_2;
    const PI: f32 = core::f32::consts::PI;
    const TAU: f32 = core::f32::consts::TAU;
    const FULL_TURN: f32 = 360.0f32;
    fn fsin(self) -> Self {
        #[cfg(not(feature = "libm"))]
        let ret = crate::float_approx::sin_approx(self);
        #[cfg(feature = "libm")]
        let ret = <Self as NumTraitsFloat>::sin(self);
        ret
    }
    fn fcos(self) -> Self {
        #[cfg(not(feature = "libm"))]
        let ret = crate::float_approx::cos_approx(self);
        #[cfg(feature = "libm")]
        let ret = <Self as NumTraitsFloat>::cos(self);
        ret
    }
    fn fsqrt(self) -> Self {
        if self <= 0f32 {
            return 0f32;
        }
        #[cfg(not(feature = "libm"))]
        let ret = crate::float_approx::sqrt_approx(self);
        #[cfg(feature = "libm")]
        let ret = <Self as NumTraitsFloat>::sqrt(self);
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_wrapping() {
        assert_eq!(390f32.wrap_degrees(), 30f32);
        assert_eq!((-90f32).wrap_degrees(), 270f32);
        assert_eq!(360f32.wrap_degrees(), 0f32);
        assert_eq!(0f32.wrap_degrees(), 0f32);
        assert_eq!((-720f32).wrap_degrees(), 0f32);
        assert_eq!(1.0e9f32.wrap_degrees(), 1.0e9f32 % 360.0);
        assert_eq!((-1.0e-6f32).wrap_degrees(), 0f32);
        let huge = f32::MAX.wrap_degrees();
        assert!((0.0..360.0).contains(&huge));
    }
    #[test]
    fn radians() {
        assert!((180f32.deg_to_rad() - core::f32::consts::PI).fabs() < 1e-6);
        assert!((90f32.deg_to_rad().fsin() - 1.0).fabs() < 1e-4);
    }
}
