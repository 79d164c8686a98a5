//! Floating point fast approximations used when `libm` is unavailable
//!
//! Benchmark me!

#[cfg(any(test, doc, not(feature = "libm")))]
mod detail {
    use crate::Float;

    /// Approximate sin(x).  The argument is first reduced into
    /// `[-pi/2, pi/2]`, then evaluated with a 9th order taylor series about
    /// x == 0, which is good to a few parts per million over that interval.
    pub fn sin_approx(x: f32) -> f32 {
        // reduce to [-pi, pi]
        let turns = (x / f32::TAU).fround();
        let mut x = x - turns * f32::TAU;
        // fold into [-pi/2, pi/2] using sin(pi - x) == sin(x)
        if x > f32::FRAC_PI_2 {
            x = f32::PI - x;
        } else if x < -f32::FRAC_PI_2 {
            x = -f32::PI - x;
        }
        //small angle approximation.  Faster and removes 0 as an edge case
        if x.fabs() < (1.0 / 4096.0) {
            return x;
        }
        let x2 = x * x;
        // sin(x) = x - x^3/3! + x^5/5! - x^7/7! + x^9/9! (+ higher order terms)
        //        = x { 1 - x^2/6 [ 1 - x^2/20 ( 1 - x^2/42 [ 1 - x^2/72 ] ) ] }
        let d_nested = 1.0 - x2 / 72.0;
        let c_nested = 1.0 - (x2 / 42.0) * d_nested;
        let b_nested = 1.0 - (x2 / 20.0) * c_nested;
        let a_nested = 1.0 - (x2 / 6.0) * b_nested;
        x * a_nested
    }

    /// Approximate cos(x) as sin(x + pi/2)
    pub fn cos_approx(x: f32) -> f32 {
        sin_approx(x + f32::FRAC_PI_2)
    }

    /// Approximate sqrt(x) for positive x.  An initial guess is formed by
    /// halving the exponent directly in the bit representation, then refined
    /// with three Newton-Raphson iterations.
    pub fn sqrt_approx(x: f32) -> f32 {
        if x <= 0.0 {
            return 0.0;
        }
        let mut guess = f32::from_bits((x.to_bits() >> 1) + 0x1fbd_1df5);
        for _ in 0..3 {
            guess = 0.5 * (guess + x / guess);
        }
        guess
    }
}

#[cfg(any(test, doc, not(feature = "libm")))]
pub use detail::*;
