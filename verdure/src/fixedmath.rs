//! Fixed-Point types and lookup tables used by the analyzer and the renderers.
//!
//! As a quick aside - everything here prioritizes deterministic, repeatable
//! results over accuracy.  All conversions and products truncate rather than
//! round, matching a plain arithmetic right shift on the raw bits.

use crate::{Fix15Ops, Float};
pub use fixed::types::I17F15;

/// A signed 32 bit fixed point number with 15 fractional bits, 16 integral
/// bits, and a sign bit.  This is the working type for all of the spectral
/// and fractal arithmetic.
pub type Fix15 = I17F15;

/// 0.4, the "beta" coefficient for the alpha-max-plus-beta-min magnitude
/// estimate
pub const ZERO_POINT_4: Fix15 = Fix15::lit("0.4");

/// Fill a table with one full period of a sine wave:
/// `table[i] = sin(2*pi*i/N)`.
///
/// Reading the table `N/4` entries ahead yields the cosine.
pub fn sine_table<const N: usize>() -> [Fix15; N] {
    let mut table = [Fix15::ZERO; N];
    for (i, value) in table.iter_mut().enumerate() {
        let theta = f32::TAU * (i as f32) / (N as f32);
        *value = Fix15::from_float(theta.fsin());
    }
    table
}

/// Fill a table with a Hann window: `table[i] = 0.5 * (1 - cos(2*pi*i/N))`
pub fn hann_window<const N: usize>() -> [Fix15; N] {
    let mut table = [Fix15::ZERO; N];
    for (i, value) in table.iter_mut().enumerate() {
        let theta = f32::TAU * (i as f32) / (N as f32);
        *value = Fix15::from_float(f32::ONE_HALF * (f32::ONE - theta.fcos()));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_correctness() {
        assert_eq!(ZERO_POINT_4, Fix15::from_float(0.4));
        assert_eq!(ZERO_POINT_4.to_bits(), 13107);
    }
    #[test]
    fn sine_table_landmarks() {
        let table = sine_table::<1024>();
        assert_eq!(table[0], Fix15::ZERO);
        let quarter = table[256].to_float();
        assert!((quarter - 1.0).abs() < 1e-3);
        assert!(table[512].to_float().abs() < 1e-3);
        assert!((table[768].to_float() + 1.0).abs() < 1e-3);
    }
    #[test]
    fn hann_window_shape() {
        let window = hann_window::<64>();
        assert_eq!(window[0], Fix15::ZERO);
        assert!((window[32].to_float() - 1.0).abs() < 1e-3);
        for i in 1..32 {
            // symmetric about the center, give or take a truncated bit
            let diff = (window[i] - window[64 - i]).abs();
            assert!(diff <= Fix15::from_bits(2));
        }
    }
}
