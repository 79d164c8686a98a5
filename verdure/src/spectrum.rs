//! Fixed-point spectral analysis: a Hann-windowed, in-place radix-2
//! decimation-in-time transform, followed by an alpha-max-plus-beta-min
//! magnitude estimate and a peak search over the lower half of the spectrum.
//!
//! The butterflies divide by two at every stage, so the transform of an `N`
//! point block comes out scaled by `1/N` and can never overflow [Fix15].

use crate::fixedmath::{hann_window, sine_table, Fix15, ZERO_POINT_4};
use crate::Fix15Ops;

/// Reverse the low `bits` bits of `value`.  `bits` must be between 1 and the
/// width of `usize`.
pub const fn bit_reverse(value: usize, bits: u32) -> usize {
    value.reverse_bits() >> (usize::BITS - bits)
}

/// Reorder two equal-length, power-of-two sized arrays into bit-reversed
/// index order.  Applying this twice restores the original order.
///
/// # Panics
///
/// Panics if the lengths differ or are not a power of two
pub fn bit_reverse_permute(re: &mut [Fix15], im: &mut [Fix15]) {
    let n = re.len();
    assert_eq!(n, im.len());
    assert!(n.is_power_of_two());
    if n < 4 {
        // nothing moves in one or two points
        return;
    }
    let bits = n.trailing_zeros();
    // the first and last indices are palindromes
    for m in 1..(n - 1) {
        let mr = bit_reverse(m, bits);
        // don't swap back what has already been swapped
        if mr > m {
            re.swap(m, mr);
            im.swap(m, mr);
        }
    }
}

/// Alpha-max-plus-beta-min magnitude estimate: `max + 0.4 * min` of the
/// absolute values of the two components
pub fn magnitude_approx(re: Fix15, im: Fix15) -> Fix15 {
    let re = re.abs();
    let im = im.abs();
    re.max(im) + re.min(im).mulfix(ZERO_POINT_4)
}

/// Convert a bin index into the frequency of its center, in Hz
pub fn bin_to_hz<const N: usize>(bin: usize, sample_rate: u32) -> f32 {
    bin as f32 * (sample_rate as f32 / N as f32)
}

/// Read-only lookup tables for an `N` point analysis
pub struct SpectralTables<const N: usize> {
    sine: [Fix15; N],
    window: [Fix15; N],
}

impl<const N: usize> SpectralTables<N> {
    /// Generate the sine and window tables
    pub fn new() -> Self {
        Self {
            sine: sine_table(),
            window: hann_window(),
        }
    }
    /// One period of a sine wave
    pub fn sine(&self) -> &[Fix15; N] {
        &self.sine
    }
    /// The Hann window
    pub fn window(&self) -> &[Fix15; N] {
        &self.window
    }
}

impl<const N: usize> Default for SpectralTables<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// The dominant component of a block
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// Index of the strongest bin, or 0 if no eligible bin had any energy
    pub bin: usize,
    /// Estimated magnitude of that bin
    pub magnitude: Fix15,
    /// Center frequency of that bin, in Hz
    pub frequency_hz: f32,
}

/// An `N` point spectral analyzer.  `N` must be a power of two, at least 4.
///
/// The analyzer owns its working buffers, which [SpectralAnalyzer::transform]
/// overwrites in place; nothing carries over from one block to the next.
pub struct SpectralAnalyzer<const N: usize> {
    tables: SpectralTables<N>,
    re: [Fix15; N],
    im: [Fix15; N],
}

impl<const N: usize> SpectralAnalyzer<N> {
    const VALID_SIZE: () = assert!(N.is_power_of_two() && N >= 4);

    /// Constructor.  Generates the lookup tables.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_SIZE;
        Self {
            tables: SpectralTables::new(),
            re: [Fix15::ZERO; N],
            im: [Fix15::ZERO; N],
        }
    }
    /// The lookup tables in use
    pub fn tables(&self) -> &SpectralTables<N> {
        &self.tables
    }
    /// Copy a block of samples into the working buffers, applying the window
    /// and zeroing the imaginary parts
    pub fn load_samples(&mut self, samples: &[u8; N]) {
        let window = self.tables.window.iter();
        let working = self.re.iter_mut().zip(self.im.iter_mut());
        for (((re, im), smp), win) in working.zip(samples.iter()).zip(window) {
            *re = Fix15::from_int(*smp as i32).mulfix(*win);
            *im = Fix15::ZERO;
        }
    }
    /// Transform the working buffers in place (bit reversal followed by the
    /// Danielson-Lanczos butterflies).  The result is scaled by `1/N`.
    pub fn transform(&mut self) {
        bit_reverse_permute(&mut self.re, &mut self.im);
        let sine = &self.tables.sine;
        let re = &mut self.re;
        let im = &mut self.im;
        // length of the transforms being combined
        let mut half = 1;
        while half < N {
            let step = half << 1;
            let stride = N / step;
            for m in 0..half {
                let k = m * stride;
                let wr = sine[k + N / 4] >> 1u32;
                let wi = -sine[k] >> 1u32;
                let mut i = m;
                while i < N {
                    let j = i + half;
                    let tr = wr.mulfix(re[j]) - wi.mulfix(im[j]);
                    let ti = wr.mulfix(im[j]) + wi.mulfix(re[j]);
                    let qr = re[i] >> 1u32;
                    let qi = im[i] >> 1u32;
                    re[j] = qr - tr;
                    im[j] = qi - ti;
                    re[i] = qr + tr;
                    im[i] = qi + ti;
                    i += step;
                }
            }
            half = step;
        }
    }
    /// The real parts of the working buffer
    pub fn real(&self) -> &[Fix15; N] {
        &self.re
    }
    /// The imaginary parts of the working buffer
    pub fn imag(&self) -> &[Fix15; N] {
        &self.im
    }
    /// Estimated magnitudes of the first `N/2` bins of the last transform
    pub fn magnitudes(&self) -> impl Iterator<Item = Fix15> + '_ {
        self.re[..N / 2]
            .iter()
            .zip(self.im[..N / 2].iter())
            .map(|(re, im)| magnitude_approx(*re, *im))
    }
    /// Find the strongest bin among `first_bin..N/2`.  Ties go to the lower
    /// bin.  If no bin is above zero, bin 0 is reported.
    pub fn peak(&self, first_bin: usize, sample_rate: u32) -> Peak {
        let mut bin = 0;
        let mut magnitude = Fix15::ZERO;
        for (i, mag) in self.magnitudes().enumerate().skip(first_bin) {
            if mag > magnitude {
                magnitude = mag;
                bin = i;
            }
        }
        Peak {
            bin,
            magnitude,
            frequency_hz: bin_to_hz::<N>(bin, sample_rate),
        }
    }
    /// Window, transform, and search a block in one go
    pub fn analyze(&mut self, samples: &[u8; N], first_bin: usize, sample_rate: u32) -> Peak {
        self.load_samples(samples);
        self.transform();
        self.peak(first_bin, sample_rate)
    }
}

impl<const N: usize> Default for SpectralAnalyzer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NUM_SAMPLES;
    use std::boxed::Box;

    fn tone<const N: usize>(bin: usize, amplitude: f64) -> [u8; N] {
        let mut block = [0u8; N];
        for (i, smp) in block.iter_mut().enumerate() {
            let phase = core::f64::consts::TAU * (bin * i) as f64 / N as f64;
            *smp = (128.0 + amplitude * phase.sin()).round() as u8;
        }
        block
    }

    #[test]
    fn bit_reverse_is_an_involution() {
        for bits in 3..=10u32 {
            let n = 1usize << bits;
            for m in 0..n {
                assert_eq!(bit_reverse(bit_reverse(m, bits), bits), m);
            }
            let mut re: std::vec::Vec<Fix15> = (0..n).map(|i| Fix15::from_bits(i as i32)).collect();
            let mut im: std::vec::Vec<Fix15> = (0..n).map(|i| Fix15::from_bits(-(i as i32))).collect();
            bit_reverse_permute(&mut re, &mut im);
            assert_eq!(re[1].to_bits() as usize, n / 2);
            bit_reverse_permute(&mut re, &mut im);
            for i in 0..n {
                assert_eq!(re[i].to_bits(), i as i32);
                assert_eq!(im[i].to_bits(), -(i as i32));
            }
        }
    }
    #[test]
    fn bit_reverse_examples() {
        assert_eq!(bit_reverse(1, 10), 512);
        assert_eq!(bit_reverse(0b0000000110, 10), 0b0110000000);
        assert_eq!(bit_reverse(3, 3), 6);
    }
    #[test]
    fn magnitude_estimate() {
        let three = Fix15::from_int(3);
        let four = Fix15::from_int(4);
        // 4 + 0.4*3, with 0.4 truncated to 13107/32768
        let expected = four + three.mulfix(ZERO_POINT_4);
        assert_eq!(magnitude_approx(three, -four), expected);
        assert_eq!(magnitude_approx(-four, three), expected);
        assert!((expected.to_float() - 5.2).abs() < 1e-3);
    }
    #[test]
    fn bin_frequencies() {
        assert_eq!(bin_to_hz::<NUM_SAMPLES>(41, 10_000), 400.390625);
        assert_eq!(bin_to_hz::<NUM_SAMPLES>(0, 10_000), 0.0);
        assert_eq!(bin_to_hz::<64>(1, 6400), 100.0);
    }
    #[test]
    fn pure_tone_peaks_at_its_bin() {
        let mut analyzer = Box::new(SpectralAnalyzer::<NUM_SAMPLES>::new());
        for bin in [7usize, 41, 100, 256, 500] {
            let block = tone::<NUM_SAMPLES>(bin, 100.0);
            let peak = analyzer.analyze(&block, 5, 10_000);
            assert!(
                peak.bin + 1 >= bin && peak.bin <= bin + 1,
                "tone at bin {} reported at {}",
                bin,
                peak.bin
            );
            // amplitude 100, halved by the window and again by the split
            // between positive and negative frequencies
            assert!((peak.magnitude.to_float() - 25.0).abs() < 2.0);
        }
    }
    #[test]
    fn constant_input_stays_in_the_lowest_bins() {
        let mut analyzer = Box::new(SpectralAnalyzer::<NUM_SAMPLES>::new());
        analyzer.load_samples(&[200u8; NUM_SAMPLES]);
        analyzer.transform();
        let mags: std::vec::Vec<f32> = analyzer.magnitudes().map(|m| m.to_float()).collect();
        assert!((mags[0] - 100.0).abs() < 0.1);
        assert!((mags[1] - 50.0).abs() < 0.1);
        assert!(mags[3..].iter().all(|m| *m < 0.05));
        let peak = analyzer.peak(5, 10_000);
        assert!(peak.magnitude.to_float() < 0.05);
    }
    #[test]
    fn silence_reports_bin_zero() {
        let mut analyzer = SpectralAnalyzer::<64>::new();
        let peak = analyzer.analyze(&[0u8; 64], 5, 10_000);
        assert_eq!(peak.bin, 0);
        assert_eq!(peak.magnitude, Fix15::ZERO);
        assert_eq!(peak.frequency_hz, 0.0);
    }
    #[test]
    fn small_transform_matches_direct_dft() {
        const N: usize = 16;
        let mut block = [0u8; N];
        for (i, smp) in block.iter_mut().enumerate() {
            *smp = ((i * 37) % 251) as u8;
        }
        let mut analyzer = SpectralAnalyzer::<N>::new();
        analyzer.load_samples(&block);
        let windowed: std::vec::Vec<f64> =
            analyzer.real().iter().map(|v| v.to_float() as f64).collect();
        analyzer.transform();
        for k in 0..N {
            let (mut sr, mut si) = (0f64, 0f64);
            for (n, x) in windowed.iter().enumerate() {
                let theta = core::f64::consts::TAU * (k * n) as f64 / N as f64;
                sr += x * theta.cos();
                si -= x * theta.sin();
            }
            let re = analyzer.real()[k].to_float() as f64;
            let im = analyzer.imag()[k].to_float() as f64;
            assert!((re - sr / N as f64).abs() < 0.01, "re[{}]", k);
            assert!((im - si / N as f64).abs() < 0.01, "im[{}]", k);
        }
    }
}
