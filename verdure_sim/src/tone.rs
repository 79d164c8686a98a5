//! A synthetic stand-in for the microphone, ADC, and DMA chain.

use oorandom::Rand32;
use std::time::{Duration, Instant};
use verdure::transport::{SampleSource, TransportFault};

/// Tones that land in the low, mid, and high pacing bands in turn
pub const BAND_SWEEP: [f32; 3] = [60.0, 200.0, 1200.0];

/// Generates blocks of noisy unsigned 8 bit sine samples, stepping through a
/// list of tones.
///
/// After a [SampleSource::rearm] the block is "filling" until one block's
/// worth of wall-clock time (scaled by the time scale) has passed.  With a
/// time scale of zero every poll after a rearm returns a block.
pub struct ToneSource {
    sample_rate: u32,
    tones: Vec<f32>,
    blocks_per_tone: u32,
    amplitude: f32,
    noise: u8,
    fault_every: Option<u32>,
    time_scale: f32,
    rng: Rand32,
    block: Vec<u8>,
    phase: f32,
    blocks: u32,
    armed_at: Instant,
    ready: bool,
}

impl ToneSource {
    /// `block_len` samples per block at `sample_rate`, cycling through
    /// `tones`, `blocks_per_tone` blocks each
    pub fn new(sample_rate: u32, block_len: usize, tones: &[f32], blocks_per_tone: u32, seed: u64) -> Self {
        Self {
            sample_rate,
            tones: if tones.is_empty() {
                vec![0.0]
            } else {
                tones.to_vec()
            },
            blocks_per_tone: blocks_per_tone.max(1),
            amplitude: 100.0,
            noise: 8,
            fault_every: None,
            time_scale: 0.0,
            rng: Rand32::new(seed),
            block: vec![128; block_len],
            phase: 0.0,
            blocks: 0,
            armed_at: Instant::now(),
            ready: false,
        }
    }
    /// Pace block delivery at `scale` times real time (0 disables pacing)
    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.time_scale = scale.max(0.0);
        self
    }
    /// Peak amplitude of the noise, in sample units
    pub fn with_noise(mut self, noise: u8) -> Self {
        self.noise = noise;
        self
    }
    /// Report an overrun instead of every `n`th block
    pub fn with_fault_every(mut self, n: u32) -> Self {
        self.fault_every = if n == 0 { None } else { Some(n) };
        self
    }
    /// Number of blocks delivered or faulted so far
    pub fn blocks(&self) -> u32 {
        self.blocks
    }
    /// The tone being generated for the next block
    pub fn current_tone(&self) -> f32 {
        let index = (self.blocks / self.blocks_per_tone) as usize % self.tones.len();
        self.tones[index]
    }
    fn block_period(&self) -> Duration {
        let secs = self.block.len() as f32 / self.sample_rate.max(1) as f32;
        Duration::from_secs_f32(secs * self.time_scale)
    }
    fn fill(&mut self) {
        let step = core::f32::consts::TAU * self.current_tone() / self.sample_rate.max(1) as f32;
        let noise = self.noise as u32;
        for smp in self.block.iter_mut() {
            let jitter = if noise == 0 {
                0.0
            } else {
                self.rng.rand_range(0..2 * noise + 1) as f32 - noise as f32
            };
            let value = 128.0 + self.amplitude * self.phase.sin() + jitter;
            *smp = value.round().clamp(0.0, 255.0) as u8;
            self.phase = (self.phase + step) % core::f32::consts::TAU;
        }
    }
}

impl SampleSource for ToneSource {
    fn poll_block(&mut self) -> Result<Option<&[u8]>, TransportFault> {
        if !self.ready {
            if self.armed_at.elapsed() < self.block_period() {
                return Ok(None);
            }
            self.fill();
            self.ready = true;
            self.blocks += 1;
        }
        if self.fault_every.is_some_and(|n| self.blocks % n == 0) {
            return Err(TransportFault::Overrun);
        }
        Ok(Some(&self.block))
    }
    fn rearm(&mut self) {
        self.ready = false;
        self.armed_at = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdure::config::SpectralConfig;
    use verdure::spectrum::SpectralAnalyzer;
    use verdure::NUM_SAMPLES;

    fn dominant(source: &mut ToneSource) -> f32 {
        let config = SpectralConfig::new();
        let mut analyzer = Box::new(SpectralAnalyzer::<NUM_SAMPLES>::new());
        let block = source.poll_block().unwrap().unwrap();
        let samples: &[u8; NUM_SAMPLES] = block.try_into().unwrap();
        analyzer.load_samples(samples);
        source.rearm();
        analyzer.transform();
        analyzer
            .peak(config.first_peak_bin, config.sample_rate)
            .frequency_hz
    }

    #[test]
    fn detects_the_generated_tone() {
        let mut source = ToneSource::new(10_000, NUM_SAMPLES, &[400.0], 1, 3);
        let hz = dominant(&mut source);
        // one bin is 10000 / 1024 Hz wide
        assert!((hz - 400.0).abs() < 10.0, "{}", hz);
    }
    #[test]
    fn sweeps_the_bands() {
        let mut source = ToneSource::new(10_000, NUM_SAMPLES, &BAND_SWEEP, 2, 5).with_noise(0);
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(dominant(&mut source));
        }
        for (hz, tone) in seen.iter().zip([60.0, 60.0, 200.0, 200.0, 1200.0, 1200.0]) {
            assert!((hz - tone).abs() < 10.0, "{} vs {}", hz, tone);
        }
        assert_eq!(source.blocks(), 6);
    }
    #[test]
    fn faults_every_nth_block() {
        let mut source = ToneSource::new(10_000, 64, &[400.0], 1, 1).with_fault_every(3);
        let mut faults = 0;
        for _ in 0..9 {
            if source.poll_block().is_err() {
                faults += 1;
            }
            source.rearm();
        }
        assert_eq!(faults, 3);
    }
    #[test]
    fn paced_source_is_filling_at_first() {
        let mut source = ToneSource::new(10, 64, &[1.0], 1, 1).with_time_scale(1.0);
        source.rearm();
        assert_eq!(source.poll_block(), Ok(None));
        assert_eq!(source.blocks(), 0);
    }
}
