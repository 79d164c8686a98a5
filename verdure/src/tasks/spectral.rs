use super::Shared;
use crate::canvas::{Canvas, Color};
use crate::config::SpectralConfig;
use crate::sched::{Step, Task};
use crate::spectrum::{Peak, SpectralAnalyzer};
use crate::transport::{SampleSource, TransportFault};
use crate::NUM_SAMPLES;
use arrayvec::ArrayString;
use core::fmt::Write;

/// Turns sample blocks into a published dominant frequency.
///
/// Each resume polls the transport once.  A full block is copied into the
/// analyzer, the transport is re-armed, and only then is the block
/// transformed, so capture of the next block overlaps the analysis.  Faulty
/// blocks, and blocks that are not exactly `N` samples long, are logged and
/// dropped.
pub struct SpectralTask<'a, S: SampleSource, C: Canvas + ?Sized, const N: usize = NUM_SAMPLES> {
    analyzer: SpectralAnalyzer<N>,
    source: S,
    shared: Shared<'a, C>,
    config: SpectralConfig,
    last: Option<Peak>,
    analyzed: u32,
    skipped: u32,
}

impl<'a, S: SampleSource, C: Canvas + ?Sized, const N: usize> SpectralTask<'a, S, C, N> {
    /// Constructor
    pub fn new(source: S, shared: Shared<'a, C>, config: &SpectralConfig) -> Self {
        Self {
            analyzer: SpectralAnalyzer::new(),
            source,
            shared,
            config: *config,
            last: None,
            analyzed: 0,
            skipped: 0,
        }
    }
    /// The peak of the most recently analyzed block
    pub fn last_peak(&self) -> Option<Peak> {
        self.last
    }
    /// Number of blocks analyzed
    pub fn analyzed(&self) -> u32 {
        self.analyzed
    }
    /// Number of blocks dropped because of a transport fault
    pub fn skipped(&self) -> u32 {
        self.skipped
    }
    /// The transport
    pub fn source(&self) -> &S {
        &self.source
    }
    fn draw_overlay(&self, hz: f32) {
        let overlay = &self.config.overlay;
        if !overlay.enabled {
            return;
        }
        let mut text = ArrayString::<16>::new();
        // 16 characters always hold an i32
        let _ = write!(text, "{}", hz as i32);
        let canvas = self.shared.canvas;
        canvas.fill_rect(overlay.x, overlay.y, overlay.width, overlay.height, Color::Black);
        canvas.draw_text(overlay.x, overlay.y, &text, overlay.text_size, overlay.color);
    }
}

impl<S: SampleSource, C: Canvas + ?Sized, const N: usize> Task for SpectralTask<'_, S, C, N> {
    fn name(&self) -> &'static str {
        "spectral"
    }
    fn resume(&mut self) -> Step {
        let fault = match self.source.poll_block() {
            Ok(None) => return Step::Yielded,
            Ok(Some(block)) => match <&[u8; N]>::try_from(block) {
                Ok(samples) => {
                    self.analyzer.load_samples(samples);
                    None
                }
                Err(_) if block.len() > N => Some(TransportFault::Overrun),
                Err(_) => Some(TransportFault::Underrun),
            },
            Err(fault) => Some(fault),
        };
        self.source.rearm();
        if let Some(fault) = fault {
            self.skipped += 1;
            log::warn!("Dropping sample block: {}", fault);
            return Step::Yielded;
        }
        self.analyzer.transform();
        let peak = self
            .analyzer
            .peak(self.config.first_peak_bin, self.config.sample_rate);
        self.shared.frequency.publish(peak.frequency_hz);
        self.analyzed += 1;
        self.last = Some(peak);
        self.draw_overlay(peak.frequency_hz);
        Step::Yielded
    }
}
