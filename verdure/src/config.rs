//! Compiled-in tunables for the analyzer, both renderers, and the pacing
//! tables that connect them.
//!
//! Every struct here has a `const fn new()` with the stock values and a
//! `Default` impl that forwards to it.  [VisualizerConfig::validate] checks
//! the whole tree up front so the long-running tasks never have to.

use crate::canvas::Color;
use crate::entropy::IntRange;
use crate::fern::{AffineCoefficients, FernError, Thresholds};
use crate::lsystem::Preset;
use serde::{Deserialize, Serialize};

/// A configuration value that cannot be used
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The canvas has no pixels
    EmptyCanvas,
    /// The sample rate is zero
    ZeroSampleRate,
    /// The first bin considered for the peak must be at least 1 (DC is never
    /// a useful peak)
    PeakBin,
    /// The pacing band edges are not increasing
    BandOrder,
    /// The named range cannot produce any value
    EmptyRange(&'static str),
    /// The L-system turn angles are not within `[0, 360]` degrees
    TurnAngle,
    /// The L-system rotation has no presets in it
    NoPresets,
    /// The fern renderer would not draw any trees or layers
    NoTrees,
    /// The per-layer scale factor is not in `(0, 1]`
    LayerScale,
    /// The fern map thresholds are unusable
    Fern(FernError),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyCanvas => f.write_str("canvas has zero width or height"),
            Self::ZeroSampleRate => f.write_str("sample rate must be nonzero"),
            Self::PeakBin => f.write_str("first peak bin must be at least 1"),
            Self::BandOrder => f.write_str("pacing band edges must increase"),
            Self::EmptyRange(name) => write!(f, "range '{}' is empty", name),
            Self::TurnAngle => f.write_str("turn angles must be between 0 and 360 degrees"),
            Self::NoPresets => f.write_str("no L-system presets enabled"),
            Self::NoTrees => f.write_str("fern tree count and layer count must be nonzero"),
            Self::LayerScale => f.write_str("fern layer scale must be in (0, 1]"),
            Self::Fern(e) => write!(f, "fern: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

impl From<FernError> for ConfigError {
    fn from(value: FernError) -> Self {
        Self::Fern(value)
    }
}

/// Dimensions of the output
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Width, in pixels
    pub width: i32,
    /// Height, in pixels
    pub height: i32,
}

impl CanvasConfig {
    /// 640x480 VGA
    pub const fn new() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Where and how the dominant frequency is printed
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Turn the overlay on or off
    pub enabled: bool,
    /// Left edge of the text box
    pub x: i32,
    /// Top edge of the text box
    pub y: i32,
    /// Width of the box cleared before each update
    pub width: i32,
    /// Height of the box cleared before each update
    pub height: i32,
    /// Text scale factor
    pub text_size: u8,
    /// Text color
    pub color: Color,
}

impl OverlayConfig {
    /// A white readout near the top center of the screen
    pub const fn new() -> Self {
        Self {
            enabled: true,
            x: 250,
            y: 20,
            width: 176,
            height: 30,
            text_size: 2,
            color: Color::White,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Spectral analysis parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralConfig {
    /// The rate at which the transport delivers samples, in Hz
    pub sample_rate: u32,
    /// Bins below this index are never reported as the peak
    pub first_peak_bin: usize,
    /// Frequency readout
    pub overlay: OverlayConfig,
}

impl SpectralConfig {
    /// 10kHz sampling, ignoring the five lowest bins
    pub const fn new() -> Self {
        Self {
            sample_rate: 10_000,
            first_peak_bin: 5,
            overlay: OverlayConfig::new(),
        }
    }
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One of the three frequency bands that select the drawing speed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PacingBand {
    /// Bass: draw slowly
    Low,
    /// Mid range
    Mid,
    /// Treble: draw quickly
    High,
}

impl PacingBand {
    /// Provides the name of the band
    pub const fn to_str(&self) -> &'static str {
        ["Low", "Mid", "High"][*self as usize]
    }
}

/// Maps the published dominant frequency onto renderer delays
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Upper edge (inclusive) of the low band, in Hz
    pub low_max_hz: f32,
    /// Upper edge (inclusive) of the mid band, in Hz
    pub mid_max_hz: f32,
    /// L-system per-segment delay for each band, in ms
    pub segment_ms: [u32; 3],
    /// Fern per-layer delay for each band, in ms
    pub layer_ms: [u32; 3],
    /// Fern per-pixel delay, in us
    pub pixel_us: u32,
    /// Pause between finishing an epoch and clearing the canvas, in ms
    pub clear_pause_ms: u32,
}

impl PacingConfig {
    /// Stock pacing: bands split at 100Hz and 300Hz
    pub const fn new() -> Self {
        Self {
            low_max_hz: 100.0,
            mid_max_hz: 300.0,
            segment_ms: [6, 5, 4],
            layer_ms: [200, 100, 20],
            pixel_us: 10,
            clear_pause_ms: 2000,
        }
    }
    /// Classify a frequency
    pub fn band(&self, hz: f32) -> PacingBand {
        if hz <= self.low_max_hz {
            PacingBand::Low
        } else if hz <= self.mid_max_hz {
            PacingBand::Mid
        } else {
            PacingBand::High
        }
    }
    /// The L-system delay after each drawn segment
    pub fn segment_delay_ms(&self, hz: f32) -> u32 {
        self.segment_ms[self.band(hz) as usize]
    }
    /// The fern delay after each drawn layer
    pub fn layer_delay_ms(&self, hz: f32) -> u32 {
        self.layer_ms[self.band(hz) as usize]
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// L-system renderer parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LsysConfig {
    /// Where every plant is rooted
    pub origin_x: i32,
    /// Where every plant is rooted
    pub origin_y: i32,
    /// Magnitude of each turn, in degrees.  The left and right angles are
    /// picked independently.
    pub turn_deg: IntRange,
    /// The presets picked from between epochs.  `None` entries are skipped.
    pub rotation: [Option<Preset>; 4],
}

impl LsysConfig {
    /// Rooted at the bottom center, turns of 25 to 35 degrees, rotating
    /// between the bush, twig, and weed presets
    pub const fn new() -> Self {
        Self {
            origin_x: 320,
            origin_y: 480,
            turn_deg: IntRange::new(25, 11),
            rotation: [
                Some(Preset::Bush),
                Some(Preset::Twig),
                Some(Preset::Weed),
                None,
            ],
        }
    }
    /// Iterate over the enabled presets
    pub fn presets(&self) -> impl Iterator<Item = Preset> + '_ {
        self.rotation.iter().flatten().copied()
    }
}

impl Default for LsysConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Fern renderer parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FernConfig {
    /// Trees drawn per epoch
    pub tree_count: u8,
    /// Horizontal position of the first tree
    pub first_tree_x: i32,
    /// Horizontal distance between trees
    pub tree_stride: i32,
    /// Vertical position of the bottom layer
    pub base_y: i32,
    /// Number of leaf layers per tree
    pub max_layers: u8,
    /// Factor applied to the leaf scale and the layer spacing after each
    /// layer
    pub layer_scale: f32,
    /// Integer scale from model space to pixels, picked per tree
    pub scale: IntRange,
    /// Horizontal drift between layers, picked per tree
    pub drift: IntRange,
    /// Map selection thresholds
    pub thresholds: Thresholds,
    /// The stem, successive, left leaf, and right leaf maps.  The second one
    /// is partially re-randomized for each tree.
    pub maps: [AffineCoefficients; 4],
    /// Range of the successive map's `a` coefficient, in hundredths
    pub successive_a: IntRange,
    /// Range of the successive map's `b` coefficient, in hundredths
    pub successive_b: IntRange,
    /// Range of the successive map's `c` coefficient, in hundredths
    pub successive_c: IntRange,
    /// Range of the successive map's `f` coefficient, in hundredths
    pub successive_f: IntRange,
    /// Leaf color
    pub color: Color,
    /// Fixed pause after each layer, in place of the frequency-driven
    /// [PacingConfig::layer_delay_ms]
    pub fixed_layer_ms: Option<u32>,
}

impl FernConfig {
    /// Two trees per epoch, sharing the screen with the L-system
    pub const fn new() -> Self {
        Self {
            tree_count: 2,
            first_tree_x: 160,
            tree_stride: 320,
            base_y: 460,
            max_layers: 20,
            layer_scale: 0.8,
            scale: IntRange::new(20, 20),
            drift: IntRange::new(-10, 20),
            thresholds: Thresholds::new(21_474_835, 1_846_835_936, 1_997_159_792),
            maps: [
                AffineCoefficients::new(0.0, 0.0, 0.0, 0.16, 0.0, 0.0),
                AffineCoefficients::new(0.82, 0.08, -0.08, 0.85, 0.0, 1.6),
                AffineCoefficients::new(0.2, 0.26, 0.23, 0.22, 0.0, 1.6).subtracting_b(),
                AffineCoefficients::new(-0.15, 0.28, 0.26, 0.24, 0.0, 0.44),
            ],
            successive_a: IntRange::new(60, 30),
            successive_b: IntRange::new(-15, 30),
            successive_c: IntRange::new(-15, 30),
            successive_f: IntRange::new(100, 100),
            color: Color::Green,
            fixed_layer_ms: None,
        }
    }
    /// Three closer-spaced trees at a steady 80ms per layer, for when the
    /// fern renderer has the screen to itself
    pub const fn fern_only() -> Self {
        let mut config = Self::new();
        config.tree_count = 3;
        config.tree_stride = 160;
        config.fixed_layer_ms = Some(80);
        config
    }
    /// Horizontal position of tree number `index` within an epoch
    pub const fn tree_x(&self, index: u8) -> i32 {
        self.first_tree_x + self.tree_stride * index as i32
    }
}

impl Default for FernConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything needed to run the visualizer
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Seed for all of the random choices
    pub seed: u64,
    /// Output dimensions
    pub canvas: CanvasConfig,
    /// Frequency extraction
    pub spectral: SpectralConfig,
    /// Frequency to speed mapping
    pub pacing: PacingConfig,
    /// Grammar renderer
    pub lsys: LsysConfig,
    /// Fractal renderer
    pub fern: FernConfig,
}

impl VisualizerConfig {
    /// Default seed, if not provided a seed
    pub const DEFAULT_SEED: u64 = 0x2f6b_9c1e_d04a_7735;
    /// The combined configuration: L-system and fern renderers side by side
    pub const fn new() -> Self {
        Self {
            seed: Self::DEFAULT_SEED,
            canvas: CanvasConfig::new(),
            spectral: SpectralConfig::new(),
            pacing: PacingConfig::new(),
            lsys: LsysConfig::new(),
            fern: FernConfig::new(),
        }
    }
    /// The fern-only configuration
    pub const fn fern_only() -> Self {
        let mut config = Self::new();
        config.fern = FernConfig::fern_only();
        config
    }
    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.width <= 0 || self.canvas.height <= 0 {
            return Err(ConfigError::EmptyCanvas);
        }
        if self.spectral.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.spectral.first_peak_bin == 0 {
            return Err(ConfigError::PeakBin);
        }
        if !(self.pacing.low_max_hz < self.pacing.mid_max_hz) {
            return Err(ConfigError::BandOrder);
        }
        let ranges = [
            ("turn_deg", self.lsys.turn_deg),
            ("scale", self.fern.scale),
            ("drift", self.fern.drift),
            ("successive_a", self.fern.successive_a),
            ("successive_b", self.fern.successive_b),
            ("successive_c", self.fern.successive_c),
            ("successive_f", self.fern.successive_f),
        ];
        for (name, range) in ranges {
            if range.is_empty() {
                return Err(ConfigError::EmptyRange(name));
            }
        }
        let turn = self.lsys.turn_deg;
        if turn.min < 0 || turn.min > 360 || turn.span > 361 || turn.max() > 360 {
            return Err(ConfigError::TurnAngle);
        }
        if self.lsys.presets().next().is_none() {
            return Err(ConfigError::NoPresets);
        }
        if self.fern.tree_count == 0 || self.fern.max_layers == 0 {
            return Err(ConfigError::NoTrees);
        }
        if !(self.fern.layer_scale > 0.0 && self.fern.layer_scale <= 1.0) {
            return Err(ConfigError::LayerScale);
        }
        self.fern.thresholds.validate()?;
        Ok(())
    }
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self::new()
    }
}
