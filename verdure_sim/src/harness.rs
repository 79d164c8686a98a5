//! Runs the renderers on two host threads, one per simulated core.
//!
//! Context 0 runs the L-system renderer alone.  Context 1 runs the fern
//! renderer with the spectral task in the background.  In fern-only mode
//! context 1 is the only context and the fern renderer clears the canvas
//! itself.

use crate::delay::ScaledDelay;
use crate::framebuffer::FrameBuffer;
use crate::tone::{ToneSource, BAND_SWEEP};
use oorandom::Rand32;
use std::thread;
use verdure::config::{ConfigError, VisualizerConfig};
use verdure::fern::FernError;
use verdure::sched::Scheduler;
use verdure::sync::{EpochFlags, EpochRole, PublishedFrequency};
use verdure::tasks::{FernTask, LsysTask, Shared, SpectralTask};
use verdure::{NUM_SAMPLES, POINTS_PER_TREE};

/// Which program to run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// L-system and fern renderers side by side
    Combined,
    /// Just the fern renderer
    FernOnly,
}

impl Mode {
    /// Provides the name of the mode
    pub const fn to_str(&self) -> &'static str {
        match self {
            Self::Combined => "combined",
            Self::FernOnly => "fern-only",
        }
    }
    /// The default configuration for this mode
    pub const fn config(&self) -> VisualizerConfig {
        match self {
            Self::Combined => VisualizerConfig::new(),
            Self::FernOnly => VisualizerConfig::fern_only(),
        }
    }
}

/// How to run the simulation
#[derive(Clone, Copy, Debug)]
pub struct SimOptions {
    /// Which program to run
    pub mode: Mode,
    /// Number of epochs to draw before stopping
    pub epochs: u32,
    /// Multiplier applied to every pause (0 runs flat out)
    pub time_scale: f32,
    /// Blocks of audio generated per tone of the band sweep
    pub blocks_per_tone: u32,
    /// Report an overrun instead of every `n`th block (0 for never)
    pub fault_every: u32,
    /// Play this one tone instead of sweeping the pacing bands
    pub tone_hz: Option<f32>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Combined,
            epochs: 3,
            time_scale: 0.0,
            blocks_per_tone: 8,
            fault_every: 0,
            tone_hz: None,
        }
    }
}

/// A problem starting the simulation
#[derive(Debug)]
pub enum SimError {
    /// The configuration did not validate
    Config(ConfigError),
    /// The fern maps could not be built
    Fern(FernError),
    /// A simulated context panicked
    ContextPanicked(&'static str),
}

impl core::fmt::Display for SimError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {}", e),
            Self::Fern(e) => write!(f, "fern setup failed: {}", e),
            Self::ContextPanicked(name) => write!(f, "context {} panicked", name),
        }
    }
}

impl std::error::Error for SimError {}

impl From<ConfigError> for SimError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<FernError> for SimError {
    fn from(value: FernError) -> Self {
        Self::Fern(value)
    }
}

/// What a finished simulation produced
#[derive(Clone, Debug)]
pub struct SimReport {
    /// Epochs completed by the L-system renderer
    pub lsys_epochs: u32,
    /// Epochs completed by the fern renderer
    pub fern_epochs: u32,
    /// Sample blocks analyzed
    pub blocks_analyzed: u32,
    /// Sample blocks dropped because of transport faults
    pub blocks_skipped: u32,
    /// The last published dominant frequency
    pub frequency_hz: f32,
    /// Number of canvas clears
    pub clears: u32,
    /// Thumbnail of the canvas as it was left
    pub thumbnail: String,
}

/// Keep resuming until every foreground task has finished, giving the
/// other thread a chance to run between rounds
fn drive<const N: usize>(sched: &mut Scheduler<'_, N>) {
    while sched.run_rounds(1) > 0 {
        thread::yield_now();
    }
}

/// Run one program to completion on a fresh frame buffer
pub fn simulate(config: &VisualizerConfig, options: &SimOptions) -> Result<SimReport, SimError> {
    config.validate()?;
    let canvas = FrameBuffer::new(config.canvas.width, config.canvas.height);
    let frequency = PublishedFrequency::new();
    let flags = EpochFlags::new();
    let shared = Shared::new(&canvas, &frequency, &flags);
    let mut seeds = Rand32::new(config.seed);

    let tones = match options.tone_hz {
        Some(hz) => vec![hz],
        None => BAND_SWEEP.to_vec(),
    };
    let source = ToneSource::new(
        config.spectral.sample_rate,
        NUM_SAMPLES,
        &tones,
        options.blocks_per_tone,
        seeds.rand_u32() as u64,
    )
    .with_time_scale(options.time_scale)
    .with_fault_every(options.fault_every);
    let mut spectral = Box::new(SpectralTask::<_, _, NUM_SAMPLES>::new(
        source,
        shared,
        &config.spectral,
    ));

    let fern_role = match options.mode {
        Mode::Combined => EpochRole::Follower,
        Mode::FernOnly => EpochRole::Solo,
    };
    let mut fern = Box::new(
        FernTask::<_, _, _, POINTS_PER_TREE>::new(
            shared,
            config,
            ScaledDelay::new(options.time_scale),
            Rand32::new(seeds.rand_u32() as u64),
            fern_role,
        )?
        .with_epoch_limit(options.epochs),
    );
    let mut lsys = match options.mode {
        Mode::Combined => Some(Box::new(
            LsysTask::new(
                shared,
                config,
                ScaledDelay::new(options.time_scale),
                Rand32::new(seeds.rand_u32() as u64),
                EpochRole::Leader,
            )
            .with_epoch_limit(options.epochs),
        )),
        Mode::FernOnly => None,
    };

    log::info!(
        "Running {} program for {} epochs (seed {:#x})",
        options.mode.to_str(),
        options.epochs,
        config.seed
    );
    thread::scope(|s| -> Result<(), SimError> {
        let context0 = lsys.as_mut().map(|task| {
            s.spawn(move || {
                let mut sched = Scheduler::<'_, 1>::new();
                if sched.add(task.as_mut()).is_ok() {
                    drive(&mut sched);
                }
            })
        });
        let (fern, spectral) = (&mut fern, &mut spectral);
        let context1 = s.spawn(move || {
            let mut sched = Scheduler::<'_, 2>::new();
            if sched.add(fern.as_mut()).is_ok() && sched.add_background(spectral.as_mut()).is_ok() {
                drive(&mut sched);
            }
        });
        if let Some(handle) = context0 {
            handle
                .join()
                .map_err(|_| SimError::ContextPanicked("0"))?;
        }
        context1
            .join()
            .map_err(|_| SimError::ContextPanicked("1"))
    })?;

    let report = SimReport {
        lsys_epochs: lsys.as_ref().map_or(0, |task| task.epochs()),
        fern_epochs: fern.epochs(),
        blocks_analyzed: spectral.analyzed(),
        blocks_skipped: spectral.skipped(),
        frequency_hz: frequency.read(),
        clears: canvas.clears(),
        thumbnail: canvas.ascii_thumbnail(64, 24),
    };
    log::info!(
        "Finished: {} L-system and {} fern epochs, {} blocks analyzed ({} dropped), last peak {}Hz",
        report.lsys_epochs,
        report.fern_epochs,
        report.blocks_analyzed,
        report.blocks_skipped,
        report.frequency_hz
    );
    Ok(report)
}
