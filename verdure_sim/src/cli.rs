//! Command-line argument parsing.

use clap::Parser;

use crate::harness::{Mode, SimOptions};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "verdure-sim")]
#[command(about = "Runs the verdure renderers on two simulated cores", long_about = None)]
pub struct Args {
    /// Draw only the fern, three trees at a time
    #[arg(long)]
    pub fern_only: bool,

    /// Seed for the renderers (drawn from system entropy if omitted)
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Play a single tone instead of sweeping the pacing bands
    #[arg(long, value_name = "HZ")]
    pub tone: Option<f32>,

    /// Number of epochs to draw before stopping
    #[arg(long, value_name = "N", default_value = "3")]
    pub epochs: u32,

    /// Multiplier applied to every pause (0 runs flat out)
    #[arg(long, value_name = "X", default_value = "1")]
    pub time_scale: f32,

    /// Report an overrun instead of every Nth sample block (0 for never)
    #[arg(long, value_name = "N", default_value = "0")]
    pub fault_every: u32,
}

impl Args {
    /// Which program the arguments select
    pub fn mode(&self) -> Mode {
        if self.fern_only {
            Mode::FernOnly
        } else {
            Mode::Combined
        }
    }
    /// Simulation options built from the arguments
    pub fn sim_options(&self) -> SimOptions {
        SimOptions {
            mode: self.mode(),
            epochs: self.epochs,
            time_scale: self.time_scale,
            fault_every: self.fault_every,
            tone_hz: self.tone,
            ..SimOptions::default()
        }
    }
}
