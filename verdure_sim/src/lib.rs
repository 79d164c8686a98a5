//! A host-side simulator for the verdure renderers.
//!
//! The two microcontroller cores become two threads, the VGA frame buffer
//! becomes a shared array of atomic pixels, and the microphone becomes a
//! synthetic tone generator that sweeps through the pacing bands.

pub mod cli;
pub mod delay;
pub mod framebuffer;
pub mod harness;
pub mod tone;

pub use cli::Args;
pub use harness::{simulate, Mode, SimError, SimOptions, SimReport};
