//! This crate contains the numeric and algorithmic core of an audio-reactive
//! plant renderer: a fixed-point spectral analyzer that extracts the dominant
//! frequency of an incoming audio block, a grammar-rewriting (L-system) tree
//! renderer, a stochastic iterated-function-system (Barnsley fern) renderer,
//! and the cooperative scheduling glue that lets the two renderers share a
//! frame buffer across two execution contexts.
//!
//! The crate is `no_std` and does not allocate.  All hot-path arithmetic uses
//! the 32 bit [Fix15] type (15 fractional bits), and every fixed-point helper
//! truncates, so a seeded run is bit-for-bit reproducible.  Floating point is
//! only used for turtle headings, table generation, and pacing; it goes
//! through the [Float] trait so that targets without `libm` fall back to the
//! internal approximations.
//!
//! The pieces, leaf first:
//!
//! * [fixedmath] and [Fix15Ops]: the fixed-point substrate
//! * [spectrum]: windowed in-place radix-2 transform and peak picking
//! * [lsystem]: rule tables, string expansion, and turtle interpretation
//! * [fern]: affine maps, chaos-game point generation, and layered leaves
//! * [sync], [sched], and [tasks]: the completion-flag rendezvous, the
//!   round-robin cooperative scheduler, and the three long-running tasks
//!
//! The pixel driver and the sampling transport are external collaborators and
//! appear here only as the [canvas::Canvas], [canvas::Delay], and
//! [transport::SampleSource] traits.

#![no_std]
#![warn(missing_docs)]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod fixedmath;
mod float_approx;

mod fixed_traits;
pub use fixed_traits::Fix15Ops;

mod float_traits;
pub use float_traits::Float;

pub mod canvas;
pub mod config;
pub mod entropy;
pub mod fern;
pub mod lsystem;
pub mod sched;
pub mod spectrum;
pub mod sync;
pub mod tasks;
pub mod transport;

/// True if using libm for floating-point math, false if using internal
/// approximation functions
pub const USE_LIBM: bool = cfg!(feature = "libm");

pub use fixedmath::Fix15;

/// Number of samples per spectral block.  Must be a power of two.
pub const NUM_SAMPLES: usize = 1024;

/// Number of chaos-game points generated for each fern tree
pub const POINTS_PER_TREE: usize = 1000;

/// Capacity, in symbols, of an L-system generation string.  This is sized
/// for the largest built-in preset with some headroom.
pub const GENERATION_CAPACITY: usize = 8192;

/// Maximum nesting depth of `[` branches the turtle can save
pub const TURTLE_STACK_DEPTH: usize = 32;
