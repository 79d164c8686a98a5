//! Sources of randomness for the stochastic parts of the renderers.
//!
//! Everything random (map selection, tree re-randomization, preset choice)
//! goes through the [Entropy] trait so that a run can be replayed from a
//! seed, or driven by a fixed script in tests.

use oorandom::Rand32;
use serde::{Deserialize, Serialize};

/// The largest value returned by [Entropy::next_draw] (2^31 - 1)
pub const RAND_MAX: u32 = 0x7fff_ffff;

/// A stream of uniformly distributed random numbers
pub trait Entropy {
    /// Draw a number uniformly distributed over `[0, RAND_MAX]`
    fn next_draw(&mut self) -> u32;
    /// Draw a number uniformly distributed over `[0, bound)`.  Returns zero if
    /// `bound` is zero.
    fn below(&mut self, bound: u32) -> u32;
}

impl Entropy for Rand32 {
    fn next_draw(&mut self) -> u32 {
        self.rand_u32() >> 1
    }
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.rand_range(0..bound)
    }
}

/// An inclusive-exclusive integer range `[min, min + span)`, sampled
/// uniformly
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    /// The smallest value that can be picked
    pub min: i32,
    /// The number of distinct values that can be picked
    pub span: u32,
}

impl IntRange {
    /// Create a new range of `span` values starting at `min`
    pub const fn new(min: i32, span: u32) -> Self {
        Self { min, span }
    }
    /// A range that can only produce `value`
    pub const fn fixed(value: i32) -> Self {
        Self::new(value, 1)
    }
    /// The largest value that can be picked
    pub const fn max(&self) -> i32 {
        self.min + self.span as i32 - 1
    }
    /// True if no value can be picked
    pub const fn is_empty(&self) -> bool {
        self.span == 0
    }
    /// Pick a value
    pub fn pick(&self, entropy: &mut impl Entropy) -> i32 {
        self.min + entropy.below(self.span) as i32
    }
    /// Pick a value and scale it by 1/100
    pub fn pick_percent(&self, entropy: &mut impl Entropy) -> f32 {
        self.pick(entropy) as f32 / 100.0
    }
}
