//! Stochastic iterated function system ("Barnsley fern") leaves.
//!
//! Four affine maps are applied by the chaos game: each step draws a random
//! number, picks the first map whose threshold is above it, and applies it to
//! the previous point.  Every generated point is then pushed through the left
//! and right leaf maps once more to give two leaf-shaped point clouds, which
//! are stamped onto the canvas in shrinking layers to build up a tree.
//!
//! All of the point arithmetic is in [Fix15] and truncating, so a tree is
//! reproduced exactly from the same sequence of random draws.

use crate::canvas::{Canvas, Color, Delay};
use crate::config::FernConfig;
use crate::entropy::{Entropy, RAND_MAX};
use crate::{Fix15, Fix15Ops, Float};
use serde::{Deserialize, Serialize};

/// A problem with the fern configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FernError {
    /// The map thresholds are not strictly increasing within
    /// `[0, RAND_MAX]`
    InvalidPartition,
}

impl core::fmt::Display for FernError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidPartition => f.write_str("map thresholds must strictly increase"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FernError {}

/// The four maps, in selection order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FernMap {
    /// Collapses onto the stem
    Stem,
    /// Maps the whole leaf onto the next (smaller) leaflet up the stem
    Successive,
    /// Maps the whole leaf onto the lowest left leaflet
    LeftLeaf,
    /// Maps the whole leaf onto the lowest right leaflet
    RightLeaf,
}

/// Upper bounds (exclusive) of the random draws that select the first three
/// maps.  Draws at or above the last threshold select the right leaf map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Draws below this select [FernMap::Stem]
    pub stem: u32,
    /// Draws below this select [FernMap::Successive]
    pub successive: u32,
    /// Draws below this select [FernMap::LeftLeaf]
    pub left: u32,
}

impl Thresholds {
    /// Constructor
    pub const fn new(stem: u32, successive: u32, left: u32) -> Self {
        Self {
            stem,
            successive,
            left,
        }
    }
    /// Check that the thresholds partition `[0, RAND_MAX]` into four
    /// non-empty pieces
    pub const fn validate(&self) -> Result<(), FernError> {
        if 0 < self.stem
            && self.stem < self.successive
            && self.successive < self.left
            && self.left <= RAND_MAX
        {
            Ok(())
        } else {
            Err(FernError::InvalidPartition)
        }
    }
    /// Pick the map for a random draw
    pub const fn select(&self, draw: u32) -> FernMap {
        if draw < self.stem {
            FernMap::Stem
        } else if draw < self.successive {
            FernMap::Successive
        } else if draw < self.left {
            FernMap::LeftLeaf
        } else {
            FernMap::RightLeaf
        }
    }
}

/// The coefficients of an affine map, as written in configuration
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffineCoefficients {
    /// x' = a·x + b·y + e
    pub a: f32,
    /// x' = a·x + b·y + e
    pub b: f32,
    /// y' = c·x + d·y + f
    pub c: f32,
    /// y' = c·x + d·y + f
    pub d: f32,
    /// x' = a·x + b·y + e
    pub e: f32,
    /// y' = c·x + d·y + f
    pub f: f32,
    /// Subtract the `b·y` term instead of adding it: x' = a·x - b·y + e
    #[serde(default)]
    pub subtract_b: bool,
}

impl AffineCoefficients {
    /// Constructor
    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self {
            a,
            b,
            c,
            d,
            e,
            f,
            subtract_b: false,
        }
    }
    /// The same map, with the `b·y` product subtracted rather than added
    pub const fn subtracting_b(mut self) -> Self {
        self.subtract_b = true;
        self
    }
}

/// A point in model space
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    /// Horizontal coordinate
    pub x: Fix15,
    /// Vertical coordinate (up is positive)
    pub y: Fix15,
}

impl Point {
    /// The origin
    pub const ZERO: Point = Point {
        x: Fix15::ZERO,
        y: Fix15::ZERO,
    };
    /// Constructor
    pub const fn new(x: Fix15, y: Fix15) -> Self {
        Self { x, y }
    }
    /// Multiply both coordinates by `k`
    pub fn scale(self, k: Fix15) -> Self {
        Self::new(k.mulfix(self.x), k.mulfix(self.y))
    }
}

/// `x' = a·x ± b·y + e; y' = c·x + d·y + f`, with each product truncated
/// separately.
///
/// Truncation rounds toward negative infinity, so `a·x - b·y` is not always
/// equal to `a·x + (-b)·y`; the map keeps the sign the coefficients were
/// written with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AffineMap {
    /// Coefficient of x in x'
    pub a: Fix15,
    /// Coefficient of y in x'
    pub b: Fix15,
    /// Coefficient of x in y'
    pub c: Fix15,
    /// Coefficient of y in y'
    pub d: Fix15,
    /// Offset of x'
    pub e: Fix15,
    /// Offset of y'
    pub f: Fix15,
    /// `b·y` is subtracted from x' instead of added
    pub subtract_b: bool,
}

impl AffineMap {
    /// Convert from configuration, truncating each coefficient
    pub fn from_coefficients(k: &AffineCoefficients) -> Self {
        Self {
            a: Fix15::from_float(k.a),
            b: Fix15::from_float(k.b),
            c: Fix15::from_float(k.c),
            d: Fix15::from_float(k.d),
            e: Fix15::from_float(k.e),
            f: Fix15::from_float(k.f),
            subtract_b: k.subtract_b,
        }
    }
    /// Apply the map
    pub fn apply(&self, p: Point) -> Point {
        let ax = self.a.mulfix(p.x);
        let by = self.b.mulfix(p.y);
        let x = if self.subtract_b { ax - by } else { ax + by };
        Point {
            x: x + self.e,
            y: self.c.mulfix(p.x) + self.d.mulfix(p.y) + self.f,
        }
    }
}

/// The random choices made for one tree, after its points are generated
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreePlan {
    /// Horizontal position of the tree
    pub x: i32,
    /// Integer scale from model space to pixels
    pub scale: i32,
    /// Horizontal shift added after each layer
    pub drift: i32,
}

/// Placement of one layer of leaves
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layer {
    /// Zero for the bottom (largest) layer
    pub index: u8,
    /// Leaf scale for this layer
    pub scale: Fix15,
    /// Horizontal shift relative to the tree position
    pub x_offset: i32,
    /// Vertical position of the leaf origin
    pub y_offset: i32,
}

impl Layer {
    /// Pixel position of a leaf point on this layer of the tree at `tree_x`
    pub fn pixel(&self, p: Point, tree_x: i32) -> (i32, i32) {
        let p = p.scale(self.scale);
        (
            p.x.to_int() + self.x_offset + tree_x,
            self.y_offset - p.y.to_int(),
        )
    }
}

/// Produces the layers of a tree, bottom up.  Each layer is shifted
/// horizontally by the drift, and the leaf scale and the vertical spacing
/// both shrink by the configured factor (the spacing is rounded to whole
/// pixels).
#[derive(Clone, Debug)]
pub struct LayerPlan {
    next: u8,
    count: u8,
    factor: f32,
    scale: f32,
    x_offset: i32,
    drift: i32,
    y_offset: i32,
    y_step: i32,
}

impl LayerPlan {
    /// Plan the layers for `tree`
    pub fn new(config: &FernConfig, tree: &TreePlan) -> Self {
        Self {
            next: 0,
            count: config.max_layers,
            factor: config.layer_scale,
            scale: 1.0,
            x_offset: 0,
            drift: tree.drift,
            y_offset: config.base_y,
            y_step: tree.scale * 2,
        }
    }
}

impl Iterator for LayerPlan {
    type Item = Layer;
    fn next(&mut self) -> Option<Layer> {
        if self.next >= self.count {
            return None;
        }
        let layer = Layer {
            index: self.next,
            scale: Fix15::from_float(self.scale),
            x_offset: self.x_offset,
            y_offset: self.y_offset,
        };
        self.next += 1;
        self.x_offset += self.drift;
        self.y_offset -= self.y_step;
        self.y_step = (self.y_step as f32 * self.factor).fround() as i32;
        self.scale *= self.factor;
        Some(layer)
    }
}

/// Generates leaf point clouds of `N` points each
pub struct FernGenerator<const N: usize> {
    maps: [AffineMap; 4],
    thresholds: Thresholds,
    left: [Point; N],
    right: [Point; N],
}

impl<const N: usize> FernGenerator<N> {
    /// Constructor.  Fails if the thresholds do not partition the draws.
    pub fn new(config: &FernConfig) -> Result<Self, FernError> {
        config.thresholds.validate()?;
        Ok(Self {
            maps: config.maps.map(|k| AffineMap::from_coefficients(&k)),
            thresholds: config.thresholds,
            left: [Point::ZERO; N],
            right: [Point::ZERO; N],
        })
    }
    /// The current maps
    pub fn map(&self, which: FernMap) -> &AffineMap {
        &self.maps[which as usize]
    }
    /// The left leaf points of the last generated tree, already scaled to
    /// pixels
    pub fn left(&self) -> &[Point; N] {
        &self.left
    }
    /// The right leaf points of the last generated tree
    pub fn right(&self) -> &[Point; N] {
        &self.right
    }
    /// Re-randomize the successive map's `a`, `b`, `c`, and `f` coefficients
    pub fn randomize_successive(&mut self, config: &FernConfig, entropy: &mut impl Entropy) {
        let map = &mut self.maps[FernMap::Successive as usize];
        map.a = Fix15::from_float(config.successive_a.pick_percent(entropy));
        map.b = Fix15::from_float(config.successive_b.pick_percent(entropy));
        map.c = Fix15::from_float(config.successive_c.pick_percent(entropy));
        map.f = Fix15::from_float(config.successive_f.pick_percent(entropy));
    }
    /// Run the chaos game from the origin, filling both leaf buffers with
    /// points multiplied by `scale`
    pub fn generate(&mut self, scale: Fix15, entropy: &mut impl Entropy) {
        let left_leaf = self.maps[FernMap::LeftLeaf as usize];
        let right_leaf = self.maps[FernMap::RightLeaf as usize];
        let mut p = Point::ZERO;
        for (left, right) in self.left.iter_mut().zip(self.right.iter_mut()) {
            let map = self.thresholds.select(entropy.next_draw());
            p = self.maps[map as usize].apply(p);
            *left = left_leaf.apply(p).scale(scale);
            *right = right_leaf.apply(p).scale(scale);
        }
    }
    /// Make all of the random choices for the tree at `x` and generate its
    /// points
    pub fn plant_tree(&mut self, config: &FernConfig, x: i32, entropy: &mut impl Entropy) -> TreePlan {
        self.randomize_successive(config, entropy);
        let scale = config.scale.pick(entropy);
        self.generate(Fix15::from_int(scale), entropy);
        let drift = config.drift.pick(entropy);
        TreePlan { x, scale, drift }
    }
    /// Stamp both leaves of the current tree onto the canvas, pausing for
    /// `pixel_us` after each pair of pixels
    pub fn draw_layer<C: Canvas + ?Sized, D: Delay + ?Sized>(
        &self,
        canvas: &C,
        delay: &mut D,
        layer: &Layer,
        tree_x: i32,
        color: Color,
        pixel_us: u32,
    ) {
        for (left, right) in self.left.iter().zip(self.right.iter()) {
            let (x, y) = layer.pixel(*left, tree_x);
            canvas.draw_pixel(x, y, color);
            let (x, y) = layer.pixel(*right, tree_x);
            canvas.draw_pixel(x, y, color);
            if pixel_us > 0 {
                delay.delay_us(pixel_us);
            }
        }
    }
}
