use super::{LsysError, Symbol};
use crate::{Float, TURTLE_STACK_DEPTH};
use arrayvec::ArrayVec;

/// Position and heading of the turtle.  Headings are in degrees, clockwise
/// on screen (y grows downward), kept in `[0, 360)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurtleState {
    /// Horizontal position, in pixels
    pub x: i32,
    /// Vertical position, in pixels
    pub y: i32,
    /// Heading, in degrees
    pub heading: f32,
}

/// Where a drawing starts and how the turtle moves
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
    /// Starting position
    pub origin_x: i32,
    /// Starting position
    pub origin_y: i32,
    /// Starting heading, in degrees.  -90 points straight up.
    pub heading: f32,
    /// Length of each `F` segment, in pixels
    pub step: i32,
    /// Turn applied by `-`, in degrees
    pub left_deg: f32,
    /// Turn applied by `+`, in degrees
    pub right_deg: f32,
}

/// A line drawn by an `F`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Start point
    pub x0: i32,
    /// Start point
    pub y0: i32,
    /// End point
    pub x1: i32,
    /// End point
    pub y1: i32,
}

/// A turtle with room to save `DEPTH` states
pub struct Turtle<const DEPTH: usize> {
    geometry: Geometry,
    state: TurtleState,
    stack: ArrayVec<TurtleState, DEPTH>,
}

impl<const DEPTH: usize> Turtle<DEPTH> {
    /// Create a turtle at the origin of `geometry`
    pub fn new(geometry: Geometry) -> Self {
        let mut ret = Self {
            geometry,
            state: TurtleState {
                x: 0,
                y: 0,
                heading: 0.0,
            },
            stack: ArrayVec::new(),
        };
        ret.reset(geometry);
        ret
    }
    /// Move back to the origin of (possibly new) `geometry` and forget any
    /// saved states
    pub fn reset(&mut self, geometry: Geometry) {
        self.geometry = geometry;
        self.state = TurtleState {
            x: geometry.origin_x,
            y: geometry.origin_y,
            heading: geometry.heading.wrap_degrees(),
        };
        self.stack.clear();
    }
    /// The current state
    pub fn state(&self) -> TurtleState {
        self.state
    }
    /// The number of saved states
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
    /// Interpret one symbol, returning the segment to draw if it was an `F`
    pub fn apply(&mut self, symbol: Symbol) -> Result<Option<Segment>, LsysError> {
        match symbol {
            b'F' => return Ok(Some(self.forward())),
            b'+' => self.turn(self.geometry.right_deg),
            b'-' => self.turn(self.geometry.left_deg),
            b'[' => self
                .stack
                .try_push(self.state)
                .map_err(|_| LsysError::BranchOverflow)?,
            b']' => self.state = self.stack.pop().ok_or(LsysError::BranchUnderflow)?,
            _ => {}
        }
        Ok(None)
    }
    /// Check that every branch was closed
    pub fn finish(&self) -> Result<(), LsysError> {
        match self.depth() {
            0 => Ok(()),
            depth => Err(LsysError::UnclosedBranch(depth)),
        }
    }
    fn forward(&mut self) -> Segment {
        let theta = self.state.heading.deg_to_rad();
        let step = self.geometry.step as f32;
        // nearest pixel, so a segment's length does not depend on its heading
        let x1 = self.state.x + (step * theta.fcos()).fround() as i32;
        let y1 = self.state.y + (step * theta.fsin()).fround() as i32;
        let segment = Segment {
            x0: self.state.x,
            y0: self.state.y,
            x1,
            y1,
        };
        self.state.x = x1;
        self.state.y = y1;
        segment
    }
    fn turn(&mut self, degrees: f32) {
        self.state.heading = (self.state.heading + degrees).wrap_degrees();
    }
}

/// Walk a whole string, calling `draw` for each segment.  Returns the number
/// of segments drawn.
///
/// Segments are emitted as they are reached, so on error everything before
/// the offending symbol has already been drawn.
pub fn interpret(
    symbols: &[Symbol],
    geometry: Geometry,
    mut draw: impl FnMut(Segment),
) -> Result<usize, LsysError> {
    let mut turtle = Turtle::<TURTLE_STACK_DEPTH>::new(geometry);
    let mut drawn = 0;
    for symbol in symbols {
        if let Some(segment) = turtle.apply(*symbol)? {
            draw(segment);
            drawn += 1;
        }
    }
    turtle.finish()?;
    Ok(drawn)
}
