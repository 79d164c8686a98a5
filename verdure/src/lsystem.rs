//! Grammar rewriting (Lindenmayer systems) and turtle interpretation.
//!
//! A [RuleSet] maps single-byte symbols onto successor strings.  Expanding a
//! generation replaces every symbol that has a rule with its successor and
//! copies every other symbol through unchanged.  The resulting string is then
//! walked by a [Turtle]:
//!
//! | Symbol | Effect                                          |
//! |--------|-------------------------------------------------|
//! | `F`    | draw a segment of the current step length       |
//! | `+`    | turn by the right angle                         |
//! | `-`    | turn by the left angle                          |
//! | `[`    | save the turtle state                           |
//! | `]`    | restore the most recently saved turtle state    |
//! | other  | nothing (placeholders such as `X` live here)    |

use arrayvec::ArrayVec;

mod presets;
mod turtle;

pub use presets::{Plant, Preset};
pub use turtle::{interpret, Geometry, Segment, Turtle, TurtleState};

/// A single grammar symbol.  Only 7 bit ASCII symbols can have rules.
pub type Symbol = u8;

/// Number of distinct symbols that can have rules
const TABLE_SIZE: usize = 128;

/// An error building or walking a grammar string
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LsysError {
    /// A rule was given a predecessor outside of 7 bit ASCII
    NonAsciiSymbol(Symbol),
    /// A rule was given an empty successor
    EmptySuccessor(Symbol),
    /// The next generation would not fit in the string buffer
    GenerationOverflow {
        /// Length the next generation would have had
        needed: usize,
        /// Capacity of the buffer
        capacity: usize,
    },
    /// A `[` was found with the turtle stack already full
    BranchOverflow,
    /// A `]` was found with nothing on the turtle stack
    BranchUnderflow,
    /// The string ended with this many `[` still open
    UnclosedBranch(usize),
}

impl core::fmt::Display for LsysError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NonAsciiSymbol(s) => write!(f, "rule predecessor {:#04x} is not ASCII", s),
            Self::EmptySuccessor(s) => write!(f, "rule for '{}' has an empty successor", *s as char),
            Self::GenerationOverflow { needed, capacity } => write!(
                f,
                "generation needs {} symbols but only {} fit",
                needed, capacity
            ),
            Self::BranchOverflow => f.write_str("branches nested too deeply"),
            Self::BranchUnderflow => f.write_str("']' without a matching '['"),
            Self::UnclosedBranch(depth) => write!(f, "{} branches left open", depth),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LsysError {}

/// A production: every occurrence of `predecessor` is replaced by `successor`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rule<'a> {
    /// The symbol to replace
    pub predecessor: Symbol,
    /// What to replace it with
    pub successor: &'a [Symbol],
}

impl<'a> Rule<'a> {
    /// Constructor
    pub const fn new(predecessor: Symbol, successor: &'a [Symbol]) -> Self {
        Self {
            predecessor,
            successor,
        }
    }
}

/// A set of productions, indexed by predecessor.  At most one rule is kept
/// per symbol; if several are installed for the same symbol, the first one
/// installed wins.
#[derive(Clone)]
pub struct RuleSet<'a> {
    table: [Option<&'a [Symbol]>; TABLE_SIZE],
}

impl<'a> RuleSet<'a> {
    /// A rule set where every symbol maps to itself
    pub const fn new() -> Self {
        Self {
            table: [None; TABLE_SIZE],
        }
    }
    /// Build a rule set from a list of rules
    pub fn from_rules(rules: &[Rule<'a>]) -> Result<Self, LsysError> {
        let mut ret = Self::new();
        for rule in rules {
            ret.install(*rule)?;
        }
        Ok(ret)
    }
    /// Add a rule.  Rules with an empty successor or a non-ASCII predecessor
    /// are rejected.  A rule for a symbol that already has one is ignored.
    pub fn install(&mut self, rule: Rule<'a>) -> Result<(), LsysError> {
        if rule.successor.is_empty() {
            return Err(LsysError::EmptySuccessor(rule.predecessor));
        }
        let slot = self
            .table
            .get_mut(rule.predecessor as usize)
            .ok_or(LsysError::NonAsciiSymbol(rule.predecessor))?;
        if slot.is_some() {
            log::debug!(
                "Ignoring duplicate rule for '{}'",
                rule.predecessor as char
            );
        } else {
            *slot = Some(rule.successor);
        }
        Ok(())
    }
    /// The successor for `symbol`, if it has a rule
    pub fn successor(&self, symbol: Symbol) -> Option<&'a [Symbol]> {
        self.table.get(symbol as usize).copied().flatten()
    }
    /// The number of symbols `symbol` expands to in one generation
    pub fn expanded_len(&self, symbol: Symbol) -> usize {
        self.successor(symbol).map_or(1, |s| s.len())
    }
}

impl Default for RuleSet<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand `current` by one generation into `next`.
///
/// The length of the result is computed before anything is written, so on
/// overflow `next` is left untouched and nothing is truncated.
pub fn expand_into<const CAP: usize>(
    current: &[Symbol],
    rules: &RuleSet,
    next: &mut ArrayVec<Symbol, CAP>,
) -> Result<(), LsysError> {
    let needed: usize = current.iter().map(|s| rules.expanded_len(*s)).sum();
    let overflow = LsysError::GenerationOverflow {
        needed,
        capacity: CAP,
    };
    if needed > CAP {
        return Err(overflow);
    }
    next.clear();
    for symbol in current {
        let written = match rules.successor(*symbol) {
            Some(successor) => next.try_extend_from_slice(successor).is_ok(),
            None => next.try_push(*symbol).is_ok(),
        };
        if !written {
            return Err(overflow);
        }
    }
    Ok(())
}

/// Holds the generation strings for one grammar.  Two buffers are kept so
/// each generation can be expanded from the previous one without copying.
pub struct Expander<const CAP: usize> {
    buffers: [ArrayVec<Symbol, CAP>; 2],
    active: usize,
}

impl<const CAP: usize> Expander<CAP> {
    /// Constructor.  The current generation starts out empty.
    pub const fn new() -> Self {
        Self {
            buffers: [ArrayVec::new_const(), ArrayVec::new_const()],
            active: 0,
        }
    }
    /// The most recently generated string
    pub fn current(&self) -> &[Symbol] {
        &self.buffers[self.active]
    }
    /// Replace the current generation with `axiom` and expand it
    /// `iterations` times.  On error the current generation is left empty.
    pub fn generate(
        &mut self,
        axiom: &[Symbol],
        rules: &RuleSet,
        iterations: u8,
    ) -> Result<&[Symbol], LsysError> {
        let start = &mut self.buffers[self.active];
        start.clear();
        start
            .try_extend_from_slice(axiom)
            .map_err(|_| LsysError::GenerationOverflow {
                needed: axiom.len(),
                capacity: CAP,
            })?;
        for _ in 0..iterations {
            if let Err(e) = self.step(rules) {
                self.buffers[self.active].clear();
                return Err(e);
            }
        }
        Ok(self.current())
    }
    /// Expand the current generation once more
    pub fn step(&mut self, rules: &RuleSet) -> Result<(), LsysError> {
        let (first, second) = self.buffers.split_at_mut(1);
        let (current, next) = if self.active == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        };
        expand_into(current, rules, next)?;
        self.active ^= 1;
        Ok(())
    }
}

impl<const CAP: usize> Default for Expander<CAP> {
    fn default() -> Self {
        Self::new()
    }
}
