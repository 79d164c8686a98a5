use super::{Geometry, Rule};
use crate::canvas::Color;
use crate::config::LsysConfig;
use crate::entropy::{Entropy, IntRange};
use serde::{Deserialize, Serialize};

const BUSH_RULES: [Rule<'static>; 2] = [Rule::new(b'X', b"F[+X]F[-X]+X"), Rule::new(b'F', b"FF")];
const TWIG_RULES: [Rule<'static>; 2] = [Rule::new(b'X', b"F[+X][-X]FX"), Rule::new(b'F', b"FF")];
const WEED_RULES: [Rule<'static>; 1] = [Rule::new(b'F', b"F[+F]F[-F]F")];
const SPRAWL_RULES: [Rule<'static>; 2] = [
    Rule::new(b'X', b"F+[[X]-X]-F[-FX]+X"),
    Rule::new(b'F', b"FF"),
];

/// The built-in plant grammars
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Preset {
    /// Dense, rounded shrub
    Bush,
    /// Upright plant with paired side shoots
    Twig,
    /// Bracketed "Koch" weed
    Weed,
    /// Wide, leaning plant
    Sprawl,
}

impl Preset {
    const ELEM: [Preset; 4] = [Self::Bush, Self::Twig, Self::Weed, Self::Sprawl];
    /// Returns a slice to all of the presets
    pub const fn presets() -> &'static [Preset] {
        &Self::ELEM
    }
    /// Provides the name of the preset
    pub const fn to_str(&self) -> &'static str {
        ["Bush", "Twig", "Weed", "Sprawl"][*self as usize]
    }
    /// Try to create a Preset from a u8
    pub const fn new_from_u8(value: u8) -> Option<Self> {
        if (value as usize) < Self::ELEM.len() {
            Some(Self::ELEM[value as usize])
        } else {
            None
        }
    }
    /// The starting string
    pub const fn axiom(&self) -> &'static [u8] {
        match self {
            Self::Weed => b"F",
            _ => b"X",
        }
    }
    /// The productions
    pub const fn rules(&self) -> &'static [Rule<'static>] {
        match self {
            Self::Bush => &BUSH_RULES,
            Self::Twig => &TWIG_RULES,
            Self::Weed => &WEED_RULES,
            Self::Sprawl => &SPRAWL_RULES,
        }
    }
    /// How many times the axiom is expanded
    pub const fn iterations(&self) -> u8 {
        match self {
            Self::Weed => 4,
            Self::Sprawl => 5,
            _ => 6,
        }
    }
    /// Segment lengths to choose from, in pixels
    pub const fn step(&self) -> IntRange {
        match self {
            Self::Bush => IntRange::new(2, 2),
            Self::Twig => IntRange::new(2, 3),
            Self::Weed => IntRange::new(3, 2),
            Self::Sprawl => IntRange::new(2, 2),
        }
    }
    /// Heading of the first segment, in degrees
    pub const fn heading(&self) -> f32 {
        -90.0
    }
}

impl From<Preset> for &'static str {
    fn from(value: Preset) -> Self {
        value.to_str()
    }
}

impl TryFrom<u8> for Preset {
    type Error = &'static str;
    fn try_from(value: u8) -> Result<Self, &'static str> {
        Self::new_from_u8(value).ok_or("Conversion of u8 to Preset Overflowed")
    }
}

/// The randomized choices that make one epoch's plant different from the
/// last
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plant {
    /// The grammar
    pub preset: Preset,
    /// Segment length, in pixels
    pub step: i32,
    /// Turn applied by `-` (negative), in degrees
    pub left_deg: f32,
    /// Turn applied by `+` (positive), in degrees
    pub right_deg: f32,
    /// Line color
    pub color: Color,
}

impl Plant {
    /// The plant drawn before anything has been randomized: a green weed
    /// with 30 degree turns
    pub const fn initial() -> Self {
        Self {
            preset: Preset::Weed,
            step: 3,
            left_deg: -30.0,
            right_deg: 30.0,
            color: Color::Green,
        }
    }
    /// Pick a new plant.  The preset is chosen uniformly from the enabled
    /// rotation, the turn angles independently from the configured range,
    /// and the color from everything but black and blue (blue is too dark to
    /// read, so it becomes yellow).
    pub fn randomize(config: &LsysConfig, entropy: &mut impl Entropy) -> Self {
        let count = config.presets().count() as u32;
        let preset = config
            .presets()
            .nth(entropy.below(count) as usize)
            .unwrap_or(Preset::Weed);
        let step = preset.step().pick(entropy);
        let left_deg = -config.turn_deg.pick(entropy) as f32;
        let right_deg = config.turn_deg.pick(entropy) as f32;
        let color = match Color::colors()[1 + entropy.below(7) as usize] {
            Color::Blue => Color::Yellow,
            c => c,
        };
        Self {
            preset,
            step,
            left_deg,
            right_deg,
            color,
        }
    }
    /// Where and how this plant is drawn
    pub fn geometry(&self, config: &LsysConfig) -> Geometry {
        Geometry {
            origin_x: config.origin_x,
            origin_y: config.origin_y,
            heading: self.preset.heading(),
            step: self.step,
            left_deg: self.left_deg,
            right_deg: self.right_deg,
        }
    }
}

impl Default for Plant {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsystem::{interpret, Expander, RuleSet};
    use crate::GENERATION_CAPACITY;
    use oorandom::Rand32;
    use std::boxed::Box;

    #[test]
    fn presets_fit_and_are_balanced() {
        let mut expander = Box::new(Expander::<GENERATION_CAPACITY>::new());
        let plant = Plant::initial();
        let config = LsysConfig::new();
        for (preset, len) in [
            (Preset::Bush, 4607),
            (Preset::Twig, 4243),
            (Preset::Weed, 1561),
            (Preset::Sprawl, 6263),
        ] {
            let rules = RuleSet::from_rules(preset.rules()).unwrap();
            let string = expander
                .generate(preset.axiom(), &rules, preset.iterations())
                .unwrap();
            assert_eq!(string.len(), len, "{}", preset.to_str());
            let geometry = Plant { preset, ..plant }.geometry(&config);
            let drawn = interpret(string, geometry, |_| {}).unwrap();
            let forwards = string.iter().filter(|s| **s == b'F').count();
            assert_eq!(drawn, forwards);
        }
    }
    #[test]
    fn preset_conversions() {
        assert_eq!(Preset::try_from(2u8), Ok(Preset::Weed));
        assert!(Preset::try_from(4u8).is_err());
        let name: &'static str = Preset::Sprawl.into();
        assert_eq!(name, "Sprawl");
    }
    #[test]
    fn randomized_plants_stay_in_range() {
        let config = LsysConfig::new();
        let mut rng = Rand32::new(42);
        let mut seen = [false; 4];
        for _ in 0..500 {
            let plant = Plant::randomize(&config, &mut rng);
            assert_ne!(plant.preset, Preset::Sprawl);
            seen[plant.preset as usize] = true;
            assert!(plant.preset.step().min <= plant.step);
            assert!(plant.step <= plant.preset.step().max());
            assert!((-35.0..=-25.0).contains(&plant.left_deg));
            assert!((25.0..=35.0).contains(&plant.right_deg));
            assert_ne!(plant.color, Color::Black);
            assert_ne!(plant.color, Color::Blue);
        }
        assert_eq!(seen, [true, true, true, false]);
    }
}
