//! Dice specs and the random source used to roll them.
//!
//! Weapon damage is written as `NdM`: the sum of `N` rolls of an `M`-sided
//! die. Parsing is strict; a malformed spec is an error and never falls back
//! to some default die.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for dice parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("No dice specified in {0}")]
    NoDice(String),
    #[error("Too many dice in {0} (at most {max})", max = MAX_DICE)]
    TooManyDice(String),
}

/// Largest dice count a spec may carry.
pub const MAX_DICE: u32 = 100;

/// Die sizes a weapon may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DieType {
    pub fn sides(&self) -> u32 {
        match self {
            DieType::D4 => 4,
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
            DieType::D20 => 20,
        }
    }

    pub fn from_sides(sides: u32) -> Option<DieType> {
        match sides {
            4 => Some(DieType::D4),
            6 => Some(DieType::D6),
            8 => Some(DieType::D8),
            10 => Some(DieType::D10),
            12 => Some(DieType::D12),
            20 => Some(DieType::D20),
            _ => None,
        }
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// Anything that can produce uniform die results.
///
/// Combat takes this as a parameter so tests can script every roll.
pub trait RandomSource {
    /// Roll one die, returning a value in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;

    /// Pick an index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize;
}

impl<R: Rng> RandomSource for R {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.gen_range(1..=sides)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// A parsed `NdM` damage spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiceSpec {
    pub count: u32,
    pub die_type: DieType,
}

impl DiceSpec {
    pub fn new(count: u32, die_type: DieType) -> Self {
        Self { count, die_type }
    }

    /// Parse a spec such as `2d6`. The separator must be a lowercase `d`.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let notation = notation.trim();
        let (count_str, sides_str) = notation
            .split_once('d')
            .ok_or_else(|| DiceError::InvalidNotation(notation.to_string()))?;

        let count = parse_digits(count_str)
            .ok_or_else(|| DiceError::InvalidNotation(notation.to_string()))?;
        if count == 0 {
            return Err(DiceError::NoDice(notation.to_string()));
        }
        if count > MAX_DICE {
            return Err(DiceError::TooManyDice(notation.to_string()));
        }

        let sides = parse_digits(sides_str)
            .ok_or_else(|| DiceError::InvalidNotation(notation.to_string()))?;
        let die_type = DieType::from_sides(sides).ok_or(DiceError::InvalidDieSize(sides))?;

        Ok(Self { count, die_type })
    }

    /// Smallest possible total.
    pub fn min_total(&self) -> u32 {
        self.count
    }

    /// Largest possible total.
    pub fn max_total(&self) -> u32 {
        self.count.saturating_mul(self.die_type.sides())
    }

    /// Roll the spec with the given source.
    pub fn roll(&self, rng: &mut (impl RandomSource + ?Sized)) -> RollResult {
        let rolls: Vec<u32> = (0..self.count)
            .map(|_| rng.roll_die(self.die_type.sides()))
            .collect();
        let total = rolls.iter().fold(0u32, |acc, r| acc.saturating_add(*r));
        RollResult {
            spec: *self,
            rolls,
            total,
        }
    }
}

/// Plain ASCII digits only; `str::parse` would also take a leading `+`.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl FromStr for DiceSpec {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceSpec::parse(s)
    }
}

impl TryFrom<String> for DiceSpec {
    type Error = DiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DiceSpec::parse(&value)
    }
}

impl From<DiceSpec> for String {
    fn from(spec: DiceSpec) -> Self {
        spec.to_string()
    }
}

impl fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.die_type)
    }
}

/// Result of rolling a dice spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    pub spec: DiceSpec,
    pub rolls: Vec<u32>,
    pub total: u32,
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown: Vec<String> = self.rolls.iter().map(|r| r.to_string()).collect();
        write!(f, "{} [{}] = {}", self.spec, shown.join(", "), self.total)
    }
}

/// Roll a single d20.
pub fn roll_d20(rng: &mut (impl RandomSource + ?Sized)) -> u32 {
    rng.roll_die(DieType::D20.sides())
}
