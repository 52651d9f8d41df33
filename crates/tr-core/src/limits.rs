//! Clamped player inputs: bet amount and difficulty level

use serde::{Deserialize, Serialize};

/// Bet per spin, always within [`BetAmount::MIN`, `BetAmount::MAX`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct BetAmount(u32);

impl BetAmount {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 100;
    pub const DEFAULT: u32 = 10;

    /// Clamp any integer into range
    pub fn new(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u32)
    }

    /// Shift by `delta`, clamped
    pub fn adjusted(self, delta: i64) -> Self {
        Self::new((self.0 as i64).saturating_add(delta))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_i64(self) -> i64 {
        self.0 as i64
    }
}

impl Default for BetAmount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl From<i64> for BetAmount {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<BetAmount> for i64 {
    fn from(bet: BetAmount) -> Self {
        bet.as_i64()
    }
}

/// Difficulty level. Higher levels add more three-of-a-kind entries to
/// the sample space, so "difficulty" actually makes winning easier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct DifficultyLevel(u8);

impl DifficultyLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const DEFAULT: u8 = 1;

    pub fn new(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All valid levels, lowest first
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl From<i64> for DifficultyLevel {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl From<DifficultyLevel> for i64 {
    fn from(level: DifficultyLevel) -> Self {
        level.0 as i64
    }
}
