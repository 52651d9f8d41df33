//! Symbol definitions and outcome triples

use std::fmt;
use std::ops::Index;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of reels on the machine
pub const REEL_COUNT: usize = 3;

/// Visible slots per reel
pub const REEL_ROWS: usize = 3;

/// The three slots a reel currently shows (top to bottom)
pub type ReelWindow = [Symbol; REEL_ROWS];

/// Logical reel symbol.
///
/// Identity only. How a symbol is drawn on screen is the presentation
/// layer's business; `key()` is the stable name used in storage and config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Symbol {
    #[serde(rename = "money_mouth_face")]
    MoneyMouth = 0,
    #[serde(rename = "cold_face")]
    ColdFace = 1,
    #[serde(rename = "alien")]
    Alien = 2,
    #[serde(rename = "heart_on_fire")]
    HeartOnFire = 3,
    #[serde(rename = "collision")]
    Collision = 4,
}

impl Symbol {
    /// All symbols in canonical order
    pub const ALL: [Symbol; 5] = [
        Symbol::MoneyMouth,
        Symbol::ColdFace,
        Symbol::Alien,
        Symbol::HeartOnFire,
        Symbol::Collision,
    ];

    /// Number of distinct symbols
    pub const COUNT: usize = Self::ALL.len();

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable key (matches the serde name)
    pub fn key(self) -> &'static str {
        match self {
            Symbol::MoneyMouth => "money_mouth_face",
            Symbol::ColdFace => "cold_face",
            Symbol::Alien => "alien",
            Symbol::HeartOnFire => "heart_on_fire",
            Symbol::Collision => "collision",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.key() == key)
    }

    /// Uniformly random symbol
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::COUNT)]
    }

    /// Independently randomized reel window (visual noise)
    pub fn random_window<R: Rng + ?Sized>(rng: &mut R) -> ReelWindow {
        [Self::random(rng), Self::random(rng), Self::random(rng)]
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Final result of one spin: one symbol per reel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeTriple([Symbol; REEL_COUNT]);

impl OutcomeTriple {
    pub const fn new(symbols: [Symbol; REEL_COUNT]) -> Self {
        Self(symbols)
    }

    /// Three copies of the same symbol
    pub const fn matching(symbol: Symbol) -> Self {
        Self([symbol, symbol, symbol])
    }

    pub fn symbols(&self) -> [Symbol; REEL_COUNT] {
        self.0
    }

    /// Symbol for a reel, `None` past the last reel
    pub fn symbol(&self, reel_index: usize) -> Option<Symbol> {
        self.0.get(reel_index).copied()
    }

    /// All three reels show the same symbol (the only winning pattern)
    pub fn is_three_of_a_kind(&self) -> bool {
        self.0[0] == self.0[1] && self.0[1] == self.0[2]
    }

    pub fn is_all_distinct(&self) -> bool {
        self.0[0] != self.0[1] && self.0[1] != self.0[2] && self.0[0] != self.0[2]
    }

    /// Exactly two reels match
    pub fn is_near_miss(&self) -> bool {
        !self.is_three_of_a_kind() && !self.is_all_distinct()
    }
}

impl Index<usize> for OutcomeTriple {
    type Output = Symbol;

    fn index(&self, index: usize) -> &Symbol {
        &self.0[index]
    }
}

impl From<[Symbol; REEL_COUNT]> for OutcomeTriple {
    fn from(symbols: [Symbol; REEL_COUNT]) -> Self {
        Self(symbols)
    }
}

impl fmt::Display for OutcomeTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.0[0], self.0[1], self.0[2])
    }
}
