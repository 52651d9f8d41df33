//! Balances and statistics as plain values

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Player balance on first load and after reset
pub const DEFAULT_PLAYER_BALANCE: i64 = 1000;

/// Machine balance on first load and after reset
pub const DEFAULT_MACHINE_BALANCE: i64 = 5000;

/// Lifetime game statistics.
///
/// Field names serialize in camelCase; this is the shape stored under
/// the `gameStats` key. Missing fields read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameStats {
    pub games_played: u64,
    pub wins: u64,
    pub losses: u64,
    pub biggest_win: u64,
    pub total_wagered: u64,
    pub total_won: u64,
}

impl GameStats {
    /// Stats after one more winning spin
    pub fn with_win(&self, bet: u64, amount: u64) -> CoreResult<Self> {
        let mut next = self.with_game(bet)?;
        next.wins = checked(next.wins.checked_add(1), "wins")?;
        next.total_won = checked(next.total_won.checked_add(amount), "totalWon")?;
        next.biggest_win = next.biggest_win.max(amount);
        Ok(next)
    }

    /// Stats after one more losing spin
    pub fn with_loss(&self, bet: u64) -> CoreResult<Self> {
        let mut next = self.with_game(bet)?;
        next.losses = checked(next.losses.checked_add(1), "losses")?;
        Ok(next)
    }

    fn with_game(&self, bet: u64) -> CoreResult<Self> {
        let mut next = *self;
        next.games_played = checked(next.games_played.checked_add(1), "gamesPlayed")?;
        next.total_wagered = checked(next.total_wagered.checked_add(bet), "totalWagered")?;
        Ok(next)
    }

    /// Return to player, percent of wagered
    pub fn rtp(&self) -> f64 {
        if self.total_wagered > 0 {
            (self.total_won as f64 / self.total_wagered as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Percent of games won
    pub fn hit_rate(&self) -> f64 {
        if self.games_played > 0 {
            (self.wins as f64 / self.games_played as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Every game counted is either a win or a loss
    pub fn is_consistent(&self) -> bool {
        self.wins.checked_add(self.losses) == Some(self.games_played)
    }
}

/// Everything a resolved spin can change, committed as one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub player_balance: i64,
    pub machine_balance: i64,
    pub stats: GameStats,
}

impl LedgerSnapshot {
    pub fn new(player_balance: i64, machine_balance: i64, stats: GameStats) -> Self {
        Self {
            player_balance,
            machine_balance,
            stats,
        }
    }

    /// Sum that spins never change
    pub fn total_funds(&self) -> i128 {
        self.player_balance as i128 + self.machine_balance as i128
    }
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self::new(
            DEFAULT_PLAYER_BALANCE,
            DEFAULT_MACHINE_BALANCE,
            GameStats::default(),
        )
    }
}

pub(crate) fn checked<T>(value: Option<T>, field: &'static str) -> CoreResult<T> {
    value.ok_or(CoreError::Overflow(field))
}
