//! Session Ledger
//!
//! Owns balances, bet, difficulty level, statistics and the active-spin
//! flag. Every mutation that touches persisted values writes through to the
//! store before returning.
//!
//! ## Persisted keys
//!
//! | Key             | Value                                  |
//! |-----------------|----------------------------------------|
//! | `playerBalance` | stringified integer                    |
//! | `gameStats`     | JSON object, camelCase stats fields    |
//!
//! The machine balance is not persisted; it starts from its default on
//! every load.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use tr_core::{
    BetAmount, CoreError, DEFAULT_MACHINE_BALANCE, DEFAULT_PLAYER_BALANCE, DifficultyLevel,
    GameStats, LedgerSnapshot, OutcomeTriple, Resolution,
};

use crate::store::{KeyValueStore, StoreError};

pub const PLAYER_BALANCE_KEY: &str = "playerBalance";
pub const GAME_STATS_KEY: &str = "gameStats";

// ============ Errors ============

/// Ledger errors
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Why a spin request was dropped. Not an error: the request is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SpinRejection {
    #[error("a spin is already in progress")]
    InProgress,

    #[error("balance {balance} is below bet {bet}")]
    InsufficientBalance { balance: i64, bet: i64 },
}

// ============ Defaults ============

/// Values restored on first load and on reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerDefaults {
    pub player_balance: i64,
    pub machine_balance: i64,
    pub bet: BetAmount,
    pub level: DifficultyLevel,
}

impl Default for LedgerDefaults {
    fn default() -> Self {
        Self {
            player_balance: DEFAULT_PLAYER_BALANCE,
            machine_balance: DEFAULT_MACHINE_BALANCE,
            bet: BetAmount::default(),
            level: DifficultyLevel::default(),
        }
    }
}

impl LedgerDefaults {
    fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::new(self.player_balance, self.machine_balance, GameStats::default())
    }
}

// ============ Ledger ============

pub struct SessionLedger {
    store: Arc<dyn KeyValueStore>,
    defaults: LedgerDefaults,
    snapshot: LedgerSnapshot,
    bet: BetAmount,
    level: DifficultyLevel,
    spinning: bool,
}

impl SessionLedger {
    /// Ledger at its defaults. Nothing is read from `store` until
    /// [`SessionLedger::load`].
    pub fn new(store: Arc<dyn KeyValueStore>, defaults: LedgerDefaults) -> Self {
        Self {
            store,
            snapshot: defaults.snapshot(),
            bet: defaults.bet,
            level: defaults.level,
            spinning: false,
            defaults,
        }
    }

    /// `new` followed by `load`
    pub fn open(store: Arc<dyn KeyValueStore>, defaults: LedgerDefaults) -> Self {
        let mut ledger = Self::new(store, defaults);
        ledger.load();
        ledger
    }

    /// Restore persisted balance and stats. Missing or malformed values
    /// fall back to defaults; this never fails.
    pub fn load(&mut self) {
        let player_balance = self
            .read_key(PLAYER_BALANCE_KEY)
            .and_then(|raw| match raw.trim().parse::<i64>() {
                Ok(balance) => Some(balance),
                Err(e) => {
                    log::warn!("Ignoring malformed {PLAYER_BALANCE_KEY} {raw:?}: {e}");
                    None
                }
            })
            .unwrap_or(self.defaults.player_balance);

        let stats = self
            .read_key(GAME_STATS_KEY)
            .and_then(|raw| match serde_json::from_str::<GameStats>(&raw) {
                Ok(stats) if stats.is_consistent() => Some(stats),
                Ok(stats) => {
                    log::warn!("Ignoring inconsistent {GAME_STATS_KEY}: {stats:?}");
                    None
                }
                Err(e) => {
                    log::warn!("Ignoring malformed {GAME_STATS_KEY}: {e}");
                    None
                }
            })
            .unwrap_or_default();

        self.snapshot = LedgerSnapshot::new(player_balance, self.defaults.machine_balance, stats);
        log::info!(
            "Ledger loaded: player={} machine={} games={}",
            player_balance,
            self.snapshot.machine_balance,
            stats.games_played
        );
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Cannot read {key} from store: {e}");
                None
            }
        }
    }

    // ---- accessors ----

    pub fn snapshot(&self) -> &LedgerSnapshot {
        &self.snapshot
    }

    pub fn player_balance(&self) -> i64 {
        self.snapshot.player_balance
    }

    pub fn machine_balance(&self) -> i64 {
        self.snapshot.machine_balance
    }

    pub fn stats(&self) -> &GameStats {
        &self.snapshot.stats
    }

    pub fn bet(&self) -> BetAmount {
        self.bet
    }

    pub fn level(&self) -> DifficultyLevel {
        self.level
    }

    pub fn defaults(&self) -> &LedgerDefaults {
        &self.defaults
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    pub fn can_spin(&self) -> bool {
        self.check_spin().is_ok()
    }

    // ---- spin lifecycle ----

    fn check_spin(&self) -> Result<(), SpinRejection> {
        if self.spinning {
            return Err(SpinRejection::InProgress);
        }
        if self.snapshot.player_balance < self.bet.as_i64() {
            return Err(SpinRejection::InsufficientBalance {
                balance: self.snapshot.player_balance,
                bet: self.bet.as_i64(),
            });
        }
        Ok(())
    }

    /// Raise the active-spin flag if a spin may start. On rejection nothing
    /// changes.
    pub fn begin_spin(&mut self) -> Result<(), SpinRejection> {
        self.check_spin()?;
        self.spinning = true;
        Ok(())
    }

    /// Resolve the settled outcome at the current bet, commit it in memory
    /// and lower the active-spin flag. Nothing is written to the store.
    ///
    /// If resolution fails the ledger is unchanged. The flag is lowered
    /// either way since a spin cannot be resumed.
    pub fn settle(&mut self, outcome: OutcomeTriple) -> Result<Resolution, CoreError> {
        let result = tr_core::resolve(outcome, self.bet, &self.snapshot);
        match &result {
            Ok(resolution) => self.commit(resolution),
            Err(e) => log::warn!("Spin {outcome} not applied: {e}"),
        }
        self.spinning = false;
        result
    }

    /// `settle` followed by `persist`
    pub fn finish_spin(&mut self, outcome: OutcomeTriple) -> LedgerResult<Resolution> {
        let resolution = self.settle(outcome)?;
        self.persist()?;
        Ok(resolution)
    }

    /// Swap in a resolved snapshot and persist it.
    ///
    /// The in-memory commit happens first and is kept even when the write
    /// fails; the error is returned so the caller can report it.
    pub fn apply_resolution(&mut self, resolution: &Resolution) -> LedgerResult<()> {
        self.commit(resolution);
        self.persist()
    }

    fn commit(&mut self, resolution: &Resolution) {
        self.snapshot = resolution.updated;
        log::debug!(
            "Spin resolved: {} win={} amount={} player={}",
            resolution.outcome,
            resolution.payout.is_win,
            resolution.payout.amount,
            self.snapshot.player_balance
        );
    }

    // ---- player actions ----

    /// Shift the bet by `delta`, clamped. Returns false while spinning.
    pub fn adjust_bet(&mut self, delta: i64) -> bool {
        if self.spinning {
            return false;
        }
        self.bet = self.bet.adjusted(delta);
        true
    }

    /// Set the bet, clamped. Returns false while spinning.
    pub fn set_bet(&mut self, bet: i64) -> bool {
        if self.spinning {
            return false;
        }
        self.bet = BetAmount::new(bet);
        true
    }

    /// Set the difficulty level, clamped. Returns false while spinning.
    pub fn set_level(&mut self, level: i64) -> bool {
        if self.spinning {
            return false;
        }
        self.level = DifficultyLevel::new(level);
        true
    }

    /// Credit the player. Non-positive or overflowing amounts are dropped
    /// and return `Ok(false)`.
    pub fn add_funds(&mut self, amount: i64) -> LedgerResult<bool> {
        if amount <= 0 {
            return Ok(false);
        }
        let Some(balance) = self.snapshot.player_balance.checked_add(amount) else {
            log::warn!("Ignoring add of {amount}: balance would overflow");
            return Ok(false);
        };
        self.snapshot.player_balance = balance;
        log::info!("Added {amount} funds, player balance now {balance}");
        self.persist()?;
        Ok(true)
    }

    /// Restore default balances and stats and clear the persisted keys.
    /// Bet and level are kept. Returns `Ok(false)` while spinning.
    pub fn reset(&mut self) -> LedgerResult<bool> {
        if self.spinning {
            return Ok(false);
        }
        self.snapshot = self.defaults.snapshot();
        log::info!("Ledger reset to defaults");
        self.store.remove_many(&[PLAYER_BALANCE_KEY, GAME_STATS_KEY])?;
        Ok(true)
    }

    /// Write balance and stats to the store
    pub fn persist(&self) -> LedgerResult<()> {
        let result = self.write_keys();
        if let Err(e) = &result {
            log::warn!("Failed to persist ledger: {e}");
        }
        result
    }

    fn write_keys(&self) -> LedgerResult<()> {
        let balance = self.snapshot.player_balance.to_string();
        let stats = serde_json::to_string(&self.snapshot.stats)?;
        self.store.set_many(&[
            (PLAYER_BALANCE_KEY, balance.as_str()),
            (GAME_STATS_KEY, stats.as_str()),
        ])?;
        Ok(())
    }
}

/// Parse a raw funds entry. Accepts positive whole numbers in any notation
/// `f64` parsing understands ("50", " 50 ", "5e1", "50.0"); anything else is
/// `None`.
pub fn parse_funds(raw: &str) -> Option<i64> {
    let value: f64 = raw.trim().parse().ok()?;
    if !value.is_finite() || value <= 0.0 || value.fract() != 0.0 || value >= i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use tr_core::Symbol;

    fn ledger() -> (Arc<MemoryStore>, SessionLedger) {
        let store = Arc::new(MemoryStore::new());
        let ledger = SessionLedger::open(store.clone(), LedgerDefaults::default());
        (store, ledger)
    }

    #[test]
    fn test_fresh_ledger_defaults() {
        let (store, ledger) = ledger();
        assert_eq!(ledger.player_balance(), 1000);
        assert_eq!(ledger.machine_balance(), 5000);
        assert_eq!(ledger.bet().get(), 10);
        assert_eq!(ledger.level().get(), 1);
        assert_eq!(*ledger.stats(), GameStats::default());
        assert!(!ledger.is_spinning());
        assert!(store.is_empty());
    }

    #[test]
    fn test_spin_lifecycle_commits_and_persists() {
        let (store, mut ledger) = ledger();
        ledger.begin_spin().unwrap();
        assert!(ledger.is_spinning());
        assert_eq!(ledger.begin_spin(), Err(SpinRejection::InProgress));

        let resolution = ledger.finish_spin(OutcomeTriple::matching(Symbol::Alien)).unwrap();
        assert!(resolution.payout.is_win);
        assert!(!ledger.is_spinning());
        assert_eq!(ledger.player_balance(), 1030);
        assert_eq!(ledger.machine_balance(), 4970);

        assert_eq!(store.get(PLAYER_BALANCE_KEY).unwrap().as_deref(), Some("1030"));
        let stored: GameStats =
            serde_json::from_str(&store.get(GAME_STATS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored, *ledger.stats());
    }

    #[test]
    fn test_insufficient_balance_rejected() {
        let store = Arc::new(MemoryStore::new());
        let defaults = LedgerDefaults {
            player_balance: 5,
            ..LedgerDefaults::default()
        };
        let mut ledger = SessionLedger::open(store, defaults);

        assert_eq!(
            ledger.begin_spin(),
            Err(SpinRejection::InsufficientBalance { balance: 5, bet: 10 })
        );
        assert!(!ledger.is_spinning());

        assert!(ledger.set_bet(5));
        assert!(ledger.can_spin());
    }

    #[test]
    fn test_overflow_leaves_ledger_untouched() {
        let store = Arc::new(MemoryStore::new());
        let defaults = LedgerDefaults {
            player_balance: i64::MAX - 5,
            ..LedgerDefaults::default()
        };
        let mut ledger = SessionLedger::open(store.clone(), defaults);
        let before = *ledger.snapshot();

        ledger.begin_spin().unwrap();
        let result = ledger.finish_spin(OutcomeTriple::matching(Symbol::Collision));
        assert!(matches!(result, Err(LedgerError::Core(CoreError::Overflow(_)))));
        assert_eq!(*ledger.snapshot(), before);
        assert!(!ledger.is_spinning());
        assert!(store.is_empty());
    }

    #[test]
    fn test_bet_and_level_locked_while_spinning() {
        let (_, mut ledger) = ledger();
        assert!(ledger.adjust_bet(5));
        assert_eq!(ledger.bet().get(), 15);

        ledger.begin_spin().unwrap();
        assert!(!ledger.adjust_bet(5));
        assert!(!ledger.set_level(3));
        assert!(!ledger.reset().unwrap());
        assert_eq!(ledger.bet().get(), 15);
        assert_eq!(ledger.level().get(), 1);
    }

    #[test]
    fn test_bet_clamps() {
        let (_, mut ledger) = ledger();
        for _ in 0..30 {
            ledger.adjust_bet(5);
        }
        assert_eq!(ledger.bet().get(), 100);
        for _ in 0..30 {
            ledger.adjust_bet(-5);
        }
        assert_eq!(ledger.bet().get(), 1);

        ledger.set_level(9);
        assert_eq!(ledger.level().get(), 5);
    }

    #[test]
    fn test_add_funds() {
        let (store, mut ledger) = ledger();
        assert!(ledger.add_funds(50).unwrap());
        assert_eq!(ledger.player_balance(), 1050);
        assert_eq!(store.get(PLAYER_BALANCE_KEY).unwrap().as_deref(), Some("1050"));

        assert!(!ledger.add_funds(0).unwrap());
        assert!(!ledger.add_funds(-10).unwrap());
        assert!(!ledger.add_funds(i64::MAX).unwrap());
        assert_eq!(ledger.player_balance(), 1050);
    }

    #[test]
    fn test_parse_funds() {
        assert_eq!(parse_funds("50"), Some(50));
        assert_eq!(parse_funds(" 50 "), Some(50));
        assert_eq!(parse_funds("5e1"), Some(50));
        assert_eq!(parse_funds("50.0"), Some(50));
        assert_eq!(parse_funds("abc"), None);
        assert_eq!(parse_funds(""), None);
        assert_eq!(parse_funds("12.5"), None);
        assert_eq!(parse_funds("-3"), None);
        assert_eq!(parse_funds("0"), None);
        assert_eq!(parse_funds("NaN"), None);
        assert_eq!(parse_funds("inf"), None);
    }

    #[test]
    fn test_reset_clears_store_and_keeps_bet() {
        let (store, mut ledger) = ledger();
        ledger.set_bet(40);
        ledger.begin_spin().unwrap();
        ledger
            .finish_spin(OutcomeTriple::new([Symbol::Alien, Symbol::ColdFace, Symbol::Collision]))
            .unwrap();
        assert!(!store.is_empty());

        assert!(ledger.reset().unwrap());
        assert_eq!(*ledger.snapshot(), LedgerSnapshot::default());
        assert_eq!(ledger.bet().get(), 40);
        assert!(store.is_empty());
    }
}
