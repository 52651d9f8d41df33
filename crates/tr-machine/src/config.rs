//! Machine configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use tr_core::{BetAmount, DEFAULT_MACHINE_BALANCE, DEFAULT_PLAYER_BALANCE, DifficultyLevel};
use tr_reels::{TimingConfig, TimingProfile};
use tr_state::{LedgerDefaults, LedgerError};

/// Bet buttons move the bet by this much
pub const DEFAULT_BET_STEP: i64 = 5;

/// Machine errors
#[derive(Debug, thiserror::Error)]
pub enum MachineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

pub type MachineResult<T> = Result<T, MachineError>;

/// Everything a machine needs besides its store.
///
/// Every field has a default, so a config file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MachineConfig {
    /// Player balance on first load and after reset
    pub starting_player_balance: i64,
    /// Machine balance on every load and after reset
    pub starting_machine_balance: i64,
    /// Bet when the machine is created
    pub default_bet: BetAmount,
    /// Amount `increase_bet` / `decrease_bet` move the bet by.
    /// Values below 1 are raised to 1.
    pub bet_step: i64,
    /// Difficulty level when the machine is created
    pub default_level: DifficultyLevel,
    /// Reel animation timing
    pub timing: TimingConfig,
    /// Fixed RNG seed; entropy when absent
    pub seed: Option<u64>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            starting_player_balance: DEFAULT_PLAYER_BALANCE,
            starting_machine_balance: DEFAULT_MACHINE_BALANCE,
            default_bet: BetAmount::default(),
            bet_step: DEFAULT_BET_STEP,
            default_level: DifficultyLevel::default(),
            timing: TimingConfig::normal(),
            seed: None,
        }
    }
}

impl MachineConfig {
    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: &Path) -> MachineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let config = match ext.as_deref() {
            Some("json") => Self::from_json(&text)?,
            Some("yaml" | "yml") => Self::from_yaml(&text)?,
            _ => return Err(MachineError::UnsupportedFormat(path.to_path_buf())),
        };
        log::info!("Loaded machine config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> MachineResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_json(text: &str) -> MachineResult<Self> {
        Ok(serde_json::from_str::<Self>(text)?.normalized())
    }

    pub fn from_yaml(text: &str) -> MachineResult<Self> {
        Ok(serde_yml::from_str::<Self>(text)?.normalized())
    }

    /// Bet step actually applied, never below 1
    pub fn effective_bet_step(&self) -> i64 {
        self.bet_step.max(1)
    }

    fn normalized(mut self) -> Self {
        if self.bet_step < 1 {
            log::warn!("betStep {} raised to 1", self.bet_step);
            self.bet_step = 1;
        }
        self
    }

    pub fn to_json(&self) -> MachineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace timing with a named profile
    pub fn with_profile(mut self, profile: TimingProfile) -> Self {
        self.timing = TimingConfig::from_profile(profile);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Values the ledger starts from and resets to
    pub fn ledger_defaults(&self) -> LedgerDefaults {
        LedgerDefaults {
            player_balance: self.starting_player_balance,
            machine_balance: self.starting_machine_balance,
            bet: self.default_bet,
            level: self.default_level,
        }
    }
}
