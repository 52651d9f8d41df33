//! Slot machine facade
//!
//! Ties the outcome generator, reel animator and session ledger together
//! behind the calls a presentation layer makes.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use tr_core::{
    BetAmount, CoreError, DifficultyLevel, OutcomeGenerator, OutcomeTriple, Payout, REEL_COUNT,
    ReelWindow, Symbol, apply_near_miss,
};
use tr_reels::{Clock, ReelAnimator, ReelEvent};
use tr_state::{KeyValueStore, MemoryStore, SessionLedger, SpinRejection, parse_funds};

use crate::config::{MachineConfig, MachineResult};
use crate::prompt::{Confirm, NumericPrompt};

pub const RESET_PROMPT: &str =
    "Are you sure you want to restart? Your balance and statistics will be reset.";
pub const ADD_FUNDS_PROMPT: &str = "How much would you like to add to your balance?";

/// Result of one completed spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinSummary {
    pub outcome: OutcomeTriple,
    /// Draw before the near-miss pass
    pub raw_outcome: OutcomeTriple,
    pub payout: Payout,
    pub bet: BetAmount,
    pub level: DifficultyLevel,
    pub player_balance: i64,
    pub machine_balance: i64,
    pub duration_ms: u64,
    /// The store accepted the new balance and stats
    pub persisted: bool,
}

impl SpinSummary {
    pub fn is_win(&self) -> bool {
        self.payout.is_win
    }

    /// Near-miss pass rewrote the draw
    pub fn was_biased(&self) -> bool {
        self.outcome != self.raw_outcome
    }
}

/// Something a running spin produced
#[derive(Debug, Clone, PartialEq)]
pub enum SpinEvent {
    Reel(ReelEvent),
    /// All reels settled and the ledger committed the payout
    Completed(SpinSummary),
    /// All reels settled but the payout could not be applied; the ledger
    /// is unchanged
    Voided {
        outcome: OutcomeTriple,
        error: CoreError,
    },
}

struct ActiveSpin {
    raw: OutcomeTriple,
    animator: ReelAnimator,
}

pub struct SlotMachine {
    config: MachineConfig,
    ledger: SessionLedger,
    rng: StdRng,
    windows: [ReelWindow; REEL_COUNT],
    active: Option<ActiveSpin>,
    last_spin: Option<SpinSummary>,
}

impl SlotMachine {
    /// Machine over `store`, with persisted state loaded
    pub fn new(config: MachineConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let ledger = SessionLedger::open(store, config.ledger_defaults());

        Self {
            config,
            ledger,
            rng,
            windows: initial_windows(),
            active: None,
            last_spin: None,
        }
    }

    /// Machine that forgets everything when dropped
    pub fn in_memory(config: MachineConfig) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    /// Reseed the RNG
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    // ---- accessors ----

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    pub fn bet(&self) -> BetAmount {
        self.ledger.bet()
    }

    pub fn level(&self) -> DifficultyLevel {
        self.ledger.level()
    }

    pub fn is_spinning(&self) -> bool {
        self.ledger.is_spinning()
    }

    /// What each reel shows right now
    pub fn reels(&self) -> [ReelWindow; REEL_COUNT] {
        self.windows
    }

    pub fn last_spin(&self) -> Option<&SpinSummary> {
        self.last_spin.as_ref()
    }

    /// Animator of the running spin
    pub fn animator(&self) -> Option<&ReelAnimator> {
        self.active.as_ref().map(|a| &a.animator)
    }

    // ---- spinning ----

    /// Start a spin. Rejected without side effects while another spin runs
    /// or when the balance does not cover the bet.
    pub fn spin(&mut self) -> Result<(), SpinRejection> {
        self.ledger.begin_spin()?;
        let generator = OutcomeGenerator::new(self.ledger.level());
        let raw = generator.draw_raw(&mut self.rng);
        let outcome = apply_near_miss(raw, &mut self.rng);
        self.start_animation(raw, outcome);
        Ok(())
    }

    /// Start a spin that lands on `outcome`, skipping the generator
    pub fn spin_forced(&mut self, outcome: OutcomeTriple) -> Result<(), SpinRejection> {
        self.ledger.begin_spin()?;
        self.start_animation(outcome, outcome);
        Ok(())
    }

    fn start_animation(&mut self, raw: OutcomeTriple, outcome: OutcomeTriple) {
        log::debug!(
            "Spin accepted: bet={} level={} outcome={outcome}",
            self.ledger.bet().get(),
            self.ledger.level().get()
        );
        let animator = ReelAnimator::new(outcome, self.windows, self.config.timing.clone(), &mut self.rng);
        self.last_spin = None;
        self.active = Some(ActiveSpin { raw, animator });
    }

    /// When the next call to [`SlotMachine::step`] has something to do,
    /// in ms since spin start. `None` when no spin is running.
    pub fn next_due_ms(&self) -> Option<u64> {
        let active = self.active.as_ref()?;
        Some(
            active
                .animator
                .next_due_ms()
                .unwrap_or_else(|| active.animator.now_ms()),
        )
    }

    /// Advance the running spin by one event.
    ///
    /// Reel events come first; once every reel has settled the next call
    /// resolves the payout and returns `Completed` (or `Voided`). `None`
    /// when no spin is running.
    pub fn step(&mut self) -> Option<SpinEvent> {
        let active = self.active.as_mut()?;
        if let Some(event) = active.animator.step(&mut self.rng) {
            self.windows = active.animator.windows();
            return Some(SpinEvent::Reel(event));
        }

        let active = self.active.take()?;
        Some(self.complete(active))
    }

    fn complete(&mut self, active: ActiveSpin) -> SpinEvent {
        let outcome = active.animator.outcome();
        let duration_ms = active.animator.now_ms();

        let resolution = match self.ledger.settle(outcome) {
            Ok(resolution) => resolution,
            Err(error) => return SpinEvent::Voided { outcome, error },
        };
        let persisted = self.ledger.persist().is_ok();

        let summary = SpinSummary {
            outcome,
            raw_outcome: active.raw,
            payout: resolution.payout,
            bet: self.ledger.bet(),
            level: self.ledger.level(),
            player_balance: resolution.updated.player_balance,
            machine_balance: resolution.updated.machine_balance,
            duration_ms,
            persisted,
        };
        self.last_spin = Some(summary.clone());
        SpinEvent::Completed(summary)
    }

    /// Drive the running spin to the end, pacing it with `clock`.
    ///
    /// Every event goes to `observer`, the final one included. Returns the
    /// summary, or `None` when nothing was running or the payout was voided.
    pub fn run_spin<C, F>(&mut self, clock: &mut C, mut observer: F) -> Option<SpinSummary>
    where
        C: Clock + ?Sized,
        F: FnMut(&SpinEvent),
    {
        clock.restart();
        while let Some(due) = self.next_due_ms() {
            clock.wait_until(due);
            let Some(event) = self.step() else { break };
            observer(&event);
            match event {
                SpinEvent::Completed(summary) => return Some(summary),
                SpinEvent::Voided { .. } => return None,
                SpinEvent::Reel(_) => {}
            }
        }
        None
    }

    // ---- player actions ----

    /// Raise the bet by the configured step. False while spinning.
    pub fn increase_bet(&mut self) -> bool {
        self.ledger.adjust_bet(self.config.effective_bet_step())
    }

    /// Lower the bet by the configured step. False while spinning.
    pub fn decrease_bet(&mut self) -> bool {
        self.ledger.adjust_bet(-self.config.effective_bet_step())
    }

    pub fn set_bet(&mut self, bet: i64) -> bool {
        self.ledger.set_bet(bet)
    }

    pub fn set_level(&mut self, level: i64) -> bool {
        self.ledger.set_level(level)
    }

    /// Ask `prompt` for an amount and credit it. Dismissed or invalid input
    /// changes nothing and returns `Ok(None)`.
    pub fn add_funds<P>(&mut self, prompt: &mut P) -> MachineResult<Option<i64>>
    where
        P: NumericPrompt + ?Sized,
    {
        let Some(raw) = prompt.prompt(ADD_FUNDS_PROMPT) else {
            return Ok(None);
        };
        let Some(amount) = parse_funds(&raw) else {
            log::debug!("Ignoring funds input {raw:?}");
            return Ok(None);
        };
        Ok(self.ledger.add_funds(amount)?.then_some(amount))
    }

    /// Reset balances and stats once `confirm` agrees. Not offered while
    /// spinning.
    pub fn reset<C>(&mut self, confirm: &mut C) -> MachineResult<bool>
    where
        C: Confirm + ?Sized,
    {
        if self.is_spinning() || !confirm.confirm(RESET_PROMPT) {
            return Ok(false);
        }
        let done = self.ledger.reset()?;
        if done {
            self.last_spin = None;
        }
        Ok(done)
    }
}

fn initial_windows() -> [ReelWindow; REEL_COUNT] {
    std::array::from_fn(|i| [Symbol::ALL[i]; 3])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr_reels::{ReelEventKind, TimingConfig, VirtualClock};

    fn machine() -> SlotMachine {
        let config = MachineConfig {
            timing: TimingConfig::instant(),
            seed: Some(42),
            ..MachineConfig::default()
        };
        SlotMachine::in_memory(config)
    }

    #[test]
    fn test_initial_state() {
        let machine = machine();
        assert!(!machine.is_spinning());
        assert_eq!(machine.bet().get(), 10);
        assert_eq!(
            machine.reels(),
            [[Symbol::MoneyMouth; 3], [Symbol::ColdFace; 3], [Symbol::Alien; 3]]
        );
        assert!(machine.last_spin().is_none());
        assert_eq!(machine.next_due_ms(), None);
    }

    #[test]
    fn test_step_reports_completion_after_last_settle() {
        let mut machine = machine();
        machine.spin_forced(OutcomeTriple::matching(Symbol::Alien)).unwrap();

        let mut settled = 0;
        let summary = loop {
            match machine.step().unwrap() {
                SpinEvent::Reel(event) => {
                    if let ReelEventKind::Settled { .. } = event.kind {
                        settled += 1;
                    }
                    assert_eq!(machine.ledger().player_balance(), 1000);
                    assert!(machine.is_spinning());
                }
                SpinEvent::Completed(summary) => break summary,
                SpinEvent::Voided { .. } => panic!("voided"),
            }
        };

        assert_eq!(settled, 3);
        assert!(summary.is_win());
        assert!(summary.persisted);
        assert_eq!(summary.player_balance, 1030);
        assert!(!machine.is_spinning());
        assert_eq!(machine.step(), None);
        assert_eq!(machine.reels(), [[Symbol::Alien; 3]; 3]);
    }

    #[test]
    fn test_run_spin_without_spin_is_noop() {
        let mut machine = machine();
        let mut clock = VirtualClock::new();
        let mut calls = 0;
        assert_eq!(machine.run_spin(&mut clock, |_| calls += 1), None);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_bet_step() {
        let mut machine = machine();
        assert!(machine.increase_bet());
        assert_eq!(machine.bet().get(), 15);
        assert!(machine.decrease_bet());
        assert!(machine.decrease_bet());
        assert!(machine.decrease_bet());
        assert_eq!(machine.bet().get(), 1);
    }

    #[test]
    fn test_bet_buttons_keep_direction_with_bad_step() {
        for bet_step in [i64::MIN, -5, 0] {
            let mut machine = SlotMachine::in_memory(MachineConfig {
                bet_step,
                ..MachineConfig::default()
            });
            assert!(machine.increase_bet());
            assert_eq!(machine.bet().get(), 11);
            assert!(machine.decrease_bet());
            assert!(machine.decrease_bet());
            assert_eq!(machine.bet().get(), 9);
        }
    }
}
