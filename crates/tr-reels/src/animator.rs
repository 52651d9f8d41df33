//! Reel animator: three staggered reels on one timer queue

use rand::Rng;
use serde::{Deserialize, Serialize};

use tr_core::{OutcomeTriple, REEL_COUNT, ReelWindow, Symbol};

use crate::reel::{Reel, ReelPhase, TickOutcome};
use crate::scheduler::{Clock, TimerQueue};
use crate::timing::TimingConfig;

/// What a reel timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReelAction {
    Start,
    Tick,
    Lock,
}

/// Timer payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReelTimer {
    pub reel_index: usize,
    pub action: ReelAction,
}

/// Something visible happened to a reel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelEvent {
    /// Milliseconds since spin start
    pub timestamp_ms: u64,
    pub reel_index: usize,
    pub kind: ReelEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReelEventKind {
    /// Reel left `Idle`
    Started,
    /// Reel shows a new noise window (`tick` counts from 1)
    Tick { tick: u32, window: ReelWindow },
    /// Reel locked on its outcome symbol
    Settled { symbol: Symbol },
}

/// Drives one spin's worth of reel animation.
///
/// Built per spin from the final outcome. `step` executes exactly one due
/// timer; once [`ReelAnimator::is_complete`] is true every reel shows three
/// copies of its outcome symbol and the queue is empty.
#[derive(Debug, Clone)]
pub struct ReelAnimator {
    outcome: OutcomeTriple,
    reels: [Reel; REEL_COUNT],
    queue: TimerQueue<ReelTimer>,
    timing: TimingConfig,
    now_ms: u64,
}

impl ReelAnimator {
    /// Prepare a spin. `windows` is what the reels show right now; step
    /// counts are drawn here, one per reel.
    pub fn new<R: Rng + ?Sized>(
        outcome: OutcomeTriple,
        windows: [ReelWindow; REEL_COUNT],
        timing: TimingConfig,
        rng: &mut R,
    ) -> Self {
        let steps = [
            timing.roll_steps(rng),
            timing.roll_steps(rng),
            timing.roll_steps(rng),
        ];
        Self::with_steps(outcome, windows, timing, steps)
    }

    /// Prepare a spin with fixed step counts
    pub fn with_steps(
        outcome: OutcomeTriple,
        windows: [ReelWindow; REEL_COUNT],
        timing: TimingConfig,
        steps: [u32; REEL_COUNT],
    ) -> Self {
        let targets = outcome.symbols();
        let reels = std::array::from_fn(|i| Reel::new(i, windows[i], targets[i], steps[i]));

        let mut queue = TimerQueue::new();
        for reel_index in 0..REEL_COUNT {
            queue.schedule(
                timing.start_offset_ms(reel_index),
                ReelTimer {
                    reel_index,
                    action: ReelAction::Start,
                },
            );
        }

        log::debug!(
            "reel animation prepared: outcome={outcome} steps={steps:?} profile={:?}",
            timing.profile
        );

        Self {
            outcome,
            reels,
            queue,
            timing,
            now_ms: 0,
        }
    }

    pub fn outcome(&self) -> OutcomeTriple {
        self.outcome
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn reels(&self) -> &[Reel; REEL_COUNT] {
        &self.reels
    }

    /// Current display of every reel
    pub fn windows(&self) -> [ReelWindow; REEL_COUNT] {
        std::array::from_fn(|i| self.reels[i].window())
    }

    pub fn phases(&self) -> [ReelPhase; REEL_COUNT] {
        std::array::from_fn(|i| self.reels[i].phase())
    }

    /// Time of the last executed timer
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.queue.next_due_ms()
    }

    /// Join barrier: every reel has settled
    pub fn is_complete(&self) -> bool {
        self.reels.iter().all(Reel::is_settled)
    }

    /// What the reels show once the spin is over
    pub fn final_windows(&self) -> Option<[ReelWindow; REEL_COUNT]> {
        self.is_complete().then(|| self.windows())
    }

    /// Spin length once complete
    pub fn total_duration_ms(&self) -> Option<u64> {
        self.is_complete().then_some(self.now_ms)
    }

    /// When each reel will settle given its drawn step count
    pub fn projected_settle_ms(&self) -> [u64; REEL_COUNT] {
        std::array::from_fn(|i| self.timing.projected_settle_ms(i, self.reels[i].steps()))
    }

    /// Execute the earliest pending timer. `None` once the spin is over.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<ReelEvent> {
        let timer = self.queue.pop()?;
        self.now_ms = self.now_ms.max(timer.due_ms);
        let ReelTimer { reel_index, action } = timer.payload;
        let now = self.now_ms;
        let increment = self.timing.tick_increment_ms();
        let base = self.timing.base_tick_delay_ms;
        let reel = &mut self.reels[reel_index];

        let kind = match action {
            ReelAction::Start => {
                let first_delay = reel.start(base, increment)?;
                let next = if reel.steps() == 0 {
                    ReelAction::Lock
                } else {
                    ReelAction::Tick
                };
                let due = if next == ReelAction::Lock {
                    now
                } else {
                    now.saturating_add(first_delay)
                };
                self.queue.schedule(due, ReelTimer { reel_index, action: next });
                ReelEventKind::Started
            }
            ReelAction::Tick => {
                let outcome = reel.tick(rng)?;
                let (due, next) = match outcome {
                    TickOutcome::Continue { next_delay_ms } => {
                        (now.saturating_add(next_delay_ms), ReelAction::Tick)
                    }
                    TickOutcome::Finished => (now, ReelAction::Lock),
                };
                self.queue.schedule(due, ReelTimer { reel_index, action: next });
                ReelEventKind::Tick {
                    tick: reel.ticks_done(),
                    window: reel.window(),
                }
            }
            ReelAction::Lock => {
                let symbol = reel.lock()?;
                log::debug!("reel {reel_index} settled on {symbol} at {now}ms");
                ReelEventKind::Settled { symbol }
            }
        };

        Some(ReelEvent {
            timestamp_ms: now,
            reel_index,
            kind,
        })
    }

    /// Run every remaining timer, waiting on `clock` before each one and
    /// handing each event to `observer`. Returns the spin duration.
    pub fn run<R, C, F>(&mut self, clock: &mut C, rng: &mut R, mut observer: F) -> u64
    where
        R: Rng + ?Sized,
        C: Clock + ?Sized,
        F: FnMut(&ReelEvent),
    {
        while let Some(due) = self.next_due_ms() {
            clock.wait_until(due);
            if let Some(event) = self.step(rng) {
                observer(&event);
            }
        }
        self.now_ms
    }
}
