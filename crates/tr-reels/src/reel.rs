//! Per-reel state machine

use rand::Rng;
use serde::{Deserialize, Serialize};

use tr_core::{ReelWindow, Symbol};

/// Where a reel is in its spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReelPhase {
    /// Waiting for its start offset
    Idle,
    /// Showing noise
    Spinning,
    /// Locked to its final symbol
    Settled,
}

/// Result of one animation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// More ticks to go; the next one is due after this delay
    Continue { next_delay_ms: u64 },
    /// That was the last tick; the reel is ready to lock
    Finished,
}

/// One reel: three visible slots plus its spin progress.
#[derive(Debug, Clone)]
pub struct Reel {
    index: usize,
    phase: ReelPhase,
    window: ReelWindow,
    target: Symbol,
    steps: u32,
    ticks_done: u32,
    delay_ms: u64,
    increment_ms: u64,
}

impl Reel {
    /// Idle reel showing `window`, destined to lock on `target`
    pub fn new(index: usize, window: ReelWindow, target: Symbol, steps: u32) -> Self {
        Self {
            index,
            phase: ReelPhase::Idle,
            window,
            target,
            steps,
            ticks_done: 0,
            delay_ms: 0,
            increment_ms: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> ReelPhase {
        self.phase
    }

    pub fn window(&self) -> ReelWindow {
        self.window
    }

    pub fn target(&self) -> Symbol {
        self.target
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn ticks_done(&self) -> u32 {
        self.ticks_done
    }

    pub fn is_settled(&self) -> bool {
        self.phase == ReelPhase::Settled
    }

    /// `Idle → Spinning`. Returns the delay before the first tick, or `None`
    /// if the reel was not idle.
    pub fn start(&mut self, base_delay_ms: u64, increment_ms: u64) -> Option<u64> {
        if self.phase != ReelPhase::Idle {
            return None;
        }
        self.phase = ReelPhase::Spinning;
        self.delay_ms = base_delay_ms;
        self.increment_ms = increment_ms;
        Some(self.delay_ms)
    }

    /// Show fresh noise and advance the deceleration.
    ///
    /// `None` unless spinning with ticks left.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<TickOutcome> {
        if self.phase != ReelPhase::Spinning || self.ticks_done >= self.steps {
            return None;
        }
        self.window = Symbol::random_window(rng);
        self.ticks_done += 1;
        self.delay_ms = self.delay_ms.saturating_add(self.increment_ms);

        if self.ticks_done < self.steps {
            Some(TickOutcome::Continue {
                next_delay_ms: self.delay_ms,
            })
        } else {
            Some(TickOutcome::Finished)
        }
    }

    /// `Spinning → Settled` once every tick has run. All three slots show
    /// the target symbol afterwards.
    pub fn lock(&mut self) -> Option<Symbol> {
        if self.phase != ReelPhase::Spinning || self.ticks_done < self.steps {
            return None;
        }
        self.window = [self.target; 3];
        self.phase = ReelPhase::Settled;
        Some(self.target)
    }
}
