//! Timing profiles for reel animation

use rand::Rng;
use serde::{Deserialize, Serialize};

use tr_core::REEL_COUNT;

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingProfile {
    /// Regular play timing
    Normal,
    /// Fast mode
    Turbo,
    /// No delays at all (tests, batch simulation)
    Instant,
    /// Produced by [`TimingConfig::scaled`]
    Custom,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::Normal
    }
}

/// Detailed timing configuration (all times in ms)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Profile type
    pub profile: TimingProfile,

    /// Delay before each reel begins spinning, measured from spin start
    pub reel_start_offsets_ms: [u64; REEL_COUNT],

    /// Delay before the first tick of a reel
    pub base_tick_delay_ms: u64,

    /// Each tick lengthens the next delay by `base_tick_delay_ms * factor`
    pub deceleration_factor: f64,

    /// Ticks every reel performs at least
    pub min_steps: u32,

    /// Extra ticks are drawn uniformly from `0..extra_steps`
    pub extra_steps: u32,
}

impl TimingConfig {
    /// Normal play timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            reel_start_offsets_ms: [0, 500, 1000],
            base_tick_delay_ms: 50,
            deceleration_factor: 0.2,
            min_steps: 15,
            extra_steps: 10,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            reel_start_offsets_ms: [0, 100, 200],
            base_tick_delay_ms: 10,
            ..Self::normal()
        }
    }

    /// Zero delays, same tick counts
    pub fn instant() -> Self {
        Self {
            profile: TimingProfile::Instant,
            reel_start_offsets_ms: [0; REEL_COUNT],
            base_tick_delay_ms: 0,
            ..Self::normal()
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Instant => Self::instant(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale all delays by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let factor = factor.max(0.0);
        let scale = |ms: u64| (ms as f64 * factor).round() as u64;
        Self {
            profile: TimingProfile::Custom,
            reel_start_offsets_ms: self.reel_start_offsets_ms.map(scale),
            base_tick_delay_ms: scale(self.base_tick_delay_ms),
            ..self.clone()
        }
    }

    /// Growth of the inter-tick delay after every tick
    pub fn tick_increment_ms(&self) -> u64 {
        (self.base_tick_delay_ms as f64 * self.deceleration_factor).round() as u64
    }

    /// Delay preceding tick `tick_index` (0-based)
    pub fn delay_before_tick(&self, tick_index: u32) -> u64 {
        self.base_tick_delay_ms
            .saturating_add(self.tick_increment_ms().saturating_mul(tick_index as u64))
    }

    /// Start offset for a reel (reels past the last reuse its offset)
    pub fn start_offset_ms(&self, reel_index: usize) -> u64 {
        self.reel_start_offsets_ms[reel_index.min(REEL_COUNT - 1)]
    }

    /// Draw a tick count: `min_steps + random_int(0, extra_steps - 1)`
    pub fn roll_steps<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.extra_steps == 0 {
            self.min_steps
        } else {
            self.min_steps.saturating_add(rng.random_range(0..self.extra_steps))
        }
    }

    /// Time from spin start until a reel with `steps` ticks settles.
    /// Saturates at `u64::MAX`.
    pub fn projected_settle_ms(&self, reel_index: usize, steps: u32) -> u64 {
        let n = steps as u64;
        // n * (n - 1) / 2 fits in u64 for any u32 step count
        let ramp = self.tick_increment_ms().saturating_mul(n * n.saturating_sub(1) / 2);
        let ticking = self.base_tick_delay_ms.saturating_mul(n).saturating_add(ramp);
        self.start_offset_ms(reel_index).saturating_add(ticking)
    }

    /// Longest possible spin (every reel draws the maximum tick count)
    pub fn max_spin_duration_ms(&self) -> u64 {
        let max_steps = self.min_steps.saturating_add(self.extra_steps.saturating_sub(1));
        (0..REEL_COUNT)
            .map(|reel| self.projected_settle_ms(reel, max_steps))
            .max()
            .unwrap_or(0)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}
