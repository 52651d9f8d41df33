//! # tr-reels - Reel animation for Tri-Reel
//!
//! Three reels, each an independent `Idle → Spinning → Settled` state
//! machine, driven by one timer queue on one thread. Reels start on a
//! stagger, tick random noise with linearly growing delays, then lock to
//! the symbol the outcome generator picked for them.
//!
//! ## Architecture
//!
//! ```text
//! ReelAnimator
//!     │
//!     ├── TimingConfig (offsets, base delay, deceleration)
//!     ├── TimerQueue<ReelTimer> (due time, insertion order)
//!     └── [Reel; 3]
//!           │
//!           v
//!     ReelEvent stream ── Clock (virtual / wall) ── observer
//! ```

pub mod animator;
pub mod reel;
pub mod scheduler;
pub mod timing;

pub use animator::*;
pub use reel::*;
pub use scheduler::*;
pub use timing::*;
