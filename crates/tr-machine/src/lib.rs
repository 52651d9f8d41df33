//! tr-machine: Tri-Reel slot machine facade
//!
//! ## Spin flow
//!
//! ```text
//! spin() ──► OutcomeGenerator ──► ReelAnimator ──► step() × N ──► SessionLedger
//!   │            (final triple)      (reel events)     (last)        (settle + persist)
//!   └── rejected: InProgress / InsufficientBalance
//! ```
//!
//! The ledger is untouched until every reel has settled. `run_spin` drives
//! the same loop against a [`tr_reels::Clock`].

mod config;
mod machine;
mod prompt;

pub use config::*;
pub use machine::*;
pub use prompt::*;

pub use tr_reels::{Clock, ReelEvent, ReelEventKind, TimingConfig, TimingProfile, VirtualClock, WallClock};
pub use tr_state::{JsonFileStore, KeyValueStore, MemoryStore, SpinRejection};
