//! # tr-core - Outcome engine for the Tri-Reel slot machine
//!
//! Everything that decides *what* a spin produces and *how much* it moves
//! between the player and the machine. No timing, no persistence.
//!
//! ## Architecture
//!
//! ```text
//! DifficultyLevel
//!     │
//!     v
//! OutcomeGenerator ── weighted space (125 + 5L) ── near-miss pass
//!     │
//!     v
//! OutcomeTriple + BetAmount + LedgerSnapshot
//!     │
//!     v
//! payout::resolve → Resolution { payout, updated snapshot }
//! ```

pub mod error;
pub mod limits;
pub mod outcome;
pub mod payout;
pub mod snapshot;
pub mod symbols;

pub use error::*;
pub use limits::*;
pub use outcome::*;
pub use payout::*;
pub use snapshot::*;
pub use symbols::*;
