//! tr-state: Session ledger and persistence
//!
//! Balances, bet, level and statistics, plus the key-value store they are
//! saved to after every mutation.

mod ledger;
mod store;

pub use ledger::*;
pub use store::*;
