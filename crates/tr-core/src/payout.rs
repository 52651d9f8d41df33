//! Payout resolution

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::limits::BetAmount;
use crate::snapshot::{LedgerSnapshot, checked};
use crate::symbols::OutcomeTriple;

/// Three of a kind pays the bet times this
pub const WIN_MULTIPLIER: i64 = 3;

/// Transfer decided by one outcome.
///
/// `amount` is what moves between player and machine: the win on a
/// three of a kind, the bet otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub is_win: bool,
    pub amount: i64,
    pub bet: i64,
}

/// Payout plus the ledger values it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub outcome: OutcomeTriple,
    pub payout: Payout,
    pub updated: LedgerSnapshot,
}

/// Classify an outcome and size the transfer
pub fn evaluate(outcome: &OutcomeTriple, bet: BetAmount) -> Payout {
    let bet = bet.as_i64();
    if outcome.is_three_of_a_kind() {
        Payout {
            is_win: true,
            amount: bet * WIN_MULTIPLIER,
            bet,
        }
    } else {
        Payout {
            is_win: false,
            amount: bet,
            bet,
        }
    }
}

/// Resolve a settled spin against the current ledger values.
///
/// Pure: `current` is never modified. Either every field of the returned
/// snapshot reflects the spin, or an error comes back and nothing does.
pub fn resolve(
    outcome: OutcomeTriple,
    bet: BetAmount,
    current: &LedgerSnapshot,
) -> CoreResult<Resolution> {
    let payout = evaluate(&outcome, bet);
    let updated = apply_payout(current, &payout)?;
    Ok(Resolution {
        outcome,
        payout,
        updated,
    })
}

fn apply_payout(current: &LedgerSnapshot, payout: &Payout) -> CoreResult<LedgerSnapshot> {
    // bet is clamped to [1, 100] so both conversions are lossless
    let bet = payout.bet.unsigned_abs();
    let amount = payout.amount.unsigned_abs();

    if payout.is_win {
        Ok(LedgerSnapshot {
            player_balance: checked(
                current.player_balance.checked_add(payout.amount),
                "playerBalance",
            )?,
            machine_balance: checked(
                current.machine_balance.checked_sub(payout.amount),
                "machineBalance",
            )?,
            stats: current.stats.with_win(bet, amount)?,
        })
    } else {
        Ok(LedgerSnapshot {
            player_balance: checked(
                current.player_balance.checked_sub(payout.amount),
                "playerBalance",
            )?,
            machine_balance: checked(
                current.machine_balance.checked_add(payout.amount),
                "machineBalance",
            )?,
            stats: current.stats.with_loss(bet)?,
        })
    }
}
