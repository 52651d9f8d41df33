//! Terminal rendering: glyphs, reel frames, messages, stats

use std::fmt::Write as _;

use tr_core::{GameStats, REEL_COUNT, REEL_ROWS, ReelWindow, Symbol};
use tr_machine::{SlotMachine, SpinRejection, SpinSummary};

/// Emoji shown for each symbol
pub fn glyph(symbol: Symbol) -> &'static str {
    match symbol {
        Symbol::MoneyMouth => "🤑",
        Symbol::ColdFace => "🥶",
        Symbol::Alien => "👽",
        Symbol::HeartOnFire => "❤️‍🔥",
        Symbol::Collision => "💥",
    }
}

/// Three rows, one column per reel
pub fn render_reels(windows: &[ReelWindow; REEL_COUNT]) -> String {
    let mut out = String::new();
    for row in 0..REEL_ROWS {
        out.push_str("  │");
        for window in windows {
            let _ = write!(out, " {} │", glyph(window[row]));
        }
        out.push('\n');
    }
    out
}

/// Line shown after a spin
pub fn spin_message(summary: &SpinSummary) -> String {
    if summary.is_win() {
        format!("You won {}!", summary.payout.amount)
    } else {
        "So close, try again".to_string()
    }
}

pub fn rejection_message(rejection: &SpinRejection) -> String {
    match rejection {
        SpinRejection::InProgress => "Reels are still spinning".to_string(),
        SpinRejection::InsufficientBalance { balance, bet } => {
            format!("Balance {balance} does not cover the bet of {bet}")
        }
    }
}

pub fn status_line(machine: &SlotMachine) -> String {
    let ledger = machine.ledger();
    format!(
        "Balance: {}  Machine: {}  Bet: {}  Level: {}",
        ledger.player_balance(),
        ledger.machine_balance(),
        machine.bet().get(),
        machine.level().get()
    )
}

pub fn stats_table(stats: &GameStats) -> String {
    format!(
        "Games played:  {}\n\
         Wins:          {}\n\
         Losses:        {}\n\
         Win rate:      {:.0}%\n\
         Biggest win:   {}\n\
         Total wagered: {}\n\
         Total won:     {}\n\
         Return:        {:.0}%\n",
        stats.games_played,
        stats.wins,
        stats.losses,
        stats.hit_rate(),
        stats.biggest_win,
        stats.total_wagered,
        stats.total_won,
        stats.rtp()
    )
}
