//! Batch simulation on a virtual clock

use anyhow::Result;
use serde::Serialize;

use tr_core::{GameStats, OutcomeGenerator};
use tr_machine::{MachineConfig, SlotMachine, VirtualClock};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub spins_requested: u64,
    pub spins_played: u64,
    pub level: u8,
    pub bet: u32,
    pub win_rate: f64,
    pub expected_win_rate: f64,
    /// Share of all-distinct draws turned into a near miss
    pub near_miss_rate: f64,
    pub mean_spin_ms: f64,
    pub player_balance: i64,
    pub machine_balance: i64,
    pub stats: GameStats,
    /// Set when the player ran out of funds before the last spin
    pub stopped_early: bool,
}

pub fn run(
    config: MachineConfig,
    spins: u64,
    level: Option<i64>,
    bet: Option<i64>,
) -> Result<SimulationReport> {
    let mut machine = SlotMachine::in_memory(config);
    if let Some(level) = level {
        machine.set_level(level);
    }
    if let Some(bet) = bet {
        machine.set_bet(bet);
    }

    let mut clock = VirtualClock::new();
    let mut played = 0u64;
    let mut distinct_draws = 0u64;
    let mut biased = 0u64;
    let mut total_ms = 0u64;
    let mut stopped_early = false;

    for _ in 0..spins {
        if let Err(rejection) = machine.spin() {
            log::info!("Simulation stopped after {played} spins: {rejection}");
            stopped_early = true;
            break;
        }
        let Some(summary) = machine.run_spin(&mut clock, |_| {}) else {
            anyhow::bail!("spin {} could not be paid out", played + 1);
        };

        played += 1;
        total_ms += summary.duration_ms;
        if summary.raw_outcome.is_all_distinct() {
            distinct_draws += 1;
            if summary.was_biased() {
                biased += 1;
            }
        }
    }

    let ledger = machine.ledger();
    let stats = *ledger.stats();
    Ok(SimulationReport {
        spins_requested: spins,
        spins_played: played,
        level: machine.level().get(),
        bet: machine.bet().get(),
        win_rate: ratio(stats.wins, played),
        expected_win_rate: OutcomeGenerator::new(machine.level()).three_of_a_kind_probability(),
        near_miss_rate: ratio(biased, distinct_draws),
        mean_spin_ms: ratio(total_ms, played),
        player_balance: ledger.player_balance(),
        machine_balance: ledger.machine_balance(),
        stats,
        stopped_early,
    })
}

fn ratio(n: u64, d: u64) -> f64 {
    if d == 0 { 0.0 } else { n as f64 / d as f64 }
}

impl std::fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Spins:           {} of {}{}",
            self.spins_played,
            self.spins_requested,
            if self.stopped_early { " (out of funds)" } else { "" }
        )?;
        writeln!(f, "Level / bet:     {} / {}", self.level, self.bet)?;
        writeln!(
            f,
            "Win rate:        {:.4} (expected {:.4})",
            self.win_rate, self.expected_win_rate
        )?;
        writeln!(f, "Near-miss rate:  {:.4} (expected 0.6000)", self.near_miss_rate)?;
        writeln!(f, "Mean spin:       {:.0} ms", self.mean_spin_ms)?;
        writeln!(f, "Player balance:  {}", self.player_balance)?;
        writeln!(f, "Machine balance: {}", self.machine_balance)?;
        writeln!(f, "Biggest win:     {}", self.stats.biggest_win)?;
        write!(f, "Return:          {:.1}%", self.stats.rtp())
    }
}
