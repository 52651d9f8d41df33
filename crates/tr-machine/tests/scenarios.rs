//! End-to-end machine scenarios on a virtual clock

use std::sync::Arc;

use approx::assert_abs_diff_eq;

use tr_core::{GameStats, LedgerSnapshot, OutcomeTriple, Symbol};
use tr_machine::{
    JsonFileStore, KeyValueStore, MachineConfig, MemoryStore, ReelEventKind, SlotMachine,
    SpinEvent, SpinRejection, TimingConfig, VirtualClock,
};

fn config(seed: u64) -> MachineConfig {
    MachineConfig {
        timing: TimingConfig::instant(),
        seed: Some(seed),
        ..MachineConfig::default()
    }
}

fn finish(machine: &mut SlotMachine) -> tr_machine::SpinSummary {
    let mut clock = VirtualClock::new();
    machine.run_spin(&mut clock, |_| {}).unwrap()
}

#[test]
fn test_three_of_a_kind_pays_three_times_bet() {
    let mut machine = SlotMachine::in_memory(config(1));
    machine.spin_forced(OutcomeTriple::matching(Symbol::Alien)).unwrap();
    let summary = finish(&mut machine);

    assert!(summary.is_win());
    assert_eq!(summary.payout.amount, 30);

    let ledger = machine.ledger();
    assert_eq!(ledger.player_balance(), 1030);
    assert_eq!(ledger.machine_balance(), 4970);
    assert_eq!(ledger.stats().wins, 1);
    assert_eq!(ledger.stats().total_won, 30);
    assert_eq!(ledger.stats().biggest_win, 30);
    assert_eq!(ledger.stats().total_wagered, 10);
}

#[test]
fn test_distinct_outcome_loses_bet() {
    let mut machine = SlotMachine::in_memory(config(2));
    machine
        .spin_forced(OutcomeTriple::new([Symbol::Alien, Symbol::ColdFace, Symbol::Collision]))
        .unwrap();
    let summary = finish(&mut machine);

    assert!(!summary.is_win());
    let ledger = machine.ledger();
    assert_eq!(ledger.player_balance(), 990);
    assert_eq!(ledger.machine_balance(), 5010);
    assert_eq!(ledger.stats().losses, 1);
    assert_eq!(ledger.stats().games_played, 1);
}

#[test]
fn test_spin_while_spinning_is_dropped() {
    let mut machine = SlotMachine::in_memory(config(3));
    machine.spin().unwrap();
    let before = *machine.ledger().snapshot();
    let windows = machine.reels();

    assert_eq!(machine.spin(), Err(SpinRejection::InProgress));
    assert_eq!(*machine.ledger().snapshot(), before);
    assert_eq!(machine.reels(), windows);

    // bet, level and reset are frozen too
    assert!(!machine.increase_bet());
    assert!(!machine.set_level(4));
    assert!(!machine.reset(&mut |_: &str| true).unwrap());
    assert_eq!(machine.bet().get(), 10);

    finish(&mut machine);
    assert!(!machine.is_spinning());
    assert!(machine.spin().is_ok());
}

#[test]
fn test_insufficient_balance_is_dropped() {
    let config = MachineConfig {
        starting_player_balance: 9,
        ..config(4)
    };
    let mut machine = SlotMachine::in_memory(config);
    assert_eq!(
        machine.spin(),
        Err(SpinRejection::InsufficientBalance { balance: 9, bet: 10 })
    );
    assert!(!machine.is_spinning());
    assert_eq!(machine.next_due_ms(), None);

    machine.decrease_bet();
    assert!(machine.spin().is_ok());
}

#[test]
fn test_no_ledger_change_before_final_settle() {
    let mut machine = SlotMachine::in_memory(MachineConfig {
        timing: TimingConfig::normal(),
        seed: Some(5),
        ..MachineConfig::default()
    });
    let start = *machine.ledger().snapshot();
    machine.spin_forced(OutcomeTriple::matching(Symbol::Collision)).unwrap();
    let expected_end = machine
        .animator()
        .map(|a| *a.projected_settle_ms().iter().max().unwrap())
        .unwrap();

    let mut clock = VirtualClock::new();
    let mut settles = 0;
    let mut events = Vec::new();
    let summary = machine
        .run_spin(&mut clock, |event| events.push(event.clone()))
        .unwrap();

    for event in &events {
        if let SpinEvent::Reel(reel_event) = event {
            if let ReelEventKind::Settled { .. } = reel_event.kind {
                settles += 1;
            }
        }
    }
    assert_eq!(settles, 3);
    assert!(matches!(events.last(), Some(SpinEvent::Completed(_))));
    assert_eq!(summary.duration_ms, expected_end);
    assert_eq!(summary.player_balance, start.player_balance + 30);
}

#[test]
fn test_ledger_frozen_during_step_by_step_spin() {
    let mut machine = SlotMachine::in_memory(config(6));
    let start = *machine.ledger().snapshot();
    machine.spin().unwrap();

    while let Some(event) = machine.step() {
        match event {
            SpinEvent::Reel(_) => assert_eq!(*machine.ledger().snapshot(), start),
            SpinEvent::Completed(summary) => {
                assert_ne!(*machine.ledger().snapshot(), start);
                assert_eq!(machine.last_spin(), Some(&summary));
            }
            SpinEvent::Voided { .. } => panic!("unexpected void"),
        }
    }
}

#[test]
fn test_total_funds_constant_across_spins() {
    let mut machine = SlotMachine::in_memory(config(7));
    let total = machine.ledger().snapshot().total_funds();

    for i in 0..200 {
        if i % 7 == 0 {
            machine.increase_bet();
        }
        if machine.spin().is_err() {
            break;
        }
        finish(&mut machine);
        let snapshot = machine.ledger().snapshot();
        assert_eq!(snapshot.total_funds(), total);
        assert!(snapshot.stats.is_consistent());
    }
    assert!(machine.ledger().stats().games_played > 0);
}

#[test]
fn test_win_rate_tracks_level() {
    let mut machine = SlotMachine::in_memory(MachineConfig {
        starting_player_balance: 1_000_000_000,
        default_bet: tr_core::BetAmount::new(1),
        ..config(8)
    });
    machine.set_level(5);

    let spins = 20_000;
    for _ in 0..spins {
        machine.spin().unwrap();
        finish(&mut machine);
    }

    let stats = machine.ledger().stats();
    let rate = stats.wins as f64 / spins as f64;
    assert_abs_diff_eq!(rate, 30.0 / 150.0, epsilon = 0.015);
}

#[test]
fn test_add_funds_input() {
    let mut machine = SlotMachine::in_memory(config(9));

    let added = machine.add_funds(&mut |_: &str| Some("50".to_string())).unwrap();
    assert_eq!(added, Some(50));
    assert_eq!(machine.ledger().player_balance(), 1050);

    for input in ["abc", "", "  ", "-5", "0", "2.5"] {
        let added = machine.add_funds(&mut |_: &str| Some(input.to_string())).unwrap();
        assert_eq!(added, None, "input {input:?}");
    }
    assert_eq!(machine.add_funds(&mut |_: &str| None).unwrap(), None);
    assert_eq!(machine.ledger().player_balance(), 1050);
}

#[test]
fn test_reset_needs_confirmation_and_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let mut machine = SlotMachine::new(config(10), store.clone());
    machine.spin_forced(OutcomeTriple::matching(Symbol::HeartOnFire)).unwrap();
    finish(&mut machine);
    machine.increase_bet();
    assert!(!store.is_empty());

    let mut asked = Vec::new();
    assert!(!machine.reset(&mut |msg: &str| {
        asked.push(msg.to_string());
        false
    })
    .unwrap());
    assert_eq!(asked.len(), 1);
    assert_eq!(machine.ledger().player_balance(), 1030);

    assert!(machine.reset(&mut |_: &str| true).unwrap());
    let once = *machine.ledger().snapshot();
    assert!(machine.reset(&mut |_: &str| true).unwrap());
    assert_eq!(*machine.ledger().snapshot(), once);

    assert_eq!(once, LedgerSnapshot::default());
    assert_eq!(once.stats, GameStats::default());
    assert!(store.is_empty());
    assert!(machine.last_spin().is_none());
    assert_eq!(machine.bet().get(), 15);
}

#[test]
fn test_session_restored_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    {
        let mut machine = SlotMachine::new(config(11), Arc::new(JsonFileStore::open(&path)));
        machine
            .spin_forced(OutcomeTriple::new([Symbol::ColdFace, Symbol::ColdFace, Symbol::Alien]))
            .unwrap();
        finish(&mut machine);
        machine.add_funds(&mut |_: &str| Some("100".to_string())).unwrap();
    }

    let store = JsonFileStore::open(&path);
    assert_eq!(store.get("playerBalance").unwrap().as_deref(), Some("1090"));

    let machine = SlotMachine::new(config(12), Arc::new(store));
    assert_eq!(machine.ledger().player_balance(), 1090);
    assert_eq!(machine.ledger().machine_balance(), 5000);
    assert_eq!(machine.ledger().stats().losses, 1);
}

#[test]
fn test_same_seed_same_session() {
    let play = |seed| {
        let mut machine = SlotMachine::in_memory(config(seed));
        (0..20)
            .map(|_| {
                machine.spin().unwrap();
                finish(&mut machine).outcome
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(play(13), play(13));
}
