//! Reel animation timing
//!
//! Runs full spins on a virtual clock and checks the event stream.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tr_core::{OutcomeTriple, REEL_COUNT, Symbol};
use tr_reels::{ReelAnimator, ReelEvent, ReelEventKind, TimingConfig, VirtualClock};

fn run_spin(seed: u64, outcome: OutcomeTriple, timing: TimingConfig) -> (ReelAnimator, Vec<ReelEvent>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut clock = VirtualClock::new();
    let mut anim = ReelAnimator::new(outcome, [[Symbol::MoneyMouth; 3]; REEL_COUNT], timing, &mut rng);
    let mut events = Vec::new();
    anim.run(&mut clock, &mut rng, |e| events.push(e.clone()));
    (anim, events)
}

fn events_for(events: &[ReelEvent], reel: usize) -> Vec<&ReelEvent> {
    events.iter().filter(|e| e.reel_index == reel).collect()
}

#[test]
fn test_reels_start_on_stagger() {
    let outcome = OutcomeTriple::new([Symbol::Alien, Symbol::ColdFace, Symbol::Collision]);
    let (_, events) = run_spin(1, outcome, TimingConfig::normal());

    for (reel, offset) in [(0usize, 0u64), (1, 500), (2, 1000)] {
        let first = events_for(&events, reel)[0];
        assert_eq!(first.kind, ReelEventKind::Started);
        assert_eq!(first.timestamp_ms, offset);
    }
}

#[test]
fn test_tick_gaps_grow_linearly() {
    let outcome = OutcomeTriple::matching(Symbol::HeartOnFire);
    for seed in 0..20 {
        let (_, events) = run_spin(seed, outcome, TimingConfig::normal());

        for reel in 0..REEL_COUNT {
            let reel_events = events_for(&events, reel);
            let mut times = vec![reel_events[0].timestamp_ms];
            times.extend(
                reel_events
                    .iter()
                    .filter(|e| matches!(e.kind, ReelEventKind::Tick { .. }))
                    .map(|e| e.timestamp_ms),
            );

            let ticks = times.len() - 1;
            assert!((15..=24).contains(&ticks), "reel {reel} ticked {ticks} times");

            for (i, pair) in times.windows(2).enumerate() {
                assert_eq!(pair[1] - pair[0], 50 + 10 * i as u64);
            }
        }
    }
}

#[test]
fn test_each_reel_settles_after_its_last_tick_on_its_symbol() {
    let outcome = OutcomeTriple::new([Symbol::Collision, Symbol::Collision, Symbol::Alien]);
    let (anim, events) = run_spin(3, outcome, TimingConfig::normal());

    for reel in 0..REEL_COUNT {
        let reel_events = events_for(&events, reel);
        let last = reel_events.last().unwrap();
        let before = reel_events[reel_events.len() - 2];

        assert_eq!(
            last.kind,
            ReelEventKind::Settled {
                symbol: outcome[reel]
            }
        );
        assert!(matches!(before.kind, ReelEventKind::Tick { .. }));
        assert_eq!(last.timestamp_ms, before.timestamp_ms);
    }

    assert_eq!(anim.windows(), [[Symbol::Collision; 3], [Symbol::Collision; 3], [Symbol::Alien; 3]]);
}

#[test]
fn test_event_stream_is_time_ordered_and_complete_last() {
    let outcome = OutcomeTriple::matching(Symbol::Alien);
    let (anim, events) = run_spin(4, outcome, TimingConfig::normal());

    assert!(events.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));

    let last = events.last().unwrap();
    assert!(matches!(last.kind, ReelEventKind::Settled { .. }));
    assert_eq!(Some(last.timestamp_ms), anim.total_duration_ms());
    assert_eq!(last.timestamp_ms, *anim.projected_settle_ms().iter().max().unwrap());
}

#[test]
fn test_reel_two_settles_last_with_equal_steps() {
    let outcome = OutcomeTriple::matching(Symbol::ColdFace);
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut clock = VirtualClock::new();
    let mut anim = ReelAnimator::with_steps(
        outcome,
        [[Symbol::Alien; 3]; REEL_COUNT],
        TimingConfig::normal(),
        [20, 20, 20],
    );

    let mut settle_order = Vec::new();
    anim.run(&mut clock, &mut rng, |e| {
        if let ReelEventKind::Settled { .. } = e.kind {
            settle_order.push((e.reel_index, e.timestamp_ms));
        }
    });

    // 20 ticks: 50 * 20 + 10 * 190 = 2900
    assert_eq!(settle_order, vec![(0, 2900), (1, 3400), (2, 3900)]);
}

#[test]
fn test_instant_profile_keeps_tick_count() {
    let outcome = OutcomeTriple::matching(Symbol::MoneyMouth);
    let (anim, events) = run_spin(6, outcome, TimingConfig::instant());

    assert_eq!(anim.total_duration_ms(), Some(0));
    let ticks = events
        .iter()
        .filter(|e| matches!(e.kind, ReelEventKind::Tick { .. }))
        .count();
    assert!(ticks >= 45);
}

#[test]
fn test_same_seed_same_animation() {
    let outcome = OutcomeTriple::new([Symbol::Alien, Symbol::ColdFace, Symbol::Collision]);
    let (_, a) = run_spin(99, outcome, TimingConfig::normal());
    let (_, b) = run_spin(99, outcome, TimingConfig::normal());
    assert_eq!(a, b);
}

#[test]
fn test_huge_tick_delay_saturates() {
    let timing = TimingConfig {
        base_tick_delay_ms: u64::MAX,
        ..TimingConfig::normal()
    };
    let outcome = OutcomeTriple::new([Symbol::Alien, Symbol::ColdFace, Symbol::Collision]);
    let (anim, events) = run_spin(3, outcome, timing.clone());

    assert!(anim.is_complete());
    assert_eq!(anim.total_duration_ms(), Some(u64::MAX));
    assert_eq!(anim.projected_settle_ms(), [u64::MAX; REEL_COUNT]);
    assert_eq!(timing.max_spin_duration_ms(), u64::MAX);
    assert_eq!(timing.delay_before_tick(u32::MAX), u64::MAX);

    let settled: Vec<_> = events
        .iter()
        .filter_map(|e| match e.kind {
            ReelEventKind::Settled { symbol } => Some(symbol),
            _ => None,
        })
        .collect();
    assert_eq!(settled.len(), REEL_COUNT);
}
