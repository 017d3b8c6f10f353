//! Property tests for the engine's determinism and catch-up bounds

use catchup_core::{Action, Engine, EngineConfig};
use proptest::prelude::*;

#[derive(Debug, Clone, PartialEq)]
struct Farm {
    crops: i64,
    rate: i64,
    elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
enum Cmd {
    Plant(i64),
    Harvest,
}

type FarmReducer = fn(&Farm, &Action<Cmd>) -> Farm;

fn reduce(state: &Farm, action: &Action<Cmd>) -> Farm {
    match action {
        Action::Tick(dt_ms) => Farm {
            crops: state.crops.wrapping_add(state.rate),
            elapsed_ms: state.elapsed_ms.wrapping_add(*dt_ms),
            ..state.clone()
        },
        Action::Custom(Cmd::Plant(n)) => Farm {
            rate: state.rate.wrapping_add(*n),
            ..state.clone()
        },
        Action::Custom(Cmd::Harvest) => Farm {
            crops: 0,
            ..state.clone()
        },
    }
}

fn farm() -> Farm {
    Farm {
        crops: 0,
        rate: 1,
        elapsed_ms: 0,
    }
}

fn engine(config: EngineConfig) -> Engine<Farm, Cmd, FarmReducer> {
    Engine::new(config, reduce as FarmReducer, farm())
}

fn action_strategy() -> impl Strategy<Value = Action<Cmd>> {
    prop_oneof![
        (1u64..5_000).prop_map(Action::Tick),
        (-5i64..5).prop_map(|n| Action::Custom(Cmd::Plant(n))),
        Just(Action::Custom(Cmd::Harvest)),
    ]
}

proptest! {
    #[test]
    fn replay_is_deterministic(actions in prop::collection::vec(action_strategy(), 0..64)) {
        let config = EngineConfig::new(1_000, 60_000, 60, 8).unwrap();
        let mut a = engine(config);
        let mut b = engine(config);

        let ra = a.replay(actions.clone());
        let rb = b.replay(actions.clone());
        prop_assert_eq!(&ra.state, &rb.state);
        prop_assert_eq!(ra.ticks_applied, rb.ticks_applied);
        prop_assert_eq!(
            ra.ticks_applied,
            actions.iter().filter(|a| a.is_tick()).count() as u64
        );
    }

    #[test]
    fn offline_matches_live_ticking(n in 0u64..200, dt_ms in 1u64..2_000, chunk in 1u64..50) {
        let config = EngineConfig::new(dt_ms, n * dt_ms, n, chunk).unwrap();
        let mut live = engine(config);
        let mut offline = engine(config);

        let ticked = live.tick(n);
        let caught_up = offline.apply_offline(0, (n * dt_ms) as i64);
        prop_assert_eq!(caught_up.ticks_applied, n);
        prop_assert_eq!(caught_up.state, ticked.state);
    }

    #[test]
    fn clamp_and_cap_hold(
        last in -1_000_000_000i64..1_000_000_000,
        now in -1_000_000_000i64..1_000_000_000,
        dt_ms in 1u64..10_000,
        max_offline_ms in 0u64..10_000_000,
        max_ticks_total in 0u64..5_000,
        chunk in 1u64..1_000,
    ) {
        let config = EngineConfig::new(dt_ms, max_offline_ms, max_ticks_total, chunk).unwrap();
        let result = engine(config).apply_offline(last, now);

        prop_assert_eq!(result.requested_delta_ms, now - last);
        prop_assert!(result.clamped_delta_ms <= max_offline_ms);
        prop_assert!(result.ticks_applied <= max_ticks_total);
        prop_assert_eq!(result.ticks_applied, result.ticks_capped);
        prop_assert!(result.applied_delta_ms <= result.clamped_delta_ms);
        prop_assert_eq!(
            result.unapplied_delta_ms(),
            result.lost_to_cap_ms() + result.sub_tick_remainder_ms()
        );
        prop_assert!(result.sub_tick_remainder_ms() < dt_ms);
        prop_assert_eq!(result.chunks, result.ticks_applied.div_ceil(chunk));
        if result.was_backwards() {
            prop_assert_eq!(result.ticks_applied, 0);
            prop_assert_eq!(&result.state, &farm());
        }
    }

    #[test]
    fn chunk_size_does_not_change_result(
        elapsed in 0i64..500_000,
        chunk_a in 1u64..100,
        chunk_b in 1u64..100,
    ) {
        let a = EngineConfig::new(1_000, 400_000, 300, chunk_a).unwrap();
        let b = EngineConfig::new(1_000, 400_000, 300, chunk_b).unwrap();

        let ra = engine(a).apply_offline(0, elapsed);
        let rb = engine(b).apply_offline(0, elapsed);
        prop_assert_eq!(ra.ticks_applied, rb.ticks_applied);
        prop_assert_eq!(ra.state, rb.state);
    }
}
