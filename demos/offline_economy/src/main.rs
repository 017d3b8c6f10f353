//! Offline Economy Example
//!
//! Demonstrates catchup with a small idle economy and checks, end to end,
//! that offline catch-up is deterministic:
//! - two engines replaying the same actions agree
//! - catching up offline equals ticking live
//! - the chunk size never changes the outcome
//! - a save from an old schema restores and keeps catching up
//!
//! Run with `RUST_LOG=debug` to see the engine's catch-up diagnostics.

use catchup_core::{
    numeric_delta, Action, Engine, EngineConfig, Event, EventSink, ManualClock, Session,
};
use catchup_save::{JsonMap, MigrationChain, MigrationCodec, SaveCodec, SaveFormat};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Economy {
    gold: i64,
    miners: i64,
    gold_per_miner: i64,
}

#[derive(Debug, Clone, PartialEq)]
enum Order {
    HireMiner { cost: i64 },
    UpgradePicks,
}

type EconomyReducer = Box<dyn Fn(&Economy, &Action<Order>) -> Economy>;

fn economy() -> Economy {
    Economy {
        gold: 10,
        miners: 1,
        gold_per_miner: 1,
    }
}

fn reducer(milestones: Option<EventSink>) -> EconomyReducer {
    Box::new(move |state: &Economy, action: &Action<Order>| {
        let next = match action {
            Action::Tick(_) => Economy {
                gold: state.gold + state.miners * state.gold_per_miner,
                ..state.clone()
            },
            Action::Custom(Order::HireMiner { cost }) if state.gold >= *cost => Economy {
                gold: state.gold - cost,
                miners: state.miners + 1,
                ..state.clone()
            },
            Action::Custom(Order::HireMiner { .. }) => state.clone(),
            Action::Custom(Order::UpgradePicks) => Economy {
                gold_per_miner: state.gold_per_miner * 2,
                ..state.clone()
            },
        };
        if let Some(sink) = &milestones {
            if next.gold / 100 > state.gold / 100 {
                sink.push(Event::new("gold_milestone").with("gold", next.gold / 100 * 100));
            }
        }
        next
    })
}

fn engine(config: EngineConfig) -> Engine<Economy, Order, EconomyReducer> {
    Engine::new(config, reducer(None), economy())
}

fn check(name: &str, passed: bool, failures: &mut Vec<String>) {
    if passed {
        info!(check = name, "ok");
    } else {
        error!(check = name, "mismatch");
        failures.push(name.to_string());
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Catchup Offline Economy Example ===\n");

    let mut failures = Vec::new();
    let config = match EngineConfig::new(1_000, 8 * 3_600_000, 20_000, 500) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid engine config");
            return ExitCode::FAILURE;
        }
    };

    // Determinism: identical action streams give identical states
    let actions: Vec<Action<Order>> = (0..300)
        .map(|i| match i % 50 {
            10 => Action::Custom(Order::HireMiner { cost: 25 }),
            40 => Action::Custom(Order::UpgradePicks),
            _ => Action::Tick(1_000),
        })
        .collect();
    let first = engine(config).replay(actions.clone());
    let second = engine(config).replay(actions);
    println!(
        "Replay: {} ticks -> {} gold, {} miners",
        first.ticks_applied, first.state.gold, first.state.miners
    );
    check("replay determinism", first.state == second.state, &mut failures);

    // Offline catch-up equals live ticking
    let ticks = 5_000;
    let live = engine(config).tick(ticks);
    let offline = engine(config).apply_offline(0, ticks as i64 * 1_000);
    println!(
        "Offline: {} ticks in {} chunks -> {} gold",
        offline.ticks_applied, offline.chunks, offline.state.gold
    );
    check("offline equals live", live.state == offline.state, &mut failures);

    // Chunk size only slices the work
    let small_chunks = EngineConfig::new(1_000, 8 * 3_600_000, 20_000, 7);
    let chunk_independent = small_chunks
        .map(|small| {
            let sliced = engine(small).apply_offline(0, ticks as i64 * 1_000);
            sliced.state == offline.state && sliced.chunks > offline.chunks
        })
        .unwrap_or(false);
    check("chunk size independence", chunk_independent, &mut failures);

    // A long absence is clamped to the offline window and capped
    let away = engine(config).apply_offline(0, 3 * 24 * 3_600_000);
    println!(
        "Three days away: clamped to {} ms, {} of {} ticks applied, {} ms unapplied",
        away.clamped_delta_ms,
        away.ticks_applied,
        away.ticks_requested,
        away.unapplied_delta_ms()
    );
    check(
        "long absence bounded",
        away.was_clamped && away.was_capped && away.ticks_applied == config.max_ticks_total(),
        &mut failures,
    );

    // Restore a save written before miners existed and keep playing
    let migrations = MigrationChain::new()
        .with(0, |mut m: JsonMap| {
            if let Some(coins) = m.remove("coins") {
                m.insert("gold".into(), coins);
            }
            m.entry("miners").or_insert(json!(1));
            m
        })
        .with(1, |mut m: JsonMap| {
            m.entry("gold_per_miner").or_insert(json!(1));
            m
        });
    let codec = SaveCodec::new(MigrationCodec::<Economy>::serde(2).with_migrations(migrations));
    let legacy = r#"{"schemaVersion": 0, "lastObservedMs": 1000, "state": {"coins": 95}}"#;

    match codec.from_text(legacy, SaveFormat::Json, None) {
        Ok(save) => {
            let milestones = EventSink::new();
            let (state, last_observed_ms) = save.into_parts();
            let engine = Engine::new(config, reducer(Some(milestones.clone())), state)
                .with_event_sink(milestones)
                .with_resource_delta(numeric_delta::<Economy>);
            let mut session = Session::new(engine, ManualClock::new(61_500), last_observed_ms);

            let result = session.apply_offline();
            println!(
                "Legacy save: {} ticks applied, gold {:+}, {} milestone(s)",
                result.ticks_applied,
                result.resources_delta.get("gold").copied().unwrap_or(0.0),
                result.events.len()
            );
            check(
                "legacy save resumes",
                session.state().gold == 155 && session.last_observed_ms() == 61_000,
                &mut failures,
            );

            match codec
                .capture_session(&session)
                .and_then(|save| codec.to_text(&save, SaveFormat::JsonPretty))
            {
                Ok(text) => println!("\nSaved:\n{text}\n"),
                Err(e) => {
                    error!(error = %e, "failed to save session");
                    failures.push("save session".to_string());
                }
            }
        }
        Err(e) => {
            error!(error = %e, "failed to load legacy save");
            failures.push("legacy save resumes".to_string());
        }
    }

    if failures.is_empty() {
        println!("All checks passed.");
        ExitCode::SUCCESS
    } else {
        println!("Failed checks: {}", failures.join(", "));
        ExitCode::FAILURE
    }
}
