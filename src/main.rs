//! Headless demo driver
//!
//! Runs a session against the builtin level catalog with a trivial
//! autopilot (the paddle shadows the first ball) and logs the outcome.
//! Useful for profiling the simulation and sanity-checking level data
//! without a renderer attached.

use breakout_core::consts::{PHYSICS_INTERVAL_MS, SECONDARY_INTERVAL_MS};
use breakout_core::sim::{GameEvent, GameState, TickInput, secondary_tick, tick};
use breakout_core::{LevelError, LevelSet};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let level_index = args
        .next()
        .and_then(|a| a.parse().ok())
        .unwrap_or(0usize);
    let seed = args.next().and_then(|a| a.parse().ok()).unwrap_or(0xB41Cu64);

    if let Err(err) = run(level_index, seed) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run(level_index: usize, seed: u64) -> Result<(), LevelError> {
    let levels = LevelSet::builtin();
    let mut state = GameState::new(levels.level(level_index)?, seed);

    let mut launch = true;
    let mut secondary_budget = 0.0f32;
    // Ten simulated minutes is plenty for any level, autopiloted or not
    let max_ticks = (10.0 * 60.0 * 1000.0 / PHYSICS_INTERVAL_MS) as usize;

    for _ in 0..max_ticks {
        let input = TickInput {
            launch,
            pointer_x: state.balls.first().map(|b| b.rect.center().x),
            accelerate: true,
            ..TickInput::default()
        };
        launch = false;

        tick(&mut state, &input, PHYSICS_INTERVAL_MS);
        // Balls reset to the paddle after a miss; relaunch next tick
        launch = state.balls.iter().any(|b| b.waiting);

        secondary_budget += PHYSICS_INTERVAL_MS;
        while secondary_budget >= SECONDARY_INTERVAL_MS {
            if let Err(err) = secondary_tick(&mut state, SECONDARY_INTERVAL_MS) {
                log::error!("power-up defect: {err}");
            }
            secondary_budget -= SECONDARY_INTERVAL_MS;
        }

        for event in state.take_events() {
            let (score, lives) = state.hud();
            match event {
                GameEvent::LevelCleared { level } => {
                    log::info!("level {level} cleared: score {score}, lives {lives}");
                }
                GameEvent::GameOver { score } => {
                    log::info!("game over: score {score}");
                }
            }
            return Ok(());
        }
    }

    let (score, lives) = state.hud();
    log::info!("time box reached: score {score}, lives {lives}");
    Ok(())
}
