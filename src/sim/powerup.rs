//! Power-up generation and effects
//!
//! Power-ups drop from destroyed bricks, fall toward the paddle and apply
//! their effect when caught. Generation re-rolls types that are maxed out
//! for the current session; the Random type resolves to a concrete type
//! when applied, never to itself.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::Rect;
use super::state::GameState;
use crate::consts::*;

/// Ball-speed multiplier cap for the speed-up power-up
const SPEED_UP_CAP: f32 = 1.8;
/// Ball-speed multiplier floor for the speed-down power-up
const SPEED_DOWN_FLOOR: f32 = 0.4;
/// Ball count cap for the extra-ball power-up
const MAX_BALLS: usize = 4;
/// Supported score bonus values
const SCORE_VALUES: [u32; 3] = [200, 500, 1000];

/// Unrecoverable power-up defects; these indicate a data or logic error,
/// not a transient fault.
#[derive(Debug, Error, PartialEq)]
pub enum PowerUpError {
    #[error("invalid power-up configuration: {kind:?} with value {value}")]
    InvalidConfiguration { kind: PowerUpKind, value: f64 },
}

/// The enumerated power-up types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    NoClip,
    BallSpeedUp,
    BallSpeedDown,
    PaddleGrow,
    ExtraBall,
    ExtraLife,
    ScoreAdd,
    Random,
}

impl PowerUpKind {
    const ALL: [PowerUpKind; 8] = [
        PowerUpKind::NoClip,
        PowerUpKind::BallSpeedUp,
        PowerUpKind::BallSpeedDown,
        PowerUpKind::PaddleGrow,
        PowerUpKind::ExtraBall,
        PowerUpKind::ExtraLife,
        PowerUpKind::ScoreAdd,
        PowerUpKind::Random,
    ];

    /// A type is invalid when its effect is already maxed out or
    /// meaningless for the current session state.
    fn is_invalid(self, state: &GameState) -> bool {
        match self {
            PowerUpKind::NoClip => state.no_clip,
            PowerUpKind::BallSpeedUp => state.ball_speed_multiplier >= SPEED_UP_CAP,
            PowerUpKind::BallSpeedDown => state.ball_speed_multiplier <= SPEED_DOWN_FLOOR,
            PowerUpKind::PaddleGrow => state.paddle.rect.size.x >= FIELD_WIDTH / 2.0,
            PowerUpKind::ExtraBall => state.ball_count() >= MAX_BALLS,
            PowerUpKind::ExtraLife
            | PowerUpKind::ScoreAdd
            | PowerUpKind::Random => false,
        }
    }
}

/// A falling power-up entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    /// Type-specific magnitude, resolved at spawn time
    pub value: f64,
    pub rect: Rect,
}

impl PowerUp {
    /// Fall toward the bottom edge; returns true once fully below it.
    pub fn fall(&mut self, dt_ms: f32) -> bool {
        self.rect.pos.y += POWERUP_FALL_SPEED * dt_ms;
        self.rect.bottom() > FIELD_HEIGHT
    }

    /// Apply this power-up's effect to the session.
    ///
    /// An unrecognized type/value combination is a programming error and
    /// fails with [`PowerUpError::InvalidConfiguration`].
    pub fn apply(&self, state: &mut GameState) -> Result<(), PowerUpError> {
        match self.kind {
            PowerUpKind::NoClip => state.arm_no_clip(),
            PowerUpKind::BallSpeedUp => state.ball_speed_multiplier += self.value as f32,
            PowerUpKind::BallSpeedDown => state.ball_speed_multiplier -= self.value as f32,
            PowerUpKind::PaddleGrow => state.paddle.grow(self.value as f32),
            PowerUpKind::ExtraBall => state.add_ball(),
            PowerUpKind::ExtraLife => state.lives += self.value as u32,
            PowerUpKind::ScoreAdd => {
                let value = self.value as u32;
                if !SCORE_VALUES.contains(&value) {
                    return Err(PowerUpError::InvalidConfiguration {
                        kind: self.kind,
                        value: self.value,
                    });
                }
                state.score += value;
            }
            PowerUpKind::Random => {
                // Resolve to a freshly drawn concrete type, never Random
                let resolved = loop {
                    let candidate = generate(state, self.rect.pos);
                    if candidate.kind != PowerUpKind::Random {
                        break candidate;
                    }
                };
                log::debug!("random power-up resolved to {:?}", resolved.kind);
                resolved.apply(state)?;
            }
        }
        Ok(())
    }
}

/// Draw a random power-up for the current session state, re-rolling
/// types that are currently maxed out. The loop terminates because
/// extra-life, score-add and random are never invalid.
pub fn generate(state: &mut GameState, pos: Vec2) -> PowerUp {
    let kind = loop {
        let candidate = PowerUpKind::ALL[state.rng().random_range(0..PowerUpKind::ALL.len())];
        if !candidate.is_invalid(state) {
            break candidate;
        }
    };

    let value = match kind {
        PowerUpKind::NoClip
        | PowerUpKind::ExtraBall
        | PowerUpKind::ExtraLife => 1.0,
        PowerUpKind::BallSpeedUp | PowerUpKind::BallSpeedDown => {
            state.rng().random::<f64>() * 0.2
        }
        PowerUpKind::PaddleGrow => state.rng().random_range(10..50) as f64,
        PowerUpKind::ScoreAdd => {
            SCORE_VALUES[state.rng().random_range(0..SCORE_VALUES.len())] as f64
        }
        PowerUpKind::Random => 0.0,
    };

    PowerUp {
        kind,
        value,
        rect: Rect::new(pos.x, pos.y, POWERUP_WIDTH, POWERUP_HEIGHT),
    }
}
