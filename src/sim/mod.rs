//! Deterministic game simulation
//!
//! Pure state plus tick functions: no windowing, no rendering, no wall
//! clock. Given the same level, seed and input sequence the simulation
//! always produces the same session, which keeps replays and tests exact.

pub mod brick;
pub mod geometry;
pub mod powerup;
pub mod state;
pub mod tick;
pub mod timers;

pub use brick::{Brick, BrickType, BrickTypeId, DestroyEffect, GridPos, HitValidation, Rgb};
pub use geometry::{Rect, Side, contact_side};
pub use powerup::{PowerUp, PowerUpError, PowerUpKind};
pub use state::{Ball, GameEvent, GamePhase, GameState, Paddle, ScorePopup};
pub use tick::{TickInput, secondary_tick, tick};
pub use timers::{TimerAction, TimerQueue};
