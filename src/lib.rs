//! Breakout Core - deterministic simulation for a brick-breaker game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, session state)
//! - `levels`: Level catalog repository (text layouts -> brick grids)
//!
//! The host shell owns windowing, rendering and OS input; it forwards
//! abstract input events plus elapsed milliseconds into the two tick entry
//! points and draws whatever entity state the session exposes.

pub mod levels;
pub mod sim;

pub use levels::{Level, LevelError, LevelSet};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Play-field dimensions (logical pixels)
    pub const FIELD_WIDTH: f32 = 1920.0;
    pub const FIELD_HEIGHT: f32 = 1060.0;

    /// Physics tick nominal interval (60 Hz target), milliseconds
    pub const PHYSICS_INTERVAL_MS: f32 = 1000.0 / 60.0;
    /// Secondary tick nominal interval (power-ups, popups), milliseconds
    pub const SECONDARY_INTERVAL_MS: f32 = 33.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 110.0;
    pub const PADDLE_HEIGHT: f32 = 20.0;
    /// Paddle speed in pixels per millisecond
    pub const PADDLE_SPEED: f32 = 1.5;

    /// Ball defaults
    pub const BALL_SIZE: f32 = 16.0;
    /// Base ball speed in pixels per millisecond
    pub const BALL_SPEED: f32 = 0.9;
    /// Ball speed while the accelerate (debug) input is held
    pub const BALL_SPEED_ACCELERATED: f32 = 2.0;
    /// Launch/bounce angles stay this many degrees away from horizontal
    pub const LAUNCH_ANGLE_DELTA: f32 = 15.0;

    /// Brick dimensions
    pub const BRICK_WIDTH: f32 = 50.0;
    pub const BRICK_HEIGHT: f32 = 20.0;
    pub const BRICK_MARGIN: f32 = 1.0;

    /// Power-up defaults
    pub const POWERUP_WIDTH: f32 = 52.0;
    pub const POWERUP_HEIGHT: f32 = 32.0;
    /// Fall speed in pixels per millisecond
    pub const POWERUP_FALL_SPEED: f32 = 0.4;
    /// Probability that a destroyed brick drops a power-up
    pub const POWERUP_DROP_CHANCE: f64 = 0.1;
    /// No-clip effect duration, milliseconds
    pub const NOCLIP_DURATION_MS: u64 = 5000;

    /// Score popup rise speed in pixels per millisecond
    pub const POPUP_RISE_SPEED: f32 = 0.4;
    /// Maximum upward travel of a score popup before it disappears
    pub const POPUP_MAX_RISE: f32 = 80.0;
    /// Cap on concurrently visible score popups
    pub const MAX_POPUPS: usize = 10;

    /// Starting lives
    pub const START_LIVES: u32 = 5;
    /// Delay before a finished session hands control back to the shell
    pub const END_DELAY_MS: u64 = 4000;
}

/// Unit direction vector for an angle given in degrees.
///
/// Screen coordinates: positive Y points down, so upward angles are in
/// the (180, 360) degree range.
#[inline]
pub fn unit_from_degrees(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}
