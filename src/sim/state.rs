//! Session state and core simulation types
//!
//! Everything a host shell needs to draw a frame lives here: the paddle,
//! balls, bricks, falling power-ups and score popups, plus score/lives.
//! The session also orchestrates brick hits (validation, damage, destroy
//! effects, drops) and the Playing/Paused/Won/Lost phase machine.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::brick::{Brick, CollisionPayload, DestroyEffect, GridPos, HitValidation, resolve_token};
use super::geometry::{Rect, Side};
use super::powerup::PowerUp;
use super::timers::{TimerAction, TimerQueue};
use crate::consts::*;
use crate::levels::Level;
use crate::unit_from_degrees;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Both ticks frozen, entities retained
    Paused,
    /// All destructible bricks cleared (terminal)
    Won,
    /// Lives exhausted (terminal)
    Lost,
}

/// Notifications for the host shell, drained via [`GameState::take_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The end-of-session delay after a win elapsed; the shell should
    /// build the next session or fall back to level selection.
    LevelCleared { level: usize },
    /// The end-of-session delay after a loss elapsed.
    GameOver { score: u32 },
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub rect: Rect,
    /// Unit direction vector (zero while waiting)
    pub velocity: Vec2,
    /// Scalar speed in pixels per millisecond, set each tick
    pub speed: f32,
    /// Attached to the paddle, not yet launched
    pub waiting: bool,
}

impl Ball {
    pub fn new() -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, BALL_SIZE, BALL_SIZE),
            velocity: Vec2::ZERO,
            speed: 0.0,
            waiting: true,
        }
    }

    /// Advance by `velocity * speed * dt`, each axis rounded to the
    /// nearest pixel independently so positions stay integral.
    pub fn advance(&mut self, dt_ms: f32) {
        self.rect.pos.x += (self.velocity.x * self.speed * dt_ms).round();
        self.rect.pos.y += (self.velocity.y * self.speed * dt_ms).round();
    }

    /// Back to the waiting state; position is left where it is.
    pub fn reset(&mut self) {
        self.waiting = true;
        self.velocity = Vec2::ZERO;
    }

    /// Snap to the paddle's top center.
    pub fn move_to_paddle(&mut self, paddle: &Paddle) {
        self.rect.pos = Vec2::new(
            paddle.rect.center().x - self.rect.size.x / 2.0,
            paddle.rect.top() - self.rect.size.y,
        );
    }

    /// Launch from the paddle at a random upward angle, excluding the
    /// near-horizontal band on both sides.
    pub fn launch(&mut self, rng: &mut Pcg32) {
        self.waiting = false;
        let angle = rng.random_range((180.0 + LAUNCH_ANGLE_DELTA)..(360.0 - LAUNCH_ANGLE_DELTA));
        self.velocity = unit_from_degrees(angle);
    }
}

/// The player's paddle. Horizontal movement only, clamped to the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub rect: Rect,
}

impl Paddle {
    fn new() -> Self {
        Self {
            rect: Rect::new(
                FIELD_WIDTH / 2.0 - PADDLE_WIDTH / 2.0,
                FIELD_HEIGHT * 0.9 - PADDLE_HEIGHT,
                PADDLE_WIDTH,
                PADDLE_HEIGHT,
            ),
        }
    }

    /// Shift horizontally and clamp to the field bounds.
    pub fn shift(&mut self, dx: f32) {
        self.move_center_to(self.rect.center().x + dx);
    }

    /// Center the paddle on `x`, clamped so it never leaves the field.
    pub fn move_center_to(&mut self, x: f32) {
        let half = self.rect.size.x / 2.0;
        let clamped = x.clamp(half, FIELD_WIDTH - half);
        self.rect.pos.x = clamped - half;
    }

    /// Widen the paddle, keeping it centered and inside the field.
    pub fn grow(&mut self, amount: f32) {
        let center = self.rect.center().x;
        self.rect.size.x = (self.rect.size.x + amount).min(FIELD_WIDTH);
        self.move_center_to(center);
    }
}

/// Transient floating label showing points gained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePopup {
    pub pos: Vec2,
    pub score: u32,
    /// Popup disappears once it rises to this y
    max_y: f32,
}

impl ScorePopup {
    pub fn new(pos: Vec2, score: u32) -> Self {
        Self {
            pos,
            score,
            max_y: pos.y - POPUP_MAX_RISE,
        }
    }

    /// Float upward; returns true once the popup should be removed.
    pub fn rise(&mut self, dt_ms: f32) -> bool {
        self.pos.y -= POPUP_RISE_SPEED * dt_ms;
        self.pos.y <= self.max_y
    }
}

/// Complete session state (deterministic, serializable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// The level this session plays
    pub level: Level,
    pub phase: GamePhase,
    pub score: u32,
    pub lives: u32,
    /// Multiplies the base/accelerated ball speed
    pub ball_speed_multiplier: f32,
    /// No-clip power-up active (balls pass through most bricks)
    pub no_clip: bool,
    /// Debug hold-to-speed input state
    pub accelerate: bool,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub bricks: Vec<Brick>,
    pub power_ups: Vec<PowerUp>,
    pub popups: Vec<ScorePopup>,
    /// Simulation clock in milliseconds; frozen while paused
    pub clock_ms: f64,
    pub(crate) timers: TimerQueue,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Build a session for `level`.
    pub fn new(level: Level, seed: u64) -> Self {
        let bricks = generate_bricks(&level);
        log::info!(
            "session start: level {} with {} bricks, seed {seed}",
            level.number,
            bricks.len()
        );

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            level,
            phase: GamePhase::Playing,
            score: 0,
            lives: START_LIVES,
            ball_speed_multiplier: 1.0,
            no_clip: false,
            accelerate: false,
            paddle: Paddle::new(),
            balls: Vec::new(),
            bricks,
            power_ups: Vec::new(),
            popups: Vec::new(),
            clock_ms: 0.0,
            timers: TimerQueue::new(),
            events: Vec::new(),
        };
        state.add_ball();
        state
    }

    /// Spawn a ball attached to the paddle.
    pub fn add_ball(&mut self) {
        let mut ball = Ball::new();
        ball.move_to_paddle(&self.paddle);
        self.balls.push(ball);
    }

    pub fn ball_count(&self) -> usize {
        self.balls.len()
    }

    /// Scalar displays for the host shell.
    pub fn hud(&self) -> (u32, u32) {
        (self.score, self.lives)
    }

    /// Drain pending shell notifications.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Split borrow for callers that mutate balls while drawing randomness.
    pub(crate) fn balls_and_rng(&mut self) -> (&mut Vec<Ball>, &mut Pcg32) {
        (&mut self.balls, &mut self.rng)
    }

    /// Index of the brick occupying `grid`, if any.
    pub fn brick_at(&self, grid: GridPos) -> Option<usize> {
        self.bricks.iter().position(|b| b.grid == grid)
    }

    /// Bricks that must be destroyed to clear the level (everything
    /// whose hit validation is not the always-false kind).
    pub fn destructible_bricks(&self) -> usize {
        self.bricks
            .iter()
            .filter(|b| b.kind.get().validation != HitValidation::Never)
            .count()
    }

    /// Enable no-clip mode. Re-arming resets the expiry window.
    pub fn arm_no_clip(&mut self) {
        self.no_clip = true;
        self.timers
            .schedule(self.clock_ms as u64, NOCLIP_DURATION_MS, TimerAction::NoClipExpire);
        log::debug!("no-clip armed for {NOCLIP_DURATION_MS}ms");
    }

    /// Drop no-clip immediately (ball lost, expiry fired).
    pub fn clear_no_clip(&mut self) {
        self.no_clip = false;
        self.timers.cancel(TimerAction::NoClipExpire);
    }

    /// Strike the brick at `brick_idx` from `side`. Returns true when the
    /// brick was destroyed and removed.
    ///
    /// A rejected hit leaves health untouched. On destruction the brick's
    /// score is awarded, a popup spawns (up to the cap), the destroy
    /// effect fires (explosions cascade through neighbors), and with a
    /// fixed probability a power-up drops at the brick's position.
    pub fn hit_brick(&mut self, brick_idx: usize, side: Side) -> bool {
        let brick = &self.bricks[brick_idx];
        let payload = CollisionPayload {
            side,
            grid: brick.grid,
            no_clip: self.no_clip,
        };

        if !brick.kind.get().validates(&payload) {
            return false;
        }

        let brick = &mut self.bricks[brick_idx];
        brick.health -= 1;
        if brick.health > 0 {
            return false;
        }

        let destroyed = self.bricks.swap_remove(brick_idx);
        let brick_type = destroyed.kind.get();
        self.score += brick_type.score;

        if self.popups.len() < MAX_POPUPS {
            self.popups
                .push(ScorePopup::new(destroyed.rect.pos, brick_type.score));
        }

        if brick_type.on_destroy == DestroyEffect::Explode {
            self.explode(payload.grid);
        }

        if self.rng.random_bool(POWERUP_DROP_CHANCE) {
            let drop_pos = Vec2::new(
                destroyed.rect.center().x - POWERUP_WIDTH / 2.0,
                destroyed.rect.bottom(),
            );
            let power_up = super::powerup::generate(self, drop_pos);
            log::debug!("power-up drop: {:?}", power_up.kind);
            self.power_ups.push(power_up);
        }

        true
    }

    /// Hit all four orthogonal neighbors of the exploding cell. Each
    /// neighbor is struck on the face pointing back at the explosion, so
    /// chains of adjacent explosive bricks cascade recursively.
    fn explode(&mut self, origin: GridPos) {
        let struck_sides = [Side::Left, Side::Right, Side::Top, Side::Bottom];
        for (neighbor, side) in origin.neighbors().into_iter().zip(struck_sides) {
            if let Some(idx) = self.brick_at(neighbor) {
                // No-clip lethality does not apply to blast damage
                self.hit_brick(idx, side);
            }
        }
    }

    /// Evaluate win/lose transitions. Terminal phases schedule the
    /// end-of-session delay exactly once.
    pub(crate) fn check_transitions(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }

        if self.destructible_bricks() == 0 {
            log::info!("level {} cleared, score {}", self.level.number, self.score);
            self.phase = GamePhase::Won;
            self.timers
                .schedule(self.clock_ms as u64, END_DELAY_MS, TimerAction::EndOfSession);
        } else if self.lives == 0 {
            log::info!("out of lives, final score {}", self.score);
            self.phase = GamePhase::Lost;
            self.timers
                .schedule(self.clock_ms as u64, END_DELAY_MS, TimerAction::EndOfSession);
        }
    }

    /// Fire due timers against the current clock.
    pub(crate) fn run_timers(&mut self) {
        for action in self.timers.drain_due(self.clock_ms as u64) {
            match action {
                TimerAction::NoClipExpire => {
                    self.no_clip = false;
                    log::debug!("no-clip expired");
                }
                TimerAction::EndOfSession => match self.phase {
                    GamePhase::Won => self.events.push(GameEvent::LevelCleared {
                        level: self.level.number,
                    }),
                    GamePhase::Lost => {
                        self.events.push(GameEvent::GameOver { score: self.score })
                    }
                    // Guard: only terminal phases schedule this action
                    _ => {}
                },
            }
        }
    }
}

/// Build brick entities from a level layout. The grid is centered
/// horizontally on the longest row; vertical placement leaves a fifth of
/// the remaining space above the grid.
fn generate_bricks(level: &Level) -> Vec<Brick> {
    let longest_row = level.width() as f32;
    let rows = level.layout.len() as f32;
    let start_x = (FIELD_WIDTH - (BRICK_WIDTH + BRICK_MARGIN) * longest_row) / 2.0;
    let start_y = (FIELD_HEIGHT - (BRICK_HEIGHT + BRICK_MARGIN) * rows) / 5.0;

    let mut bricks = Vec::new();
    for (row_idx, row) in level.layout.iter().enumerate() {
        for (col_idx, token) in row.chars().enumerate() {
            let Some((kind, health)) = resolve_token(token) else {
                continue;
            };
            let rect = Rect::new(
                start_x + (BRICK_WIDTH + BRICK_MARGIN) * col_idx as f32,
                start_y + (BRICK_HEIGHT + BRICK_MARGIN) * row_idx as f32,
                BRICK_WIDTH,
                BRICK_HEIGHT,
            );
            let grid = GridPos::new(col_idx as i32, row_idx as i32);
            bricks.push(Brick::new(kind, rect, grid, health));
        }
    }
    bricks
}
