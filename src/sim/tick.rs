//! Per-tick simulation advance
//!
//! Two independent cadences: the physics tick moves the paddle and balls
//! and resolves collisions; the secondary tick moves power-ups and score
//! popups and applies caught power-ups. Both take the actual elapsed
//! milliseconds, so the simulation stays correct under scheduling jitter.

use super::geometry::{Rect, Side, contact_side};
use super::powerup::PowerUpError;
use super::state::{GamePhase, GameState};
use crate::consts::*;

/// Input state for a single physics tick.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Move-left key held
    pub left: bool,
    /// Move-right key held
    pub right: bool,
    /// Launch waiting balls (edge)
    pub launch: bool,
    /// Reset all balls to the paddle (edge)
    pub reset: bool,
    /// Debug hold-to-speed key held
    pub accelerate: bool,
    /// Pause/resume toggle (edge)
    pub pause: bool,
    /// Pointer x position inside the field, when the pointer moved
    pub pointer_x: Option<f32>,
}

/// Advance the physics simulation by `dt_ms` elapsed milliseconds.
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::debug!("paused");
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::debug!("resumed");
            }
            _ => {}
        }
    }

    // Paused freezes the clock and every entity
    if state.phase == GamePhase::Paused {
        return;
    }

    state.clock_ms += dt_ms as f64;
    state.run_timers();

    // Terminal phases keep draining timers (end-of-session delay) but
    // nothing moves anymore
    if state.phase != GamePhase::Playing {
        return;
    }

    state.accelerate = input.accelerate;
    move_paddle(state, input, dt_ms);

    if input.launch {
        for i in 0..state.balls.len() {
            if state.balls[i].waiting {
                let paddle = state.paddle.clone();
                state.balls[i].move_to_paddle(&paddle);
                let (balls, rng) = state.balls_and_rng();
                balls[i].launch(rng);
            }
        }
    }

    if input.reset {
        for ball in &mut state.balls {
            ball.reset();
        }
    }

    state.check_transitions();
    if state.phase != GamePhase::Playing {
        return;
    }

    let base_speed = if state.accelerate {
        BALL_SPEED_ACCELERATED
    } else {
        BALL_SPEED
    };
    let speed = base_speed * state.ball_speed_multiplier;

    let mut i = 0;
    while i < state.balls.len() {
        if state.balls[i].waiting {
            let paddle = state.paddle.clone();
            state.balls[i].move_to_paddle(&paddle);
            i += 1;
            continue;
        }

        state.balls[i].speed = speed;
        state.balls[i].advance(dt_ms);

        // Side walls reflect
        let rect = state.balls[i].rect;
        if rect.left() < 0.0 || rect.left() > FIELD_WIDTH - rect.size.x {
            state.balls[i].velocity.x *= -1.0;
        }

        // Top reflects; bottom exit costs the ball or a life
        if rect.top() < 0.0 {
            state.balls[i].velocity.y *= -1.0;
        } else if rect.top() > FIELD_HEIGHT - rect.size.y {
            if state.balls.len() > 1 {
                state.balls.remove(i);
            } else {
                state.balls[i].reset();
                state.lives = state.lives.saturating_sub(1);
                state.clear_no_clip();
                log::info!("ball lost, {} lives remaining", state.lives);
                i += 1;
            }
            continue;
        }

        brick_physics(state, i);

        if state.balls[i].rect.intersects(&state.paddle.rect) {
            paddle_physics(state, i);
        }
        i += 1;
    }
}

/// Advance the secondary simulation (power-ups, score popups) by `dt_ms`.
///
/// Fails only on an invalid power-up configuration, which is a data or
/// logic defect rather than a recoverable runtime fault.
pub fn secondary_tick(state: &mut GameState, dt_ms: f32) -> Result<(), PowerUpError> {
    if state.phase != GamePhase::Playing {
        return Ok(());
    }

    let mut i = 0;
    while i < state.popups.len() {
        if state.popups[i].rise(dt_ms) {
            state.popups.remove(i);
        } else {
            i += 1;
        }
    }

    let mut i = 0;
    while i < state.power_ups.len() {
        if state.power_ups[i].fall(dt_ms) {
            state.power_ups.remove(i);
        } else {
            i += 1;
        }
    }

    // Collect catches first, then apply: applying mutates the list
    // (extra balls, new drops) so no iteration may be in flight.
    let paddle = state.paddle.rect;
    let mut caught = Vec::new();
    let mut i = 0;
    while i < state.power_ups.len() {
        if state.power_ups[i].rect.intersects(&paddle) {
            caught.push(state.power_ups.remove(i));
        } else {
            i += 1;
        }
    }
    for power_up in caught {
        log::info!("caught power-up {:?}", power_up.kind);
        power_up.apply(state)?;
    }

    Ok(())
}

fn move_paddle(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    if input.left {
        state.paddle.shift(-PADDLE_SPEED * dt_ms);
    }
    if input.right {
        state.paddle.shift(PADDLE_SPEED * dt_ms);
    }
    if let Some(x) = input.pointer_x {
        state.paddle.move_center_to(x);
    }
}

/// Reflect a unit velocity off the given contact side.
fn bounce(state: &mut GameState, ball_idx: usize, side: Side) {
    match side {
        Side::Top | Side::Bottom => state.balls[ball_idx].velocity.y *= -1.0,
        Side::Left | Side::Right => state.balls[ball_idx].velocity.x *= -1.0,
    }
}

/// Resolve ball/brick contact for one ball.
///
/// A one-step lookahead rectangle (current bounds shifted by the unscaled
/// velocity) gathers candidate bricks; the single most-touched brick (the
/// largest overlap with the *current* bounds, first found on ties) takes
/// the hit. In no-clip mode the ball passes through unless the brick
/// rejects the hit; otherwise the ball always bounces off the contact
/// side before damage is applied.
fn brick_physics(state: &mut GameState, ball_idx: usize) {
    let rect = state.balls[ball_idx].rect;
    let velocity = state.balls[ball_idx].velocity;
    let lookahead = Rect::new(
        rect.pos.x + velocity.x,
        rect.pos.y + velocity.y,
        rect.size.x,
        rect.size.y,
    );

    let mut best: Option<(usize, Rect, f32)> = None;
    for (idx, brick) in state.bricks.iter().enumerate() {
        if !brick.rect.intersects(&lookahead) {
            continue;
        }
        let overlap = rect
            .intersection(&brick.rect)
            .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        let area = overlap.area();
        if best.as_ref().is_none_or(|(_, _, best_area)| area > *best_area) {
            best = Some((idx, overlap, area));
        }
    }

    let Some((brick_idx, overlap, _)) = best else {
        return;
    };
    let side = contact_side(&rect, &state.bricks[brick_idx].rect, &overlap);

    if state.no_clip {
        // Any valid hit is lethal while no-clip is active; only bricks
        // that reject the hit still bounce the ball.
        state.bricks[brick_idx].health = 1;
        if !state.hit_brick(brick_idx, side) {
            bounce(state, ball_idx, side);
        }
    } else {
        bounce(state, ball_idx, side);
        state.hit_brick(brick_idx, side);
    }
}

/// Resolve ball/paddle contact: blend the specular reflection angle with
/// a paddle-offset-driven angle (10%/90%), then clamp away from the
/// horizontal so the ball always leaves at a playable angle.
fn paddle_physics(state: &mut GameState, ball_idx: usize) {
    let ball = &state.balls[ball_idx];
    let paddle = &state.paddle.rect;

    let bounce_angle = (-ball.velocity.y).atan2(ball.velocity.x).to_degrees();
    let offset = ball.rect.center().x - paddle.center().x;
    let paddle_angle = offset * 90.0 / (paddle.size.x / 2.0) - 90.0;

    let blended = bounce_angle * 0.1 + paddle_angle * 0.9;
    let clamped = blended.clamp(-180.0 + LAUNCH_ANGLE_DELTA, -LAUNCH_ANGLE_DELTA);

    state.balls[ball_idx].velocity = crate::unit_from_degrees(clamped);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::Level;
    use crate::sim::brick::GridPos;
    use glam::Vec2;

    const DT: f32 = 16.0;

    fn state(rows: &[&str]) -> GameState {
        let level = Level {
            layout: rows.iter().map(|r| r.to_string()).collect(),
            number: 0,
        };
        GameState::new(level, 99)
    }

    fn launch_straight_up(state: &mut GameState) {
        let ball = &mut state.balls[0];
        ball.waiting = false;
        ball.velocity = Vec2::new(0.0, -1.0);
    }

    #[test]
    fn test_waiting_ball_tracks_paddle() {
        let mut s = state(&["g"]);
        let input = TickInput {
            right: true,
            ..TickInput::default()
        };
        tick(&mut s, &input, DT);
        let paddle_center = s.paddle.rect.center().x;
        assert_eq!(s.balls[0].rect.center().x, paddle_center);
    }

    #[test]
    fn test_straight_up_ball_rises_monotonically_then_bounces() {
        let mut s = state(&["@"]);
        // Park the only brick out of the ball's column
        s.bricks[0].rect.pos.x = 0.0;
        launch_straight_up(&mut s);

        let input = TickInput::default();
        let mut last_y = s.balls[0].rect.top();
        loop {
            tick(&mut s, &input, DT);
            let y = s.balls[0].rect.top();
            if s.balls[0].velocity.y > 0.0 {
                break; // top-edge bounce happened
            }
            assert!(y < last_y, "ball must rise monotonically until the bounce");
            last_y = y;
        }
        assert!(s.balls[0].rect.top() < 30.0);
    }

    #[test]
    fn test_last_ball_bottom_exit_costs_a_life_and_loses() {
        let mut s = state(&["g"]);
        s.lives = 1;
        s.no_clip = true;
        let ball = &mut s.balls[0];
        ball.waiting = false;
        ball.velocity = Vec2::new(0.0, 1.0);
        ball.rect.pos.y = FIELD_HEIGHT - 20.0;

        let input = TickInput::default();
        tick(&mut s, &input, DT);
        assert_eq!(s.lives, 0);
        assert!(s.balls[0].waiting);
        assert!(!s.no_clip, "losing the last ball clears no-clip");
        assert_eq!(s.ball_count(), 1);

        // The transition is evaluated on the following tick
        tick(&mut s, &input, DT);
        assert_eq!(s.phase, GamePhase::Lost);
    }

    #[test]
    fn test_extra_ball_bottom_exit_is_just_removed() {
        let mut s = state(&["g"]);
        s.add_ball();
        let ball = &mut s.balls[1];
        ball.waiting = false;
        ball.velocity = Vec2::new(0.0, 1.0);
        ball.rect.pos.y = FIELD_HEIGHT - 20.0;

        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.ball_count(), 1);
        assert_eq!(s.lives, crate::consts::START_LIVES);
    }

    #[test]
    fn test_side_wall_reflects_x() {
        let mut s = state(&["g"]);
        let ball = &mut s.balls[0];
        ball.waiting = false;
        ball.velocity = Vec2::new(-1.0, 0.0).normalize();
        ball.rect.pos = Vec2::new(5.0, 500.0);
        // Keep it away from the brick row
        tick(&mut s, &TickInput::default(), DT);
        assert!(s.balls[0].velocity.x > 0.0);
    }

    #[test]
    fn test_brick_hit_bounces_and_damages() {
        let mut s = state(&["g"]);
        let brick_rect = s.bricks[0].rect;
        let ball = &mut s.balls[0];
        ball.waiting = false;
        ball.velocity = Vec2::new(0.0, -1.0);
        // Just below the brick, moving up into it
        ball.rect.pos = Vec2::new(
            brick_rect.center().x - BALL_SIZE / 2.0,
            brick_rect.bottom() + 10.0,
        );

        tick(&mut s, &TickInput::default(), DT);
        assert!(s.bricks.is_empty());
        assert_eq!(s.score, 10);
        assert!(s.balls[0].velocity.y > 0.0, "bounced off the brick");
    }

    #[test]
    fn test_no_clip_passes_through_semi_destructible() {
        let mut s = state(&["@"]);
        s.arm_no_clip();
        let brick_rect = s.bricks[0].rect;
        let ball = &mut s.balls[0];
        ball.waiting = false;
        ball.velocity = Vec2::new(0.0, 1.0);
        ball.rect.pos = Vec2::new(
            brick_rect.center().x - BALL_SIZE / 2.0,
            brick_rect.top() - BALL_SIZE - 10.0,
        );

        tick(&mut s, &TickInput::default(), DT);
        assert!(s.bricks.is_empty(), "semi-destructible dies in no-clip");
        assert_eq!(s.balls[0].velocity, Vec2::new(0.0, 1.0), "no bounce");
    }

    #[test]
    fn test_semi_destructible_bounces_without_no_clip() {
        let mut s = state(&["@"]);
        let brick_rect = s.bricks[0].rect;
        let ball = &mut s.balls[0];
        ball.waiting = false;
        ball.velocity = Vec2::new(0.0, 1.0);
        ball.rect.pos = Vec2::new(
            brick_rect.center().x - BALL_SIZE / 2.0,
            brick_rect.top() - BALL_SIZE - 10.0,
        );

        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.bricks.len(), 1, "no damage without no-clip");
        assert_eq!(s.bricks[0].health, 1);
        assert!(s.balls[0].velocity.y < 0.0, "ball bounced");
    }

    #[test]
    fn test_indestructible_bounces_even_in_no_clip() {
        let mut s = state(&["x@"]);
        s.arm_no_clip();
        let brick_rect = s.bricks[0].rect;
        let ball = &mut s.balls[0];
        ball.waiting = false;
        ball.velocity = Vec2::new(0.0, 1.0);
        ball.rect.pos = Vec2::new(
            brick_rect.center().x - BALL_SIZE / 2.0,
            brick_rect.top() - BALL_SIZE - 10.0,
        );

        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.bricks.len(), 2);
        assert!(s.balls[0].velocity.y < 0.0, "rejected hit still bounces");
    }

    #[test]
    fn test_only_most_touched_brick_takes_damage() {
        let mut s = state(&["gg"]);
        let left = s.bricks[0].rect;
        let ball = &mut s.balls[0];
        ball.waiting = false;
        ball.velocity = Vec2::new(0.0, -1.0);
        // Overlapping mostly the left brick, slightly the right one
        ball.rect.pos = Vec2::new(left.right() - BALL_SIZE + 4.0, left.bottom() - 2.0);

        brick_physics(&mut s, 0);
        assert_eq!(s.bricks.len(), 1);
        assert_eq!(
            s.bricks[0].grid,
            GridPos::new(1, 0),
            "the less-touched brick survives"
        );
    }

    #[test]
    fn test_equal_overlap_tie_hits_first_brick() {
        let mut s = state(&["gg"]);
        let left = s.bricks[0].rect;
        let right = s.bricks[1].rect;
        let ball = &mut s.balls[0];
        ball.waiting = false;
        ball.velocity = Vec2::new(0.0, -1.0);
        // Centered on the gap between the bricks, so both overlap
        // rectangles are identical
        let gap_center = (left.right() + right.left()) / 2.0;
        ball.rect.pos = Vec2::new(
            gap_center - BALL_SIZE / 2.0,
            left.top() - BALL_SIZE + 2.0,
        );
        assert_eq!(
            ball.rect.intersection(&left).map(|o| o.area()),
            ball.rect.intersection(&right).map(|o| o.area()),
        );

        brick_physics(&mut s, 0);
        assert_eq!(s.bricks.len(), 1);
        assert_eq!(
            s.bricks[0].grid,
            GridPos::new(1, 0),
            "on a tie the brick found first takes the hit"
        );
    }

    #[test]
    fn test_paddle_bounce_angle_is_clamped_upward() {
        let mut s = state(&["g"]);
        let paddle = s.paddle.rect;
        let ball = &mut s.balls[0];
        ball.waiting = false;
        ball.velocity = Vec2::new(0.0, 1.0);
        // Dead center: the ball should leave straight up
        ball.rect.pos = Vec2::new(
            paddle.center().x - BALL_SIZE / 2.0,
            paddle.top() - BALL_SIZE / 2.0,
        );
        paddle_physics(&mut s, 0);
        assert!(s.balls[0].velocity.y < -0.95);

        // Far right edge: clamped to the 15 degree exclusion band
        s.balls[0].velocity = Vec2::new(0.0, 1.0);
        s.balls[0].rect.pos.x = paddle.right() - BALL_SIZE / 2.0;
        paddle_physics(&mut s, 0);
        let v = s.balls[0].velocity;
        assert!(v.y < 0.0, "always leaves upward");
        assert!(v.x > 0.9, "steep sideways launch is clamped");
    }

    #[test]
    fn test_pause_freezes_clock_and_entities() {
        let mut s = state(&["g"]);
        launch_straight_up(&mut s);
        tick(&mut s, &TickInput::default(), DT);
        let pos = s.balls[0].rect.pos;
        let clock = s.clock_ms;

        let pause = TickInput {
            pause: true,
            ..TickInput::default()
        };
        tick(&mut s, &pause, DT);
        assert_eq!(s.phase, GamePhase::Paused);

        for _ in 0..10 {
            tick(&mut s, &TickInput::default(), DT);
        }
        assert_eq!(s.balls[0].rect.pos, pos);
        assert_eq!(s.clock_ms, clock);

        tick(&mut s, &pause, DT);
        assert_eq!(s.phase, GamePhase::Playing);
        tick(&mut s, &TickInput::default(), DT);
        assert!(s.balls[0].rect.pos != pos);
    }

    #[test]
    fn test_launch_input_releases_waiting_balls() {
        let mut s = state(&["g"]);
        assert!(s.balls[0].waiting);
        let input = TickInput {
            launch: true,
            ..TickInput::default()
        };
        tick(&mut s, &input, DT);
        let v = s.balls[0].velocity;
        assert!(!s.balls[0].waiting);
        assert!(v.y < 0.0, "launch arc always points upward");
        // Excluded near-horizontal band
        let angle = v.y.atan2(v.x).to_degrees();
        assert!(angle < -LAUNCH_ANGLE_DELTA && angle > -180.0 + LAUNCH_ANGLE_DELTA);
    }

    #[test]
    fn test_secondary_tick_applies_caught_power_up() {
        use crate::sim::powerup::{PowerUp, PowerUpKind};

        let mut s = state(&["g"]);
        let paddle = s.paddle.rect;
        s.power_ups.push(PowerUp {
            kind: PowerUpKind::ExtraLife,
            value: 1.0,
            rect: Rect::new(paddle.center().x, paddle.top() - 5.0, 52.0, 32.0),
        });

        secondary_tick(&mut s, DT).unwrap();
        assert!(s.power_ups.is_empty());
        assert_eq!(s.lives, crate::consts::START_LIVES + 1);
    }

    #[test]
    fn test_secondary_tick_frozen_while_paused() {
        use crate::sim::powerup::{PowerUp, PowerUpKind};

        let mut s = state(&["g"]);
        s.phase = GamePhase::Paused;
        s.power_ups.push(PowerUp {
            kind: PowerUpKind::ExtraLife,
            value: 1.0,
            rect: Rect::new(100.0, 100.0, 52.0, 32.0),
        });

        secondary_tick(&mut s, DT).unwrap();
        assert_eq!(s.power_ups[0].rect.pos.y, 100.0);
    }

    #[test]
    fn test_win_then_end_of_session_event() {
        use crate::sim::state::GameEvent;

        let mut s = state(&["g"]);
        s.bricks.clear();
        tick(&mut s, &TickInput::default(), DT);
        assert_eq!(s.phase, GamePhase::Won);

        // Drive the clock past the end-of-session delay
        let ticks = (crate::consts::END_DELAY_MS as f32 / DT) as usize + 2;
        for _ in 0..ticks {
            tick(&mut s, &TickInput::default(), DT);
        }
        assert_eq!(s.take_events(), vec![GameEvent::LevelCleared { level: 0 }]);
    }
}
