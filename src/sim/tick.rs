//! Fixed timestep simulation tick
//!
//! One call to [`tick`] advances the whole arena by a single 60 Hz step:
//! input commands, ball flight, collision response, power-ups, life loss,
//! level progression, and timed-effect expiry, in that order.

use glam::Vec2;
use rand::Rng;

use super::collision::{paddle_bounce_velocity, reflect_x, reflect_y, Rect};
use super::state::{Brick, GameEvent, GamePhase, GameState, PowerUp, PowerUpKind};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Held: move the paddle left
    pub move_left: bool,
    /// Held: move the paddle right
    pub move_right: bool,
    /// Edge-triggered: release a stuck ball
    pub launch: bool,
    /// Edge-triggered: reset the session to level 1
    pub restart: bool,
    /// Edge-triggered: flip the pause state
    pub toggle_pause: bool,
}

/// Advance the game state by one fixed timestep.
///
/// Returns the render/audio callouts raised during the step. Pause and
/// game-over freeze everything except the restart and pause commands.
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Restart is honored from any phase, including game over.
    if input.restart {
        log::info!("session restart (seed {})", state.seed);
        state.restart();
        return events;
    }

    if input.toggle_pause {
        state.phase = match state.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            // Game over is terminal until restart
            GamePhase::GameOver => GamePhase::GameOver,
        };
    }

    if state.phase != GamePhase::Playing {
        return events;
    }

    state.time_ticks += 1;

    // Paddle movement from held keys
    let mut dx = 0.0;
    if input.move_left {
        dx -= state.paddle.speed;
    }
    if input.move_right {
        dx += state.paddle.speed;
    }
    if dx != 0.0 {
        state.paddle.shift(dx);
    }

    // A stuck ball rides the paddle until launched
    if state.ball.stuck {
        state.ball.rest_on(&state.paddle);
        if input.launch {
            state.ball.launch(&mut state.rng);
        }
    }

    state.ball.advance();

    collide_walls(state);
    collide_paddle(state, &mut events);
    collide_bricks(state, &mut events);
    update_powerups(state, &mut events);
    check_ball_lost(state, &mut events);
    check_level_clear(state, &mut events);

    // High-score watermark; the driver persists increases
    if state.score > state.high_score {
        state.high_score = state.score;
    }

    state.paddle.expire_widen(state.time_ticks);

    events
}

/// Side and top walls invert the matching velocity component. Only applies
/// when the ball is heading into the wall, so a deep overlap cannot flip
/// the velocity twice. The bottom edge is open (life loss, not a wall).
fn collide_walls(state: &mut GameState) {
    let bounds = state.ball.bounds();
    let vel = state.ball.vel;
    if (bounds.left() <= 0.0 && vel.x < 0.0) || (bounds.right() >= SCREEN_WIDTH && vel.x > 0.0) {
        state.ball.vel = reflect_x(state.ball.vel);
    }
    if bounds.top() <= 0.0 && vel.y < 0.0 {
        state.ball.vel = reflect_y(state.ball.vel);
    }
}

/// Paddle contact redirects the ball by hit offset and grows its speed.
fn collide_paddle(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.ball.stuck {
        return;
    }
    if !state.ball.bounds().intersects(&state.paddle.rect()) {
        return;
    }
    state.ball.vel = paddle_bounce_velocity(
        state.ball.pos.x,
        state.paddle.center_x,
        state.paddle.width,
        state.ball.current_speed(),
    );
    events.push(GameEvent::PaddleHit);
}

/// All brick overlaps in a tick share a single y-inversion; every struck
/// brick loses a hit point, and bricks at zero are removed, scored, and may
/// drop a power-up.
fn collide_bricks(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.ball.stuck {
        return;
    }
    let ball_bounds = state.ball.bounds();

    let mut struck_any = false;
    let mut drops: Vec<PowerUp> = Vec::new();
    for i in 0..state.bricks.len() {
        if !ball_bounds.intersects(&state.bricks[i].rect) {
            continue;
        }
        struck_any = true;
        if state.bricks[i].hit() {
            let points = state.bricks[i].point_value;
            let center = Vec2::new(
                state.bricks[i].rect.center_x(),
                state.bricks[i].rect.center_y(),
            );
            state.score += points;
            events.push(GameEvent::BrickDestroyed { points });

            if state.rng.random::<f64>() < POWERUP_SPAWN_CHANCE {
                let kind = if state.rng.random::<f64>() < WIDEN_PROB {
                    PowerUpKind::Widen
                } else {
                    PowerUpKind::ExtraLife
                };
                drops.push(PowerUp::new(center, kind));
            }
        }
    }

    if struck_any {
        state.ball.vel = reflect_y(state.ball.vel);
    }
    state.bricks.retain(|b| b.hits_remaining > 0);
    state.powerups.extend(drops);
}

/// Power-ups fall at constant speed, despawn below the screen, and apply
/// their effect on paddle contact.
fn update_powerups(state: &mut GameState, events: &mut Vec<GameEvent>) {
    for powerup in state.powerups.iter_mut() {
        powerup.fall();
    }

    let paddle_rect = state.paddle.rect();
    let mut collected: Vec<PowerUpKind> = Vec::new();
    state.powerups.retain(|powerup| {
        if powerup.rect().top() > SCREEN_HEIGHT {
            return false;
        }
        if powerup.rect().intersects(&paddle_rect) {
            collected.push(powerup.kind);
            return false;
        }
        true
    });

    let now = state.time_ticks;
    for kind in collected {
        match kind {
            PowerUpKind::Widen => {
                state
                    .paddle
                    .apply_widen(WIDEN_MULTIPLIER, WIDEN_DURATION_MS, now);
            }
            PowerUpKind::ExtraLife => state.lives += 1,
        }
        events.push(GameEvent::PowerUpCollected { kind });
    }
}

/// A ball fully below the bottom edge costs a life; at zero lives the
/// session enters terminal game over, otherwise the ball re-sticks.
fn check_ball_lost(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.ball.bounds().top() <= SCREEN_HEIGHT {
        return;
    }
    state.lives = state.lives.saturating_sub(1);
    events.push(GameEvent::BallLost);
    if state.lives == 0 {
        log::info!(
            "game over at level {} with score {}",
            state.level,
            state.score
        );
        state.phase = GamePhase::GameOver;
        events.push(GameEvent::GameOver);
    } else {
        state.ball.reset_to(&state.paddle);
    }
}

/// An empty brick set advances the level in place: faster base speed
/// (capped), ball re-stuck, power-ups cleared, fresh field. Never terminal.
fn check_level_clear(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if !state.bricks.is_empty() {
        return;
    }
    state.level += 1;
    state.ball.base_speed = (state.ball.base_speed + BASE_SPEED_STEP).min(BASE_SPEED_CAP);
    state.ball.reset_to(&state.paddle);
    state.powerups.clear();
    state.bricks = build_brick_field(state.level);
    log::info!(
        "level {} cleared, {} bricks in level {}",
        state.level - 1,
        state.bricks.len(),
        state.level
    );
    events.push(GameEvent::LevelCleared { level: state.level });
}

/// Color and point value per row, cycling by `row % 6`; upper rows are
/// worth more.
pub const ROW_STYLES: [((u8, u8, u8), u32); 6] = [
    ((70, 130, 255), 60),
    ((200, 60, 60), 50),
    ((200, 120, 60), 40),
    ((200, 200, 60), 30),
    ((60, 200, 120), 20),
    ((170, 210, 255), 10),
];

/// Brick columns for a level: grows slowly, capped at 14.
pub fn columns_for_level(level: u32) -> u32 {
    (8 + level).min(14)
}

/// Brick rows for a level: a level-scaled count capped at 8, plus one
/// fixed top row.
pub fn rows_for_level(level: u32) -> u32 {
    (3 + level).min(8) + 1
}

/// Generate the brick layout for a level. Level 1 is a 9x5 grid; both
/// dimensions grow with the level up to 14x9.
pub fn build_brick_field(level: u32) -> Vec<Brick> {
    let cols = columns_for_level(level);
    let rows = rows_for_level(level);
    let brick_w = SCREEN_WIDTH / cols as f32;

    let mut bricks = Vec::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        let (color, points) = ROW_STYLES[row as usize % ROW_STYLES.len()];
        for col in 0..cols {
            let x = col as f32 * brick_w;
            let y = BRICK_FIELD_TOP + row as f32 * BRICK_HEIGHT;
            let rect = Rect::new(
                x + BRICK_GUTTER,
                y + BRICK_GUTTER,
                brick_w - 2.0 * BRICK_GUTTER,
                BRICK_HEIGHT - 2.0 * BRICK_GUTTER,
            );
            bricks.push(Brick::new(rect, color, points));
        }
    }
    bricks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::WidenEffect;

    fn launched_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed, 0);
        let input = TickInput {
            launch: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        state
    }

    #[test]
    fn test_level_one_field_is_9x5() {
        let state = GameState::new(1, 0);
        assert_eq!(columns_for_level(1), 9);
        assert_eq!(rows_for_level(1), 5);
        assert_eq!(state.bricks.len(), 45);
    }

    #[test]
    fn test_field_growth_caps() {
        assert_eq!(columns_for_level(6), 14);
        assert_eq!(columns_for_level(30), 14);
        assert_eq!(rows_for_level(5), 9);
        assert_eq!(rows_for_level(30), 9);
    }

    #[test]
    fn test_launch_releases_ball_at_base_speed() {
        let state = launched_state(42);
        assert!(!state.ball.stuck);
        assert!((state.ball.vel.length() - BALL_START_SPEED).abs() < 1e-4);
        // Upward-biased spread: [-120, -60] degrees from horizontal
        let angle = state.ball.vel.y.atan2(state.ball.vel.x).to_degrees();
        assert!(
            (-120.001..=-59.999).contains(&angle),
            "launch angle out of range: {angle}"
        );
    }

    #[test]
    fn test_launch_is_noop_when_free() {
        let mut state = launched_state(42);
        let vel = state.ball.vel;
        let input = TickInput {
            launch: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.ball.vel, vel);
    }

    #[test]
    fn test_stuck_ball_tracks_paddle() {
        let mut state = GameState::new(7, 0);
        let input = TickInput {
            move_right: true,
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut state, &input);
        }
        assert_eq!(state.ball.pos.x, state.paddle.center_x);
        assert_eq!(state.ball.vel, Vec2::ZERO);
    }

    #[test]
    fn test_pause_freezes_update() {
        let mut state = launched_state(42);
        let pos = state.ball.pos;
        let pause = TickInput {
            toggle_pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Paused);

        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.ball.pos, pos);
        assert_eq!(state.time_ticks, ticks);

        // Toggle back
        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_wall_bounce_inverts_x() {
        let mut state = launched_state(42);
        state.ball.pos = Vec2::new(BALL_RADIUS + 1.0, 300.0);
        state.ball.vel = Vec2::new(-3.0, -2.0);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.ball.vel, Vec2::new(3.0, -2.0));
    }

    #[test]
    fn test_ceiling_bounce_inverts_y() {
        let mut state = launched_state(42);
        state.ball.pos = Vec2::new(400.0, BALL_RADIUS + 1.0);
        state.ball.vel = Vec2::new(1.5, -3.0);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.ball.vel, Vec2::new(1.5, 3.0));
    }

    #[test]
    fn test_brick_hit_decrements_and_removes() {
        let mut state = launched_state(42);
        state.bricks.clear();
        state
            .bricks
            .push(Brick::new(Rect::new(100.0, 100.0, 80.0, 20.0), (200, 60, 60), 50));
        state
            .bricks
            .push(Brick::new(Rect::new(600.0, 100.0, 80.0, 20.0), (200, 60, 60), 50));

        // Park the ball so the next advance lands inside the first brick
        state.ball.pos = Vec2::new(140.0, 125.0);
        state.ball.vel = Vec2::new(0.0, -4.0);
        let events = tick(&mut state, &TickInput::default());

        assert_eq!(state.bricks.len(), 1);
        assert_eq!(state.score, 50);
        assert!(events.contains(&GameEvent::BrickDestroyed { points: 50 }));
        // Bounce: y-velocity inverted exactly once
        assert_eq!(state.ball.vel.y, 4.0);
    }

    #[test]
    fn test_simultaneous_brick_hits_invert_y_once() {
        let mut state = launched_state(42);
        state.bricks.clear();
        state
            .bricks
            .push(Brick::new(Rect::new(100.0, 100.0, 40.0, 20.0), (200, 60, 60), 50));
        state
            .bricks
            .push(Brick::new(Rect::new(140.0, 100.0, 40.0, 20.0), (200, 120, 60), 40));
        // A far-away brick keeps the level from clearing mid-assert
        state
            .bricks
            .push(Brick::new(Rect::new(600.0, 100.0, 40.0, 20.0), (60, 200, 120), 20));

        // The ball straddles the seam between the first two bricks
        state.ball.pos = Vec2::new(140.0, 125.0);
        state.ball.vel = Vec2::new(0.0, -4.0);
        tick(&mut state, &TickInput::default());

        assert_eq!(state.bricks.len(), 1);
        assert_eq!(state.score, 90);
        assert_eq!(state.ball.vel, Vec2::new(0.0, 4.0));
    }

    #[test]
    fn test_paddle_bounce_emits_event_and_speeds_up() {
        let mut state = launched_state(42);
        let speed_before = 5.0;
        state.ball.pos = Vec2::new(
            state.paddle.center_x,
            state.paddle.top() - BALL_RADIUS + 1.0,
        );
        state.ball.vel = Vec2::new(0.0, speed_before);
        // Position already overlaps after one advance step
        state.ball.pos.y -= speed_before;
        let events = tick(&mut state, &TickInput::default());

        assert!(events.contains(&GameEvent::PaddleHit));
        let expected = (speed_before * 1.05 + 0.2).min(BALL_MAX_SPEED);
        assert!((state.ball.vel.length() - expected).abs() < 1e-3);
        assert!(state.ball.vel.y <= 0.0);
    }

    #[test]
    fn test_ball_lost_resets_stuck() {
        let mut state = launched_state(42);
        state.ball.pos = Vec2::new(400.0, SCREEN_HEIGHT + 50.0);
        state.ball.vel = Vec2::new(0.0, 5.0);
        let events = tick(&mut state, &TickInput::default());

        assert_eq!(state.lives, START_LIVES - 1);
        assert!(events.contains(&GameEvent::BallLost));
        assert!(state.ball.stuck);
        assert_eq!(state.ball.vel, Vec2::ZERO);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_last_life_is_terminal_game_over() {
        let mut state = launched_state(42);
        state.lives = 1;
        state.ball.pos = Vec2::new(400.0, SCREEN_HEIGHT + 50.0);
        state.ball.vel = Vec2::new(0.0, 5.0);
        let events = tick(&mut state, &TickInput::default());

        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(events.contains(&GameEvent::GameOver));

        // Pause cannot resurrect a dead session
        let pause = TickInput {
            toggle_pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::GameOver);

        // No further score accrual while dead
        let score = state.score;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.score, score);
    }

    #[test]
    fn test_level_clear_advances_and_rebuilds() {
        let mut state = launched_state(42);
        state.bricks.clear();
        state.powerups.push(PowerUp::new(
            Vec2::new(100.0, 100.0),
            PowerUpKind::ExtraLife,
        ));
        let events = tick(&mut state, &TickInput::default());

        assert_eq!(state.level, 2);
        assert!(events.contains(&GameEvent::LevelCleared { level: 2 }));
        assert!((state.ball.base_speed - (BALL_START_SPEED + BASE_SPEED_STEP)).abs() < 1e-6);
        assert!(state.ball.stuck);
        assert!(state.powerups.is_empty());
        assert_eq!(
            state.bricks.len() as u32,
            columns_for_level(2) * rows_for_level(2)
        );
    }

    #[test]
    fn test_base_speed_caps_at_twelve() {
        let mut state = launched_state(42);
        for _ in 0..20 {
            state.bricks.clear();
            tick(&mut state, &TickInput::default());
        }
        assert!((state.ball.base_speed - BASE_SPEED_CAP).abs() < 1e-6);
    }

    #[test]
    fn test_widen_pickup_and_extend_only_expiry() {
        let mut state = launched_state(42);
        let base = state.paddle.base_width;

        // Drop a widen power-up straight onto the paddle
        state.powerups.push(PowerUp::new(
            Vec2::new(state.paddle.center_x, state.paddle.top()),
            PowerUpKind::Widen,
        ));
        let events = tick(&mut state, &TickInput::default());
        assert!(events.contains(&GameEvent::PowerUpCollected {
            kind: PowerUpKind::Widen
        }));
        assert!((state.paddle.width - base * WIDEN_MULTIPLIER).abs() < 1e-4);

        let first_expiry = state.paddle.widen.expect("widen active").expires_at_tick;

        // A second pickup later extends the expiry, never shortens it
        for _ in 0..30 {
            tick(&mut state, &TickInput::default());
        }
        state.powerups.push(PowerUp::new(
            Vec2::new(state.paddle.center_x, state.paddle.top()),
            PowerUpKind::Widen,
        ));
        tick(&mut state, &TickInput::default());
        let second_expiry = state.paddle.widen.expect("widen active").expires_at_tick;
        assert!(second_expiry > first_expiry);

        // After the expiry passes, the paddle reverts exactly to base width
        state.paddle.widen = Some(WidenEffect {
            expires_at_tick: state.time_ticks,
            ..state.paddle.widen.unwrap()
        });
        tick(&mut state, &TickInput::default());
        assert_eq!(state.paddle.width, base);
        assert!(state.paddle.widen.is_none());
    }

    #[test]
    fn test_extra_life_pickup() {
        let mut state = launched_state(42);
        state.powerups.push(PowerUp::new(
            Vec2::new(state.paddle.center_x, state.paddle.top()),
            PowerUpKind::ExtraLife,
        ));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.lives, START_LIVES + 1);
    }

    #[test]
    fn test_powerup_despawns_below_screen() {
        let mut state = launched_state(42);
        state
            .powerups
            .push(PowerUp::new(Vec2::new(100.0, SCREEN_HEIGHT + 40.0), PowerUpKind::Widen));
        tick(&mut state, &TickInput::default());
        assert!(state.powerups.is_empty());
        assert_eq!(state.paddle.width, state.paddle.base_width);
    }

    #[test]
    fn test_restart_resets_session_but_not_high_score() {
        let mut state = launched_state(42);
        state.score = 230;
        state.high_score = 230;
        state.lives = 1;
        state.level = 3;

        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &input);

        assert_eq!(state.score, 0);
        assert_eq!(state.lives, START_LIVES);
        assert_eq!(state.level, 1);
        assert_eq!(state.high_score, 230);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.ball.stuck);
        assert_eq!(state.bricks.len(), 45);
    }

    #[test]
    fn test_high_score_watermark_is_monotone() {
        let mut state = launched_state(42);
        state.score = 80;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.high_score, 80);

        state.score = 40;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.high_score, 80);
    }

    #[test]
    fn test_determinism_same_seed_same_run() {
        let mut a = GameState::new(99_999, 0);
        let mut b = GameState::new(99_999, 0);

        let scripts = [
            TickInput {
                launch: true,
                ..Default::default()
            },
            TickInput {
                move_left: true,
                ..Default::default()
            },
            TickInput {
                move_right: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for input in scripts.iter().cycle().take(600) {
            tick(&mut a, input);
            tick(&mut b, input);
        }

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.score, b.score);
        assert_eq!(a.ball.pos, b.ball.pos);
        assert_eq!(a.ball.vel, b.ball.vel);
        assert_eq!(a.bricks.len(), b.bricks.len());
    }
}
