//! Game state and core simulation types
//!
//! One authoritative arena: indexed lists for bricks and power-ups, a
//! singleton paddle and ball, and a single session struct owning score,
//! lives, level, and phase.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::Rect;
use crate::consts::*;
use crate::{ms_to_ticks, rotate_deg};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay (includes the pre-launch serve, see [`Ball::stuck`])
    Playing,
    /// Manual pause; all update logic frozen except input polling
    Paused,
    /// Lives exhausted; terminal until an explicit restart
    GameOver,
}

/// Power-up varieties dropped by destroyed bricks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpKind {
    /// Temporarily widens the paddle
    Widen,
    /// Grants one extra life
    ExtraLife,
}

/// Render/audio callouts produced by a tick. Consumers are best-effort;
/// the simulation never depends on their handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    PaddleHit,
    BrickDestroyed { points: u32 },
    PowerUpCollected { kind: PowerUpKind },
    BallLost,
    LevelCleared { level: u32 },
    GameOver,
}

/// A brick entity
#[derive(Debug, Clone)]
pub struct Brick {
    pub rect: Rect,
    pub color: (u8, u8, u8),
    pub hits_remaining: u32,
    pub point_value: u32,
}

impl Brick {
    pub fn new(rect: Rect, color: (u8, u8, u8), point_value: u32) -> Self {
        Self {
            rect,
            color,
            hits_remaining: 1,
            point_value,
        }
    }

    /// Register one hit. Returns true when the brick is destroyed.
    pub fn hit(&mut self) -> bool {
        self.hits_remaining = self.hits_remaining.saturating_sub(1);
        self.hits_remaining == 0
    }
}

/// Timed paddle-width multiplier with extend-only expiry semantics
#[derive(Debug, Clone, Copy)]
pub struct WidenEffect {
    pub multiplier: f32,
    /// Tick at which the paddle reverts to its base width
    pub expires_at_tick: u64,
    /// Duration of a single application, kept for HUD countdown display
    pub duration_ticks: u64,
}

impl WidenEffect {
    pub fn remaining_ticks(&self, now_tick: u64) -> u64 {
        self.expires_at_tick.saturating_sub(now_tick)
    }

    /// Fraction of the (single-application) duration still remaining
    pub fn fraction_remaining(&self, now_tick: u64) -> f32 {
        if self.duration_ticks == 0 {
            return 0.0;
        }
        (self.remaining_ticks(now_tick) as f32 / self.duration_ticks as f32).clamp(0.0, 1.0)
    }
}

/// The player's paddle, anchored by its bottom-center point
#[derive(Debug, Clone)]
pub struct Paddle {
    pub center_x: f32,
    pub bottom_y: f32,
    pub base_width: f32,
    /// Current width (base width times any active widen multiplier)
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub widen: Option<WidenEffect>,
}

impl Paddle {
    pub fn new() -> Self {
        Self {
            center_x: SCREEN_WIDTH / 2.0,
            bottom_y: SCREEN_HEIGHT - PADDLE_BOTTOM_MARGIN,
            base_width: PADDLE_WIDTH,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
            speed: PADDLE_SPEED,
            widen: None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_bottom_center(self.center_x, self.bottom_y, self.width, self.height)
    }

    pub fn top(&self) -> f32 {
        self.bottom_y - self.height
    }

    /// Move horizontally, keeping the whole paddle on screen.
    pub fn shift(&mut self, dx: f32) {
        let half = self.width / 2.0;
        self.center_x = (self.center_x + dx).clamp(half, SCREEN_WIDTH - half);
    }

    /// Apply a widen power-up. A second application while one is active
    /// extends the expiry to `max(current, now + duration)`; it never
    /// shortens an effect already running.
    pub fn apply_widen(&mut self, multiplier: f32, duration_ms: u64, now_tick: u64) {
        let duration_ticks = ms_to_ticks(duration_ms);
        let new_expiry = now_tick + duration_ticks;
        match &mut self.widen {
            Some(effect) => {
                effect.multiplier = multiplier;
                effect.expires_at_tick = effect.expires_at_tick.max(new_expiry);
                effect.duration_ticks = duration_ticks;
            }
            None => {
                self.widen = Some(WidenEffect {
                    multiplier,
                    expires_at_tick: new_expiry,
                    duration_ticks,
                });
            }
        }
        self.width = self.base_width * multiplier;
    }

    /// Revert to base width and clear the effect.
    pub fn reset_width(&mut self) {
        self.width = self.base_width;
        self.widen = None;
    }

    /// Expire an elapsed widen effect. Returns true if the width reverted.
    pub fn expire_widen(&mut self, now_tick: u64) -> bool {
        if let Some(effect) = self.widen {
            if now_tick > effect.expires_at_tick {
                self.reset_width();
                return true;
            }
        }
        false
    }
}

impl Default for Paddle {
    fn default() -> Self {
        Self::new()
    }
}

/// The ball. While `stuck` it rides the paddle with zero velocity; a launch
/// command releases it at a random upward angle.
#[derive(Debug, Clone)]
pub struct Ball {
    /// Center position
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Speed scalar used for launches; raised on level-ups
    pub base_speed: f32,
    pub stuck: bool,
}

impl Ball {
    pub fn new() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            base_speed: BALL_START_SPEED,
            stuck: true,
        }
    }

    /// Bounding box used for overlap tests
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.pos, self.radius * 2.0, self.radius * 2.0)
    }

    /// Current speed magnitude, falling back to the base speed at rest
    pub fn current_speed(&self) -> f32 {
        let len = self.vel.length();
        if len > 0.0 { len } else { self.base_speed }
    }

    /// Park the ball just above the paddle center.
    pub fn rest_on(&mut self, paddle: &Paddle) {
        self.pos = Vec2::new(paddle.center_x, paddle.top() - 2.0 - self.radius);
    }

    /// Re-attach to the paddle (after a lost life or level change).
    pub fn reset_to(&mut self, paddle: &Paddle) {
        self.stuck = true;
        self.vel = Vec2::ZERO;
        self.rest_on(paddle);
    }

    /// Release a stuck ball at a random angle in [-120, -60] degrees, an
    /// upward-biased spread. No-op when already free.
    pub fn launch(&mut self, rng: &mut impl Rng) {
        if self.stuck {
            let angle = rng.random_range(-120.0..=-60.0_f32);
            self.vel = rotate_deg(Vec2::new(self.base_speed, 0.0), angle);
            self.stuck = false;
        }
    }

    /// Advance one tick of free flight.
    pub fn advance(&mut self) {
        if !self.stuck {
            self.pos += self.vel;
        }
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

/// A falling power-up entity
#[derive(Debug, Clone)]
pub struct PowerUp {
    /// Center position
    pub pos: Vec2,
    pub kind: PowerUpKind,
}

impl PowerUp {
    pub fn new(pos: Vec2, kind: PowerUpKind) -> Self {
        Self { pos, kind }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.pos, POWERUP_SIZE, POWERUP_SIZE)
    }

    /// Descend one tick at constant speed.
    pub fn fall(&mut self) {
        self.pos.y += POWERUP_FALL_SPEED;
    }
}

/// Complete session state (deterministic; all randomness flows through the
/// embedded seeded RNG)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub(super) rng: Pcg32,
    pub score: u32,
    pub lives: u32,
    /// Current level, 1-based
    pub level: u32,
    /// Session high-score watermark; persisted by the driver when it rises
    pub high_score: u32,
    pub phase: GamePhase,
    /// Simulation tick counter (the clock for timed effects)
    pub time_ticks: u64,
    pub paddle: Paddle,
    pub ball: Ball,
    pub bricks: Vec<Brick>,
    pub powerups: Vec<PowerUp>,
}

impl GameState {
    /// Create a fresh session at level 1.
    pub fn new(seed: u64, high_score: u32) -> Self {
        let paddle = Paddle::new();
        let mut ball = Ball::new();
        ball.rest_on(&paddle);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            lives: START_LIVES,
            level: 1,
            high_score,
            phase: GamePhase::Playing,
            time_ticks: 0,
            paddle,
            ball,
            bricks: super::tick::build_brick_field(1),
            powerups: Vec::new(),
        }
    }

    /// Reset score/lives/level and rebuild the field, keeping the high
    /// score and the RNG stream. Valid from any phase.
    pub fn restart(&mut self) {
        self.score = 0;
        self.lives = START_LIVES;
        self.level = 1;
        self.phase = GamePhase::Playing;
        self.paddle = Paddle::new();
        self.ball = Ball::new();
        self.ball.rest_on(&self.paddle);
        self.bricks = super::tick::build_brick_field(1);
        self.powerups.clear();
    }
}
