//! Block Buster - a terminal brick breaking game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state)
//! - `persistence`: High-score save file
//! - `display`: Terminal rendering layer

pub mod display;
pub mod persistence;
pub mod sim;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Logical playfield dimensions (pixels)
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: u32 = 60;

    /// Paddle defaults - anchored by its bottom-center point
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 16.0;
    /// Horizontal paddle travel per tick while a direction is held
    pub const PADDLE_SPEED: f32 = 7.0;
    /// Distance of the paddle's bottom edge from the screen bottom
    pub const PADDLE_BOTTOM_MARGIN: f32 = 30.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    pub const BALL_START_SPEED: f32 = 4.5;
    /// Hard cap on ball speed after paddle bounces
    pub const BALL_MAX_SPEED: f32 = 14.0;
    /// Base-speed raise per cleared level, and its cap
    pub const BASE_SPEED_STEP: f32 = 0.7;
    pub const BASE_SPEED_CAP: f32 = 12.0;
    /// Maximum bounce angle off the paddle (degrees from horizontal)
    pub const PADDLE_BOUNCE_MAX_DEG: f32 = 60.0;

    /// Brick field geometry
    pub const BRICK_HEIGHT: f32 = 24.0;
    pub const BRICK_FIELD_TOP: f32 = 60.0;
    pub const BRICK_GUTTER: f32 = 2.0;

    /// Power-up tuning
    pub const POWERUP_SIZE: f32 = 20.0;
    pub const POWERUP_FALL_SPEED: f32 = 3.0;
    /// Probability a destroyed brick drops any power-up
    pub const POWERUP_SPAWN_CHANCE: f64 = 0.22;
    /// Probability a spawned power-up widens the paddle (vs extra life)
    pub const WIDEN_PROB: f64 = 0.7;
    pub const WIDEN_MULTIPLIER: f32 = 1.5;
    pub const WIDEN_DURATION_MS: u64 = 20_000;

    pub const START_LIVES: u32 = 3;
}

/// Rotate a vector by `degrees` in screen coordinates (y axis points down).
///
/// Positive angles rotate from +x toward +y, so an upward deflection of
/// `a` degrees is a rotation by `-a`.
#[inline]
pub fn rotate_deg(v: Vec2, degrees: f32) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Convert a millisecond duration to whole simulation ticks.
#[inline]
pub fn ms_to_ticks(ms: u64) -> u64 {
    ms * consts::TICK_RATE as u64 / 1000
}
