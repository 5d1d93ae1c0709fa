//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (carried inside `GameState`)
//! - No rendering, audio, or filesystem dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{paddle_bounce_velocity, reflect_x, reflect_y, Rect};
pub use state::{
    Ball, Brick, GameEvent, GamePhase, GameState, Paddle, PowerUp, PowerUpKind, WidenEffect,
};
pub use tick::{build_brick_field, columns_for_level, rows_for_level, tick, TickInput, ROW_STYLES};
