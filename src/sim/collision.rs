//! Collision detection and response for rectangular geometry
//!
//! The playfield is axis-aligned: bricks and the paddle are rectangles, the
//! ball collides through its bounding box the way the entities overlap in
//! play. Response math (bounce angles, speed growth) lives here so the tick
//! loop stays a sequence of named operations.

use glam::Vec2;

use crate::consts::*;
use crate::rotate_deg;

/// An axis-aligned rectangle in playfield coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Build a rect from its bottom-center anchor point.
    pub fn from_bottom_center(cx: f32, bottom: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w / 2.0, bottom - h, w, h)
    }

    /// Build a rect from its center point.
    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// Overlap test. Edge-touching rectangles do not count as overlapping.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Velocity after a paddle bounce.
///
/// The horizontal hit offset ratio (-1 at the left edge, +1 at the right)
/// maps to a deflection of up to `PADDLE_BOUNCE_MAX_DEG` from horizontal,
/// and the speed grows by `speed * 1.05 + 0.2` up to `BALL_MAX_SPEED`.
/// The vertical component is forced upward so the ball always leaves the
/// paddle.
pub fn paddle_bounce_velocity(
    ball_center_x: f32,
    paddle_center_x: f32,
    paddle_width: f32,
    current_speed: f32,
) -> Vec2 {
    // Degenerate paddle width would divide by zero; treat as a center hit.
    let offset = if paddle_width > f32::EPSILON {
        (ball_center_x - paddle_center_x) / (paddle_width / 2.0)
    } else {
        0.0
    };
    let bounce_angle = offset * PADDLE_BOUNCE_MAX_DEG;

    let new_speed = (current_speed * 1.05 + 0.2).min(BALL_MAX_SPEED);

    let mut vel = rotate_deg(Vec2::new(new_speed, 0.0), -bounce_angle);
    if vel.y > 0.0 {
        vel.y = -vel.y;
    }
    vel
}

/// Invert the horizontal velocity component.
#[inline]
pub fn reflect_x(vel: Vec2) -> Vec2 {
    Vec2::new(-vel.x, vel.y)
}

/// Invert the vertical velocity component.
#[inline]
pub fn reflect_y(vel: Vec2) -> Vec2 {
    Vec2::new(vel.x, -vel.y)
}
