//! Vector and physics primitives
//!
//! Vector algebra itself comes from `glam::Vec2` (`+`, `-`, `*`, `length`,
//! `distance`, `normalize_or_zero`). This module adds the handful of
//! operations the simulation needs on top: polar construction, toroidal
//! wrap, frame-rate independent friction and the circle overlap test.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::WorldConfig;
use crate::{cartesian_to_polar, polar_to_cartesian};

/// Vector of the given magnitude pointing along `angle`
#[inline]
pub fn from_angle(angle: f32, magnitude: f32) -> Vec2 {
    polar_to_cartesian(magnitude, angle)
}

/// Direction of a vector in radians (`atan2(y, x)`)
#[inline]
pub fn heading(v: Vec2) -> f32 {
    cartesian_to_polar(v).1
}

/// Explicit Euler step: `pos + vel * dt`
#[inline]
pub fn integrate(pos: Vec2, vel: Vec2, dt: f32) -> Vec2 {
    pos + vel * dt
}

/// Single-step toroidal wrap.
///
/// A coordinate past an edge is moved onto the opposite edge (not taken
/// modulo the world size). Per-tick displacement is bounded, so one step
/// is always enough.
pub fn wrap_position(pos: Vec2, world: &WorldConfig) -> Vec2 {
    let mut wrapped = pos;
    if wrapped.x < 0.0 {
        wrapped.x = world.width;
    } else if wrapped.x > world.width {
        wrapped.x = 0.0;
    }
    if wrapped.y < 0.0 {
        wrapped.y = world.height;
    } else if wrapped.y > world.height {
        wrapped.y = 0.0;
    }
    wrapped
}

/// Whether a point lies inside the world rectangle (edges inclusive)
#[inline]
pub fn in_bounds(pos: Vec2, world: &WorldConfig) -> bool {
    (0.0..=world.width).contains(&pos.x) && (0.0..=world.height).contains(&pos.y)
}

/// Exponential velocity decay: `vel * coefficient^dt`
#[inline]
pub fn apply_friction(vel: Vec2, coefficient: f32, dt: f32) -> Vec2 {
    vel * coefficient.powf(dt)
}

/// Rescale `vel` so its magnitude does not exceed `max_speed`
#[inline]
pub fn clamp_speed(vel: Vec2, max_speed: f32) -> Vec2 {
    if vel.length() > max_speed {
        vel.normalize_or_zero() * max_speed
    } else {
        vel
    }
}

/// Narrow-phase test: centers closer than the sum of radii
#[inline]
pub fn circle_collision(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

/// Axis-aligned bounding box (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounding box of a circle
    pub fn around(center: Vec2, radius: f32) -> Self {
        Self::new(
            center.x - radius,
            center.y - radius,
            radius * 2.0,
            radius * 2.0,
        )
    }

    /// The whole playfield
    pub fn world(world: &WorldConfig) -> Self {
        Self::new(0.0, 0.0, world.width, world.height)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Closed-interval overlap (touching edges count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }
}
