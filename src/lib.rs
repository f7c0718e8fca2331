//! Asteroid Storm - simulation core for a 2D arcade space shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, pooling, spatial index, collisions, game state)
//! - `session`: Public facade driving the session state machine
//! - `config`: Immutable, data-driven game balance
//! - `audio`, `effects`, `highscores`: Ports to the outside world (sound, particles, persistence)

pub mod audio;
pub mod config;
pub mod effects;
pub mod error;
pub mod highscores;
pub mod session;
pub mod sim;

pub use config::Config;
pub use error::{ConfigError, PortError};
pub use highscores::HighScores;
pub use session::{Hud, Ports, PowerUpIndicator, Session};
pub use sim::{GamePhase, InputSnapshot};

use glam::Vec2;

/// Timing constants shared by the simulation and its drivers
pub mod consts {
    /// Upper bound on a single tick's delta (bounds integration error on frame stalls)
    pub const MAX_TICK_DT: f32 = 1.0 / 30.0;
    /// Nominal frame delta used by headless drivers and tests
    pub const FRAME_DT: f32 = 1.0 / 60.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}
