//! Timed pickups

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::Body;
use crate::config::{PowerUpConfig, WorldConfig};

/// Effect granted on pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    RapidFire,
    MultiShot,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::Shield,
        PowerUpKind::RapidFire,
        PowerUpKind::MultiShot,
    ];

    /// Uniform pick over all kinds
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "shield",
            PowerUpKind::RapidFire => "rapid_fire",
            PowerUpKind::MultiShot => "multi_shot",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub body: Body,
    pub kind: PowerUpKind,
    /// Seconds since spawn, drives the pulse
    pub pulse_phase: f32,
    /// Seconds before the pickup disappears
    pub lifetime: f32,
    pulse_rate: f32,
}

impl PowerUp {
    /// A stationary pickup at `pos`
    pub fn new(pos: Vec2, kind: PowerUpKind, cfg: &PowerUpConfig) -> Self {
        Self {
            body: Body::new(pos, cfg.radius),
            kind,
            pulse_phase: 0.0,
            lifetime: cfg.lifetime_secs,
            pulse_rate: cfg.pulse_rate,
        }
    }

    pub fn update(&mut self, dt: f32, world: &WorldConfig) {
        self.body.advance_wrapped(dt, world);
        self.pulse_phase += dt;
        self.lifetime -= dt;
        if self.lifetime <= 0.0 {
            self.body.destroy();
        }
    }

    /// Drawn radius. Collision always uses the base radius.
    pub fn pulse_radius(&self) -> f32 {
        self.body.radius * (0.8 + 0.2 * (self.pulse_phase * self.pulse_rate).sin())
    }

    /// Fades out over the last two seconds
    pub fn opacity(&self) -> f32 {
        (self.lifetime / 2.0).clamp(0.0, 1.0)
    }
}
