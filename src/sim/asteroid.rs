//! Asteroids: jagged outlines, spin, and fragmentation

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::Body;
use super::physics::from_angle;
use crate::config::{AsteroidConfig, WorldConfig};
use crate::normalize_angle;

/// Size class. Only ever decreases, one step per split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    pub fn radius(self, cfg: &AsteroidConfig) -> f32 {
        match self {
            AsteroidSize::Large => cfg.radius_large,
            AsteroidSize::Medium => cfg.radius_medium,
            AsteroidSize::Small => cfg.radius_small,
        }
    }

    /// Score for destroying an asteroid of this size
    pub fn points(self, cfg: &AsteroidConfig) -> u64 {
        match self {
            AsteroidSize::Large => cfg.points_large,
            AsteroidSize::Medium => cfg.points_medium,
            AsteroidSize::Small => cfg.points_small,
        }
    }

    /// Size of the fragments this size breaks into
    pub fn smaller(self) -> Option<AsteroidSize> {
        match self {
            AsteroidSize::Large => Some(AsteroidSize::Medium),
            AsteroidSize::Medium => Some(AsteroidSize::Small),
            AsteroidSize::Small => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AsteroidSize::Large => "large",
            AsteroidSize::Medium => "medium",
            AsteroidSize::Small => "small",
        }
    }
}

/// One outline vertex: polar angle and radial scale in [1 − jaggedness, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlineVertex {
    pub angle: f32,
    pub jitter: f32,
}

/// A drifting, spinning rock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub body: Body,
    pub size: AsteroidSize,
    pub outline: Vec<OutlineVertex>,
    /// Radians per second, fixed at creation
    pub spin: f32,
}

impl Asteroid {
    /// Random shape, spin and heading at the base speed range
    pub fn new(pos: Vec2, size: AsteroidSize, cfg: &AsteroidConfig, rng: &mut impl Rng) -> Self {
        let vertex_count = rng.random_range(cfg.min_vertices..=cfg.max_vertices);
        let outline = (0..vertex_count)
            .map(|i| OutlineVertex {
                angle: i as f32 / vertex_count as f32 * TAU,
                jitter: rng.random_range((1.0 - cfg.jaggedness)..=1.0),
            })
            .collect();

        let mut body = Body::new(pos, size.radius(cfg));
        let speed = rng.random_range(cfg.min_speed..=cfg.max_speed);
        body.vel = from_angle(rng.random_range(0.0..TAU), speed);

        Self {
            body,
            size,
            outline,
            spin: rng.random_range(-cfg.spin_speed..=cfg.spin_speed),
        }
    }

    pub fn update(&mut self, dt: f32, world: &WorldConfig) {
        self.body.advance_wrapped(dt, world);
        self.body.rotation = normalize_angle(self.body.rotation + self.spin * dt);
    }

    pub fn points(&self, cfg: &AsteroidConfig) -> u64 {
        self.size.points(cfg)
    }

    /// Fragments produced when this asteroid is shot.
    ///
    /// Large and medium rocks break into 2 or 3 of the next size down,
    /// fanned evenly around a circle with some jitter and sent off faster
    /// than the base speed range. Small rocks leave nothing.
    pub fn split(&self, cfg: &AsteroidConfig, rng: &mut impl Rng) -> Vec<Asteroid> {
        let Some(child_size) = self.size.smaller() else {
            return Vec::new();
        };
        let count = if rng.random_bool(0.5) { 2 } else { 3 };
        let min_speed = cfg.min_speed * cfg.split_speed_factor;
        let max_speed = cfg.max_speed * cfg.split_speed_factor;

        (0..count)
            .map(|i| {
                let jitter = rng.random_range(-cfg.split_jitter..=cfg.split_jitter);
                let angle = i as f32 / count as f32 * TAU + jitter;
                let speed = rng.random_range(min_speed..=max_speed);
                let mut child = Asteroid::new(self.body.pos, child_size, cfg, rng);
                child.body.vel = from_angle(angle, speed);
                child
            })
            .collect()
    }
}
