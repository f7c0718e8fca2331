//! Hostile saucer
//!
//! Crosses the screen horizontally from the edge it spawned on, drifting
//! up and down with a vertical speed that is re-rolled at random intervals.
//! It wraps vertically only; leaving past either side removes it.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::Body;
use super::physics::{heading, integrate};
use crate::config::{UfoConfig, WorldConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UfoSize {
    Large,
    Small,
}

impl UfoSize {
    pub fn radius(self, cfg: &UfoConfig) -> f32 {
        match self {
            UfoSize::Large => cfg.radius,
            UfoSize::Small => cfg.radius * 0.5,
        }
    }

    pub fn accuracy(self, cfg: &UfoConfig) -> f32 {
        match self {
            UfoSize::Large => cfg.accuracy_large,
            UfoSize::Small => cfg.accuracy_small,
        }
    }

    pub fn points(self, cfg: &UfoConfig) -> u64 {
        match self {
            UfoSize::Large => cfg.points_large,
            UfoSize::Small => cfg.points_small,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UfoSize::Large => "large",
            UfoSize::Small => "small",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ufo {
    pub body: Body,
    pub size: UfoSize,
    /// 1.0 aims dead on; 0.0 fires in any direction
    pub accuracy: f32,
    /// Seconds until the next shot
    pub fire_timer: f32,
    /// Seconds until the vertical drift is re-rolled
    pub redirect_secs: f32,
}

impl Ufo {
    /// Spawn on the left edge (moving right) or the right edge (moving left)
    pub fn spawn(
        size: UfoSize,
        from_left: bool,
        y: f32,
        cfg: &UfoConfig,
        world: &WorldConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let (x, direction) = if from_left {
            (0.0, 1.0)
        } else {
            (world.width, -1.0)
        };
        let mut body = Body::new(Vec2::new(x, y), size.radius(cfg));
        body.vel = Vec2::new(cfg.speed * direction, 0.0);
        Self {
            body,
            size,
            accuracy: size.accuracy(cfg),
            fire_timer: cfg.fire_interval_secs,
            redirect_secs: rng.random_range(cfg.redirect_min_secs..=cfg.redirect_max_secs),
        }
    }

    pub fn points(&self, cfg: &UfoConfig) -> u64 {
        self.size.points(cfg)
    }

    pub fn update(&mut self, dt: f32, cfg: &UfoConfig, world: &WorldConfig, rng: &mut impl Rng) {
        self.body.pos = integrate(self.body.pos, self.body.vel, dt);

        self.redirect_secs -= dt;
        if self.redirect_secs <= 0.0 {
            self.redirect_secs = rng.random_range(cfg.redirect_min_secs..=cfg.redirect_max_secs);
            self.body.vel.y = rng.random_range(-cfg.vertical_speed..=cfg.vertical_speed);
        }

        if self.body.pos.y < 0.0 {
            self.body.pos.y = world.height;
        } else if self.body.pos.y > world.height {
            self.body.pos.y = 0.0;
        }

        let r = self.body.radius;
        if self.body.pos.x < -r || self.body.pos.x > world.width + r {
            self.body.destroy();
        }

        self.fire_timer -= dt;
    }

    /// Consume the fire timer once it has run down
    pub fn try_fire(&mut self, cfg: &UfoConfig) -> bool {
        if self.fire_timer > 0.0 {
            return false;
        }
        self.fire_timer = cfg.fire_interval_secs;
        true
    }

    /// Heading towards `target`, spoiled by up to ±π·(1 − accuracy)
    pub fn aim_angle(&self, target: Vec2, rng: &mut impl Rng) -> f32 {
        let angle = heading(target - self.body.pos);
        let spread = PI * (1.0 - self.accuracy);
        if spread > 0.0 {
            angle + rng.random_range(-spread..=spread)
        } else {
            angle
        }
    }
}
