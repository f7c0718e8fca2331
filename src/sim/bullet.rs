//! Projectiles
//!
//! Bullets live in a `Pool` and are recycled rather than reallocated.
//! Unlike every other body they never wrap: leaving the playfield or
//! running out of lifetime destroys them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Body;
use super::physics::{from_angle, in_bounds, integrate};
use crate::config::{BulletConfig, WorldConfig};

/// Who fired the bullet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    #[default]
    Player,
    /// Fired by the UFO
    Hostile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub body: Body,
    pub owner: Owner,
    /// Seconds left before the bullet fizzles
    pub lifetime: f32,
}

impl Default for Bullet {
    fn default() -> Self {
        let mut body = Body::new(Vec2::ZERO, 0.0);
        body.alive = false;
        Self {
            body,
            owner: Owner::Player,
            lifetime: 0.0,
        }
    }
}

impl Bullet {
    /// (Re)launch a pooled bullet from `pos` along `angle`
    pub fn fire(&mut self, pos: Vec2, angle: f32, owner: Owner, cfg: &BulletConfig) {
        self.body = Body::new(pos, cfg.radius);
        self.body.vel = from_angle(angle, cfg.speed);
        self.body.rotation = angle;
        self.owner = owner;
        self.lifetime = cfg.lifetime_secs;
    }

    /// Pool reset hook
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_hostile(&self) -> bool {
        self.owner == Owner::Hostile
    }

    /// Move, age, and destroy on expiry or on leaving the world
    pub fn update(&mut self, dt: f32, world: &WorldConfig) {
        self.body.pos = integrate(self.body.pos, self.body.vel, dt);
        self.lifetime -= dt;
        if self.lifetime <= 0.0 || !in_bounds(self.body.pos, world) {
            self.body.destroy();
        }
    }
}
