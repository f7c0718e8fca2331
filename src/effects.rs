//! Visual effects port and the built-in particle system
//!
//! Particles are purely cosmetic. They draw from their own RNG so that
//! plugging a different effects back-end never changes gameplay.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::error::PortError;
use crate::sim::asteroid::AsteroidSize;
use crate::sim::physics::{from_angle, integrate};
use crate::sim::pool::Pool;
use crate::sim::powerup::PowerUpKind;

const SHIP_COLOR: u32 = 0x00ffff;
const THRUST_COLOR: u32 = 0xff9900;
const DEBRIS_COLOR: u32 = 0xffffff;
const UFO_COLOR: u32 = 0xff00ff;

/// What blew up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionKind {
    Asteroid(AsteroidSize),
    Ufo,
    Ship,
}

/// Explosion preset
#[derive(Debug, Clone, Copy)]
struct Burst {
    count: usize,
    speed: f32,
    lifetime: f32,
    size: f32,
    color: u32,
}

impl ExplosionKind {
    fn burst(self) -> Burst {
        let (count, speed, lifetime, size, color) = match self {
            ExplosionKind::Asteroid(AsteroidSize::Large) => (20, 150.0, 0.8, 4.0, DEBRIS_COLOR),
            ExplosionKind::Asteroid(AsteroidSize::Medium) => (15, 120.0, 0.6, 3.0, DEBRIS_COLOR),
            ExplosionKind::Asteroid(AsteroidSize::Small) => (10, 100.0, 0.4, 2.0, DEBRIS_COLOR),
            ExplosionKind::Ufo => (25, 200.0, 1.0, 4.0, UFO_COLOR),
            ExplosionKind::Ship => (15, 200.0, 0.6, 3.0, SHIP_COLOR),
        };
        Burst {
            count,
            speed,
            lifetime,
            size,
            color,
        }
    }
}

/// RGB color of a pickup's burst
pub fn pickup_color(kind: PowerUpKind) -> u32 {
    match kind {
        PowerUpKind::Shield => 0x00ff00,
        PowerUpKind::RapidFire => 0xff0000,
        PowerUpKind::MultiShot => 0xffff00,
    }
}

/// Visual effects back-end seen by the simulation
pub trait EffectsPort {
    fn create_explosion(&mut self, pos: Vec2, kind: ExplosionKind) -> Result<(), PortError>;

    /// Exhaust puff behind a ship facing `angle`
    fn create_thrust(&mut self, pos: Vec2, angle: f32) -> Result<(), PortError>;

    fn create_pickup_burst(&mut self, pos: Vec2, kind: PowerUpKind) -> Result<(), PortError>;

    /// Advance any running effects by `dt`
    fn advance(&mut self, _dt: f32) -> Result<(), PortError> {
        Ok(())
    }

    /// Drop every running effect
    fn clear(&mut self) -> Result<(), PortError> {
        Ok(())
    }

    /// Snapshot of live particles for drawing
    fn particles(&self) -> Vec<Particle> {
        Vec::new()
    }
}

/// Ignores every effect request
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffects;

impl EffectsPort for NoEffects {
    fn create_explosion(&mut self, _pos: Vec2, _kind: ExplosionKind) -> Result<(), PortError> {
        Ok(())
    }

    fn create_thrust(&mut self, _pos: Vec2, _angle: f32) -> Result<(), PortError> {
        Ok(())
    }

    fn create_pickup_burst(&mut self, _pos: Vec2, _kind: PowerUpKind) -> Result<(), PortError> {
        Ok(())
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub size: f32,
    /// Seconds left
    pub life: f32,
    pub max_life: f32,
    pub alive: bool,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            color: DEBRIS_COLOR,
            size: 1.0,
            life: 0.0,
            max_life: 1.0,
            alive: false,
        }
    }
}

impl Particle {
    fn launch(&mut self, pos: Vec2, vel: Vec2, color: u32, size: f32, lifetime: f32) {
        self.pos = pos;
        self.vel = vel;
        self.color = color;
        self.size = size;
        self.life = lifetime;
        self.max_life = lifetime;
        self.alive = true;
    }

    fn update(&mut self, dt: f32) {
        self.pos = integrate(self.pos, self.vel, dt);
        self.life -= dt;
        if self.life <= 0.0 {
            self.alive = false;
        }
    }

    /// Fades linearly over the particle's lifetime
    pub fn opacity(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// Pooled particle emitter
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    pool: Pool<Particle>,
    rng: Pcg32,
}

impl ParticleSystem {
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            pool: Pool::new(capacity, Particle::default, |p| p.alive = false),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Pool sized by `particle_capacity`
    pub fn from_config(cfg: &SessionConfig, seed: u64) -> Self {
        Self::new(cfg.particle_capacity, seed)
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    /// Total pooled particles (free + active)
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    fn emit(&mut self, pos: Vec2, vel: Vec2, color: u32, size: f32, lifetime: f32) {
        self.pool
            .spawn(|p| p.launch(pos, vel, color, size, lifetime));
    }
}

impl EffectsPort for ParticleSystem {
    fn create_explosion(&mut self, pos: Vec2, kind: ExplosionKind) -> Result<(), PortError> {
        let burst = kind.burst();
        for _ in 0..burst.count {
            let angle = self.rng.random_range(0.0..TAU);
            let speed = self.rng.random_range(burst.speed * 0.5..=burst.speed);
            let size = self.rng.random_range(burst.size * 0.5..=burst.size);
            self.emit(pos, from_angle(angle, speed), burst.color, size, burst.lifetime);
        }
        Ok(())
    }

    fn create_thrust(&mut self, pos: Vec2, angle: f32) -> Result<(), PortError> {
        for _ in 0..3 {
            let spread = angle + PI + self.rng.random_range(-0.3..=0.3);
            let speed = self.rng.random_range(50.0..=100.0);
            let jitter = Vec2::new(
                self.rng.random_range(-5.0..=5.0),
                self.rng.random_range(-5.0..=5.0),
            );
            self.emit(pos + jitter, from_angle(spread, speed), THRUST_COLOR, 2.0, 0.3);
        }
        Ok(())
    }

    fn create_pickup_burst(&mut self, pos: Vec2, kind: PowerUpKind) -> Result<(), PortError> {
        const COUNT: usize = 20;
        let color = pickup_color(kind);
        for i in 0..COUNT {
            let angle = i as f32 / COUNT as f32 * TAU;
            let speed = self.rng.random_range(50.0..=150.0);
            self.emit(pos, from_angle(angle, speed), color, 3.0, 0.8);
        }
        Ok(())
    }

    fn advance(&mut self, dt: f32) -> Result<(), PortError> {
        for particle in self.pool.iter_mut() {
            particle.update(dt);
        }
        self.pool.retain(|p| p.alive);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PortError> {
        self.pool.release_all();
        Ok(())
    }

    fn particles(&self) -> Vec<Particle> {
        self.pool.iter().cloned().collect()
    }
}
