//! Game configuration
//!
//! Built once at startup and shared read-only with every component. Every
//! section carries `#[serde(default)]`, so a partial JSON file only
//! overrides what it names. Sections that fail validation are replaced by
//! their defaults rather than rejected.

use std::f32::consts::TAU;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Playfield dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl WorldConfig {
    fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

/// Player craft handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipConfig {
    pub radius: f32,
    /// Acceleration at full thrust (units/s²)
    pub thrust: f32,
    /// Turn rate (radians/s)
    pub turn_rate: f32,
    /// Fraction of velocity retained after one second
    pub friction: f32,
    pub max_speed: f32,
    /// Angular frequency of the invulnerability blink
    pub blink_frequency: f32,
    pub invulnerability_secs: f32,
    pub hyperspace_cooldown_secs: f32,
    /// Hyperspace never lands closer than this to a world edge
    pub hyperspace_margin: f32,
    pub fire_interval_secs: f32,
    /// Fire interval is divided by this while rapid fire is active
    pub rapid_fire_divisor: f32,
}

impl Default for ShipConfig {
    fn default() -> Self {
        Self {
            radius: 15.0,
            thrust: 300.0,
            turn_rate: TAU,
            friction: 0.7,
            max_speed: 500.0,
            blink_frequency: 20.0,
            invulnerability_secs: 3.0,
            hyperspace_cooldown_secs: 2.0,
            hyperspace_margin: 50.0,
            fire_interval_secs: 0.15,
            rapid_fire_divisor: 3.0,
        }
    }
}

impl ShipConfig {
    fn is_valid(&self) -> bool {
        self.radius > 0.0
            && self.max_speed > 0.0
            && (0.0..=1.0).contains(&self.friction)
            && self.fire_interval_secs >= 0.0
            && self.rapid_fire_divisor >= 1.0
            && self.hyperspace_margin >= 0.0
    }
}

/// Projectiles (shared by the player and the UFO)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    pub speed: f32,
    pub radius: f32,
    pub lifetime_secs: f32,
    /// Soft cap on concurrently live bullets; also the pool capacity
    pub max_bullets: usize,
    /// Heading offset of the outer multi-shot bullets (radians)
    pub multi_shot_spread: f32,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 500.0,
            radius: 2.0,
            lifetime_secs: 1.2,
            max_bullets: 10,
            multi_shot_spread: 0.1,
        }
    }
}

impl BulletConfig {
    fn is_valid(&self) -> bool {
        self.speed > 0.0 && self.radius > 0.0 && self.lifetime_secs > 0.0 && self.max_bullets > 0
    }
}

/// Asteroid field generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsteroidConfig {
    /// Wave size at level 1 (each level adds one)
    pub initial_count: u32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Speed range multiplier for split fragments
    pub split_speed_factor: f32,
    /// Random angular jitter applied to each fragment's direction (± radians)
    pub split_jitter: f32,
    pub radius_large: f32,
    pub radius_medium: f32,
    pub radius_small: f32,
    pub points_large: u64,
    pub points_medium: u64,
    pub points_small: u64,
    pub min_vertices: usize,
    pub max_vertices: usize,
    /// Outline vertices are pulled inward by up to this fraction of the radius
    pub jaggedness: f32,
    /// Maximum spin rate (radians/s)
    pub spin_speed: f32,
    /// New waves never spawn closer than this to the ship
    pub safe_spawn_distance: f32,
}

impl Default for AsteroidConfig {
    fn default() -> Self {
        Self {
            initial_count: 4,
            min_speed: 20.0,
            max_speed: 80.0,
            split_speed_factor: 1.5,
            split_jitter: 0.5,
            radius_large: 40.0,
            radius_medium: 20.0,
            radius_small: 10.0,
            points_large: 20,
            points_medium: 50,
            points_small: 100,
            min_vertices: 8,
            max_vertices: 12,
            jaggedness: 0.4,
            spin_speed: 1.2,
            safe_spawn_distance: 100.0,
        }
    }
}

impl AsteroidConfig {
    fn is_valid(&self) -> bool {
        self.initial_count > 0
            && self.min_speed >= 0.0
            && sampleable(self.min_speed, self.max_speed)
            && self.split_speed_factor > 0.0
            && sampleable(
                self.min_speed * self.split_speed_factor,
                self.max_speed * self.split_speed_factor,
            )
            && self.split_jitter >= 0.0
            && sampleable(-self.split_jitter, self.split_jitter)
            && self.radius_small > 0.0
            && self.radius_small <= self.radius_medium
            && self.radius_medium <= self.radius_large
            && self.min_vertices >= 3
            && self.min_vertices <= self.max_vertices
            && (0.0..1.0).contains(&self.jaggedness)
            && self.spin_speed >= 0.0
            && sampleable(-self.spin_speed, self.spin_speed)
    }
}

/// Hostile saucer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UfoConfig {
    /// Radius of the large saucer; the small one is half this
    pub radius: f32,
    pub speed: f32,
    /// Vertical drift is re-rolled within ± this speed
    pub vertical_speed: f32,
    pub redirect_min_secs: f32,
    pub redirect_max_secs: f32,
    pub fire_interval_secs: f32,
    pub spawn_interval_secs: f32,
    /// Spawn height stays this far from the top and bottom edges
    pub spawn_margin: f32,
    pub points_large: u64,
    pub points_small: u64,
    /// Aim accuracy in [0, 1]; the inaccuracy cone is ±π·(1 − accuracy)
    pub accuracy_large: f32,
    pub accuracy_small: f32,
}

impl Default for UfoConfig {
    fn default() -> Self {
        Self {
            radius: 20.0,
            speed: 100.0,
            vertical_speed: 50.0,
            redirect_min_secs: 1.0,
            redirect_max_secs: 3.0,
            fire_interval_secs: 2.0,
            spawn_interval_secs: 20.0,
            spawn_margin: 50.0,
            points_large: 200,
            points_small: 1000,
            accuracy_large: 0.3,
            accuracy_small: 0.95,
        }
    }
}

impl UfoConfig {
    fn is_valid(&self) -> bool {
        self.radius > 0.0
            && self.speed > 0.0
            && self.vertical_speed >= 0.0
            && sampleable(-self.vertical_speed, self.vertical_speed)
            && self.redirect_min_secs > 0.0
            && sampleable(self.redirect_min_secs, self.redirect_max_secs)
            && self.spawn_margin >= 0.0
            && self.fire_interval_secs > 0.0
            && self.spawn_interval_secs >= 0.0
            && (0.0..=1.0).contains(&self.accuracy_large)
            && (0.0..=1.0).contains(&self.accuracy_small)
    }
}

/// Pickups and the effects they grant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpConfig {
    pub radius: f32,
    /// Chance of a drop per destroyed asteroid
    pub spawn_chance: f64,
    pub lifetime_secs: f32,
    /// Pulse angular frequency (visual only)
    pub pulse_rate: f32,
    pub shield_charges: u32,
    pub shield_secs: f32,
    pub rapid_fire_secs: f32,
    pub multi_shot_secs: f32,
}

impl Default for PowerUpConfig {
    fn default() -> Self {
        Self {
            radius: 15.0,
            spawn_chance: 0.1,
            lifetime_secs: 10.0,
            pulse_rate: 4.0,
            shield_charges: 3,
            shield_secs: 5.0,
            rapid_fire_secs: 10.0,
            multi_shot_secs: 8.0,
        }
    }
}

impl PowerUpConfig {
    fn is_valid(&self) -> bool {
        self.radius > 0.0
            && (0.0..=1.0).contains(&self.spawn_chance)
            && self.lifetime_secs > 0.0
            && self.shield_secs >= 0.0
            && self.rapid_fire_secs >= 0.0
            && self.multi_shot_secs >= 0.0
    }
}

/// Broad-phase quadtree tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// A node splits once it holds more than this many objects
    pub max_objects: usize,
    pub max_depth: u32,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            max_objects: 10,
            max_depth: 5,
        }
    }
}

impl SpatialConfig {
    fn is_valid(&self) -> bool {
        self.max_objects > 0
    }
}

/// Session bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub starting_lives: u32,
    /// First score threshold that grants an extra life
    pub extra_life_score: u64,
    /// Threshold increment after each grant
    pub extra_life_step: u64,
    /// Upper bound on a single tick's delta (seconds)
    pub max_tick_dt: f32,
    /// Initial particle pool capacity
    pub particle_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            extra_life_score: 10_000,
            extra_life_step: 10_000,
            max_tick_dt: crate::consts::MAX_TICK_DT,
            particle_capacity: 50,
        }
    }
}

impl SessionConfig {
    fn is_valid(&self) -> bool {
        self.starting_lives > 0 && self.extra_life_step > 0 && self.max_tick_dt > 0.0
    }
}

/// `lo..=hi` is non-empty with a finite width, so it can be sampled
fn sampleable(lo: f32, hi: f32) -> bool {
    lo <= hi && (hi - lo).is_finite()
}

/// Complete, immutable game configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub world: WorldConfig,
    pub ship: ShipConfig,
    pub bullets: BulletConfig,
    pub asteroids: AsteroidConfig,
    pub ufo: UfoConfig,
    pub power_ups: PowerUpConfig,
    pub spatial: SpatialConfig,
    pub session: SessionConfig,
}

impl Config {
    /// Parse a (possibly partial) JSON document.
    ///
    /// Malformed JSON is an error; semantically invalid sections are
    /// replaced by their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Load from a JSON file, falling back to defaults on any failure
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path)
            .map_err(ConfigError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Using default config ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// First validation failure, if any
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            (self.world.is_valid(), "world dimensions must be positive"),
            (self.ship.is_valid(), "ship section out of range"),
            (self.bullets.is_valid(), "bullet section out of range"),
            (self.asteroids.is_valid(), "asteroid section out of range"),
            (self.ufo.is_valid(), "ufo section out of range"),
            (self.power_ups.is_valid(), "power-up section out of range"),
            (self.spatial.is_valid(), "spatial section out of range"),
            (self.session.is_valid(), "session section out of range"),
        ];
        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, reason)) => Err(ConfigError::Invalid(reason)),
            None => Ok(()),
        }
    }

    /// Replace every invalid section with its default
    pub fn sanitized(mut self) -> Self {
        if !self.world.is_valid() {
            log::warn!("Invalid world config, using defaults");
            self.world = WorldConfig::default();
        }
        if !self.ship.is_valid() {
            log::warn!("Invalid ship config, using defaults");
            self.ship = ShipConfig::default();
        }
        if !self.bullets.is_valid() {
            log::warn!("Invalid bullet config, using defaults");
            self.bullets = BulletConfig::default();
        }
        if !self.asteroids.is_valid() {
            log::warn!("Invalid asteroid config, using defaults");
            self.asteroids = AsteroidConfig::default();
        }
        if !self.ufo.is_valid() {
            log::warn!("Invalid ufo config, using defaults");
            self.ufo = UfoConfig::default();
        }
        if !self.power_ups.is_valid() {
            log::warn!("Invalid power-up config, using defaults");
            self.power_ups = PowerUpConfig::default();
        }
        if !self.spatial.is_valid() {
            log::warn!("Invalid spatial config, using defaults");
            self.spatial = SpatialConfig::default();
        }
        if !self.session.is_valid() {
            log::warn!("Invalid session config, using defaults");
            self.session = SessionConfig::default();
        }
        self
    }
}
