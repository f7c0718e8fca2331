//! Game state and core simulation types
//!
//! Everything a session owns lives in `GameState`. Randomness comes only
//! from the seeded `rng`, so two sessions fed the same seed and the same
//! inputs play out identically.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::asteroid::{Asteroid, AsteroidSize};
use super::bullet::{Bullet, Owner};
use super::entity::EntityRef;
use super::physics::{Rect, wrap_position};
use super::pool::Pool;
use super::powerup::PowerUp;
use super::quadtree::QuadTree;
use super::ship::Ship;
use super::ufo::{Ufo, UfoSize};
use crate::audio::SoundHandle;
use crate::config::Config;

/// Attempts at finding a wave spawn point clear of the ship
const SPAWN_ATTEMPTS: usize = 100;

/// Session lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first start
    #[default]
    Menu,
    Playing,
    Paused,
    /// Run ended; `start` plays again
    GameOver,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    /// 1-based level; wave size grows by one per level
    pub level: u32,
    /// Best score known to this session (loaded from the score store)
    pub high_score: u64,
    /// Score at which the next extra life is granted
    pub next_extra_life: u64,
    /// Seconds accumulated towards the next UFO spawn
    pub ufo_timer: f32,
    /// Present exactly while Playing or Paused
    pub ship: Option<Ship>,
    pub asteroids: Vec<Asteroid>,
    pub bullets: Pool<Bullet>,
    pub ufo: Option<Ufo>,
    pub power_ups: Vec<PowerUp>,
    /// Engine loop, while thrusting
    pub thrust_sound: Option<SoundHandle>,
    /// Drone loop, while a UFO is on screen
    pub ufo_sound: Option<SoundHandle>,
    /// Broad-phase index over `asteroids`, rebuilt every tick
    pub(crate) spatial: QuadTree,
}

impl GameState {
    /// Fresh state in the Menu phase
    pub fn new(seed: u64, cfg: &Config) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Menu,
            score: 0,
            lives: cfg.session.starting_lives,
            level: 1,
            high_score: 0,
            next_extra_life: cfg.session.extra_life_score,
            ufo_timer: 0.0,
            ship: None,
            asteroids: Vec::new(),
            bullets: Pool::new(cfg.bullets.max_bullets, Bullet::default, Bullet::clear),
            ufo: None,
            power_ups: Vec::new(),
            thrust_sound: None,
            ufo_sound: None,
            spatial: QuadTree::new(Rect::world(&cfg.world), &cfg.spatial),
        }
    }

    pub fn world_center(cfg: &Config) -> Vec2 {
        Vec2::new(cfg.world.width / 2.0, cfg.world.height / 2.0)
    }

    /// Uniform point at least `margin` away from every edge
    pub fn random_point(&mut self, margin: f32, cfg: &Config) -> Vec2 {
        let w = cfg.world.width;
        let h = cfg.world.height;
        let (x_lo, x_hi) = inset(margin, w);
        let (y_lo, y_hi) = inset(margin, h);
        Vec2::new(
            self.rng.random_range(x_lo..=x_hi),
            self.rng.random_range(y_lo..=y_hi),
        )
    }

    /// Spawn `initial_count + level - 1` large asteroids clear of the ship
    pub fn spawn_wave(&mut self, cfg: &Config) {
        let count = cfg.asteroids.initial_count + self.level.saturating_sub(1);
        let avoid = self.ship.as_ref().map(|s| s.body.pos);
        for _ in 0..count {
            let pos = self.wave_spawn_point(avoid, cfg);
            let asteroid = Asteroid::new(pos, AsteroidSize::Large, &cfg.asteroids, &mut self.rng);
            self.asteroids.push(asteroid);
        }
        log::debug!("Level {}: spawned {} asteroids", self.level, count);
    }

    fn wave_spawn_point(&mut self, avoid: Option<Vec2>, cfg: &Config) -> Vec2 {
        let mut pos = self.random_point(0.0, cfg);
        let Some(ship) = avoid else {
            return pos;
        };
        for _ in 0..SPAWN_ATTEMPTS {
            if pos.distance(ship) >= cfg.asteroids.safe_spawn_distance {
                return pos;
            }
            pos = self.random_point(0.0, cfg);
        }
        // Tiny worlds may have no clear spot; push straight away from the ship
        let away = (pos - ship).normalize_or_zero();
        let away = if away == Vec2::ZERO { Vec2::X } else { away };
        wrap_position(ship + away * cfg.asteroids.safe_spawn_distance, &cfg.world)
    }

    /// Launch a bullet unless the soft cap is reached
    pub fn fire_bullet(&mut self, pos: Vec2, angle: f32, owner: Owner, cfg: &Config) -> bool {
        if self.bullets.active_count() >= cfg.bullets.max_bullets {
            return false;
        }
        self.bullets
            .spawn(|b| b.fire(pos, angle, owner, &cfg.bullets));
        true
    }

    /// Create a UFO of random size on a random side
    pub fn spawn_ufo(&mut self, cfg: &Config) -> UfoSize {
        let size = if self.rng.random_bool(0.5) {
            UfoSize::Large
        } else {
            UfoSize::Small
        };
        let from_left = self.rng.random_bool(0.5);
        let (lo, hi) = inset(cfg.ufo.spawn_margin, cfg.world.height);
        let y = self.rng.random_range(lo..=hi);
        self.ufo = Some(Ufo::spawn(
            size,
            from_left,
            y,
            &cfg.ufo,
            &cfg.world,
            &mut self.rng,
        ));
        size
    }

    /// Rebuild the broad-phase index from the live asteroids
    pub fn rebuild_spatial(&mut self) {
        self.spatial.clear();
        for (i, asteroid) in self.asteroids.iter().enumerate() {
            if asteroid.body.alive {
                self.spatial.insert(asteroid.body.bounds(), i);
            }
        }
    }

    /// Every live entity, in draw order
    pub fn entities(&self) -> Vec<EntityRef<'_>> {
        let mut out = Vec::with_capacity(
            1 + self.asteroids.len() + self.bullets.active_count() + 1 + self.power_ups.len(),
        );
        out.extend(self.power_ups.iter().map(EntityRef::PowerUp));
        out.extend(self.asteroids.iter().map(EntityRef::Asteroid));
        out.extend(self.bullets.iter().map(EntityRef::Bullet));
        out.extend(self.ufo.iter().map(EntityRef::Ufo));
        out.extend(self.ship.iter().map(EntityRef::Ship));
        out
    }
}

/// `[margin, extent - margin]`, collapsing to the midpoint if the margin
/// does not fit
fn inset(margin: f32, extent: f32) -> (f32, f32) {
    if 2.0 * margin <= extent {
        (margin, extent - margin)
    } else {
        (extent / 2.0, extent / 2.0)
    }
}
