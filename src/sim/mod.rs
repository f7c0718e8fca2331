//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Seeded RNG only (`GameState::rng`)
//! - Stable iteration order (pool slots and vector indices)
//! - No rendering or platform dependencies; side effects go through `Ports`

pub mod asteroid;
pub mod bullet;
pub mod collision;
pub mod entity;
pub mod physics;
pub mod pool;
pub mod powerup;
pub mod quadtree;
pub mod ship;
pub mod state;
pub mod tick;
pub mod ufo;

pub use asteroid::{Asteroid, AsteroidSize};
pub use bullet::{Bullet, Owner};
pub use collision::resolve_collisions;
pub use entity::{Body, Drawable, EntityKind, EntityRef};
pub use physics::Rect;
pub use pool::{Handle, Pool};
pub use powerup::{PowerUp, PowerUpKind};
pub use quadtree::QuadTree;
pub use ship::Ship;
pub use state::{GamePhase, GameState};
pub use tick::{InputSnapshot, pause, resume, start, tick};
pub use ufo::{Ufo, UfoSize};
