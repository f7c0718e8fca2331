//! Entity model
//!
//! Every simulated object shares a physical envelope (`Body`) and carries a
//! per-kind payload in its own struct (`Ship`, `Asteroid`, ...). Code that
//! needs to treat entities uniformly goes through `EntityRef`, a borrowed
//! tagged union, and dispatches on `EntityKind` explicitly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::asteroid::{Asteroid, OutlineVertex};
use super::bullet::Bullet;
use super::physics::{Rect, integrate, wrap_position};
use super::powerup::PowerUp;
use super::ship::Ship;
use super::ufo::Ufo;
use crate::config::WorldConfig;

/// Physical state shared by every entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Radians
    pub rotation: f32,
    pub alive: bool,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            rotation: 0.0,
            alive: true,
        }
    }

    /// Integrate one step and wrap around the world edges
    pub fn advance_wrapped(&mut self, dt: f32, world: &WorldConfig) {
        self.pos = wrap_position(integrate(self.pos, self.vel, dt), world);
    }

    /// Broad-phase bounding box
    pub fn bounds(&self) -> Rect {
        Rect::around(self.pos, self.radius)
    }

    pub fn destroy(&mut self) {
        self.alive = false;
    }
}

/// Kind tag for dispatch and for renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Ship,
    Asteroid,
    Bullet,
    Ufo,
    PowerUp,
}

/// Borrowed view over any entity
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Ship(&'a Ship),
    Asteroid(&'a Asteroid),
    Bullet(&'a Bullet),
    Ufo(&'a Ufo),
    PowerUp(&'a PowerUp),
}

impl<'a> EntityRef<'a> {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Ship(_) => EntityKind::Ship,
            EntityRef::Asteroid(_) => EntityKind::Asteroid,
            EntityRef::Bullet(_) => EntityKind::Bullet,
            EntityRef::Ufo(_) => EntityKind::Ufo,
            EntityRef::PowerUp(_) => EntityKind::PowerUp,
        }
    }

    pub fn body(&self) -> &'a Body {
        match self {
            EntityRef::Ship(s) => &s.body,
            EntityRef::Asteroid(a) => &a.body,
            EntityRef::Bullet(b) => &b.body,
            EntityRef::Ufo(u) => &u.body,
            EntityRef::PowerUp(p) => &p.body,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.body().bounds()
    }

    /// Render-facing snapshot of this entity
    pub fn drawable(&self) -> Drawable {
        let body = self.body();
        let mut drawable = Drawable {
            kind: self.kind(),
            pos: body.pos,
            rotation: body.rotation,
            radius: body.radius,
            visible: true,
            opacity: 1.0,
            shielded: false,
            thrusting: false,
            hostile: false,
            outline: Vec::new(),
        };
        match self {
            EntityRef::Ship(ship) => {
                drawable.visible = ship.visible;
                drawable.shielded = ship.shields > 0;
                drawable.thrusting = ship.thrust > 0.0;
            }
            EntityRef::Asteroid(asteroid) => {
                drawable.outline = asteroid.outline.clone();
            }
            EntityRef::Bullet(bullet) => {
                drawable.hostile = bullet.is_hostile();
            }
            EntityRef::Ufo(_) => {}
            EntityRef::PowerUp(power_up) => {
                drawable.radius = power_up.pulse_radius();
                drawable.opacity = power_up.opacity();
            }
        }
        drawable
    }
}

/// Everything an external renderer needs to draw one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawable {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub rotation: f32,
    pub radius: f32,
    /// False during the off phase of the invulnerability blink
    pub visible: bool,
    /// Alpha in [0, 1]; expiring pickups fade out
    pub opacity: f32,
    pub shielded: bool,
    pub thrusting: bool,
    /// Bullet fired by the UFO
    pub hostile: bool,
    /// Asteroid outline (empty for other kinds)
    pub outline: Vec<OutlineVertex>,
}
