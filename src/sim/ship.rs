//! The player's ship
//!
//! All timers here are countdowns in seconds, advanced only by `update`.
//! Nothing expires on a wall clock, so pausing freezes every effect and a
//! new session cannot be touched by a previous one.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Body;
use super::physics::{apply_friction, clamp_speed, from_angle};
use super::powerup::PowerUpKind;
use crate::config::{Config, PowerUpConfig, ShipConfig};
use crate::normalize_angle;

/// Remaining time on each power-up effect (0 = inactive)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub shield_secs: f32,
    pub rapid_fire_secs: f32,
    pub multi_shot_secs: f32,
}

impl ActiveEffects {
    /// Remaining time for one kind
    pub fn remaining(&self, kind: PowerUpKind) -> f32 {
        match kind {
            PowerUpKind::Shield => self.shield_secs,
            PowerUpKind::RapidFire => self.rapid_fire_secs,
            PowerUpKind::MultiShot => self.multi_shot_secs,
        }
    }

    fn tick(&mut self, dt: f32) {
        self.shield_secs = (self.shield_secs - dt).max(0.0);
        self.rapid_fire_secs = (self.rapid_fire_secs - dt).max(0.0);
        self.multi_shot_secs = (self.multi_shot_secs - dt).max(0.0);
    }
}

/// The player-controlled craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub body: Body,
    /// Thrust level in [0, 1]
    pub thrust: f32,
    /// Turn input in {-1, 0, 1}
    pub turn: f32,
    /// Seconds until the next shot is allowed
    pub fire_cooldown: f32,
    /// Seconds of invulnerability left
    pub invulnerable_secs: f32,
    blink_clock: f32,
    pub visible: bool,
    /// Hits the shield can still absorb
    pub shields: u32,
    pub effects: ActiveEffects,
    /// Seconds until hyperspace is ready again
    pub hyperspace_cooldown: f32,
}

impl Ship {
    pub fn new(pos: Vec2, cfg: &ShipConfig) -> Self {
        Self {
            body: Body::new(pos, cfg.radius),
            thrust: 0.0,
            turn: 0.0,
            fire_cooldown: 0.0,
            invulnerable_secs: 0.0,
            blink_clock: 0.0,
            visible: true,
            shields: 0,
            effects: ActiveEffects::default(),
            hyperspace_cooldown: 0.0,
        }
    }

    pub fn set_thrust(&mut self, value: f32) {
        self.thrust = value.clamp(0.0, 1.0);
    }

    pub fn set_turn(&mut self, value: f32) {
        self.turn = if value == 0.0 { 0.0 } else { value.signum() };
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_secs > 0.0
    }

    pub fn rapid_fire(&self) -> bool {
        self.effects.rapid_fire_secs > 0.0
    }

    pub fn multi_shot(&self) -> bool {
        self.effects.multi_shot_secs > 0.0
    }

    pub fn make_invulnerable(&mut self, secs: f32) {
        self.invulnerable_secs = secs;
        self.blink_clock = 0.0;
    }

    /// Advance motion and every countdown by `dt`
    pub fn update(&mut self, dt: f32, cfg: &Config) {
        let ship = &cfg.ship;
        self.body.advance_wrapped(dt, &cfg.world);

        self.body.rotation = normalize_angle(self.body.rotation + self.turn * ship.turn_rate * dt);

        if self.thrust > 0.0 {
            let accel = from_angle(self.body.rotation, ship.thrust * self.thrust);
            self.body.vel = clamp_speed(self.body.vel + accel * dt, ship.max_speed);
        }
        self.body.vel = apply_friction(self.body.vel, ship.friction, dt);

        if self.is_invulnerable() {
            self.invulnerable_secs -= dt;
            self.blink_clock += dt;
            if self.invulnerable_secs <= 0.0 {
                self.invulnerable_secs = 0.0;
                self.visible = true;
            } else {
                self.visible = (self.blink_clock * ship.blink_frequency).sin() > 0.0;
            }
        }

        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
        self.hyperspace_cooldown = (self.hyperspace_cooldown - dt).max(0.0);

        self.effects.tick(dt);
        if self.effects.shield_secs <= 0.0 {
            self.shields = 0;
        }
    }

    /// Consume the fire cooldown if it has elapsed
    pub fn try_fire(&mut self, cfg: &ShipConfig) -> bool {
        if self.fire_cooldown > 0.0 {
            return false;
        }
        self.fire_cooldown = if self.rapid_fire() {
            cfg.fire_interval_secs / cfg.rapid_fire_divisor
        } else {
            cfg.fire_interval_secs
        };
        true
    }

    /// Headings for the next volley: three spread shots under multi-shot
    pub fn fire_angles(&self, spread: f32) -> Vec<f32> {
        let heading = self.body.rotation;
        if self.multi_shot() {
            vec![heading - spread, heading, heading + spread]
        } else {
            vec![heading]
        }
    }

    /// Where bullets leave the hull
    pub fn muzzle(&self) -> Vec2 {
        self.body.pos + from_angle(self.body.rotation, self.body.radius)
    }

    /// Rear of the hull, where thrust particles are emitted
    pub fn exhaust(&self) -> Vec2 {
        self.body.pos + from_angle(self.body.rotation + std::f32::consts::PI, self.body.radius)
    }

    /// Consume the hyperspace cooldown if it has elapsed
    pub fn try_hyperspace(&mut self, cfg: &ShipConfig) -> bool {
        if self.hyperspace_cooldown > 0.0 {
            return false;
        }
        self.hyperspace_cooldown = cfg.hyperspace_cooldown_secs;
        true
    }

    /// Teleport and come to a dead stop
    pub fn jump_to(&mut self, pos: Vec2) {
        self.body.pos = pos;
        self.body.vel = Vec2::ZERO;
    }

    /// Returns true if the hit costs a life.
    ///
    /// Invulnerability ignores the hit; otherwise a shield charge absorbs it.
    pub fn take_damage(&mut self) -> bool {
        if self.is_invulnerable() {
            return false;
        }
        if self.shields > 0 {
            self.shields -= 1;
            return false;
        }
        true
    }

    /// Grant a pickup's effect. Re-acquiring a kind restarts its full duration.
    pub fn apply_power_up(&mut self, kind: PowerUpKind, cfg: &PowerUpConfig) {
        match kind {
            PowerUpKind::Shield => {
                self.shields = cfg.shield_charges;
                self.effects.shield_secs = cfg.shield_secs;
            }
            PowerUpKind::RapidFire => self.effects.rapid_fire_secs = cfg.rapid_fire_secs,
            PowerUpKind::MultiShot => self.effects.multi_shot_secs = cfg.multi_shot_secs,
        }
    }

    /// Respawn at `pos` after losing a life
    pub fn reset(&mut self, pos: Vec2, cfg: &ShipConfig) {
        self.body.pos = pos;
        self.body.vel = Vec2::ZERO;
        self.body.rotation = 0.0;
        self.thrust = 0.0;
        self.turn = 0.0;
        self.make_invulnerable(cfg.invulnerability_secs);
    }
}
