//! Collision detection and response
//!
//! Narrow phase is always the exact circle test. Player bullets against
//! asteroids go through the quadtree first; every other pairing involves
//! at most one ship or UFO and is checked directly. The passes run in a
//! fixed order on post-movement positions, and each one sees the effects
//! of the ones before it.

use rand::Rng;

use super::entity::Body;
use super::physics::circle_collision;
use super::powerup::{PowerUp, PowerUpKind};
use super::state::{GamePhase, GameState};
use super::tick::end_game;
use crate::audio::SoundEvent;
use crate::config::Config;
use crate::effects::ExplosionKind;
use crate::session::Ports;

#[inline]
fn bodies_touch(a: &Body, b: &Body) -> bool {
    circle_collision(a.pos, a.radius, b.pos, b.radius)
}

/// Run every collision pass for this tick
pub fn resolve_collisions(state: &mut GameState, cfg: &Config, ports: &mut Ports) {
    ship_vs_asteroids(state, cfg, ports);
    if state.phase != GamePhase::Playing {
        return;
    }
    player_bullets_vs_asteroids(state, cfg, ports);
    ship_vs_ufo(state, cfg, ports);
    if state.phase != GamePhase::Playing {
        return;
    }
    player_bullets_vs_ufo(state, cfg, ports);
    hostile_bullets_vs_ship(state, cfg, ports);
    if state.phase != GamePhase::Playing {
        return;
    }
    ship_vs_power_ups(state, cfg, ports);
}

/// First asteroid touching a vulnerable ship damages it
fn ship_vs_asteroids(state: &mut GameState, cfg: &Config, ports: &mut Ports) {
    let Some(ship) = state.ship.as_ref() else {
        return;
    };
    if ship.is_invulnerable() {
        return;
    }
    let hit = state
        .asteroids
        .iter()
        .any(|a| a.body.alive && bodies_touch(&ship.body, &a.body));
    if hit {
        damage_ship(state, cfg, ports);
    }
}

/// Each player bullet destroys at most one asteroid.
///
/// Candidates come from the quadtree in ascending index order. Destroyed
/// asteroids are only marked during the pass; fragments are appended and
/// the dead removed once every bullet has been checked.
fn player_bullets_vs_asteroids(state: &mut GameState, cfg: &Config, ports: &mut Ports) {
    let mut fragments = Vec::new();

    for handle in state.bullets.handles() {
        let Some(bullet) = state.bullets.get_ref(handle) else {
            continue;
        };
        if bullet.is_hostile() || !bullet.body.alive {
            continue;
        }
        let bullet_body = bullet.body;
        let hit = state
            .spatial
            .retrieve(&bullet_body.bounds())
            .into_iter()
            .find(|&i| {
                state
                    .asteroids
                    .get(i)
                    .is_some_and(|a| a.body.alive && bodies_touch(&bullet_body, &a.body))
            });
        let Some(i) = hit else {
            continue;
        };

        state.bullets.release(handle);
        let asteroid = &mut state.asteroids[i];
        asteroid.body.destroy();
        let (pos, size) = (asteroid.body.pos, asteroid.size);

        state.score += size.points(&cfg.asteroids);
        ports.explosion(pos, ExplosionKind::Asteroid(size));
        ports.play(SoundEvent::explosion(size));

        let children = state.asteroids[i].split(&cfg.asteroids, &mut state.rng);
        log::debug!(
            "Asteroid ({}) destroyed, {} fragments",
            size.as_str(),
            children.len()
        );
        fragments.extend(children);

        if state.rng.random_bool(cfg.power_ups.spawn_chance) {
            let kind = PowerUpKind::random(&mut state.rng);
            log::debug!("Power-up dropped: {}", kind.as_str());
            state.power_ups.push(PowerUp::new(pos, kind, &cfg.power_ups));
        }
    }

    state.asteroids.retain(|a| a.body.alive);
    state.asteroids.extend(fragments);
}

/// Ramming the UFO destroys it and damages a vulnerable ship
fn ship_vs_ufo(state: &mut GameState, cfg: &Config, ports: &mut Ports) {
    let (Some(ship), Some(ufo)) = (state.ship.as_ref(), state.ufo.as_ref()) else {
        return;
    };
    if ship.is_invulnerable() || !bodies_touch(&ship.body, &ufo.body) {
        return;
    }
    destroy_ufo(state, cfg, ports);
    damage_ship(state, cfg, ports);
}

/// The first player bullet to reach the UFO destroys it
fn player_bullets_vs_ufo(state: &mut GameState, cfg: &Config, ports: &mut Ports) {
    let Some(ufo) = state.ufo.as_ref() else {
        return;
    };
    let hit = state.bullets.handles().into_iter().find(|&h| {
        state
            .bullets
            .get_ref(h)
            .is_some_and(|b| !b.is_hostile() && b.body.alive && bodies_touch(&b.body, &ufo.body))
    });
    if let Some(handle) = hit {
        state.bullets.release(handle);
        destroy_ufo(state, cfg, ports);
    }
}

/// The first UFO bullet to reach a vulnerable ship is consumed and damages it
fn hostile_bullets_vs_ship(state: &mut GameState, cfg: &Config, ports: &mut Ports) {
    let Some(ship) = state.ship.as_ref() else {
        return;
    };
    if ship.is_invulnerable() {
        return;
    }
    let hit = state.bullets.handles().into_iter().find(|&h| {
        state
            .bullets
            .get_ref(h)
            .is_some_and(|b| b.is_hostile() && b.body.alive && bodies_touch(&b.body, &ship.body))
    });
    if let Some(handle) = hit {
        state.bullets.release(handle);
        damage_ship(state, cfg, ports);
    }
}

/// Every pickup the ship touches is collected
fn ship_vs_power_ups(state: &mut GameState, cfg: &Config, ports: &mut Ports) {
    let Some(ship) = state.ship.as_mut() else {
        return;
    };
    let mut collected = Vec::new();
    state.power_ups.retain(|p| {
        if bodies_touch(&ship.body, &p.body) {
            collected.push((p.kind, p.body.pos));
            false
        } else {
            true
        }
    });
    for (kind, pos) in collected {
        ship.apply_power_up(kind, &cfg.power_ups);
        ports.play(SoundEvent::PowerUp);
        ports.pickup_burst(pos, kind);
        log::debug!("Collected {}", kind.as_str());
    }
}

/// Award the UFO's points and remove it
fn destroy_ufo(state: &mut GameState, cfg: &Config, ports: &mut Ports) {
    let Some(ufo) = state.ufo.take() else {
        return;
    };
    state.score += ufo.points(&cfg.ufo);
    ports.explosion(ufo.body.pos, ExplosionKind::Ufo);
    ports.play(SoundEvent::ExplosionMedium);
    if let Some(handle) = state.ufo_sound.take() {
        ports.stop(handle);
    }
    log::info!("UFO ({}) destroyed", ufo.size.as_str());
}

/// Apply one hit to the ship.
///
/// Invulnerability or a shield charge swallows the hit. Otherwise a life is
/// lost: the ship respawns at the world center, or the game ends.
pub(crate) fn damage_ship(state: &mut GameState, cfg: &Config, ports: &mut Ports) {
    let Some(ship) = state.ship.as_mut() else {
        return;
    };
    if !ship.take_damage() {
        log::debug!("Hit absorbed ({} shield charges left)", ship.shields);
        return;
    }
    let pos = ship.body.pos;
    state.lives = state.lives.saturating_sub(1);
    ports.explosion(pos, ExplosionKind::Ship);
    ports.play(SoundEvent::ExplosionLarge);

    if state.lives == 0 {
        end_game(state, ports);
    } else {
        ship.reset(GameState::world_center(cfg), &cfg.ship);
        log::debug!("Ship lost, {} lives left", state.lives);
    }
}
