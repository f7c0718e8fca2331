//! Variable timestep simulation tick
//!
//! One call advances the session by `dt` seconds (clamped), in a fixed
//! order: ship control, movement, broad phase, collisions, then level and
//! extra-life bookkeeping. Lifecycle transitions (`start`, `pause`,
//! `resume`, game over) live here too since they touch the same state.

use serde::{Deserialize, Serialize};

use super::bullet::Owner;
use super::collision::resolve_collisions;
use super::ship::Ship;
use super::state::{GamePhase, GameState};
use crate::audio::SoundEvent;
use crate::config::Config;
use crate::session::Ports;

/// Pre-decoded input for a single tick.
///
/// `fire` is level-triggered (held fires at the cooldown rate).
/// `hyperspace` and `pause` are edges: the producer sets them for one tick
/// per key press.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub turn_left: bool,
    pub turn_right: bool,
    pub thrust: bool,
    pub fire: bool,
    pub hyperspace: bool,
    pub pause: bool,
}

/// Begin a new run. Also used to restart from any phase.
pub fn start(state: &mut GameState, cfg: &Config, ports: &mut Ports) {
    if matches!(state.phase, GamePhase::Playing | GamePhase::Paused) {
        log::info!("Restarting session");
    }
    stop_loops(state, ports);
    ports.clear_effects();

    state.phase = GamePhase::Playing;
    state.score = 0;
    state.lives = cfg.session.starting_lives;
    state.level = 1;
    state.next_extra_life = cfg.session.extra_life_score;
    state.ufo_timer = 0.0;
    state.asteroids.clear();
    state.bullets.release_all();
    state.power_ups.clear();
    state.ufo = None;

    let mut ship = Ship::new(GameState::world_center(cfg), &cfg.ship);
    ship.make_invulnerable(cfg.ship.invulnerability_secs);
    state.ship = Some(ship);

    state.spawn_wave(cfg);
    log::info!("Session started (seed {})", state.seed);
}

/// Playing → Paused. Returns false (and does nothing) from any other phase.
pub fn pause(state: &mut GameState, ports: &mut Ports) -> bool {
    if state.phase != GamePhase::Playing {
        return false;
    }
    state.phase = GamePhase::Paused;
    stop_loops(state, ports);
    log::debug!("Paused");
    true
}

/// Paused → Playing. Returns false (and does nothing) from any other phase.
pub fn resume(state: &mut GameState, ports: &mut Ports) -> bool {
    if state.phase != GamePhase::Paused {
        return false;
    }
    state.phase = GamePhase::Playing;
    if let Some(size) = state.ufo.as_ref().map(|u| u.size) {
        state.ufo_sound = ports.play(SoundEvent::ufo(size));
    }
    log::debug!("Resumed");
    true
}

/// Lives ran out: record the score and drop the ship
pub(crate) fn end_game(state: &mut GameState, ports: &mut Ports) {
    state.phase = GamePhase::GameOver;
    state.ship = None;
    stop_loops(state, ports);

    if state.score > state.high_score {
        state.high_score = state.score;
        ports.save_high_score(state.score);
        log::info!("New high score: {}", state.score);
    }
    ports.push_score(state.score, state.level);
    log::info!("Game over: score {}, level {}", state.score, state.level);
}

fn stop_loops(state: &mut GameState, ports: &mut Ports) {
    if let Some(handle) = state.thrust_sound.take() {
        ports.stop(handle);
    }
    if let Some(handle) = state.ufo_sound.take() {
        ports.stop(handle);
    }
}

/// Advance the session by one tick
pub fn tick(
    state: &mut GameState,
    cfg: &Config,
    ports: &mut Ports,
    input: &InputSnapshot,
    dt: f32,
) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                pause(state, ports);
                return;
            }
            GamePhase::Paused => {
                resume(state, ports);
            }
            _ => {}
        }
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    let dt = dt.clamp(0.0, cfg.session.max_tick_dt);

    control_ship(state, cfg, ports, input, dt);

    for asteroid in &mut state.asteroids {
        asteroid.update(dt, &cfg.world);
    }
    state.rebuild_spatial();

    for bullet in state.bullets.iter_mut() {
        bullet.update(dt, &cfg.world);
    }
    state.bullets.retain(|b| b.body.alive);

    update_ufo(state, cfg, ports, dt);

    for power_up in &mut state.power_ups {
        power_up.update(dt, &cfg.world);
    }
    state.power_ups.retain(|p| p.body.alive);

    ports.advance_effects(dt);

    resolve_collisions(state, cfg, ports);
    if state.phase != GamePhase::Playing {
        return;
    }

    if state.asteroids.is_empty() {
        state.level += 1;
        log::info!("Level {} reached", state.level);
        state.spawn_wave(cfg);
    }

    award_extra_lives(state, cfg, ports);
}

/// Apply input to the ship, then move it
fn control_ship(
    state: &mut GameState,
    cfg: &Config,
    ports: &mut Ports,
    input: &InputSnapshot,
    dt: f32,
) {
    let Some(ship) = state.ship.as_mut() else {
        return;
    };

    let turn = if input.turn_left {
        -1.0
    } else if input.turn_right {
        1.0
    } else {
        0.0
    };
    ship.set_turn(turn);
    ship.set_thrust(if input.thrust { 1.0 } else { 0.0 });

    let exhaust = (ship.exhaust(), ship.body.rotation);
    let volley = (input.fire && ship.try_fire(&cfg.ship))
        .then(|| (ship.muzzle(), ship.fire_angles(cfg.bullets.multi_shot_spread)));
    let jump = input.hyperspace && ship.try_hyperspace(&cfg.ship);

    if input.thrust {
        ports.thrust(exhaust.0, exhaust.1);
        if state.thrust_sound.is_none() {
            state.thrust_sound = ports.play(SoundEvent::Thrust);
        }
    } else if let Some(handle) = state.thrust_sound.take() {
        ports.stop(handle);
    }

    if let Some((muzzle, angles)) = volley {
        // Each bullet is capped on its own; a partial volley still fires
        let fired = angles
            .into_iter()
            .filter(|&angle| state.fire_bullet(muzzle, angle, Owner::Player, cfg))
            .count();
        if fired > 0 {
            ports.play(SoundEvent::Fire);
        }
    }

    if jump {
        let target = state.random_point(cfg.ship.hyperspace_margin, cfg);
        if let Some(ship) = state.ship.as_mut() {
            ship.jump_to(target);
        }
        log::debug!("Hyperspace to ({:.0}, {:.0})", target.x, target.y);
    }

    if let Some(ship) = state.ship.as_mut() {
        ship.update(dt, cfg);
    }
}

/// Move and fire the UFO, or count down to the next one
fn update_ufo(state: &mut GameState, cfg: &Config, ports: &mut Ports, dt: f32) {
    if let Some(ufo) = state.ufo.as_mut() {
        ufo.update(dt, &cfg.ufo, &cfg.world, &mut state.rng);
        if !ufo.body.alive {
            state.ufo = None;
            if let Some(handle) = state.ufo_sound.take() {
                ports.stop(handle);
            }
            log::debug!("UFO left the field");
        } else if ufo.try_fire(&cfg.ufo) {
            let Some(target) = state.ship.as_ref().map(|s| s.body.pos) else {
                return;
            };
            let pos = ufo.body.pos;
            let angle = ufo.aim_angle(target, &mut state.rng);
            if state.fire_bullet(pos, angle, Owner::Hostile, cfg) {
                ports.play(SoundEvent::Fire);
            }
        }
        return;
    }

    state.ufo_timer += dt;
    if state.ufo_timer > cfg.ufo.spawn_interval_secs {
        state.ufo_timer = 0.0;
        let size = state.spawn_ufo(cfg);
        state.ufo_sound = ports.play(SoundEvent::ufo(size));
        log::info!("UFO ({}) spawned", size.as_str());
    }
}

/// One extra life per threshold crossed
fn award_extra_lives(state: &mut GameState, cfg: &Config, ports: &mut Ports) {
    while state.score >= state.next_extra_life {
        state.lives += 1;
        state.next_extra_life += cfg.session.extra_life_step;
        ports.play(SoundEvent::ExtraLife);
        log::debug!("Extra life, {} lives", state.lives);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_DT;
    use crate::sim::asteroid::AsteroidSize;
    use crate::sim::powerup::PowerUpKind;
    use glam::Vec2;

    fn started(seed: u64) -> (GameState, Config, Ports) {
        let cfg = Config::default();
        let mut ports = Ports::default();
        let mut state = GameState::new(seed, &cfg);
        start(&mut state, &cfg, &mut ports);
        (state, cfg, ports)
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::default()
    }

    #[test]
    fn test_start_sets_up_run() {
        let (state, cfg, _) = started(1);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, 3);
        assert_eq!(state.level, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.asteroids.len(), cfg.asteroids.initial_count as usize);
        let ship = state.ship.as_ref().unwrap();
        assert_eq!(ship.body.pos, GameState::world_center(&cfg));
        assert!(ship.is_invulnerable());
    }

    #[test]
    fn test_no_simulation_outside_playing() {
        let cfg = Config::default();
        let mut ports = Ports::default();
        let mut state = GameState::new(1, &cfg);
        tick(&mut state, &cfg, &mut ports, &idle(), FRAME_DT);
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(state.asteroids.is_empty());
    }

    #[test]
    fn test_pause_input_toggles_and_freezes() {
        let (mut state, cfg, mut ports) = started(2);
        let pause = InputSnapshot {
            pause: true,
            ..idle()
        };
        tick(&mut state, &cfg, &mut ports, &pause, FRAME_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let before: Vec<Vec2> = state.asteroids.iter().map(|a| a.body.pos).collect();
        let invuln = state.ship.as_ref().unwrap().invulnerable_secs;
        for _ in 0..30 {
            tick(&mut state, &cfg, &mut ports, &idle(), FRAME_DT);
        }
        let after: Vec<Vec2> = state.asteroids.iter().map(|a| a.body.pos).collect();
        assert_eq!(before, after);
        assert_eq!(state.ship.as_ref().unwrap().invulnerable_secs, invuln);

        tick(&mut state, &cfg, &mut ports, &pause, FRAME_DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_pause_and_resume_are_idempotent() {
        let (mut state, _, mut ports) = started(3);
        assert!(!resume(&mut state, &mut ports));
        assert!(pause(&mut state, &mut ports));
        assert!(!pause(&mut state, &mut ports));
        assert_eq!(state.phase, GamePhase::Paused);
        assert!(resume(&mut state, &mut ports));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_dt_is_clamped() {
        let (mut state, cfg, mut ports) = started(4);
        state.asteroids.truncate(1);
        let a = &mut state.asteroids[0];
        a.body.pos = Vec2::new(100.0, 100.0);
        a.body.vel = Vec2::new(30.0, 0.0);
        tick(&mut state, &cfg, &mut ports, &idle(), 1.0);
        let x = state.asteroids[0].body.pos.x;
        assert!((x - (100.0 + 30.0 * cfg.session.max_tick_dt)).abs() < 1e-3);
    }

    #[test]
    fn test_multi_shot_fires_three() {
        let (mut state, cfg, mut ports) = started(5);
        state
            .ship
            .as_mut()
            .unwrap()
            .apply_power_up(PowerUpKind::MultiShot, &cfg.power_ups);
        let fire = InputSnapshot {
            fire: true,
            ..idle()
        };
        tick(&mut state, &cfg, &mut ports, &fire, FRAME_DT);
        assert_eq!(state.bullets.active_count(), 3);
        let mut offsets: Vec<f32> = state.bullets.iter().map(|b| b.body.rotation).collect();
        offsets.sort_by(f32::total_cmp);
        for (got, want) in offsets.iter().zip([-0.1f32, 0.0, 0.1]) {
            assert!((got - want).abs() < 1e-5);
        }
    }

    #[test]
    fn test_fire_respects_cap_and_cooldown() {
        let (mut state, cfg, mut ports) = started(6);
        state.asteroids.clear();
        // Keep the level from advancing mid-test
        state.asteroids.push(crate::sim::asteroid::Asteroid::new(
            Vec2::new(10.0, 10.0),
            AsteroidSize::Small,
            &cfg.asteroids,
            &mut state.rng,
        ));
        let fire = InputSnapshot {
            fire: true,
            ..idle()
        };
        tick(&mut state, &cfg, &mut ports, &fire, FRAME_DT);
        assert_eq!(state.bullets.active_count(), 1);
        // Cooldown blocks the next frame
        tick(&mut state, &cfg, &mut ports, &fire, FRAME_DT);
        assert_eq!(state.bullets.active_count(), 1);

        state.ship.as_mut().unwrap().apply_power_up(PowerUpKind::RapidFire, &cfg.power_ups);
        for _ in 0..120 {
            tick(&mut state, &cfg, &mut ports, &fire, FRAME_DT);
            assert!(state.bullets.active_count() <= cfg.bullets.max_bullets);
        }
    }

    #[test]
    fn test_hyperspace_moves_ship_inside_margin() {
        let (mut state, cfg, mut ports) = started(7);
        state.ship.as_mut().unwrap().body.vel = Vec2::new(100.0, 0.0);
        let jump = InputSnapshot {
            hyperspace: true,
            ..idle()
        };
        tick(&mut state, &cfg, &mut ports, &jump, FRAME_DT);
        let ship = state.ship.as_ref().unwrap();
        assert!(ship.body.vel.length() < 1e-3);
        assert!((50.0..=750.0).contains(&ship.body.pos.x));
        assert!((50.0..=550.0).contains(&ship.body.pos.y));
        assert!(ship.hyperspace_cooldown > 0.0);
    }

    #[test]
    fn test_level_advances_when_field_is_clear() {
        let (mut state, cfg, mut ports) = started(8);
        state.asteroids.clear();
        tick(&mut state, &cfg, &mut ports, &idle(), FRAME_DT);
        assert_eq!(state.level, 2);
        assert_eq!(state.asteroids.len(), cfg.asteroids.initial_count as usize + 1);
    }

    #[test]
    fn test_extra_life_per_threshold() {
        let (mut state, cfg, mut ports) = started(9);
        state.score = 25_000;
        tick(&mut state, &cfg, &mut ports, &idle(), FRAME_DT);
        assert_eq!(state.lives, 5);
        assert_eq!(state.next_extra_life, 30_000);
    }

    #[test]
    fn test_ufo_spawns_after_interval() {
        let (mut state, cfg, mut ports) = started(10);
        state.ufo_timer = cfg.ufo.spawn_interval_secs;
        tick(&mut state, &cfg, &mut ports, &idle(), FRAME_DT);
        let ufo = state.ufo.as_ref().unwrap();
        assert!((50.0..=550.0).contains(&ufo.body.pos.y));
        assert_eq!(state.ufo_timer, 0.0);
    }

    #[test]
    fn test_start_resets_timers_from_previous_run() {
        let (mut state, cfg, mut ports) = started(11);
        state.ufo_timer = 19.0;
        state.next_extra_life = 40_000;
        state.score = 999;
        start(&mut state, &cfg, &mut ports);
        assert_eq!(state.ufo_timer, 0.0);
        assert_eq!(state.next_extra_life, cfg.session.extra_life_score);
        assert_eq!(state.score, 0);
        assert!(state.bullets.is_empty());
    }
}
