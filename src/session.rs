//! Public facade
//!
//! A `Session` owns one game: the immutable config, the mutable state and
//! the ports to the outside world. Hosts drive it with `update` once per
//! frame and read back `drawables` and `hud` to present it.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::audio::{SilentAudio, SoundEvent, SoundHandle, SoundPort};
use crate::config::Config;
use crate::effects::{EffectsPort, ExplosionKind, NoEffects, Particle};
use crate::error::PortError;
use crate::highscores::{MemoryScoreStore, ScoreStore};
use crate::sim::entity::Drawable;
use crate::sim::powerup::PowerUpKind;
use crate::sim::state::{GamePhase, GameState};
use crate::sim::tick::{self, InputSnapshot};

/// Log a port failure and carry on without its result
fn report<T>(what: &str, result: Result<T, PortError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("{} failed: {}", what, e);
            None
        }
    }
}

/// Adapters to the outside world.
///
/// The simulation only talks to them through the helpers below, which log
/// and swallow every failure. A broken port never interrupts a tick.
pub struct Ports {
    pub sound: Box<dyn SoundPort>,
    pub effects: Box<dyn EffectsPort>,
    pub scores: Box<dyn ScoreStore>,
}

impl Default for Ports {
    /// Silent, effect-free, in-memory scores
    fn default() -> Self {
        Self::new(
            Box::new(SilentAudio),
            Box::new(NoEffects),
            Box::new(MemoryScoreStore::new()),
        )
    }
}

impl Ports {
    pub fn new(
        sound: Box<dyn SoundPort>,
        effects: Box<dyn EffectsPort>,
        scores: Box<dyn ScoreStore>,
    ) -> Self {
        Self {
            sound,
            effects,
            scores,
        }
    }

    pub(crate) fn play(&mut self, event: SoundEvent) -> Option<SoundHandle> {
        report("sound", self.sound.play(event)).flatten()
    }

    pub(crate) fn stop(&mut self, handle: SoundHandle) {
        report("sound stop", self.sound.stop(handle));
    }

    pub(crate) fn explosion(&mut self, pos: Vec2, kind: ExplosionKind) {
        report("explosion effect", self.effects.create_explosion(pos, kind));
    }

    pub(crate) fn thrust(&mut self, pos: Vec2, angle: f32) {
        report("thrust effect", self.effects.create_thrust(pos, angle));
    }

    pub(crate) fn pickup_burst(&mut self, pos: Vec2, kind: PowerUpKind) {
        report("pickup effect", self.effects.create_pickup_burst(pos, kind));
    }

    pub(crate) fn advance_effects(&mut self, dt: f32) {
        report("effects update", self.effects.advance(dt));
    }

    pub(crate) fn clear_effects(&mut self) {
        report("effects clear", self.effects.clear());
    }

    pub(crate) fn load_high_score(&self) -> u64 {
        report("high score load", self.scores.high_score()).unwrap_or(0)
    }

    pub(crate) fn save_high_score(&mut self, score: u64) {
        report("high score save", self.scores.set_high_score(score));
    }

    pub(crate) fn push_score(&mut self, score: u64, level: u32) {
        if let Some(Some(rank)) = report("score list", self.scores.push_score(score, level)) {
            log::info!("Score {} placed #{}", score, rank);
        }
    }
}

/// A power-up effect currently running on the ship
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerUpIndicator {
    pub kind: PowerUpKind,
    pub remaining_secs: f32,
}

/// Heads-up display state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub high_score: u64,
    pub shields: u32,
    /// Active effects only; an indicator disappears when its countdown ends
    pub power_ups: Vec<PowerUpIndicator>,
}

/// One game, from menu to game over and back
pub struct Session {
    cfg: Arc<Config>,
    state: GameState,
    ports: Ports,
}

impl Session {
    pub fn new(cfg: Arc<Config>, ports: Ports, seed: u64) -> Self {
        let mut state = GameState::new(seed, &cfg);
        state.high_score = ports.load_high_score();
        Self { cfg, state, ports }
    }

    /// Default config and silent ports
    pub fn with_seed(seed: u64) -> Self {
        Self::new(Arc::new(Config::default()), Ports::default(), seed)
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for scripted scenarios and tooling
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn ports(&self) -> &Ports {
        &self.ports
    }

    pub fn ports_mut(&mut self) -> &mut Ports {
        &mut self.ports
    }

    /// Start a new run (from any phase)
    pub fn start(&mut self) {
        tick::start(&mut self.state, &self.cfg, &mut self.ports);
    }

    /// Playing → Paused; no-op otherwise
    pub fn pause(&mut self) -> bool {
        tick::pause(&mut self.state, &mut self.ports)
    }

    /// Paused → Playing; no-op otherwise
    pub fn resume(&mut self) -> bool {
        tick::resume(&mut self.state, &mut self.ports)
    }

    /// Host window visibility. Hiding a running game pauses it.
    pub fn set_visible(&mut self, visible: bool) {
        if !visible {
            self.pause();
        }
    }

    /// Advance by `dt` seconds of wall time
    pub fn update(&mut self, input: &InputSnapshot, dt: f32) {
        tick::tick(&mut self.state, &self.cfg, &mut self.ports, input, dt);
    }

    /// Everything to draw this frame, back to front
    pub fn drawables(&self) -> Vec<Drawable> {
        self.state.entities().iter().map(|e| e.drawable()).collect()
    }

    /// Live particles from the effects port
    pub fn particles(&self) -> Vec<Particle> {
        self.ports.effects.particles()
    }

    pub fn hud(&self) -> Hud {
        let ship = self.state.ship.as_ref();
        let power_ups = ship
            .map(|s| {
                PowerUpKind::ALL
                    .iter()
                    .map(|&kind| PowerUpIndicator {
                        kind,
                        remaining_secs: s.effects.remaining(kind),
                    })
                    .filter(|i| i.remaining_secs > 0.0)
                    .collect()
            })
            .unwrap_or_default();
        Hud {
            phase: self.state.phase,
            score: self.state.score,
            lives: self.state.lives,
            level: self.state.level,
            high_score: self.state.high_score,
            shields: ship.map_or(0, |s| s.shields),
            power_ups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::LogAudio;
    use crate::consts::FRAME_DT;
    use crate::effects::ParticleSystem;
    use crate::sim::asteroid::{Asteroid, AsteroidSize};
    use crate::sim::bullet::Owner;
    use crate::sim::entity::EntityKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Sound port whose log stays inspectable after boxing
    #[derive(Clone, Default)]
    struct SharedAudio(Rc<RefCell<LogAudio>>);

    impl SoundPort for SharedAudio {
        fn play(&mut self, event: SoundEvent) -> Result<Option<SoundHandle>, PortError> {
            self.0.borrow_mut().play(event)
        }

        fn stop(&mut self, handle: SoundHandle) -> Result<(), PortError> {
            self.0.borrow_mut().stop(handle)
        }
    }

    /// Every call fails
    struct BrokenPorts;

    impl SoundPort for BrokenPorts {
        fn play(&mut self, _event: SoundEvent) -> Result<Option<SoundHandle>, PortError> {
            Err(PortError::Unavailable("no audio device"))
        }

        fn stop(&mut self, handle: SoundHandle) -> Result<(), PortError> {
            Err(PortError::UnknownHandle(handle.0))
        }
    }

    impl EffectsPort for BrokenPorts {
        fn create_explosion(&mut self, _pos: Vec2, _kind: ExplosionKind) -> Result<(), PortError> {
            Err(PortError::Unavailable("no renderer"))
        }

        fn create_thrust(&mut self, _pos: Vec2, _angle: f32) -> Result<(), PortError> {
            Err(PortError::Unavailable("no renderer"))
        }

        fn create_pickup_burst(&mut self, _pos: Vec2, _kind: PowerUpKind) -> Result<(), PortError> {
            Err(PortError::Unavailable("no renderer"))
        }

        fn advance(&mut self, _dt: f32) -> Result<(), PortError> {
            Err(PortError::Unavailable("no renderer"))
        }
    }

    impl ScoreStore for BrokenPorts {
        fn high_score(&self) -> Result<u64, PortError> {
            Err(PortError::Unavailable("no storage"))
        }

        fn set_high_score(&mut self, _score: u64) -> Result<(), PortError> {
            Err(PortError::Unavailable("no storage"))
        }

        fn push_score(&mut self, _score: u64, _level: u32) -> Result<Option<usize>, PortError> {
            Err(PortError::Unavailable("no storage"))
        }

        fn leaderboard(&self) -> Result<crate::HighScores, PortError> {
            Err(PortError::Unavailable("no storage"))
        }
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::default()
    }

    /// Drop the wave and park one motionless asteroid far from the ship
    fn single_asteroid(session: &mut Session, pos: Vec2, size: AsteroidSize) {
        let cfg = session.config().clone();
        let state = session.state_mut();
        state.asteroids.clear();
        let mut a = Asteroid::new(pos, size, &cfg.asteroids, &mut state.rng);
        a.body.vel = Vec2::ZERO;
        a.spin = 0.0;
        state.asteroids.push(a);
    }

    /// Strip invulnerability so the next hit counts
    fn expose_ship(session: &mut Session) {
        let ship = session.state_mut().ship.as_mut().unwrap();
        ship.make_invulnerable(0.0);
        ship.visible = true;
    }

    #[test]
    fn test_starts_in_menu_with_stored_high_score() {
        let ports = Ports::new(
            Box::new(SilentAudio),
            Box::new(NoEffects),
            Box::new(MemoryScoreStore::with_high_score(8000)),
        );
        let session = Session::new(Arc::new(Config::default()), ports, 1);
        let hud = session.hud();
        assert_eq!(hud.phase, GamePhase::Menu);
        assert_eq!(hud.high_score, 8000);
        assert!(session.drawables().is_empty());
    }

    #[test]
    fn test_restart_from_game_over() {
        let mut session = Session::with_seed(2);
        session.start();
        expose_ship(&mut session);
        session.state_mut().lives = 1;
        session.state_mut().score = 300;
        let center = GameState::world_center(session.config());
        single_asteroid(&mut session, center, AsteroidSize::Large);
        session.update(&idle(), FRAME_DT);
        assert_eq!(session.phase(), GamePhase::GameOver);
        assert!(session.state().ship.is_none());

        session.start();
        let hud = session.hud();
        assert_eq!(hud.phase, GamePhase::Playing);
        assert_eq!(hud.lives, 3);
        assert_eq!(hud.score, 0);
        assert_eq!(hud.level, 1);
        assert_eq!(hud.high_score, 300);
    }

    #[test]
    fn test_large_asteroid_kill_scores_twenty() {
        let mut session = Session::with_seed(3);
        session.start();
        single_asteroid(&mut session, Vec2::new(150.0, 150.0), AsteroidSize::Large);
        let cfg = session.config().clone();
        session
            .state_mut()
            .fire_bullet(Vec2::new(150.0, 150.0), 0.0, Owner::Player, &cfg);
        session.update(&idle(), FRAME_DT);
        assert_eq!(session.hud().score, 20);
        let mediums = session
            .state()
            .asteroids
            .iter()
            .filter(|a| a.size == AsteroidSize::Medium)
            .count();
        assert!(mediums == 2 || mediums == 3);
    }

    #[test]
    fn test_clearing_field_starts_next_level_same_tick() {
        let mut session = Session::with_seed(4);
        session.start();
        single_asteroid(&mut session, Vec2::new(150.0, 150.0), AsteroidSize::Small);
        let cfg = session.config().clone();
        session
            .state_mut()
            .fire_bullet(Vec2::new(150.0, 150.0), 0.0, Owner::Player, &cfg);
        session.update(&idle(), FRAME_DT);
        assert_eq!(session.hud().level, 2);
        assert_eq!(session.hud().score, 100);
        assert_eq!(session.state().asteroids.len(), 5);
    }

    #[test]
    fn test_asteroid_hit_costs_one_life() {
        let mut session = Session::with_seed(5);
        session.start();
        expose_ship(&mut session);
        let center = GameState::world_center(session.config());
        single_asteroid(&mut session, center, AsteroidSize::Medium);
        session.update(&idle(), FRAME_DT);
        assert_eq!(session.hud().lives, 2);
        assert_eq!(session.phase(), GamePhase::Playing);
        assert!(session.state().ship.as_ref().unwrap().is_invulnerable());
    }

    #[test]
    fn test_high_score_only_replaced_when_beaten() {
        let ports = Ports::new(
            Box::new(SilentAudio),
            Box::new(NoEffects),
            Box::new(MemoryScoreStore::with_high_score(1000)),
        );
        let mut session = Session::new(Arc::new(Config::default()), ports, 6);
        session.start();
        expose_ship(&mut session);
        session.state_mut().lives = 1;
        session.state_mut().score = 400;
        let center = GameState::world_center(session.config());
        single_asteroid(&mut session, center, AsteroidSize::Large);
        session.update(&idle(), FRAME_DT);

        assert_eq!(session.phase(), GamePhase::GameOver);
        assert_eq!(session.hud().high_score, 1000);
        assert_eq!(session.ports().scores.high_score().unwrap(), 1000);
    }

    #[test]
    fn test_pause_is_idempotent_and_visibility_pauses() {
        let mut session = Session::with_seed(7);
        assert!(!session.pause());
        session.start();
        session.set_visible(false);
        assert_eq!(session.phase(), GamePhase::Paused);
        assert!(!session.pause());
        assert_eq!(session.phase(), GamePhase::Paused);
        session.set_visible(true);
        assert_eq!(session.phase(), GamePhase::Paused);
        assert!(session.resume());
        assert_eq!(session.phase(), GamePhase::Playing);
    }

    #[test]
    fn test_power_up_indicator_follows_countdown() {
        let mut session = Session::with_seed(8);
        session.start();
        let cfg = session.config().clone();
        session
            .state_mut()
            .ship
            .as_mut()
            .unwrap()
            .apply_power_up(PowerUpKind::MultiShot, &cfg.power_ups);
        let hud = session.hud();
        assert_eq!(hud.power_ups.len(), 1);
        assert_eq!(hud.power_ups[0].kind, PowerUpKind::MultiShot);

        // Paused time does not count
        session.pause();
        for _ in 0..600 {
            session.update(&idle(), FRAME_DT);
        }
        assert_eq!(session.hud().power_ups.len(), 1);
    }

    #[test]
    fn test_game_over_stops_looping_sounds() {
        let audio = SharedAudio::default();
        let ports = Ports::new(
            Box::new(audio.clone()),
            Box::new(NoEffects),
            Box::new(MemoryScoreStore::new()),
        );
        let mut session = Session::new(Arc::new(Config::default()), ports, 9);
        session.start();
        let thrust = InputSnapshot {
            thrust: true,
            ..idle()
        };
        session.update(&thrust, FRAME_DT);
        assert_eq!(audio.0.borrow().playing().count(), 1);

        expose_ship(&mut session);
        session.state_mut().lives = 1;
        let pos = session.state().ship.as_ref().unwrap().body.pos;
        single_asteroid(&mut session, pos, AsteroidSize::Large);
        session.update(&thrust, FRAME_DT);

        assert_eq!(session.phase(), GamePhase::GameOver);
        assert_eq!(audio.0.borrow().playing().count(), 0);
        assert_eq!(audio.0.borrow().count(SoundEvent::ExplosionLarge), 1);
    }

    #[test]
    fn test_broken_ports_never_stop_the_game() {
        let ports = Ports::new(
            Box::new(BrokenPorts),
            Box::new(BrokenPorts),
            Box::new(BrokenPorts),
        );
        let mut session = Session::new(Arc::new(Config::default()), ports, 10);
        assert_eq!(session.hud().high_score, 0);
        session.start();
        let busy = InputSnapshot {
            thrust: true,
            fire: true,
            turn_left: true,
            ..idle()
        };
        for _ in 0..120 {
            session.update(&busy, FRAME_DT);
        }
        assert_ne!(session.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_particles_come_from_effects_port() {
        let ports = Ports::new(
            Box::new(SilentAudio),
            Box::new(ParticleSystem::new(50, 1)),
            Box::new(MemoryScoreStore::new()),
        );
        let mut session = Session::new(Arc::new(Config::default()), ports, 11);
        session.start();
        let thrust = InputSnapshot {
            thrust: true,
            ..idle()
        };
        session.update(&thrust, FRAME_DT);
        assert_eq!(session.particles().len(), 3);
    }

    #[test]
    fn test_drawables_serialize() {
        let mut session = Session::with_seed(12);
        session.start();
        let drawables = session.drawables();
        assert_eq!(drawables.last().map(|d| d.kind), Some(EntityKind::Ship));
        let rocks: Vec<&Drawable> = drawables
            .iter()
            .filter(|d| d.kind == EntityKind::Asteroid)
            .collect();
        assert_eq!(rocks.len(), 4);
        assert!(rocks.iter().all(|d| d.outline.len() >= 8));

        let json = serde_json::to_string(&drawables).unwrap();
        let back: Vec<Drawable> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), drawables.len());
        assert!(serde_json::to_string(&session.hud()).unwrap().contains("\"Playing\""));
    }

    #[test]
    fn test_negative_jitter_config_plays_on() {
        let cfg = Config::from_json(
            r#"{ "asteroids": { "split_jitter": -0.5 }, "ufo": { "vertical_speed": -10.0 } }"#,
        )
        .unwrap();
        let mut session = Session::new(Arc::new(cfg), Ports::default(), 13);
        session.start();
        single_asteroid(&mut session, Vec2::new(150.0, 150.0), AsteroidSize::Large);
        let cfg = session.config().clone();
        let state = session.state_mut();
        state.fire_bullet(Vec2::new(150.0, 150.0), 0.0, Owner::Player, &cfg);
        state.spawn_ufo(&cfg);
        for _ in 0..300 {
            session.update(&idle(), FRAME_DT);
        }
        assert!(session.hud().score >= 20);
    }

    #[test]
    fn test_same_seed_same_game() {
        let script = |session: &mut Session| {
            session.start();
            for i in 0..600 {
                let input = InputSnapshot {
                    turn_left: i % 90 < 30,
                    thrust: i % 50 < 20,
                    fire: i % 7 == 0,
                    hyperspace: i == 300,
                    ..InputSnapshot::default()
                };
                session.update(&input, FRAME_DT);
            }
        };
        let mut a = Session::with_seed(99);
        let mut b = Session::with_seed(99);
        script(&mut a);
        script(&mut b);
        assert_eq!(a.hud(), b.hud());
        assert_eq!(a.drawables(), b.drawables());
    }
}
