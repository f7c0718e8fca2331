//! Asteroid Storm headless driver
//!
//! Runs one scripted game at a fixed frame rate and prints the final HUD.
//! Useful for soak-testing balance changes without a renderer.
//!
//! Usage: `asteroid-storm [seed] [config.json] [scores.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::sync::Arc;

    use asteroid_storm::audio::LogAudio;
    use asteroid_storm::consts::FRAME_DT;
    use asteroid_storm::effects::ParticleSystem;
    use asteroid_storm::highscores::{JsonFileScoreStore, MemoryScoreStore, ScoreStore};
    use asteroid_storm::{Config, GamePhase, InputSnapshot, Ports, Session};

    /// Ten minutes of play at 60 fps
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    env_logger::init();
    log::info!("Asteroid Storm (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0xA57E_2010);
    let config = match args.next() {
        Some(path) => Config::load_or_default(path),
        None => Config::default(),
    };
    let scores: Box<dyn ScoreStore> = match args.next() {
        Some(path) => Box::new(JsonFileScoreStore::new(path)),
        None => Box::new(MemoryScoreStore::new()),
    };

    let ports = Ports::new(
        Box::new(LogAudio::new()),
        Box::new(ParticleSystem::from_config(&config.session, seed)),
        scores,
    );
    let mut session = Session::new(Arc::new(config), ports, seed);
    log::info!("Game initialized with seed: {}", seed);
    session.start();

    let mut frame = 0;
    while frame < MAX_FRAMES && session.phase() != GamePhase::GameOver {
        // Spin, thrust in bursts, fire steadily and jump now and then
        let input = InputSnapshot {
            turn_left: frame % 240 < 60,
            thrust: frame % 120 < 30,
            fire: frame % 8 == 0,
            hyperspace: frame % 900 == 899,
            ..InputSnapshot::default()
        };
        session.update(&input, FRAME_DT);
        frame += 1;
    }

    log::info!(
        "Stopped after {:.1}s of play ({} particles live)",
        frame as f32 * FRAME_DT,
        session.particles().len()
    );
    match serde_json::to_string_pretty(&session.hud()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to encode HUD: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web
}
