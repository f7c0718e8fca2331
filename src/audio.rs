//! Sound port
//!
//! The simulation never synthesizes audio itself. It names a cue and hands
//! it to whatever `SoundPort` the host plugged in. Looping cues (thrust,
//! UFO drone) return a handle that the caller later passes to `stop`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PortError;
use crate::sim::asteroid::AsteroidSize;
use crate::sim::ufo::UfoSize;

/// Sound cues emitted by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEvent {
    /// Player bullet fired
    Fire,
    /// Engine loop while thrusting
    Thrust,
    ExplosionLarge,
    ExplosionMedium,
    ExplosionSmall,
    /// Drone loop while a large UFO is on screen
    UfoLarge,
    /// Drone loop while a small UFO is on screen
    UfoSmall,
    /// Pickup collected
    PowerUp,
    ExtraLife,
}

impl SoundEvent {
    /// Explosion cue matching an asteroid size
    pub fn explosion(size: AsteroidSize) -> Self {
        match size {
            AsteroidSize::Large => SoundEvent::ExplosionLarge,
            AsteroidSize::Medium => SoundEvent::ExplosionMedium,
            AsteroidSize::Small => SoundEvent::ExplosionSmall,
        }
    }

    /// Drone cue matching a UFO size
    pub fn ufo(size: UfoSize) -> Self {
        match size {
            UfoSize::Large => SoundEvent::UfoLarge,
            UfoSize::Small => SoundEvent::UfoSmall,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SoundEvent::Fire => "fire",
            SoundEvent::Thrust => "thrust",
            SoundEvent::ExplosionLarge => "explosion_large",
            SoundEvent::ExplosionMedium => "explosion_medium",
            SoundEvent::ExplosionSmall => "explosion_small",
            SoundEvent::UfoLarge => "ufo_large",
            SoundEvent::UfoSmall => "ufo_small",
            SoundEvent::PowerUp => "powerup",
            SoundEvent::ExtraLife => "extra_life",
        }
    }

    /// Plays until explicitly stopped
    pub fn is_looping(&self) -> bool {
        matches!(
            self,
            SoundEvent::Thrust | SoundEvent::UfoLarge | SoundEvent::UfoSmall
        )
    }
}

impl fmt::Display for SoundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque token for a playing sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundHandle(pub u32);

/// Audio back-end seen by the simulation
pub trait SoundPort {
    /// Start a cue. Back-ends that cannot stop sounds may return `None`.
    fn play(&mut self, event: SoundEvent) -> Result<Option<SoundHandle>, PortError>;

    /// Stop a sound previously returned by `play`
    fn stop(&mut self, handle: SoundHandle) -> Result<(), PortError>;
}

/// Discards every cue
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl SoundPort for SilentAudio {
    fn play(&mut self, _event: SoundEvent) -> Result<Option<SoundHandle>, PortError> {
        Ok(None)
    }

    fn stop(&mut self, _handle: SoundHandle) -> Result<(), PortError> {
        Ok(())
    }
}

/// Logs cues and tracks looping sounds, for headless runs and tests
#[derive(Debug, Clone)]
pub struct LogAudio {
    master_volume: f32,
    muted: bool,
    next_handle: u32,
    /// Loops currently playing
    playing: Vec<(SoundHandle, SoundEvent)>,
    /// Every cue played, in order
    history: Vec<SoundEvent>,
}

impl Default for LogAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl LogAudio {
    pub fn new() -> Self {
        Self {
            master_volume: 0.3,
            muted: false,
            next_handle: 1,
            playing: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Looping sounds that have not been stopped
    pub fn playing(&self) -> impl Iterator<Item = SoundEvent> + '_ {
        self.playing.iter().map(|(_, event)| *event)
    }

    pub fn history(&self) -> &[SoundEvent] {
        &self.history
    }

    /// Number of times `event` was played
    pub fn count(&self, event: SoundEvent) -> usize {
        self.history.iter().filter(|e| **e == event).count()
    }
}

impl SoundPort for LogAudio {
    fn play(&mut self, event: SoundEvent) -> Result<Option<SoundHandle>, PortError> {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return Ok(None);
        }
        log::trace!("sound: {} (vol {:.2})", event, vol);
        self.history.push(event);

        let handle = SoundHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        if event.is_looping() {
            self.playing.push((handle, event));
        }
        Ok(Some(handle))
    }

    fn stop(&mut self, handle: SoundHandle) -> Result<(), PortError> {
        let Some(i) = self.playing.iter().position(|(h, _)| *h == handle) else {
            return Err(PortError::UnknownHandle(handle.0));
        };
        let (_, event) = self.playing.swap_remove(i);
        log::trace!("sound stopped: {}", event);
        Ok(())
    }
}
