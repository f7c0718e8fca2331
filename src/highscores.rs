//! High score persistence
//!
//! The session records two things when a run ends: the all-time best score
//! and a short leaderboard of the top five runs. Where they are kept is up
//! to the `ScoreStore` the host provides.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PortError;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Level reached
    pub level: u32,
}

/// High score leaderboard, best first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Slot a run would take: below every equal or better score
    fn rank_slot(&self, score: u64) -> usize {
        self.entries.partition_point(|e| e.score >= score)
    }

    /// A zero score never places
    pub fn qualifies(&self, score: u64) -> bool {
        score > 0 && self.rank_slot(score) < MAX_HIGH_SCORES
    }

    /// Insert a finished run. Returns its 1-based rank if it placed.
    pub fn add_score(&mut self, score: u64, level: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let slot = self.rank_slot(score);
        self.entries.insert(slot, HighScoreEntry { score, level });
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(slot + 1)
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Persistence back-end seen by the session
pub trait ScoreStore {
    /// Best score ever recorded (0 if none)
    fn high_score(&self) -> Result<u64, PortError>;

    fn set_high_score(&mut self, score: u64) -> Result<(), PortError>;

    /// Offer a finished run to the leaderboard; returns its rank if it placed
    fn push_score(&mut self, score: u64, level: u32) -> Result<Option<usize>, PortError>;

    fn leaderboard(&self) -> Result<HighScores, PortError>;
}

/// Everything a store persists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedScores {
    pub high_score: u64,
    pub scores: HighScores,
}

/// Keeps scores for the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    saved: SavedScores,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known best score
    pub fn with_high_score(high_score: u64) -> Self {
        Self {
            saved: SavedScores {
                high_score,
                scores: HighScores::new(),
            },
        }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn high_score(&self) -> Result<u64, PortError> {
        Ok(self.saved.high_score)
    }

    fn set_high_score(&mut self, score: u64) -> Result<(), PortError> {
        self.saved.high_score = score;
        Ok(())
    }

    fn push_score(&mut self, score: u64, level: u32) -> Result<Option<usize>, PortError> {
        Ok(self.saved.scores.add_score(score, level))
    }

    fn leaderboard(&self) -> Result<HighScores, PortError> {
        Ok(self.saved.scores.clone())
    }
}

/// Stores scores as a JSON document on disk.
///
/// Every call reads the file fresh, so several sessions can share one file.
/// A missing file reads as an empty record.
#[derive(Debug, Clone)]
pub struct JsonFileScoreStore {
    path: PathBuf,
}

impl JsonFileScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<SavedScores, PortError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No high scores at {}, starting fresh", self.path.display());
                Ok(SavedScores::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, saved: &SavedScores) -> Result<(), PortError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(saved)?)?;
        log::info!(
            "High scores saved ({} entries)",
            saved.scores.entries.len()
        );
        Ok(())
    }
}

impl ScoreStore for JsonFileScoreStore {
    fn high_score(&self) -> Result<u64, PortError> {
        Ok(self.load()?.high_score)
    }

    fn set_high_score(&mut self, score: u64) -> Result<(), PortError> {
        let mut saved = self.load()?;
        saved.high_score = score;
        self.save(&saved)
    }

    fn push_score(&mut self, score: u64, level: u32) -> Result<Option<usize>, PortError> {
        let mut saved = self.load()?;
        let rank = saved.scores.add_score(score, level);
        if rank.is_some() {
            self.save(&saved)?;
        }
        Ok(rank)
    }

    fn leaderboard(&self) -> Result<HighScores, PortError> {
        Ok(self.load()?.scores)
    }
}
