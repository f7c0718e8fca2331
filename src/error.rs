//! Error types
//!
//! Nothing in the simulation is fatal. These errors only surface at the
//! edges (loading configuration, talking to ports) and are logged and
//! swallowed by the session.

use thiserror::Error;

/// Failure to load or validate a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Failure reported by an external port (sound, effects, persistence).
#[derive(Debug, Error)]
pub enum PortError {
    #[error("port unavailable: {0}")]
    Unavailable(&'static str),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("unknown sound handle {0}")]
    UnknownHandle(u32),
}
