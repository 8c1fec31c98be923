//! Error taxonomy
//!
//! Every error here is fatal: a broken asset or render state cannot be
//! resumed. Actor death is a state transition, never an error.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// Asset missing or corrupt (startup only)
    #[error("could not load {name}: {reason}")]
    ResourceLoad { name: String, reason: String },

    /// A draw call failed mid-frame
    #[error("render failed: {0}")]
    Render(String),

    #[error("could not read settings from {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    /// The control loop task was cancelled
    #[error("session task failed: {0}")]
    Session(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GameError {
    pub fn resource(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::ResourceLoad {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn render(what: &str, reason: impl std::fmt::Display) -> Self {
        Self::Render(format!("could not {what}: {reason}"))
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
