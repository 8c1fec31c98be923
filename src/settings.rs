//! Host settings
//!
//! Loaded from an optional JSON file. World constants are not part of
//! this; only host behaviour (seed, title screen, logging) is.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::sim::RngState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Obstacle RNG seed; random per run when absent
    pub seed: Option<u64>,

    // === Title ===
    /// Show the title banner before the session
    pub show_title: bool,
    /// How long the title stays up (ms)
    pub title_ms: u64,

    // === Logging ===
    /// env_logger filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: None,
            show_title: true,
            title_ms: 1500,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub const TITLE_TEXT: &'static str = "Flappy";

    /// Read settings from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(GameError::Config {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        serde_json::from_str(&json).map_err(|e| GameError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Seed to run with, drawing one from entropy if unset
    pub fn rng_state(&self) -> RngState {
        match self.seed {
            Some(seed) => RngState::new(seed),
            None => RngState::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("flappy-sim-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = Settings::load(&temp_path("does-not-exist.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_path("partial.json");
        std::fs::write(&path, r#"{ "seed": 42, "show_title": false }"#).unwrap();
        let settings = Settings::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.seed, Some(42));
        assert!(!settings.show_title);
        assert_eq!(settings.title_ms, Settings::default().title_ms);
        assert_eq!(settings.rng_state().seed, 42);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let path = temp_path("broken.json");
        std::fs::write(&path, "{ seed: ").unwrap();
        let err = Settings::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(matches!(err, GameError::Config { .. }));
    }
}
