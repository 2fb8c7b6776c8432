use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, EngineError};

/// Round lifecycle settings shared by every game variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Difficulty level (1-based). Drives maze size and question ranges.
    pub level: u8,
    /// Questions per round.
    pub total_questions: u32,
    /// Lives at round start (and after Try Again).
    pub starting_lives: u8,
    /// Options per question, including the correct one.
    pub option_count: usize,
    /// Delay before a requested hint swaps the question (ms of active time).
    pub hint_delay_ms: u64,
    /// Invulnerability window after a hazard collision (ms).
    pub frozen_ms: u64,
    /// Default slowdown window for variants that slow on a wrong answer (ms).
    pub slow_ms: u64,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            level: 1,
            total_questions: 7,
            starting_lives: 3,
            option_count: 4,
            hint_delay_ms: 1500,
            frozen_ms: 1500,
            slow_ms: 3000,
        }
    }
}

impl RoundConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.total_questions == 0 {
            return Err(EngineError::InvalidConfig(
                "total_questions must be at least 1".to_string(),
            ));
        }
        if self.starting_lives == 0 {
            return Err(EngineError::InvalidConfig(
                "starting_lives must be at least 1".to_string(),
            ));
        }
        if self.option_count < 2 {
            return Err(EngineError::InvalidOptionCount {
                count: self.option_count,
            });
        }
        Ok(())
    }
}

/// Read and parse a TOML config file.
pub fn parse<T: DeserializeOwned>(path: &str) -> Result<T, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    toml::from_str::<T>(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_string(),
        source,
    })
}

/// Load config from the file named by `env_var`, else `default_path`, else defaults.
///
/// A missing file is silent; a file that exists but fails to parse is logged.
pub fn load_or_default<T: DeserializeOwned + Default>(env_var: &str, default_path: &str) -> T {
    let path = std::env::var(env_var).unwrap_or_else(|_| default_path.to_string());
    match parse::<T>(&path) {
        Ok(cfg) => cfg,
        Err(ConfigError::Io { .. }) => T::default(),
        Err(e) => {
            tracing::warn!(error = %e, "Using default config");
            T::default()
        },
    }
}
