use serde::{Deserialize, Serialize};

use storymode_core::config::{RoundConfig, load_or_default};
use storymode_core::error::EngineError;

/// Data-driven configuration for the tap quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub round: RoundConfig,
    pub seed: u64,
    /// Largest known addend at level 1; grows by `addend_step` per level.
    pub base_addend: i64,
    pub addend_step: i64,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            round: RoundConfig::default(),
            seed: 0x0A17,
            base_addend: 10,
            addend_step: 5,
        }
    }
}

impl QuizConfig {
    /// Load from `STORYMODE_QUIZ_CONFIG` or `config/quiz.toml`, falling back to defaults.
    pub fn load() -> Self {
        load_or_default("STORYMODE_QUIZ_CONFIG", "config/quiz.toml")
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.round.validate()?;
        if self.base_addend < 1 || self.addend_step < 0 {
            return Err(EngineError::InvalidConfig(format!(
                "base_addend must be >= 1 and addend_step >= 0, got {} and {}",
                self.base_addend, self.addend_step
            )));
        }
        Ok(())
    }
}
