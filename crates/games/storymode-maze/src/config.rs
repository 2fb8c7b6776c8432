use serde::{Deserialize, Serialize};

use storymode_core::chase::DEFAULT_RETARGET_CHANCE;
use storymode_core::config::{RoundConfig, load_or_default};
use storymode_core::error::EngineError;
use storymode_core::placement::PlacementRules;

/// Data-driven configuration for the maze-chase game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    pub round: RoundConfig,
    /// RNG seed for questions, placement and ghost decisions.
    pub seed: u64,
    /// Player speed (cells/tick).
    pub player_speed: f32,
    /// Ghost speed (cells/tick). Slower than the player.
    pub ghost_speed: f32,
    /// Half side of the player's wall box.
    pub player_half_extent: f32,
    /// Half side of a ghost's wall box.
    pub ghost_half_extent: f32,
    /// Player-ghost centre distance that costs a life.
    pub ghost_hit_distance: f32,
    /// Player-pellet centre distance that submits the pellet's answer.
    pub pellet_hit_distance: f32,
    /// Per-tick chance a ghost re-aims at the player.
    pub retarget_chance: f32,
    /// Upper bound on ghosts regardless of level.
    pub max_ghosts: usize,
    pub placement: PlacementRules,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            round: RoundConfig::default(),
            seed: 0x5EED,
            player_speed: 0.12,
            ghost_speed: 0.08,
            player_half_extent: 0.35,
            ghost_half_extent: 0.35,
            ghost_hit_distance: 0.7,
            pellet_hit_distance: 0.6,
            retarget_chance: DEFAULT_RETARGET_CHANCE,
            max_ghosts: 3,
            placement: PlacementRules::default(),
        }
    }
}

impl MazeConfig {
    /// Load from `STORYMODE_MAZE_CONFIG` or `config/maze.toml`, falling back to defaults.
    pub fn load() -> Self {
        load_or_default("STORYMODE_MAZE_CONFIG", "config/maze.toml")
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.round.validate()?;
        for (name, speed) in [
            ("player_speed", self.player_speed),
            ("ghost_speed", self.ghost_speed),
        ] {
            if !(speed > 0.0 && speed < 1.0) {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be in (0, 1), got {speed}"
                )));
            }
        }
        for (name, half) in [
            ("player_half_extent", self.player_half_extent),
            ("ghost_half_extent", self.ghost_half_extent),
        ] {
            if !(half > 0.0 && half < 0.5) {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be in (0, 0.5), got {half}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.retarget_chance) {
            return Err(EngineError::InvalidConfig(format!(
                "retarget_chance must be in [0, 1], got {}",
                self.retarget_chance
            )));
        }
        Ok(())
    }

    /// Ghosts on the board for the configured level.
    pub fn ghost_count(&self) -> usize {
        (1 + usize::from(self.round.level.max(1)) / 2).min(self.max_ghosts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(MazeConfig::default().validate().is_ok());
    }

    #[test]
    fn player_outruns_ghosts_by_default() {
        let cfg = MazeConfig::default();
        assert!(cfg.player_speed > cfg.ghost_speed);
    }

    #[test]
    fn toml_overrides_nested_round() {
        let cfg: MazeConfig = toml::from_str(
            r#"
            seed = 9
            ghost_speed = 0.05

            [round]
            level = 4
            total_questions = 3
            "#,
        )
        .unwrap();
        assert_eq!(cfg.seed, 9);
        assert_eq!(cfg.round.level, 4);
        assert_eq!(cfg.round.total_questions, 3);
        assert_eq!(cfg.round.starting_lives, 3);
        assert_eq!(cfg.ghost_count(), 3);
    }

    #[test]
    fn ghost_count_grows_with_level() {
        let at = |level| {
            let mut cfg = MazeConfig::default();
            cfg.round.level = level;
            cfg.ghost_count()
        };
        assert_eq!(at(1), 1);
        assert_eq!(at(2), 2);
        assert_eq!(at(3), 2);
        assert_eq!(at(6), 3);
    }

    #[test]
    fn rejects_tunnelling_speed() {
        let cfg = MazeConfig {
            player_speed: 1.5,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_nan_retarget_chance() {
        let cfg: MazeConfig = toml::from_str("retarget_chance = nan").unwrap();
        assert!(cfg.retarget_chance.is_nan());
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfig(_))));

        let cfg = MazeConfig {
            retarget_chance: 1.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
