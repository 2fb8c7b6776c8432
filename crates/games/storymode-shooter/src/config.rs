use serde::{Deserialize, Serialize};

use storymode_core::config::{RoundConfig, load_or_default};
use storymode_core::error::EngineError;
use storymode_core::grid::{MAX_MAZE_SIDE, MIN_MAZE_SIDE};

/// Data-driven configuration for the shooter game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterConfig {
    pub round: RoundConfig,
    pub seed: u64,
    /// Field size in cells, border included.
    pub field_width: u32,
    pub field_height: u32,
    /// Cannon speed along the bottom row (cells/tick).
    pub player_speed: f32,
    pub player_half_extent: f32,
    /// Bullet speed, straight up (cells/tick).
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    /// Fall speed of answer blocks (cells/tick).
    pub block_speed: f32,
    pub block_half_extent: f32,
    /// Minimum active time between shots.
    pub fire_cooldown_ms: u64,
    /// Bullets allowed in flight at once.
    pub max_bullets: usize,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            round: RoundConfig::default(),
            seed: 0xB10C,
            field_width: 11,
            field_height: 15,
            player_speed: 0.15,
            player_half_extent: 0.4,
            bullet_speed: 0.35,
            bullet_radius: 0.15,
            block_speed: 0.02,
            block_half_extent: 0.4,
            fire_cooldown_ms: 250,
            max_bullets: 6,
        }
    }
}

impl ShooterConfig {
    /// Load from `STORYMODE_SHOOTER_CONFIG` or `config/shooter.toml`, falling back to defaults.
    pub fn load() -> Self {
        load_or_default("STORYMODE_SHOOTER_CONFIG", "config/shooter.toml")
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.round.validate()?;
        if self.field_width < MIN_MAZE_SIDE || self.field_height < MIN_MAZE_SIDE {
            return Err(EngineError::MazeTooSmall {
                width: self.field_width,
                height: self.field_height,
            });
        }
        if self.field_width > MAX_MAZE_SIDE || self.field_height > MAX_MAZE_SIDE {
            return Err(EngineError::MazeTooLarge {
                width: self.field_width,
                height: self.field_height,
            });
        }
        let lanes = (self.field_width - 2) as usize;
        if self.round.option_count > lanes {
            return Err(EngineError::InvalidConfig(format!(
                "{} options do not fit in {lanes} lanes",
                self.round.option_count
            )));
        }
        for (name, speed) in [
            ("player_speed", self.player_speed),
            ("bullet_speed", self.bullet_speed),
            ("block_speed", self.block_speed),
        ] {
            if !(speed > 0.0 && speed < 1.0) {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be in (0, 1), got {speed}"
                )));
            }
        }
        for (name, half) in [
            ("player_half_extent", self.player_half_extent),
            ("bullet_radius", self.bullet_radius),
            ("block_half_extent", self.block_half_extent),
        ] {
            if !(half > 0.0 && half < 0.5) {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be in (0, 0.5), got {half}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(ShooterConfig::default().validate().is_ok());
    }

    #[test]
    fn too_many_options_for_lanes() {
        let mut cfg = ShooterConfig {
            field_width: 5,
            ..Default::default()
        };
        cfg.round.option_count = 4;
        assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn tiny_field_rejected() {
        let cfg = ShooterConfig {
            field_height: 3,
            ..Default::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(EngineError::MazeTooSmall {
                width: 11,
                height: 3
            })
        );
    }

    #[test]
    fn toml_partial() {
        let cfg: ShooterConfig = toml::from_str("fire_cooldown_ms = 100\n[round]\nlevel = 2").unwrap();
        assert_eq!(cfg.fire_cooldown_ms, 100);
        assert_eq!(cfg.round.level, 2);
        assert_eq!(cfg.field_width, 11);
    }

    #[test]
    fn oversized_extents_rejected() {
        for cfg in [
            ShooterConfig {
                player_half_extent: 0.5,
                ..Default::default()
            },
            ShooterConfig {
                bullet_radius: 0.75,
                ..Default::default()
            },
            ShooterConfig {
                bullet_radius: f32::NAN,
                ..Default::default()
            },
        ] {
            assert!(matches!(cfg.validate(), Err(EngineError::InvalidConfig(_))));
        }
    }

    #[test]
    fn huge_field_rejected() {
        let cfg = ShooterConfig {
            field_width: 70_000,
            field_height: 70_000,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(EngineError::MazeTooLarge { .. })));
    }
}
