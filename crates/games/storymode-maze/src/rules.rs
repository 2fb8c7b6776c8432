use rand::Rng;

use storymode_core::game_trait::{AfterWrong, GameRules, Penalty, Question};
use storymode_core::scoring::StarThresholds;

/// Arithmetic for the maze: sums, then differences, then products.
#[derive(Debug, Clone)]
pub struct MazeRules {
    pub slow_ms: u64,
}

impl GameRules for MazeRules {
    fn generate_question<G: Rng + ?Sized>(&self, level: u8, rng: &mut G) -> Question {
        match level {
            0 | 1 => {
                let a = rng.random_range(1..=10);
                let b = rng.random_range(1..=10);
                Question {
                    prompt: format!("{a} + {b} = ?"),
                    operands: vec![a, b],
                    answer: a + b,
                }
            },
            2 => {
                let a = rng.random_range(5..=20);
                let b = rng.random_range(1..a);
                Question {
                    prompt: format!("{a} - {b} = ?"),
                    operands: vec![a, b],
                    answer: a - b,
                }
            },
            _ => {
                let top = (i64::from(level) * 3).min(12);
                let a = rng.random_range(2..=top);
                let b = rng.random_range(2..=top);
                Question {
                    prompt: format!("{a} × {b} = ?"),
                    operands: vec![a, b],
                    answer: a * b,
                }
            },
        }
    }

    fn penalty_for_incorrect(&self) -> Penalty {
        Penalty {
            score_deduction: 0,
            slow_ms: Some(self.slow_ms),
            after: AfterWrong::ReshuffleOptions,
        }
    }

    fn star_thresholds(&self) -> StarThresholds {
        StarThresholds {
            zero_on_wipeout: true,
            ..Default::default()
        }
    }
}
