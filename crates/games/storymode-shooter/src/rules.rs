use rand::Rng;

use storymode_core::game_trait::{AfterWrong, GameRules, Penalty, Question};

/// Points lost per wrong block.
pub const WRONG_DEDUCTION: u32 = 2;

/// Times tables, with the table growing by level.
#[derive(Debug, Clone, Default)]
pub struct ShooterRules;

impl GameRules for ShooterRules {
    fn generate_question<G: Rng + ?Sized>(&self, level: u8, rng: &mut G) -> Question {
        let top = (4 + i64::from(level.max(1)) * 2).min(12);
        let a = rng.random_range(2..=top);
        let b = rng.random_range(1..=10);
        Question {
            prompt: format!("{a} × {b} = ?"),
            operands: vec![a, b],
            answer: a * b,
        }
    }

    fn penalty_for_incorrect(&self) -> Penalty {
        Penalty {
            score_deduction: WRONG_DEDUCTION,
            slow_ms: None,
            after: AfterWrong::NewQuestion,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn products_grow_with_level() {
        let mut rng = StdRng::seed_from_u64(8);
        let max_at = |level: u8, rng: &mut StdRng| {
            (0..200)
                .map(|_| ShooterRules.generate_question(level, rng).operands[0])
                .max()
                .unwrap_or(0)
        };
        assert!(max_at(1, &mut rng) <= 6);
        assert_eq!(max_at(5, &mut rng), 12);
    }

    #[test]
    fn wrong_block_costs_points_and_question() {
        let p = ShooterRules.penalty_for_incorrect();
        assert_eq!(p.score_deduction, 2);
        assert_eq!(p.after, AfterWrong::NewQuestion);
        assert!(!ShooterRules.star_thresholds().zero_on_wipeout);
    }
}
