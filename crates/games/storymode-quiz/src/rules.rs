use rand::Rng;

use storymode_core::game_trait::{AfterWrong, GameRules, Penalty, Question};

/// Missing-addend problems: `a + ? = c`.
#[derive(Debug, Clone)]
pub struct QuizRules {
    pub base_addend: i64,
    pub addend_step: i64,
}

impl QuizRules {
    fn top(&self, level: u8) -> i64 {
        self.base_addend + self.addend_step * i64::from(level.max(1) - 1)
    }
}

impl GameRules for QuizRules {
    fn generate_question<G: Rng + ?Sized>(&self, level: u8, rng: &mut G) -> Question {
        let a = rng.random_range(1..=self.top(level));
        let b = rng.random_range(1..=10);
        let c = a + b;
        Question {
            prompt: format!("{a} + ? = {c}"),
            operands: vec![a, c],
            answer: b,
        }
    }

    fn penalty_for_incorrect(&self) -> Penalty {
        Penalty {
            score_deduction: 0,
            slow_ms: None,
            after: AfterWrong::EliminateChoice,
        }
    }
}
