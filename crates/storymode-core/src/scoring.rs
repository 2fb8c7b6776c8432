use serde::{Deserialize, Serialize};

/// Per-variant star rating thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarThresholds {
    /// Points per question needed for 3 stars.
    pub three_per_question: u32,
    /// Points per question needed for 2 stars.
    pub two_per_question: u32,
    /// Award 0 stars when the round ends on lives with zero score.
    pub zero_on_wipeout: bool,
}

impl Default for StarThresholds {
    fn default() -> Self {
        Self {
            three_per_question: 8,
            two_per_question: 5,
            zero_on_wipeout: false,
        }
    }
}

impl StarThresholds {
    /// Stars (0-3) for a finished round.
    pub fn rate(&self, score: u32, total_questions: u32, game_over: bool) -> u8 {
        if game_over && self.zero_on_wipeout && score == 0 {
            return 0;
        }
        let total = u64::from(total_questions);
        let score = u64::from(score);
        if score >= total * u64::from(self.three_per_question) {
            3
        } else if score >= total * u64::from(self.two_per_question) {
            2
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_question_thresholds() {
        let t = StarThresholds::default();
        assert_eq!(t.rate(70, 7, false), 3);
        assert_eq!(t.rate(56, 7, false), 3);
        assert_eq!(t.rate(55, 7, false), 2);
        assert_eq!(t.rate(40, 7, false), 2);
        assert_eq!(t.rate(20, 7, false), 1);
    }

    #[test]
    fn wipeout_depends_on_variant() {
        let lenient = StarThresholds::default();
        assert_eq!(lenient.rate(0, 7, true), 1);
        let strict = StarThresholds {
            zero_on_wipeout: true,
            ..Default::default()
        };
        assert_eq!(strict.rate(0, 7, true), 0);
        assert_eq!(strict.rate(10, 7, true), 1);
        assert_eq!(strict.rate(0, 7, false), 1);
    }
}
