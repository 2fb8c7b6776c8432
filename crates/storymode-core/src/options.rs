use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::grid::Position;

/// Initial maximum distance of a distractor from the correct value.
pub const BASE_SPREAD: i64 = 5;
/// Draws per spread before widening it.
pub const ATTEMPTS_PER_SPREAD: u32 = 12;
/// How many times the spread may double.
pub const MAX_WIDEN_ROUNDS: u32 = 4;
/// Draws from the wide fallback range.
pub const FALLBACK_ATTEMPTS: u32 = 64;

/// One selectable answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub value: i64,
    pub is_correct: bool,
    /// Set when the option lives in the world (pellet or falling block).
    pub position: Option<Position>,
}

impl AnswerOption {
    pub fn new(value: i64, is_correct: bool) -> Self {
        Self {
            value,
            is_correct,
            position: None,
        }
    }
}

/// Build `count` shuffled options: `correct` plus distinct positive distractors.
///
/// Distractors are offsets from the correct value, re-rolled until unique and
/// positive. The offset range widens a bounded number of times, then a wide
/// random range is tried, then the smallest unused positive integers fill the
/// rest. Always terminates.
pub fn generate_options<R: Rng + ?Sized>(
    correct: i64,
    count: usize,
    rng: &mut R,
) -> Result<Vec<AnswerOption>, EngineError> {
    if count < 2 {
        return Err(EngineError::InvalidOptionCount { count });
    }

    let mut values = vec![correct];
    let mut spread = BASE_SPREAD.max(count as i64);

    'widen: for _ in 0..=MAX_WIDEN_ROUNDS {
        for _ in 0..ATTEMPTS_PER_SPREAD {
            if values.len() == count {
                break 'widen;
            }
            let mut offset = rng.random_range(1..=spread);
            if rng.random_bool(0.5) {
                offset = -offset;
            }
            let candidate = correct.saturating_add(offset);
            if candidate > 0 && !values.contains(&candidate) {
                values.push(candidate);
            }
        }
        spread = spread.saturating_mul(2);
    }

    if values.len() < count {
        let upper = correct.max(1).saturating_mul(2).max(spread) + count as i64 * 10;
        for _ in 0..FALLBACK_ATTEMPTS {
            if values.len() == count {
                break;
            }
            let candidate = rng.random_range(1..=upper);
            if !values.contains(&candidate) {
                values.push(candidate);
            }
        }
    }

    if values.len() < count {
        tracing::warn!(
            correct,
            count,
            found = values.len(),
            "Option generation fell back to ascending fill"
        );
        let mut candidate = 1i64;
        while values.len() < count {
            if !values.contains(&candidate) {
                values.push(candidate);
            }
            candidate += 1;
        }
    }

    let mut options: Vec<AnswerOption> = values
        .into_iter()
        .enumerate()
        .map(|(i, v)| AnswerOption::new(v, i == 0))
        .collect();
    options.shuffle(rng);
    Ok(options)
}

/// The correct option, if the set has one.
pub fn correct_option(options: &[AnswerOption]) -> Option<&AnswerOption> {
    options.iter().find(|o| o.is_correct)
}
