use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::events::RoundEvent;
use crate::input::Command;
use crate::render::RenderFrame;
use crate::round::RoundSession;
use crate::scoring::StarThresholds;

/// A generated arithmetic question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub operands: Vec<i64>,
    pub answer: i64,
}

/// What happens to the question after a wrong answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AfterWrong {
    /// Replace the question (same index).
    NewQuestion,
    /// Same question, fresh distractors in new places.
    ReshuffleOptions,
    /// Keep the question and options; the wrong pick is ruled out and the
    /// player picks again.
    EliminateChoice,
}

/// Variant penalty for a wrong answer (on top of the lost life).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Penalty {
    pub score_deduction: u32,
    /// Slowdown window in ms of active time.
    pub slow_ms: Option<u64>,
    pub after: AfterWrong,
}

/// Per-variant question and scoring strategy plugged into `RoundMachine`.
pub trait GameRules {
    /// Produce a question for `level`.
    fn generate_question<G: Rng + ?Sized>(&self, level: u8, rng: &mut G) -> Question;

    /// Points for a correct answer.
    fn score_for_correct(&self) -> u32 {
        10
    }

    fn penalty_for_incorrect(&self) -> Penalty;

    fn star_thresholds(&self) -> StarThresholds {
        StarThresholds::default()
    }
}

/// Static description of a game variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    /// Whether the variant consumes movement commands.
    pub continuous: bool,
    pub estimated_round_duration: Duration,
}

/// Common interface for every Story Mode mini-game.
///
/// The host drives `update` once per frame with a millisecond timestamp;
/// commands only record intent, which the next `update` consumes.
pub trait ArcadeGame {
    fn metadata(&self) -> GameMetadata;

    /// Begin the round at `now_ms`.
    fn start(&mut self, now_ms: u64);

    /// Record player intent for the next tick.
    fn apply_command(&mut self, command: Command);

    /// Advance one tick. Returns the round events raised since the last call.
    fn update(&mut self, now_ms: u64) -> Vec<RoundEvent>;

    /// Snapshot for the render sink.
    fn frame(&self) -> RenderFrame<'_>;

    fn pause(&mut self, now_ms: u64);

    fn resume(&mut self, now_ms: u64);

    /// Restart the round with full lives (the "Try Again" action).
    fn try_again(&mut self, now_ms: u64);

    /// Stop the round for good; later calls are no-ops.
    fn teardown(&mut self);

    fn session(&self) -> &RoundSession;

    /// Completed, game over, or torn down.
    fn is_finished(&self) -> bool;

    /// Encoded simulation state (context, session, options).
    fn serialize_state(&self) -> Vec<u8>;
}

/// Generates the `ArcadeGame` methods that are identical across variants:
/// `pause`, `resume`, `teardown`, `session`, `is_finished`, `serialize_state`.
///
/// Requires the implementing struct to have a `round: RoundMachine<_>` field
/// and a serializable `ctx` field.
#[macro_export]
macro_rules! storymode_game_boilerplate {
    () => {
        fn pause(&mut self, now_ms: u64) {
            self.round.pause(now_ms);
        }

        fn resume(&mut self, now_ms: u64) {
            self.round.resume(now_ms);
        }

        fn teardown(&mut self) {
            self.round.teardown();
        }

        fn session(&self) -> &$crate::round::RoundSession {
            self.round.session()
        }

        fn is_finished(&self) -> bool {
            self.round.is_finished()
        }

        fn serialize_state(&self) -> Vec<u8> {
            rmp_serde::to_vec(&(&self.ctx, self.round.session(), self.round.options()))
                .unwrap_or_default()
        }
    };
}
