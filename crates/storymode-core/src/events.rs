use serde::{Deserialize, Serialize};

/// Result handed to the host when a round ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub score: u32,
    pub stars: u8,
    /// Active play time; paused intervals excluded.
    pub time_taken_secs: f64,
    /// False when the round ended by running out of lives.
    pub won: bool,
}

/// Something that happened during a tick, in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoundEvent {
    QuestionStarted { index: u32, serial: u64 },
    Correct { value: i64, score: u32 },
    Wrong { value: i64, lives: u8 },
    /// The correct answer got away (shooter floor).
    Missed { value: i64, lives: u8 },
    /// Player ran into a hazard.
    LifeLost { lives: u8 },
    Paused,
    Resumed,
    HintRequested,
    HintApplied,
    Unfrozen,
    SlowEnded,
    Completed(RoundOutcome),
}

impl RoundEvent {
    /// Events that should reach `RoundObserver::on_wrong_answer`.
    pub fn is_wrong_answer(&self) -> bool {
        matches!(self, RoundEvent::Wrong { .. } | RoundEvent::Missed { .. })
    }
}
