use serde::Serialize;

use crate::entity::{EntityId, EntityKind, MovingEntity};
use crate::events::RoundOutcome;
use crate::game_trait::Question;
use crate::grid::{Direction, Maze, Position};
use crate::options::AnswerOption;
use crate::round::RoundSession;

/// What the renderer needs to draw one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Position,
    pub direction: Direction,
    pub radius: f32,
}

impl From<&MovingEntity> for EntityView {
    fn from(e: &MovingEntity) -> Self {
        Self {
            id: e.id,
            kind: e.kind,
            position: e.position,
            direction: e.direction,
            radius: e.radius,
        }
    }
}

/// One answer as shown to the player. Correctness is not exposed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    pub index: usize,
    pub value: i64,
    pub position: Option<Position>,
    /// Hit this tick; drawn with the break effect and gone next tick.
    pub breaking: bool,
    /// Ruled out by an earlier wrong pick (discrete variants).
    pub eliminated: bool,
}

impl OptionView {
    pub fn from_options(options: &[AnswerOption]) -> Vec<OptionView> {
        options
            .iter()
            .enumerate()
            .map(|(index, o)| OptionView {
                index,
                value: o.value,
                position: o.position,
                breaking: false,
                eliminated: false,
            })
            .collect()
    }
}

/// Heads-up display fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hud {
    pub prompt: String,
    pub lives: u8,
    pub score: u32,
    /// 1-based for display.
    pub question_number: u32,
    pub total_questions: u32,
    pub paused: bool,
    pub frozen: bool,
    pub slowed: bool,
    pub hint_available: bool,
}

impl Hud {
    pub fn new(session: &RoundSession, question: Option<&Question>) -> Self {
        Self {
            prompt: question.map(|q| q.prompt.clone()).unwrap_or_default(),
            lives: session.lives,
            score: session.score,
            question_number: (session.question_index + 1).min(session.total_questions),
            total_questions: session.total_questions,
            paused: session.paused,
            frozen: session.frozen,
            slowed: session.slowed,
            hint_available: !session.hint_used,
        }
    }
}

/// Everything drawn for one tick.
#[derive(Debug, Clone, Serialize)]
pub struct RenderFrame<'a> {
    pub maze: Option<&'a Maze>,
    pub entities: Vec<EntityView>,
    pub options: Vec<OptionView>,
    pub hud: Hud,
}

/// Receives one frame per tick.
pub trait RenderSink {
    fn present(&mut self, frame: &RenderFrame<'_>);
}

/// Receives round-level notifications.
pub trait RoundObserver {
    /// Called exactly once per round.
    fn on_complete(&mut self, outcome: &RoundOutcome);

    fn on_wrong_answer(&mut self) {}
}
