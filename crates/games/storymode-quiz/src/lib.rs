pub mod config;
pub mod rules;

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use storymode_core::error::EngineError;
use storymode_core::events::RoundEvent;
use storymode_core::game_trait::{ArcadeGame, GameMetadata};
use storymode_core::input::{Command, Intent};
use storymode_core::render::{Hud, OptionView, RenderFrame};
use storymode_core::round::{RoundMachine, Verdict};
use storymode_core::storymode_game_boilerplate;

use config::QuizConfig;
use rules::QuizRules;

/// Options the player already tapped wrongly for the current option set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizBoard {
    pub eliminated: Vec<usize>,
}

impl QuizBoard {
    pub fn is_eliminated(&self, index: usize) -> bool {
        self.eliminated.contains(&index)
    }

    fn clear(&mut self) {
        self.eliminated.clear();
    }
}

/// Tap quiz: no world, just a prompt and answer buttons.
pub struct TapQuiz {
    ctx: QuizBoard,
    round: RoundMachine<QuizRules>,
    rng: StdRng,
    intent: Intent,
}

impl TapQuiz {
    pub fn new() -> Result<Self, EngineError> {
        Self::with_config(QuizConfig::load())
    }

    pub fn with_config(config: QuizConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let rules = QuizRules {
            base_addend: config.base_addend,
            addend_step: config.addend_step,
        };
        Ok(Self {
            ctx: QuizBoard::default(),
            round: RoundMachine::new(rules, config.round)?,
            rng: StdRng::seed_from_u64(config.seed),
            intent: Intent::default(),
        })
    }

    pub fn board(&self) -> &QuizBoard {
        &self.ctx
    }

    pub fn round(&self) -> &RoundMachine<QuizRules> {
        &self.round
    }

    fn submit(&mut self, index: usize, now_ms: u64) {
        if self.ctx.is_eliminated(index) {
            tracing::debug!(index, "Tap on eliminated option ignored");
            return;
        }
        let Some(value) = self.round.options().get(index).map(|o| o.value) else {
            return;
        };
        match self.round.evaluate(value, now_ms, &mut self.rng) {
            Verdict::Penalized {
                replace_options: false,
            } => self.ctx.eliminated.push(index),
            Verdict::Advanced
            | Verdict::Penalized {
                replace_options: true,
            } => self.ctx.clear(),
            _ => {},
        }
    }
}

impl ArcadeGame for TapQuiz {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Tap Quiz".to_string(),
            description: "Tap the number that completes the sum".to_string(),
            continuous: false,
            estimated_round_duration: Duration::from_secs(90),
        }
    }

    fn start(&mut self, now_ms: u64) {
        if self.round.is_torn_down() {
            return;
        }
        self.round.start(now_ms, &mut self.rng);
    }

    fn apply_command(&mut self, command: Command) {
        if !self.round.is_torn_down() {
            self.intent.record(command);
        }
    }

    fn update(&mut self, now_ms: u64) -> Vec<RoundEvent> {
        if self.round.is_torn_down() {
            return Vec::new();
        }
        let intent = self.intent.take();
        if intent.try_again {
            self.try_again(now_ms);
            return self.round.drain_events();
        }
        if intent.toggle_pause {
            self.round.toggle_pause(now_ms);
        }
        if !self.round.is_running() {
            return self.round.drain_events();
        }

        if intent.hint {
            self.round.request_hint(now_ms);
        }
        if self.round.advance_timers(now_ms, &mut self.rng) {
            self.ctx.clear();
        }
        if let Some(index) = intent.select {
            self.submit(index, now_ms);
        }
        self.round.drain_events()
    }

    fn frame(&self) -> RenderFrame<'_> {
        let mut options = OptionView::from_options(self.round.options());
        for view in &mut options {
            view.eliminated = self.ctx.is_eliminated(view.index);
        }
        RenderFrame {
            maze: None,
            entities: Vec::new(),
            options,
            hud: Hud::new(self.round.session(), self.round.question()),
        }
    }

    fn try_again(&mut self, now_ms: u64) {
        if self.round.is_torn_down() {
            return;
        }
        self.intent = Intent::default();
        self.ctx.clear();
        self.round.reset(now_ms, &mut self.rng);
    }

    storymode_game_boilerplate!();
}
