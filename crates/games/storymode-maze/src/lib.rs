pub mod config;
pub mod rules;
pub mod sim;

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use storymode_core::chase::ChaseController;
use storymode_core::error::EngineError;
use storymode_core::events::RoundEvent;
use storymode_core::game_trait::{ArcadeGame, GameMetadata};
use storymode_core::input::{Command, Intent};
use storymode_core::motion::SLOWED_SCALE;
use storymode_core::placement::place_options;
use storymode_core::render::{EntityView, Hud, OptionView, RenderFrame};
use storymode_core::round::{RoundMachine, Verdict};
use storymode_core::storymode_game_boilerplate;

use config::MazeConfig;
use rules::MazeRules;
use sim::{Contact, SimulationContext, step_ai, step_collisions, step_motion};

/// Maze chase: steer through the maze to the pellet with the right answer
/// while ghosts close in.
pub struct MazeChase {
    ctx: SimulationContext,
    round: RoundMachine<MazeRules>,
    chase: ChaseController,
    rng: StdRng,
    intent: Intent,
    config: MazeConfig,
}

impl MazeChase {
    pub fn new() -> Result<Self, EngineError> {
        Self::with_config(MazeConfig::load())
    }

    pub fn with_config(config: MazeConfig) -> Result<Self, EngineError> {
        let ctx = SimulationContext::new(&config)?;
        let rules = MazeRules {
            slow_ms: config.round.slow_ms,
        };
        let round = RoundMachine::new(rules, config.round.clone())?;
        Ok(Self {
            ctx,
            round,
            chase: ChaseController::new(config.retarget_chance),
            rng: StdRng::seed_from_u64(config.seed),
            intent: Intent::default(),
            config,
        })
    }

    pub fn context(&self) -> &SimulationContext {
        &self.ctx
    }

    pub fn round(&self) -> &RoundMachine<MazeRules> {
        &self.round
    }

    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// Drop the current option set into open cells away from the player.
    fn scatter_options(&mut self) {
        let player_cell = self.ctx.player.position.cell();
        place_options(
            &self.ctx.maze,
            self.round.options_mut(),
            player_cell,
            self.config.placement,
            &mut self.rng,
        );
    }

    fn resolve_contact(&mut self, contact: Contact, now_ms: u64) {
        match contact {
            Contact::Ghost(id) => {
                if self.round.hazard_hit(now_ms) == Verdict::Frozen {
                    tracing::debug!(ghost = id, "Caught; resetting positions");
                    self.ctx.reset_positions();
                }
            },
            Contact::Pellet(index) => {
                let Some(value) = self.round.options().get(index).map(|o| o.value) else {
                    return;
                };
                match self.round.evaluate(value, now_ms, &mut self.rng) {
                    Verdict::Advanced
                    | Verdict::Penalized {
                        replace_options: true,
                    } => self.scatter_options(),
                    _ => {},
                }
            },
        }
    }
}

impl ArcadeGame for MazeChase {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Maze Chase".to_string(),
            description: "Reach the pellet with the right answer before the ghosts reach you"
                .to_string(),
            continuous: true,
            estimated_round_duration: Duration::from_secs(120),
        }
    }

    fn start(&mut self, now_ms: u64) {
        if self.round.is_torn_down() {
            return;
        }
        self.round.start(now_ms, &mut self.rng);
        self.scatter_options();
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

        if let Some(direction) = intent.direction {
            self.ctx.desired = direction;
        }
        if intent.hint {
            self.round.request_hint(now_ms);
        }
        if self.round.advance_timers(now_ms, &mut self.rng) {
            self.scatter_options();
        }
        if self.round.session().frozen {
            return self.round.drain_events();
        }

        let scale = if self.round.session().slowed {
            SLOWED_SCALE
        } else {
            1.0
        };
        step_motion(&mut self.ctx, scale);
        step_ai(&mut self.ctx, &self.chase, &mut self.rng);
        if let Some(contact) = step_collisions(&self.ctx, self.round.options(), &self.config) {
            self.resolve_contact(contact, now_ms);
        }
        self.round.drain_events()
    }

    fn frame(&self) -> RenderFrame<'_> {
        let mut entities = Vec::with_capacity(1 + self.ctx.ghosts.len());
        entities.push(EntityView::from(&self.ctx.player));
        entities.extend(self.ctx.ghosts.iter().map(EntityView::from));
        RenderFrame {
            maze: Some(&self.ctx.maze),
            entities,
            options: OptionView::from_options(self.round.options()),
            hud: Hud::new(self.round.session(), self.round.question()),
        }
    }

    fn try_again(&mut self, now_ms: u64) {
        if self.round.is_torn_down() {
            return;
        }
        self.intent = Intent::default();
        self.ctx.reset_positions();
        self.round.reset(now_ms, &mut self.rng);
        self.scatter_options();
    }

    storymode_game_boilerplate!();
}
