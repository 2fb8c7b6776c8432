pub mod config;
pub mod rules;
pub mod sim;

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use storymode_core::error::EngineError;
use storymode_core::events::RoundEvent;
use storymode_core::game_trait::{ArcadeGame, GameMetadata};
use storymode_core::grid::Direction;
use storymode_core::input::{Command, Intent};
use storymode_core::motion::SLOWED_SCALE;
use storymode_core::render::{EntityView, Hud, OptionView, RenderFrame};
use storymode_core::round::{RoundMachine, Verdict};
use storymode_core::storymode_game_boilerplate;

use config::ShooterConfig;
use rules::ShooterRules;
use sim::{ShooterContext, step_collisions, step_motion, sync_option_positions};

/// Block shooter: slide the cannon and shoot the falling block that carries
/// the right answer. Letting the right block reach the floor costs a life.
pub struct BlockShooter {
    ctx: ShooterContext,
    round: RoundMachine<ShooterRules>,
    rng: StdRng,
    intent: Intent,
    config: ShooterConfig,
}

impl BlockShooter {
    pub fn new() -> Result<Self, EngineError> {
        Self::with_config(ShooterConfig::load())
    }

    pub fn with_config(config: ShooterConfig) -> Result<Self, EngineError> {
        let ctx = ShooterContext::new(&config)?;
        let round = RoundMachine::new(ShooterRules, config.round.clone())?;
        Ok(Self {
            ctx,
            round,
            rng: StdRng::seed_from_u64(config.seed),
            intent: Intent::default(),
            config,
        })
    }

    pub fn context(&self) -> &ShooterContext {
        &self.ctx
    }

    pub fn round(&self) -> &RoundMachine<ShooterRules> {
        &self.round
    }

    fn respawn_blocks(&mut self) {
        let serial = self.round.serial();
        self.ctx.bullets.clear();
        self.ctx.spawn_blocks(
            self.round.options_mut(),
            serial,
            &self.config,
            &mut self.rng,
        );
    }

    /// Feed one verdict's consequences back into the field.
    fn after_verdict(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Advanced
            | Verdict::Penalized {
                replace_options: true,
            } => self.respawn_blocks(),
            _ => {},
        }
    }

    fn steer(&mut self, direction: Direction) {
        // The cannon only slides sideways; up or down stops it.
        self.ctx.player.direction = if direction.is_horizontal() {
            direction
        } else {
            Direction::None
        };
    }
}

impl ArcadeGame for BlockShooter {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Block Shooter".to_string(),
            description: "Shoot the falling block with the right answer".to_string(),
            continuous: true,
            estimated_round_duration: Duration::from_secs(150),
        }
    }

    fn start(&mut self, now_ms: u64) {
        if self.round.is_torn_down() {
            return;
        }
        self.round.start(now_ms, &mut self.rng);
        self.respawn_blocks();
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
            self.steer(direction);
        }
        if intent.hint {
            self.round.request_hint(now_ms);
        }
        if self.round.advance_timers(now_ms, &mut self.rng) {
            self.respawn_blocks();
        }
        let active_ms = self.round.active_ms(now_ms);
        if intent.fire {
            self.ctx.fire(active_ms, &self.config);
        }

        self.ctx.clear_broken();
        let scale = if self.round.session().slowed {
            SLOWED_SCALE
        } else {
            1.0
        };
        let landings = step_motion(&mut self.ctx, scale);
        let hits = step_collisions(&mut self.ctx);

        for hit in hits {
            if hit.serial != self.round.serial() {
                tracing::debug!(serial = hit.serial, "Discarding hit on stale block");
                continue;
            }
            let Some(value) = self.round.options().get(hit.option_index).map(|o| o.value) else {
                continue;
            };
            let verdict = self.round.evaluate(value, now_ms, &mut self.rng);
            self.after_verdict(verdict);
        }

        for landing in landings {
            if landing.serial != self.round.serial() {
                continue;
            }
            let correct = self
                .round
                .options()
                .get(landing.option_index)
                .is_some_and(|o| o.is_correct);
            if correct {
                let verdict = self.round.miss(now_ms, &mut self.rng);
                self.after_verdict(verdict);
            }
        }

        let serial = self.round.serial();
        sync_option_positions(&self.ctx, self.round.options_mut(), serial);
        self.round.drain_events()
    }

    fn frame(&self) -> RenderFrame<'_> {
        let mut entities = vec![EntityView::from(&self.ctx.player)];
        entities.extend(self.ctx.bullets.iter().map(EntityView::from));
        entities.extend(self.ctx.blocks.iter().map(|b| EntityView::from(&b.entity)));

        let serial = self.round.serial();
        let mut options = OptionView::from_options(self.round.options());
        for block in self.ctx.blocks.iter().filter(|b| b.serial == serial) {
            if let Some(view) = options.get_mut(block.option_index) {
                view.breaking = block.breaking;
            }
        }
        RenderFrame {
            maze: Some(&self.ctx.field),
            entities,
            options,
            hud: Hud::new(self.round.session(), self.round.question()),
        }
    }

    fn try_again(&mut self, now_ms: u64) {
        if self.round.is_torn_down() {
            return;
        }
        self.intent = Intent::default();
        self.ctx.reset();
        self.round.reset(now_ms, &mut self.rng);
        self.respawn_blocks();
    }

    storymode_game_boilerplate!();
}

#[cfg(test)]
mod tests {
    use storymode_core::entity::{EntityKind, MovingEntity};
    use storymode_core::grid::Position;
    use storymode_core::round::RoundPhase;
    use storymode_core::test_helpers::{self, round_config, run_ticks};

    use super::*;

    fn game() -> BlockShooter {
        BlockShooter::with_config(ShooterConfig::default()).unwrap()
    }

    fn block_index(g: &BlockShooter, correct: bool) -> usize {
        g.ctx
            .blocks
            .iter()
            .position(|b| g.round.options()[b.option_index].is_correct == correct)
            .unwrap()
    }

    /// Drop a wrong block onto the cannon so the next tick submits it.
    fn answer_wrong(g: &mut BlockShooter, _now: u64) {
        let i = block_index(g, false);
        g.ctx.blocks[i].entity.position = g.ctx.player.position;
    }

    /// Put a bullet right under a block.
    fn shoot_at(g: &mut BlockShooter, block: usize) {
        let target = g.ctx.blocks[block].entity.position;
        g.ctx.bullets.push(
            MovingEntity::new(
                900 + g.ctx.bullets.len() as u32,
                EntityKind::Bullet,
                Position::new(target.x, target.y + 0.6),
                0.35,
                0.15,
            )
            .with_direction(Direction::Up),
        );
    }

    #[test]
    fn contract_start() {
        test_helpers::contract_start_creates_state(&mut game());
    }

    #[test]
    fn contract_pause() {
        test_helpers::contract_pause_freezes_state(&mut game());
    }

    #[test]
    fn contract_game_over_keeps_one_star() {
        test_helpers::contract_game_over_fires_once(&mut game(), answer_wrong, 1);
    }

    #[test]
    fn contract_try_again() {
        test_helpers::contract_try_again_resets(&mut game(), answer_wrong);
    }

    #[test]
    fn contract_teardown() {
        test_helpers::contract_teardown_stops_updates(&mut game());
    }

    #[test]
    fn shooting_correct_block_advances() {
        let mut g = game();
        g.start(0);
        let serial = g.round.serial();
        let i = block_index(&g, true);
        shoot_at(&mut g, i);
        g.update(16);
        assert_eq!(g.session().question_index, 1);
        assert_eq!(g.session().score, 10);
        assert!(g.round.serial() > serial);
        assert_eq!(g.ctx.blocks.len(), 4);
        assert!(g.ctx.blocks.iter().all(|b| b.serial == g.round.serial()));
    }

    #[test]
    fn wrong_block_deducts_and_replaces_question() {
        let mut g = game();
        g.start(0);
        let i = block_index(&g, true);
        shoot_at(&mut g, i);
        g.update(16);
        let serial = g.round.serial();
        let j = block_index(&g, false);
        shoot_at(&mut g, j);
        let events = g.update(32);
        assert!(events.iter().any(RoundEvent::is_wrong_answer));
        assert_eq!(g.session().score, 8);
        assert_eq!(g.session().lives, 2);
        assert_eq!(g.session().question_index, 1);
        assert!(g.round.serial() > serial);
    }

    #[test]
    fn hit_after_advance_is_discarded() {
        let mut g = game();
        g.start(0);
        let right = block_index(&g, true);
        let wrong = block_index(&g, false);
        // Both land in the same tick; the first advances the question, so the
        // second targets a superseded option set.
        shoot_at(&mut g, right);
        shoot_at(&mut g, wrong);
        g.update(16);
        assert_eq!(g.session().lives, 3);
        assert_eq!(g.session().question_index, 1);
    }

    #[test]
    fn correct_block_reaching_floor_is_a_miss() {
        let mut g = game();
        g.start(0);
        // Out of every lane.
        g.ctx.player.position = Position::new(-10.0, -10.0);
        let mut events = Vec::new();
        for t in 1..=700u64 {
            events.extend(g.update(t * 16));
            if g.session().lives < 3 {
                break;
            }
        }
        assert!(events.iter().any(|e| matches!(e, RoundEvent::Missed { .. })));
        assert_eq!(g.session().lives, 2);
        assert_eq!(g.session().question_index, 0);
    }

    #[test]
    fn fire_command_launches_bullet() {
        let mut g = game();
        g.start(0);
        g.apply_command(Command::Fire);
        g.update(16);
        assert_eq!(g.ctx.bullets.len(), 1);
        g.apply_command(Command::Fire);
        g.update(32);
        assert_eq!(g.ctx.bullets.len(), 1, "cooldown holds the second shot");
    }

    #[test]
    fn cannon_only_moves_sideways() {
        let mut g = game();
        g.start(0);
        let y = g.ctx.player.position.y;
        g.apply_command(Command::Move(Direction::Left));
        run_ticks(&mut g, 0, 3, 16);
        assert!(g.ctx.player.position.x < 5.5);
        g.apply_command(Command::Move(Direction::Up));
        let x = g.ctx.player.position.x;
        run_ticks(&mut g, 48, 3, 16);
        assert_eq!(g.ctx.player.position.x, x);
        assert_eq!(g.ctx.player.position.y, y);
    }

    #[test]
    fn frame_shows_cannon_and_blocks() {
        let mut g = game();
        g.start(0);
        g.update(16);
        let frame = g.frame();
        assert_eq!(frame.entities.len(), 5);
        assert_eq!(frame.options.len(), 4);
        assert!(frame.options.iter().all(|o| o.position.is_some() && !o.breaking));
        assert!(frame.maze.is_some());
    }

    #[test]
    fn full_round_with_one_mistake() {
        let mut cfg = ShooterConfig::default();
        cfg.round = round_config(2, 3);
        let mut g = BlockShooter::with_config(cfg).unwrap();
        g.start(0);
        let plan = [true, false, true];
        for (t, correct) in plan.into_iter().enumerate() {
            let i = block_index(&g, correct);
            shoot_at(&mut g, i);
            g.update((t as u64 + 1) * 16);
        }
        assert_eq!(g.round.phase(), RoundPhase::Completed);
        let outcome = g.round.outcome().unwrap();
        assert_eq!(outcome.score, 18);
        assert_eq!(outcome.stars, 3);
        assert!(outcome.won);
    }
}
