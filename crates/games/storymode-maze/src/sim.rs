use rand::Rng;
use serde::{Deserialize, Serialize};

use storymode_core::chase::{ChaseController, Steer};
use storymode_core::collision::{can_occupy, within};
use storymode_core::entity::{EntityId, EntityIds, EntityKind, MovingEntity};
use storymode_core::error::EngineError;
use storymode_core::grid::{Cell, Direction, Maze};
use storymode_core::motion::integrate;
use storymode_core::options::AnswerOption;

use crate::config::MazeConfig;

/// How far ahead a requested turn must be clear before it is taken.
const TURN_LOOKAHEAD: f32 = 0.5;

/// Everything that moves, plus the maze it moves in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationContext {
    pub maze: Maze,
    pub player: MovingEntity,
    /// Direction the player last asked for. Applied as soon as it fits.
    pub desired: Direction,
    pub ghosts: Vec<MovingEntity>,
    pub ghost_spawns: Vec<Cell>,
}

/// First thing the player touched this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Ghost(EntityId),
    /// Index into the current option set.
    Pellet(usize),
}

impl SimulationContext {
    pub fn new(config: &MazeConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let maze = Maze::for_level(config.round.level);
        let mut ids = EntityIds::default();
        let player = MovingEntity::new(
            ids.next_id(),
            EntityKind::Player,
            maze.spawn_cell().center(),
            config.player_speed,
            config.player_half_extent,
        );
        let ghost_spawns = maze.corner_spawns(config.ghost_count());
        let ghosts = ghost_spawns
            .iter()
            .map(|c| {
                MovingEntity::new(
                    ids.next_id(),
                    EntityKind::Ghost,
                    c.center(),
                    config.ghost_speed,
                    config.ghost_half_extent,
                )
            })
            .collect();
        Ok(Self {
            maze,
            player,
            desired: Direction::None,
            ghosts,
            ghost_spawns,
        })
    }

    /// Put everyone back at their spawn cells, standing still.
    pub fn reset_positions(&mut self) {
        self.player.position = self.maze.spawn_cell().center();
        self.player.direction = Direction::None;
        self.desired = Direction::None;
        for (ghost, spawn) in self.ghosts.iter_mut().zip(&self.ghost_spawns) {
            ghost.position = spawn.center();
            ghost.direction = Direction::None;
        }
    }
}

/// Move the player, turning to the desired direction once it is open.
pub fn step_motion(ctx: &mut SimulationContext, speed_scale: f32) {
    if ctx.desired != Direction::None && ctx.desired != ctx.player.direction {
        let ahead = ctx.player.position.step(ctx.desired, TURN_LOOKAHEAD);
        if can_occupy(&ctx.maze, ahead, ctx.player.half_extent) {
            ctx.player.direction = ctx.desired;
        }
    }
    integrate(&mut ctx.player, &ctx.maze, speed_scale);
}

/// Steer every ghost toward the player. Returns how many had to reverse.
pub fn step_ai<R: Rng + ?Sized>(
    ctx: &mut SimulationContext,
    chase: &ChaseController,
    rng: &mut R,
) -> usize {
    let target = ctx.player.position;
    let mut reversed = 0;
    for ghost in &mut ctx.ghosts {
        if chase.steer(ghost, target, &ctx.maze, rng) == Steer::Reversed {
            reversed += 1;
        }
    }
    reversed
}

/// Ghost contact wins over pellet contact.
pub fn step_collisions(
    ctx: &SimulationContext,
    options: &[AnswerOption],
    config: &MazeConfig,
) -> Option<Contact> {
    let player = ctx.player.position;
    if let Some(ghost) = ctx
        .ghosts
        .iter()
        .find(|g| within(player, g.position, config.ghost_hit_distance))
    {
        return Some(Contact::Ghost(ghost.id));
    }
    options
        .iter()
        .position(|o| {
            o.position
                .is_some_and(|p| within(player, p, config.pellet_hit_distance))
        })
        .map(Contact::Pellet)
}
