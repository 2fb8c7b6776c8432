use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::entity::MovingEntity;
use crate::grid::{Direction, Maze, Position};
use crate::motion::{can_advance, integrate};

/// Default per-tick probability of re-aiming at the target.
pub const DEFAULT_RETARGET_CHANCE: f32 = 0.05;

/// What the controller did on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Steer {
    /// Kept going in the current direction.
    Continued,
    /// Re-aimed at the target and moved that way.
    Retargeted,
    /// Current direction was blocked; took the best open side.
    Detoured,
    /// Boxed in on all sides; flipped direction without moving.
    Reversed,
}

/// Greedy pursuit for adversaries. No search, constant work per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChaseController {
    pub retarget_chance: f32,
}

impl Default for ChaseController {
    fn default() -> Self {
        Self {
            retarget_chance: DEFAULT_RETARGET_CHANCE,
        }
    }
}

impl ChaseController {
    pub fn new(retarget_chance: f32) -> Self {
        Self { retarget_chance }
    }

    /// Retarget probability clamped to `[0, 1]`; NaN and infinities count as 0.
    pub fn chance(&self) -> f64 {
        if self.retarget_chance.is_finite() {
            f64::from(self.retarget_chance.clamp(0.0, 1.0))
        } else {
            0.0
        }
    }

    /// Advance `chaser` one tick toward `target`.
    pub fn steer<R: Rng + ?Sized>(
        &self,
        chaser: &mut MovingEntity,
        target: Position,
        maze: &Maze,
        rng: &mut R,
    ) -> Steer {
        let mut retargeted = false;
        if rng.random_bool(self.chance()) {
            let aim = toward(chaser.position, target);
            if aim != Direction::None {
                chaser.direction = aim;
                retargeted = true;
            }
        }

        if chaser.direction != Direction::None && can_advance(chaser, maze) {
            integrate(chaser, maze, 1.0);
            return if retargeted {
                Steer::Retargeted
            } else {
                Steer::Continued
            };
        }

        let feasible: SmallVec<[Direction; 4]> = Direction::CARDINAL
            .iter()
            .copied()
            .filter(|&d| {
                let probe = MovingEntity {
                    direction: d,
                    ..chaser.clone()
                };
                can_advance(&probe, maze)
            })
            .collect();

        let best = feasible.iter().copied().min_by(|&a, &b| {
            let da = chaser.position.step(a, chaser.speed).manhattan(target);
            let db = chaser.position.step(b, chaser.speed).manhattan(target);
            da.total_cmp(&db)
        });

        match best {
            Some(dir) => {
                chaser.direction = dir;
                integrate(chaser, maze, 1.0);
                Steer::Detoured
            },
            None => {
                chaser.direction = chaser.direction.reversed();
                tracing::trace!(id = chaser.id, "Chaser boxed in, reversing");
                Steer::Reversed
            },
        }
    }
}

/// Direction along the axis with the larger gap to `target`; x wins ties.
pub fn toward(from: Position, target: Position) -> Direction {
    let dx = target.x - from.x;
    let dy = target.y - from.y;
    if dx == 0.0 && dy == 0.0 {
        return Direction::None;
    }
    if dx.abs() >= dy.abs() {
        if dx > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}
