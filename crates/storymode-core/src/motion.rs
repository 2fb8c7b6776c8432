use serde::{Deserialize, Serialize};

use crate::collision::can_occupy;
use crate::entity::MovingEntity;
use crate::grid::{Maze, Position};

/// Speed multiplier while the slowed penalty is active.
pub const SLOWED_SCALE: f32 = 0.5;

/// Result of one integrator step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub position: Position,
    pub moved_x: bool,
    pub moved_y: bool,
    /// An axis with non-zero velocity was rejected by the wall test.
    pub blocked: bool,
}

/// Move from `position` by `(vx, vy)`, one axis at a time.
///
/// The horizontal attempt runs first; the vertical attempt starts from
/// wherever the horizontal one left the entity. A rejected axis is dropped
/// without cancelling the other, so diagonal motion slides along walls.
pub fn slide(maze: &Maze, position: Position, velocity: (f32, f32), half_extent: f32) -> Slide {
    let (vx, vy) = velocity;
    let mut pos = position;
    let mut moved_x = false;
    let mut moved_y = false;
    let mut blocked = false;

    if vx != 0.0 {
        let candidate = Position::new(pos.x + vx, pos.y);
        if can_occupy(maze, candidate, half_extent) {
            pos = candidate;
            moved_x = true;
        } else {
            blocked = true;
        }
    }

    if vy != 0.0 {
        let candidate = Position::new(pos.x, pos.y + vy);
        if can_occupy(maze, candidate, half_extent) {
            pos = candidate;
            moved_y = true;
        } else {
            blocked = true;
        }
    }

    Slide {
        position: pos,
        moved_x,
        moved_y,
        blocked,
    }
}

/// Advance `entity` along its direction at `speed * speed_scale`.
pub fn integrate(entity: &mut MovingEntity, maze: &Maze, speed_scale: f32) -> Slide {
    let (dx, dy) = entity.direction.delta();
    let step = entity.speed * speed_scale;
    let result = slide(
        maze,
        entity.position,
        (dx * step, dy * step),
        entity.half_extent,
    );
    entity.position = result.position;
    result
}

/// Whether `entity` could take one full step in its current direction.
pub fn can_advance(entity: &MovingEntity, maze: &Maze) -> bool {
    let next = entity.position.step(entity.direction, entity.speed);
    can_occupy(maze, next, entity.half_extent)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::entity::EntityKind;
    use crate::grid::{Cell, Direction};

    fn maze() -> Maze {
        Maze::generate(1, 21, 13).unwrap()
    }

    #[test]
    fn moves_along_open_corridor() {
        let m = maze();
        let mut e = MovingEntity::new(1, EntityKind::Player, Cell::new(1, 1).center(), 0.1, 0.4)
            .with_direction(Direction::Right);
        let out = integrate(&mut e, &m, 1.0);
        assert!(out.moved_x);
        assert!(!out.blocked);
        assert!((e.position.x - 1.6).abs() < 1e-5);
    }

    #[test]
    fn stops_at_border() {
        let m = maze();
        let mut e = MovingEntity::new(1, EntityKind::Player, Cell::new(1, 1).center(), 0.2, 0.4)
            .with_direction(Direction::Up);
        let out = integrate(&mut e, &m, 1.0);
        assert!(out.blocked);
        assert!(!out.moved_y);
        assert_eq!(e.position, Cell::new(1, 1).center());
    }

    #[test]
    fn slides_along_wall_when_vertical_blocked() {
        let m = maze();
        // Row 1 is open left-right; moving up runs into the top border.
        let start = Cell::new(3, 1).center();
        let out = slide(&m, start, (0.2, -0.2), 0.4);
        assert!(out.moved_x, "horizontal displacement must apply");
        assert!(!out.moved_y, "vertical displacement must be rejected");
        assert!(out.blocked);
        assert!((out.position.x - (start.x + 0.2)).abs() < 1e-5);
        assert!((out.position.y - start.y).abs() < 1e-5);
    }

    #[test]
    fn slows_with_scale() {
        let m = maze();
        let mut e = MovingEntity::new(1, EntityKind::Player, Cell::new(1, 1).center(), 0.2, 0.4)
            .with_direction(Direction::Right);
        integrate(&mut e, &m, SLOWED_SCALE);
        assert!((e.position.x - 1.6).abs() < 1e-5);
    }

    #[test]
    fn standing_still_never_blocks() {
        let m = maze();
        let start = Cell::new(1, 1).center();
        let out = slide(&m, start, (0.0, 0.0), 0.4);
        assert_eq!(out.position, start);
        assert!(!out.blocked);
    }

    #[test]
    fn can_advance_matches_integrate() {
        let m = maze();
        let e = MovingEntity::new(1, EntityKind::Ghost, Cell::new(1, 1).center(), 0.2, 0.4)
            .with_direction(Direction::Left);
        assert!(!can_advance(&e, &m));
        let e = e.with_direction(Direction::Down);
        assert!(can_advance(&e, &m));
    }

    proptest! {
        #[test]
        fn entities_never_end_inside_walls(
            level in 1u8..5,
            moves in proptest::collection::vec((0usize..5, 1usize..12), 1..40),
            half in 0.2f32..0.45,
            speed in 0.05f32..0.3,
        ) {
            let m = Maze::for_level(level);
            let mut e = MovingEntity::new(1, EntityKind::Player, m.spawn_cell().center(), speed, half);
            let dirs = [
                Direction::Left,
                Direction::Right,
                Direction::Up,
                Direction::Down,
                Direction::None,
            ];
            for (dir_idx, ticks) in moves {
                e.direction = dirs[dir_idx];
                for _ in 0..ticks {
                    integrate(&mut e, &m, 1.0);
                    prop_assert!(
                        can_occupy(&m, e.position, e.half_extent),
                        "entity at {:?} overlaps a wall",
                        e.position
                    );
                }
            }
        }
    }
}
