use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::{Cell, Direction, Maze};
use crate::options::AnswerOption;

/// Spacing rules for dropping options into maze cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementRules {
    /// Minimum Manhattan distance (cells) from other options, spawn and player.
    pub min_distance: u32,
    /// Random draws per option before falling back.
    pub max_attempts: u32,
}

impl Default for PlacementRules {
    fn default() -> Self {
        Self {
            min_distance: 3,
            max_attempts: 100,
        }
    }
}

/// Assign each option an open cell, returning the cells used.
///
/// A draw is rejected when it is closer than `min_distance` to the spawn cell,
/// the player's cell, or an option already placed. When the draws run out the
/// option goes to a free cell next to spawn, then to the free open cell
/// nearest spawn, and only when none is left to spawn itself. Fallback cells
/// are never the player's cell or one already taken.
pub fn place_options<R: Rng + ?Sized>(
    maze: &Maze,
    options: &mut [AnswerOption],
    player: Cell,
    rules: PlacementRules,
    rng: &mut R,
) -> Vec<Cell> {
    let open: Vec<Cell> = maze.open_cells().collect();
    let spawn = maze.spawn_cell();
    let mut taken: Vec<Cell> = Vec::with_capacity(options.len());

    for option in options.iter_mut() {
        let mut chosen = None;
        if !open.is_empty() {
            for _ in 0..rules.max_attempts {
                let candidate = open[rng.random_range(0..open.len())];
                let clear = candidate.manhattan(spawn) >= rules.min_distance
                    && candidate.manhattan(player) >= rules.min_distance
                    && taken
                        .iter()
                        .all(|t| candidate.manhattan(*t) >= rules.min_distance);
                if clear {
                    chosen = Some(candidate);
                    break;
                }
            }
        }

        let cell = match chosen {
            Some(c) => c,
            None => {
                let fallback = fallback_cell(maze, &open, player, &taken);
                tracing::warn!(
                    value = option.value,
                    x = fallback.x,
                    y = fallback.y,
                    "Option placement fell back near spawn"
                );
                fallback
            },
        };
        option.position = Some(cell.center());
        taken.push(cell);
    }
    taken
}

/// First free open cell beside spawn, else the nearest free open cell, else spawn.
fn fallback_cell(maze: &Maze, open: &[Cell], player: Cell, taken: &[Cell]) -> Cell {
    let spawn = maze.spawn_cell();
    let free = |c: &Cell| *c != spawn && *c != player && !taken.contains(c);
    Direction::CARDINAL
        .iter()
        .map(|&d| spawn.neighbor(d))
        .find(|c| maze.is_open(*c) && free(c))
        .or_else(|| {
            open.iter()
                .copied()
                .filter(|c| free(c))
                .min_by_key(|c| c.manhattan(spawn))
        })
        .unwrap_or(spawn)
}
