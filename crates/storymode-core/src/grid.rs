use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Maze dimensions per level tier. Levels past the last tier reuse it.
pub const LEVEL_SIZES: [(u32, u32); 4] = [(21, 13), (25, 15), (29, 17), (31, 19)];

/// Smallest maze that still has an interior.
pub const MIN_MAZE_SIDE: u32 = 5;

/// Largest side accepted for generated mazes and open fields.
pub const MAX_MAZE_SIDE: u32 = 512;

/// Grid cell contents. Immutable once the maze is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridCell {
    Wall,
    Path,
    PathWithPellet,
}

impl GridCell {
    pub fn is_wall(self) -> bool {
        self == GridCell::Wall
    }
}

/// Fractional position in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The cell containing this position.
    pub fn cell(self) -> Cell {
        Cell::new(self.x.floor() as i32, self.y.floor() as i32)
    }

    pub fn distance(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn manhattan(self, other: Position) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Offset by `direction` scaled by `amount`.
    pub fn step(self, direction: Direction, amount: f32) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx * amount, self.y + dy * amount)
    }
}

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn center(self) -> Position {
        Position::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }

    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn neighbor(self, direction: Direction) -> Cell {
        let (dx, dy) = direction.delta();
        Cell::new(self.x + dx as i32, self.y + dy as i32)
    }
}

/// Movement direction on the grid. `None` means standing still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    #[default]
    None,
}

impl Direction {
    /// Cardinal directions in the order used for tie-breaking.
    pub const CARDINAL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit vector; y grows downward.
    pub fn delta(self) -> (f32, f32) {
        match self {
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::None => (0.0, 0.0),
        }
    }

    /// Negate both components.
    pub fn reversed(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::None => Direction::None,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// A bordered rectangular maze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maze {
    width: u32,
    height: u32,
    level: u8,
    /// Row-major (y * width + x).
    cells: Vec<GridCell>,
}

/// Dimensions for a difficulty level, capped at the last tier.
pub fn size_for_level(level: u8) -> (u32, u32) {
    let tier = (level.max(1) as usize - 1).min(LEVEL_SIZES.len() - 1);
    LEVEL_SIZES[tier]
}

impl Maze {
    /// Generate the maze for `level` at the tier-table size.
    pub fn for_level(level: u8) -> Maze {
        let (width, height) = size_for_level(level);
        Self::build(level.max(1), width, height)
    }

    /// Generate a maze deterministically from `(level, width, height)`.
    ///
    /// No reachability pass is run: the positional rule alone decides walls.
    pub fn generate(level: u8, width: u32, height: u32) -> Result<Maze, EngineError> {
        check_size(width, height)?;
        Ok(Self::build(level.max(1), width, height))
    }

    /// Border walls only, no interior obstacles. Used by open-field variants.
    pub fn open_field(width: u32, height: u32) -> Result<Maze, EngineError> {
        check_size(width, height)?;
        let mut cells = vec![GridCell::Path; (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    cells[(y * width + x) as usize] = GridCell::Wall;
                }
            }
        }
        Ok(Maze {
            width,
            height,
            level: 1,
            cells,
        })
    }

    fn build(level: u8, width: u32, height: u32) -> Maze {
        let mut cells = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(interior_rule(level, width, height, x, y));
            }
        }
        let mut maze = Maze {
            width,
            height,
            level,
            cells,
        };
        // The spawn corner must stay walkable whatever the rule says.
        let spawn = maze.spawn_cell();
        maze.set(spawn, GridCell::Path);
        maze
    }

    fn set(&mut self, cell: Cell, value: GridCell) {
        if let Some(i) = self.index(cell.x, cell.y) {
            self.cells[i] = value;
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Cell contents, or `None` outside the grid.
    pub fn cell(&self, x: i32, y: i32) -> Option<GridCell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Out-of-bounds counts as wall.
    pub fn is_wall(&self, cell: Cell) -> bool {
        self.cell(cell.x, cell.y).is_none_or(GridCell::is_wall)
    }

    pub fn is_open(&self, cell: Cell) -> bool {
        !self.is_wall(cell)
    }

    /// All walkable cells in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| Cell::new(x, y)))
            .filter(|&c| self.is_open(c))
    }

    /// Where the player starts.
    pub fn spawn_cell(&self) -> Cell {
        Cell::new(1, 1)
    }

    /// Closest open cell by Chebyshev ring, scanning row-major inside each ring.
    pub fn nearest_open(&self, from: Cell) -> Option<Cell> {
        if self.is_open(from) {
            return Some(from);
        }
        let max_radius = self.width.max(self.height) as i32;
        for r in 1..=max_radius {
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx.abs() != r && dy.abs() != r {
                        continue;
                    }
                    let c = Cell::new(from.x + dx, from.y + dy);
                    if self.is_open(c) {
                        return Some(c);
                    }
                }
            }
        }
        None
    }

    /// Adversary spawn cells: far corner first, then the two side corners.
    pub fn corner_spawns(&self, count: usize) -> Vec<Cell> {
        let w = self.width as i32;
        let h = self.height as i32;
        let corners = [
            Cell::new(w - 2, h - 2),
            Cell::new(w - 2, 1),
            Cell::new(1, h - 2),
        ];
        corners
            .iter()
            .cycle()
            .take(count)
            .filter_map(|&c| self.nearest_open(c))
            .collect()
    }
}

fn check_size(width: u32, height: u32) -> Result<(), EngineError> {
    if width < MIN_MAZE_SIDE || height < MIN_MAZE_SIDE {
        return Err(EngineError::MazeTooSmall { width, height });
    }
    if width > MAX_MAZE_SIDE || height > MAX_MAZE_SIDE {
        return Err(EngineError::MazeTooLarge { width, height });
    }
    Ok(())
}

fn interior_rule(level: u8, width: u32, height: u32, x: u32, y: u32) -> GridCell {
    if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
        return GridCell::Wall;
    }
    let lvl = level as u32;
    let pillar = x % 2 == 0 && y % 2 == 0;
    let horizontal_blocker = lvl >= 2
        && x % 4 == 2
        && y % 2 == 1
        && y != 1
        && y != height - 2
        && (x / 2 + y / 2 + lvl) % 3 == 0;
    let vertical_blocker = lvl >= 3
        && x % 4 == 3
        && y % 2 == 0
        && x != 1
        && x != width - 2
        && (x / 2 + y / 2 + lvl) % 4 == 0;
    if pillar || horizontal_blocker || vertical_blocker {
        GridCell::Wall
    } else if x % 2 == 1 && y % 2 == 1 {
        GridCell::PathWithPellet
    } else {
        GridCell::Path
    }
}
