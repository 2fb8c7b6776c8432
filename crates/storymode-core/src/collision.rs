use crate::grid::{Cell, Maze, Position};

/// Whether a square of half-size `half_extent` centered at `position` fits.
///
/// Samples the four bounding-box corners, floors each to a cell and rejects
/// the position if any corner lands on a wall or outside the grid. Every
/// entity kind goes through this one test with its own half-extent.
pub fn can_occupy(maze: &Maze, position: Position, half_extent: f32) -> bool {
    if !position.x.is_finite() || !position.y.is_finite() {
        return false;
    }
    let corners = [
        (position.x - half_extent, position.y - half_extent),
        (position.x + half_extent, position.y - half_extent),
        (position.x - half_extent, position.y + half_extent),
        (position.x + half_extent, position.y + half_extent),
    ];
    corners.iter().all(|&(cx, cy)| {
        let cell = Cell::new(cx.floor() as i32, cy.floor() as i32);
        maze.is_open(cell)
    })
}

/// Circular proximity test between two entity centers.
pub fn within(a: Position, b: Position, distance: f32) -> bool {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy < distance * distance
}
