use serde::{Deserialize, Serialize};

use crate::grid::{Direction, Position};

/// Unique identifier for an entity within one game instance.
pub type EntityId = u32;

/// What a moving entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Ghost,
    Bullet,
    FallingBlock,
}

/// An entity the motion integrator advances every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingEntity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Position,
    pub direction: Direction,
    /// Grid units per tick.
    pub speed: f32,
    /// Half side of the wall-collision box.
    pub half_extent: f32,
    /// Radius for entity-entity proximity.
    pub radius: f32,
}

impl MovingEntity {
    pub fn new(
        id: EntityId,
        kind: EntityKind,
        position: Position,
        speed: f32,
        half_extent: f32,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            direction: Direction::None,
            speed,
            half_extent,
            radius: half_extent,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Whether the two entities' circles overlap.
    pub fn touches(&self, other: &MovingEntity) -> bool {
        crate::collision::within(self.position, other.position, self.radius + other.radius)
    }
}

/// Allocates entity ids in increasing order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityIds {
    next: EntityId,
}

impl EntityIds {
    pub fn next_id(&mut self) -> EntityId {
        self.next += 1;
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential() {
        let mut ids = EntityIds::default();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
    }

    #[test]
    fn touches_uses_sum_of_radii() {
        let a = MovingEntity::new(1, EntityKind::Player, Position::new(1.0, 1.0), 0.1, 0.3);
        let b = MovingEntity::new(2, EntityKind::Ghost, Position::new(1.5, 1.0), 0.1, 0.3);
        assert!(a.touches(&b));
        let far = MovingEntity::new(3, EntityKind::Ghost, Position::new(2.0, 1.0), 0.1, 0.3);
        assert!(!a.touches(&far));
    }
}
