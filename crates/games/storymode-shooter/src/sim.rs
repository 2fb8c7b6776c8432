use rand::Rng;
use serde::{Deserialize, Serialize};

use storymode_core::collision::can_occupy;
use storymode_core::entity::{EntityIds, EntityKind, MovingEntity};
use storymode_core::error::EngineError;
use storymode_core::grid::{Cell, Direction, Maze, Position};
use storymode_core::motion::integrate;
use storymode_core::options::AnswerOption;

use crate::config::ShooterConfig;

/// An answer falling from the top of the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallingBlock {
    pub entity: MovingEntity,
    /// Index into the option set it was spawned from.
    pub option_index: usize,
    /// Option-set serial at spawn time.
    pub serial: u64,
    /// Hit this tick. Skipped by later checks, removed next tick.
    pub breaking: bool,
}

/// Who reached a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSource {
    Bullet,
    Player,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub option_index: usize,
    pub serial: u64,
    pub source: HitSource,
}

/// A block that fell all the way to the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landing {
    pub option_index: usize,
    pub serial: u64,
}

/// Open field, cannon, bullets in flight and falling answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShooterContext {
    pub field: Maze,
    pub player: MovingEntity,
    pub bullets: Vec<MovingEntity>,
    pub blocks: Vec<FallingBlock>,
    /// Active ms of the last shot.
    pub last_shot_ms: Option<u64>,
    ids: EntityIds,
}

impl ShooterContext {
    pub fn new(config: &ShooterConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let field = Maze::open_field(config.field_width, config.field_height)?;
        let mut ids = EntityIds::default();
        let player = MovingEntity::new(
            ids.next_id(),
            EntityKind::Player,
            cannon_home(&field),
            config.player_speed,
            config.player_half_extent,
        );
        Ok(Self {
            field,
            player,
            bullets: Vec::new(),
            blocks: Vec::new(),
            last_shot_ms: None,
            ids,
        })
    }

    /// Back to a clean field with the cannon centred.
    pub fn reset(&mut self) {
        self.player.position = cannon_home(&self.field);
        self.player.direction = Direction::None;
        self.bullets.clear();
        self.blocks.clear();
        self.last_shot_ms = None;
    }

    /// Replace all blocks with one per option, each in its own lane on the top row.
    pub fn spawn_blocks<R: Rng + ?Sized>(
        &mut self,
        options: &mut [AnswerOption],
        serial: u64,
        config: &ShooterConfig,
        rng: &mut R,
    ) {
        self.blocks.clear();
        let lanes = (self.field.width() - 2) as usize;
        let picks = rand::seq::index::sample(rng, lanes, options.len().min(lanes));
        for (option_index, lane) in picks.into_iter().enumerate() {
            let position = Cell::new(lane as i32 + 1, 1).center();
            let entity = MovingEntity::new(
                self.ids.next_id(),
                EntityKind::FallingBlock,
                position,
                config.block_speed,
                config.block_half_extent,
            )
            .with_radius(config.block_half_extent + 0.05)
            .with_direction(Direction::Down);
            options[option_index].position = Some(position);
            self.blocks.push(FallingBlock {
                entity,
                option_index,
                serial,
                breaking: false,
            });
        }
    }

    /// Launch a bullet if the cooldown, the in-flight cap and the muzzle allow it.
    pub fn fire(&mut self, active_ms: u64, config: &ShooterConfig) -> bool {
        let cooled = self
            .last_shot_ms
            .is_none_or(|last| active_ms.saturating_sub(last) >= config.fire_cooldown_ms);
        if !cooled || self.bullets.len() >= config.max_bullets {
            return false;
        }
        let muzzle = self.player.position.step(Direction::Up, 0.6);
        if !can_occupy(&self.field, muzzle, config.bullet_radius) {
            return false;
        }
        let bullet = MovingEntity::new(
            self.ids.next_id(),
            EntityKind::Bullet,
            muzzle,
            config.bullet_speed,
            config.bullet_radius,
        )
        .with_direction(Direction::Up);
        self.bullets.push(bullet);
        self.last_shot_ms = Some(active_ms);
        true
    }

    /// Drop blocks that were hit last tick.
    pub fn clear_broken(&mut self) -> usize {
        let before = self.blocks.len();
        self.blocks.retain(|b| !b.breaking);
        before - self.blocks.len()
    }
}

fn cannon_home(field: &Maze) -> Position {
    Cell::new(field.width() as i32 / 2, field.height() as i32 - 2).center()
}

/// Move cannon, bullets and blocks. Returns blocks that hit the floor.
///
/// Bullets that reach the top wall are removed. Blocks that can fall no
/// further are removed and reported.
pub fn step_motion(ctx: &mut ShooterContext, player_scale: f32) -> Vec<Landing> {
    integrate(&mut ctx.player, &ctx.field, player_scale);

    let field = &ctx.field;
    ctx.bullets.retain_mut(|b| integrate(b, field, 1.0).moved_y);

    let mut landed = Vec::new();
    ctx.blocks.retain_mut(|block| {
        if block.breaking {
            return true;
        }
        if integrate(&mut block.entity, field, 1.0).moved_y {
            true
        } else {
            landed.push(Landing {
                option_index: block.option_index,
                serial: block.serial,
            });
            false
        }
    });
    landed
}

/// Bullet hits first, in bullet order, then cannon contact.
///
/// Each hit marks its block `breaking` so no later check in the same tick can
/// hit it again; other bullets still hit other blocks.
pub fn step_collisions(ctx: &mut ShooterContext) -> Vec<Hit> {
    let mut hits = Vec::new();
    let mut spent = Vec::new();
    for (bi, bullet) in ctx.bullets.iter().enumerate() {
        if let Some(block) = ctx
            .blocks
            .iter_mut()
            .find(|b| !b.breaking && bullet.touches(&b.entity))
        {
            block.breaking = true;
            spent.push(bi);
            hits.push(Hit {
                option_index: block.option_index,
                serial: block.serial,
                source: HitSource::Bullet,
            });
        }
    }
    for bi in spent.into_iter().rev() {
        ctx.bullets.remove(bi);
    }

    let player = &ctx.player;
    for block in ctx
        .blocks
        .iter_mut()
        .filter(|b| !b.breaking && player.touches(&b.entity))
    {
        block.breaking = true;
        hits.push(Hit {
            option_index: block.option_index,
            serial: block.serial,
            source: HitSource::Player,
        });
    }
    hits
}

/// Mirror block positions into the option set for rendering.
pub fn sync_option_positions(ctx: &ShooterContext, options: &mut [AnswerOption], serial: u64) {
    for option in options.iter_mut() {
        option.position = None;
    }
    for block in ctx.blocks.iter().filter(|b| b.serial == serial) {
        if let Some(option) = options.get_mut(block.option_index) {
            option.position = Some(block.entity.position);
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn setup() -> (ShooterContext, Vec<AnswerOption>, ShooterConfig, StdRng) {
        let cfg = ShooterConfig::default();
        let mut ctx = ShooterContext::new(&cfg).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut options: Vec<AnswerOption> = (0..4)
            .map(|i| AnswerOption::new(10 + i, i == 2))
            .collect();
        ctx.spawn_blocks(&mut options, 1, &cfg, &mut rng);
        (ctx, options, cfg, rng)
    }

    fn bullet_under(ctx: &mut ShooterContext, block: usize, cfg: &ShooterConfig) {
        let target = ctx.blocks[block].entity.position;
        let bullet = MovingEntity::new(
            ctx.ids.next_id(),
            EntityKind::Bullet,
            Position::new(target.x, target.y + 0.5),
            cfg.bullet_speed,
            cfg.bullet_radius,
        )
        .with_direction(Direction::Up);
        ctx.bullets.push(bullet);
    }

    #[test]
    fn blocks_get_distinct_lanes() {
        let (ctx, options, _, _) = setup();
        assert_eq!(ctx.blocks.len(), 4);
        let mut lanes: Vec<i32> = ctx
            .blocks
            .iter()
            .map(|b| b.entity.position.cell().x)
            .collect();
        lanes.sort_unstable();
        lanes.dedup();
        assert_eq!(lanes.len(), 4);
        assert!(options.iter().all(|o| o.position.is_some()));
    }

    #[test]
    fn cannon_sits_on_bottom_row() {
        let (ctx, ..) = setup();
        assert_eq!(ctx.player.position, Cell::new(5, 13).center());
    }

    #[test]
    fn fire_respects_cooldown_and_cap() {
        let (mut ctx, _, cfg, _) = setup();
        assert!(ctx.fire(0, &cfg));
        assert!(!ctx.fire(100, &cfg));
        assert!(ctx.fire(250, &cfg));
        for i in 0..10 {
            ctx.fire(500 + i * 250, &cfg);
        }
        assert_eq!(ctx.bullets.len(), cfg.max_bullets);
    }

    #[test]
    fn bullets_vanish_at_top_wall() {
        let (mut ctx, _, cfg, _) = setup();
        ctx.blocks.clear();
        ctx.fire(0, &cfg);
        for _ in 0..60 {
            step_motion(&mut ctx, 1.0);
        }
        assert!(ctx.bullets.is_empty());
    }

    #[test]
    fn blocks_land_on_floor() {
        let (mut ctx, ..) = setup();
        // Move the cannon out of every lane's way.
        ctx.player.position = Position::new(-10.0, -10.0);
        let mut landed = Vec::new();
        for _ in 0..1000 {
            landed.extend(step_motion(&mut ctx, 1.0));
            for b in &ctx.blocks {
                assert!(can_occupy(&ctx.field, b.entity.position, b.entity.half_extent));
            }
        }
        assert_eq!(landed.len(), 4);
        assert!(ctx.blocks.is_empty());
    }

    #[test]
    fn hit_block_breaks_for_one_tick() {
        let (mut ctx, _, cfg, _) = setup();
        bullet_under(&mut ctx, 0, &cfg);
        let hits = step_collisions(&mut ctx);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, HitSource::Bullet);
        assert_eq!(hits[0].option_index, ctx.blocks[0].option_index);
        assert!(ctx.blocks[0].breaking);
        assert!(ctx.bullets.is_empty());
        assert_eq!(ctx.clear_broken(), 1);
        assert_eq!(ctx.blocks.len(), 3);
    }

    #[test]
    fn second_bullet_passes_breaking_block_but_hits_another() {
        let (mut ctx, _, cfg, _) = setup();
        bullet_under(&mut ctx, 0, &cfg);
        bullet_under(&mut ctx, 0, &cfg);
        bullet_under(&mut ctx, 1, &cfg);
        let hits = step_collisions(&mut ctx);
        assert_eq!(hits.len(), 2);
        assert_ne!(hits[0].option_index, hits[1].option_index);
        // The duplicate bullet on block 0 is still flying.
        assert_eq!(ctx.bullets.len(), 1);
    }

    #[test]
    fn cannon_contact_counts_as_hit() {
        let (mut ctx, ..) = setup();
        ctx.blocks[2].entity.position = ctx.player.position;
        let hits = step_collisions(&mut ctx);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source, HitSource::Player);
    }

    #[test]
    fn sync_tracks_only_current_serial() {
        let (mut ctx, mut options, cfg, mut rng) = setup();
        step_motion(&mut ctx, 1.0);
        sync_option_positions(&ctx, &mut options, 1);
        let first = ctx.blocks.iter().find(|b| b.option_index == 0).unwrap();
        assert_eq!(options[0].position, Some(first.entity.position));

        ctx.spawn_blocks(&mut options, 2, &cfg, &mut rng);
        sync_option_positions(&ctx, &mut options, 1);
        assert!(options.iter().all(|o| o.position.is_none()));
    }

    #[test]
    fn no_shot_with_muzzle_in_wall() {
        let (mut ctx, _, cfg, _) = setup();
        ctx.player.position = Position::new(5.5, 1.45);
        assert!(!ctx.fire(0, &cfg));
        assert!(ctx.bullets.is_empty());
        assert_eq!(ctx.last_shot_ms, None);
    }

    fn assert_contained(ctx: &ShooterContext) -> Result<(), TestCaseError> {
        let p = &ctx.player;
        prop_assert!(can_occupy(&ctx.field, p.position, p.half_extent));
        for b in &ctx.bullets {
            prop_assert!(can_occupy(&ctx.field, b.position, b.half_extent));
        }
        for b in &ctx.blocks {
            prop_assert!(can_occupy(&ctx.field, b.entity.position, b.entity.half_extent));
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn every_entity_stays_inside_the_field(
            seed in any::<u64>(),
            script in prop::collection::vec(
                (prop::sample::select(Direction::CARDINAL.to_vec()), any::<bool>(), 1usize..25),
                1..40,
            ),
            slowed in any::<bool>(),
        ) {
            let (mut ctx, mut options, cfg, _) = setup();
            let mut rng = StdRng::seed_from_u64(seed);
            let scale = if slowed { 0.5 } else { 1.0 };
            let mut active_ms = 0u64;
            for (direction, fire, ticks) in script {
                ctx.player.direction = direction;
                for _ in 0..ticks {
                    active_ms += 16;
                    if fire {
                        ctx.fire(active_ms, &cfg);
                    }
                    ctx.clear_broken();
                    step_motion(&mut ctx, scale);
                    step_collisions(&mut ctx);
                    if ctx.blocks.is_empty() {
                        ctx.spawn_blocks(&mut options, 1, &cfg, &mut rng);
                    }
                    assert_contained(&ctx)?;
                }
            }
        }
    }
}
