//! Collision Resolver
//!
//! Axis-aligned box collision with discrete per-frame correction. Each frame
//! runs the passes in a fixed order over the world's current tag buckets:
//!
//! 1. player vs tiles (push-out, ground flag, tile reactions, level doors)
//! 2. enemy vs tiles (push-out and ground flag only; doors are ignored)
//! 3. enemy vs enemy (equal separation)
//! 4. player vs enemy (bounce apart)
//! 5. weapons vs tiles and vs their targets (damage, knockback, defeat)
//! 6. player vs collectables
//! 7. score drain (at most one conversion per call)
//!
//! No pass removes entities from a bucket. Destroyed entities stay queryable
//! until the next `World::sync()`, so every pass checks `is_alive` first.
//!
//! Overlaps are resolved on the axis with the smaller overlap only. Large
//! simultaneous overlaps can make a body "pop" instead of sliding; that is
//! an accepted trade-off of discrete correction.

mod bodies;
mod combat;
mod pickups;
mod tiles;

use rand::RngCore;

use super::event::Events;
use super::spawn::Spawner;
use super::world::World;
use crate::config::SimConfig;

pub use bodies::{resolve_enemy_enemy, resolve_player_enemy};
pub use combat::{resolve_weapons, weapon_target};
pub use pickups::{drain_score, resolve_pickups, Score};
pub use tiles::{resolve_enemy_tiles, resolve_player_tiles, strike_tile, TileReaction};

/// Everything outside the world that the resolver reads or writes.
pub struct CollisionContext<'a> {
    pub config: &'a SimConfig,
    /// Shared score counter (pickups add, drain converts to healing)
    pub score: &'a mut Score,
    pub events: &'a mut Events,
    pub spawner: &'a mut dyn Spawner,
    /// Source for critical knockback rolls
    pub rng: &'a mut dyn RngCore,
}

/// Run every collision pass once, in order.
pub fn resolve_collisions(world: &mut World, ctx: &mut CollisionContext) {
    resolve_player_tiles(world, ctx);
    resolve_enemy_tiles(world, ctx);
    resolve_enemy_enemy(world);
    resolve_player_enemy(world, ctx.config);
    resolve_weapons(world, ctx);
    resolve_pickups(world, ctx);
    drain_score(world, ctx);
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for the pass tests.

    use std::rc::Rc;

    use macroquad::math::Vec2;
    use rand::rngs::mock::StepRng;

    use super::*;
    use crate::assets::{AnimationClip, ClipLibrary};
    use crate::game::spawn::StandardSpawner;

    pub const ALL_CLIPS: &[&str] = &[
        "sword",
        "enemy_sword",
        "player_bullet",
        "enemy_bullet",
        "fragment",
        "grave",
        "item_heart",
        "item_big_heart",
        "item_coin",
        "item_gem",
        "item_crown",
    ];

    /// Owns everything a `CollisionContext` borrows.
    pub struct Harness {
        pub config: Rc<SimConfig>,
        pub score: Score,
        pub events: Events,
        pub spawner: StandardSpawner,
        pub rng: StepRng,
    }

    impl Harness {
        /// Knockback rolls never fire.
        pub fn new() -> Self {
            Self::with_config(SimConfig::default())
        }

        pub fn with_config(config: SimConfig) -> Self {
            let config = Rc::new(config);
            let library = ClipLibrary::from_clips(
                ALL_CLIPS.iter().map(|name| AnimationClip::new(*name, 1, 10.0)),
            );
            Self {
                spawner: StandardSpawner::new(config.clone(), Rc::new(library)),
                config,
                score: Score::default(),
                events: Events::new(),
                rng: StepRng::new(u64::MAX, 0),
            }
        }

        /// Knockback rolls always fire.
        pub fn always_knockback(mut self) -> Self {
            self.rng = StepRng::new(0, 0);
            self
        }

        pub fn ctx(&mut self) -> CollisionContext<'_> {
            CollisionContext {
                config: &self.config,
                score: &mut self.score,
                events: &mut self.events,
                spawner: &mut self.spawner,
                rng: &mut self.rng,
            }
        }
    }

    pub fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }
}
