//! Passes 6 and 7: pickups and the score-to-health conversion.

use super::CollisionContext;
use crate::game::components::PickupEffect;
use crate::game::entity::Tag;
use crate::game::event::ItemCollectedEvent;
use crate::game::geometry::intersects;
use crate::game::world::World;

/// Session score, shared between pickups and the drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub value: i32,
}

impl Score {
    pub fn new(value: i32) -> Self {
        Self { value }
    }

    pub fn add(&mut self, points: i32) {
        self.value = self.value.saturating_add(points);
    }
}

/// Pass 6: players collect overlapping pickups. The pickup is destroyed on
/// contact even if the effect did nothing (healing at full health).
pub fn resolve_pickups(world: &mut World, ctx: &mut CollisionContext) {
    for i in 0..world.count(Tag::Player) {
        let player = world.query(Tag::Player)[i];
        if !world.is_alive(player) {
            continue;
        }
        for j in 0..world.count(Tag::Collectable) {
            let item = world.query(Tag::Collectable)[j];
            if !world.is_alive(item) {
                continue;
            }
            let (Some(player_rect), Some(item_rect)) = (world.world_rect(player), world.world_rect(item)) else {
                continue;
            };
            if !intersects(player_rect, item_rect) {
                continue;
            }
            let Some(kind) = world.collectables.get(item).map(|c| c.kind) else {
                continue;
            };

            match kind.effect() {
                PickupEffect::Heal(amount) => {
                    if let Some(health) = world.health.get_mut(player) {
                        health.heal(amount);
                    }
                }
                PickupEffect::Score(points) => ctx.score.add(points),
            }
            world.destroy(item);
            ctx.events.item_collected.send(ItemCollectedEvent {
                item,
                collector: player,
                kind,
            });
            log::debug!("{} collected {:?}", player, kind);
        }
    }
}

/// Pass 7: convert one threshold's worth of score into healing for every
/// player. At most one conversion per call, even if the score covers
/// several thresholds; the rest carries over to later frames.
pub fn drain_score(world: &mut World, ctx: &mut CollisionContext) {
    let config = ctx.config;
    let scoring = &config.scoring;
    if ctx.score.value < scoring.threshold {
        return;
    }
    ctx.score.value -= scoring.threshold;
    for i in 0..world.count(Tag::Player) {
        let player = world.query(Tag::Player)[i];
        if !world.is_alive(player) {
            continue;
        }
        if let Some(health) = world.health.get_mut(player) {
            health.heal(scoring.heal_amount);
        }
    }
    log::debug!("score drained to {}", ctx.score.value);
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{v, Harness};
    use super::*;
    use crate::game::components::PickupKind;
    use crate::game::transform::BoundingBox;

    #[test]
    fn test_heart_heals_and_is_consumed() {
        let mut world = World::new();
        let mut harness = Harness::new();
        let player = world.spawn_player(v(0.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        world.health.get_mut(player).unwrap().current = 2;
        let heart = world.spawn_collectable(v(10.0, 0.0), BoundingBox::square(16.0), PickupKind::BigHeart);
        world.sync();

        resolve_pickups(&mut world, &mut harness.ctx());

        assert_eq!(world.health.get(player).unwrap().current, 5);
        assert!(!world.is_alive(heart));
        assert_eq!(harness.events.item_collected.len(), 1);
        assert_eq!(harness.score.value, 0);
    }

    #[test]
    fn test_heal_at_full_health_still_consumes() {
        let mut world = World::new();
        let mut harness = Harness::new();
        let player = world.spawn_player(v(0.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        let heart = world.spawn_collectable(v(0.0, 0.0), BoundingBox::square(16.0), PickupKind::Heart);
        world.sync();

        resolve_pickups(&mut world, &mut harness.ctx());
        assert_eq!(world.health.get(player).unwrap().current, 5);
        assert!(!world.is_alive(heart));
    }

    #[test]
    fn test_coin_adds_score_once() {
        let mut world = World::new();
        let mut harness = Harness::new();
        world.spawn_player(v(0.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        world.spawn_player(v(0.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        world.spawn_collectable(v(0.0, 0.0), BoundingBox::square(16.0), PickupKind::Coin);
        world.sync();

        resolve_pickups(&mut world, &mut harness.ctx());
        // The second player sees the coin as already dead
        assert_eq!(harness.score.value, 10);
    }

    #[test]
    fn test_distant_pickup_untouched() {
        let mut world = World::new();
        let mut harness = Harness::new();
        world.spawn_player(v(0.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        let gem = world.spawn_collectable(v(200.0, 0.0), BoundingBox::square(16.0), PickupKind::Gem);
        world.sync();

        resolve_pickups(&mut world, &mut harness.ctx());
        assert!(world.is_alive(gem));
        assert_eq!(harness.score.value, 0);
    }

    #[test]
    fn test_drain_converts_once_per_call() {
        let mut world = World::new();
        let mut harness = Harness::new();
        let a = world.spawn_player(v(0.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        let b = world.spawn_player(v(100.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        world.health.get_mut(a).unwrap().current = 1;
        world.health.get_mut(b).unwrap().current = 1;
        world.sync();
        harness.score = Score::new(250);

        drain_score(&mut world, &mut harness.ctx());

        let heal = harness.config.scoring.heal_amount;
        assert_eq!(harness.score.value, 150);
        assert_eq!(world.health.get(a).unwrap().current, 1 + heal);
        assert_eq!(world.health.get(b).unwrap().current, 1 + heal);

        drain_score(&mut world, &mut harness.ctx());
        assert_eq!(harness.score.value, 50);
        drain_score(&mut world, &mut harness.ctx());
        assert_eq!(harness.score.value, 50);
    }
}
