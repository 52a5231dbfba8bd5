//! Pass 5: weapons against tiles and against their targets.
//!
//! Hit handling is the same whichever side owns the weapon: any weapon
//! triggers tile reactions, and bullets are consumed by what they hit. The
//! only asymmetries are keyed on the weapon's tag. Player weapons hit every
//! enemy they touch; enemy weapons hit at most one player and never stack
//! damage on a player already being knocked back.

use super::tiles::strike_tile;
use super::CollisionContext;
use crate::game::components::{AiState, Mode};
use crate::game::entity::{Entity, Tag};
use crate::game::event::{DamageEvent, DeathEvent};
use crate::game::geometry::intersects;
use crate::game::knockback::{apply_knockback, knockback_direction, roll_critical};
use crate::game::spawn::{SpawnKind, SpawnRequest};
use crate::game::world::World;

/// Weapon tags, in processing order.
const WEAPON_TAGS: [Tag; 4] = [Tag::Sword, Tag::PlayerBullet, Tag::EnemySword, Tag::EnemyBullet];

/// The tag a weapon tag damages.
pub fn weapon_target(weapon: Tag) -> Option<Tag> {
    match weapon {
        Tag::Sword | Tag::PlayerBullet => Some(Tag::Enemy),
        Tag::EnemySword | Tag::EnemyBullet => Some(Tag::Player),
        _ => None,
    }
}

/// Pass 5: weapon contacts. Bullets are consumed by the first tile or
/// target they touch.
pub fn resolve_weapons(world: &mut World, ctx: &mut CollisionContext) {
    for tag in WEAPON_TAGS {
        let Some(target_tag) = weapon_target(tag) else {
            continue;
        };
        for i in 0..world.count(tag) {
            let weapon = world.query(tag)[i];
            if !world.is_alive(weapon) {
                continue;
            }
            if weapon_vs_tiles(world, ctx, weapon, tag) {
                continue;
            }
            weapon_vs_targets(world, ctx, weapon, tag, target_tag);
        }
    }
}

/// Returns true if the weapon was consumed.
fn weapon_vs_tiles(world: &mut World, ctx: &mut CollisionContext, weapon: Entity, tag: Tag) -> bool {
    let Some(weapon_rect) = world.world_rect(weapon) else {
        return false;
    };
    let ranged = world.weapons.get(weapon).is_some_and(|w| w.ranged);
    let owner = world.weapons.get(weapon).map_or(Entity::NULL, |w| w.owner);

    for j in 0..world.count(Tag::Tile) {
        let tile = world.query(Tag::Tile)[j];
        if !world.is_alive(tile) {
            continue;
        }
        if world.tiles.get(tile).is_some_and(|t| t.door_target().is_some()) {
            continue;
        }
        let Some(tile_rect) = world.world_rect(tile) else {
            continue;
        };
        if !intersects(weapon_rect, tile_rect) {
            continue;
        }
        let by = if owner.is_null() { weapon } else { owner };
        strike_tile(world, ctx, tile, by);
        if ranged {
            world.destroy(weapon);
            return true;
        }
    }
    false
}

fn weapon_vs_targets(world: &mut World, ctx: &mut CollisionContext, weapon: Entity, tag: Tag, target_tag: Tag) {
    let Some(weapon_rect) = world.world_rect(weapon) else {
        return;
    };
    let Some(stats) = world.weapons.get(weapon).copied() else {
        return;
    };

    for j in 0..world.count(target_tag) {
        let target = world.query(target_tag)[j];
        if !world.is_alive(target) || target == stats.owner {
            continue;
        }
        let Some(target_rect) = world.world_rect(target) else {
            continue;
        };
        if !intersects(weapon_rect, target_rect) {
            continue;
        }
        if tag.is_enemy_weapon() && world.states.get(target).is_some_and(|s| s.is(Mode::Knockback)) {
            continue;
        }

        strike_target(world, ctx, weapon, target, stats.damage);

        if stats.ranged {
            world.destroy(weapon);
            return;
        }
        if tag.is_enemy_weapon() {
            return;
        }
    }
}

/// Apply one weapon hit. A killing blow destroys the target without a
/// knockback roll; otherwise a critical roll may knock it back.
fn strike_target(world: &mut World, ctx: &mut CollisionContext, weapon: Entity, target: Entity, damage: i32) {
    let config = ctx.config;
    let combat = &config.combat;
    let Some(health) = world.health.get_mut(target) else {
        return;
    };
    if !health.take_damage(damage) {
        return;
    }
    health.set_invulnerable(combat.invulnerability_window);
    let remaining = health.current;
    let dead = health.is_dead();

    let source = world.weapons.get(weapon).map_or(weapon, |w| w.owner);
    let target_pos = world.transforms.get(target).map(|t| t.position).unwrap_or_default();

    if dead {
        let tag = world.tag(target).unwrap_or(Tag::Enemy);
        world.destroy(target);
        if let Some(ai) = world.ai.get_mut(target) {
            ai.state = AiState::Defeated;
        }
        ctx.events.death.send(DeathEvent {
            entity: target,
            tag,
            killer: (!source.is_null()).then_some(source),
            position: target_pos,
        });
        if tag == Tag::Enemy {
            ctx.spawner.spawn(world, SpawnRequest::new(target, target_pos, SpawnKind::Grave));
        }
        log::info!("{} {} defeated by {}", tag, target, source);
        return;
    }

    let knockback = roll_critical(&mut *ctx.rng, combat.knockback_chance);
    if knockback {
        let weapon_pos = world.transforms.get(weapon).map(|t| t.position).unwrap_or_default();
        let direction = knockback_direction(weapon_pos, target_pos);
        apply_knockback(world, target, direction, combat.knockback_strength);
        if let Some(state) = world.states.get_mut(target) {
            state.timers.knockback = combat.knockback_duration;
        }
        if let Some(ai) = world.ai.get_mut(target) {
            ai.state = AiState::Knockback;
            ai.timers.knockback = config.ai.knockback_duration;
        }
        log::trace!("critical knockback on {}", target);
    }

    ctx.events.damage.send(DamageEvent {
        target,
        source,
        amount: damage,
        remaining,
        knockback,
    });
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{v, Harness};
    use super::*;
    use crate::game::components::{EnemyAi, EnemyClass, PickupKind, TileKind, Weapon};
    use crate::game::transform::{BoundingBox, Transform};
    use macroquad::math::Vec2;

    fn enemy_at(world: &mut World, position: Vec2, class: EnemyClass) -> Entity {
        let ai = EnemyAi::new(class, 200.0, 40.0, 1.0);
        world.spawn_enemy(position, BoundingBox::square(40.0), ai, 0.0)
    }

    fn weapon_at(world: &mut World, tag: Tag, position: Vec2, owner: Entity, damage: i32, ranged: bool) -> Entity {
        let weapon = world.create(tag);
        world.insert(weapon, Transform::from_position(position));
        world.insert(weapon, BoundingBox::square(20.0));
        world.insert(weapon, Weapon { owner, damage, ranged });
        weapon
    }

    #[test]
    fn test_killing_blow_destroys_without_roll() {
        let mut world = World::new();
        // Knockback would always fire if it were rolled
        let mut harness = Harness::new().always_knockback();
        let enemy = enemy_at(&mut world, v(0.0, 0.0), EnemyClass::Fast);
        world.health.get_mut(enemy).unwrap().current = 1;
        let player = world.create(Tag::Player);
        weapon_at(&mut world, Tag::Sword, v(10.0, 0.0), player, 1, false);
        world.sync();

        resolve_weapons(&mut world, &mut harness.ctx());

        assert!(!world.is_alive(enemy));
        assert_eq!(world.ai.get(enemy).unwrap().state, AiState::Defeated);
        assert_eq!(world.states.get(enemy).unwrap().mode, Mode::Idle);
        assert_eq!(world.transforms.get(enemy).unwrap().velocity, Vec2::ZERO);
        assert!(harness.events.damage.is_empty());
        let deaths: Vec<_> = harness.events.death.iter().collect();
        assert_eq!(deaths.len(), 1);
        assert_eq!(deaths[0].killer, Some(player));

        world.sync();
        assert!(world.query(Tag::Enemy).is_empty());
        assert_eq!(world.count(Tag::Grave), 1);
    }

    #[test]
    fn test_hit_with_critical_knockback() {
        let mut world = World::new();
        let mut harness = Harness::new().always_knockback();
        let enemy = enemy_at(&mut world, v(0.0, 0.0), EnemyClass::Strong);
        weapon_at(&mut world, Tag::Sword, v(-10.0, 0.0), Entity::NULL, 1, false);
        world.sync();

        resolve_weapons(&mut world, &mut harness.ctx());

        let health = world.health.get(enemy).unwrap();
        assert_eq!(health.current, EnemyClass::Strong.profile().max_health - 1);
        assert!(health.invulnerability > 0.0);
        let ai = world.ai.get(enemy).unwrap();
        assert_eq!(ai.state, AiState::Knockback);
        assert!(ai.timers.knockback > 0.0);
        let strength = harness.config.combat.knockback_strength;
        assert_eq!(world.transforms.get(enemy).unwrap().velocity, v(strength, -strength * 0.5));
        assert!(harness.events.damage.iter().all(|e| e.knockback));
    }

    #[test]
    fn test_hit_without_critical() {
        let mut world = World::new();
        let mut harness = Harness::new();
        let enemy = enemy_at(&mut world, v(0.0, 0.0), EnemyClass::Normal);
        weapon_at(&mut world, Tag::Sword, v(-10.0, 0.0), Entity::NULL, 1, false);
        world.sync();

        resolve_weapons(&mut world, &mut harness.ctx());

        assert_eq!(world.ai.get(enemy).unwrap().state, AiState::Idle);
        assert_eq!(world.transforms.get(enemy).unwrap().velocity, Vec2::ZERO);
        assert_eq!(harness.events.damage.len(), 1);
    }

    #[test]
    fn test_invulnerable_target_takes_nothing() {
        let mut world = World::new();
        let mut harness = Harness::new();
        let enemy = enemy_at(&mut world, v(0.0, 0.0), EnemyClass::Normal);
        world.health.get_mut(enemy).unwrap().set_invulnerable(1.0);
        weapon_at(&mut world, Tag::Sword, v(0.0, 0.0), Entity::NULL, 1, false);
        world.sync();

        resolve_weapons(&mut world, &mut harness.ctx());
        let health = world.health.get(enemy).unwrap();
        assert_eq!(health.current, health.max);
        assert!(harness.events.damage.is_empty());
    }

    #[test]
    fn test_enemy_sword_hits_first_player_only() {
        let mut world = World::new();
        let mut harness = Harness::new();
        let first = world.spawn_player(v(0.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        let second = world.spawn_player(v(5.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        let enemy = enemy_at(&mut world, v(100.0, 0.0), EnemyClass::Normal);
        weapon_at(&mut world, Tag::EnemySword, v(0.0, 0.0), enemy, 2, false);
        world.sync();

        resolve_weapons(&mut world, &mut harness.ctx());
        assert_eq!(world.health.get(first).unwrap().current, 3);
        assert_eq!(world.health.get(second).unwrap().current, 5);
    }

    #[test]
    fn test_enemy_weapon_skips_knocked_back_player() {
        let mut world = World::new();
        let mut harness = Harness::new();
        let dazed = world.spawn_player(v(0.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        world.states.get_mut(dazed).unwrap().mode = Mode::Knockback;
        let other = world.spawn_player(v(5.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        weapon_at(&mut world, Tag::EnemySword, v(0.0, 0.0), Entity::NULL, 1, false);
        world.sync();

        resolve_weapons(&mut world, &mut harness.ctx());
        assert_eq!(world.health.get(dazed).unwrap().current, 5);
        assert_eq!(world.health.get(other).unwrap().current, 4);
    }

    #[test]
    fn test_player_knockback_sets_state_timer() {
        let mut world = World::new();
        let mut harness = Harness::new().always_knockback();
        let player = world.spawn_player(v(0.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        weapon_at(&mut world, Tag::EnemyBullet, v(10.0, 0.0), Entity::NULL, 1, true);
        world.sync();

        resolve_weapons(&mut world, &mut harness.ctx());
        let state = world.states.get(player).unwrap();
        assert_eq!(state.mode, Mode::Knockback);
        assert_eq!(state.timers.knockback, harness.config.combat.knockback_duration);
        assert!(state.holds_action());
    }

    #[test]
    fn test_bullet_consumed_on_hit() {
        let mut world = World::new();
        let mut harness = Harness::new();
        let a = enemy_at(&mut world, v(0.0, 0.0), EnemyClass::Emperor);
        let b = enemy_at(&mut world, v(5.0, 0.0), EnemyClass::Emperor);
        let bullet = weapon_at(&mut world, Tag::PlayerBullet, v(0.0, 0.0), Entity::NULL, 1, true);
        world.sync();

        resolve_weapons(&mut world, &mut harness.ctx());
        assert!(!world.is_alive(bullet));
        let max = EnemyClass::Emperor.profile().max_health;
        assert_eq!(world.health.get(a).unwrap().current, max - 1);
        assert_eq!(world.health.get(b).unwrap().current, max);
    }

    #[test]
    fn test_sword_hits_every_enemy_it_touches() {
        let mut world = World::new();
        let mut harness = Harness::new();
        let a = enemy_at(&mut world, v(0.0, 0.0), EnemyClass::Emperor);
        let b = enemy_at(&mut world, v(5.0, 0.0), EnemyClass::Emperor);
        weapon_at(&mut world, Tag::Sword, v(0.0, 0.0), Entity::NULL, 1, false);
        world.sync();

        resolve_weapons(&mut world, &mut harness.ctx());
        let max = EnemyClass::Emperor.profile().max_health;
        assert_eq!(world.health.get(a).unwrap().current, max - 1);
        assert_eq!(world.health.get(b).unwrap().current, max - 1);
    }

    #[test]
    fn test_sword_breaks_tile_without_moving() {
        let mut world = World::new();
        let mut harness = Harness::new();
        let tile = world.spawn_tile(
            v(0.0, 0.0),
            BoundingBox::square(32.0),
            TileKind::Breakable { drop: Some(PickupKind::Coin) },
        );
        let sword = weapon_at(&mut world, Tag::Sword, v(10.0, 0.0), Entity::NULL, 1, false);
        world.sync();

        resolve_weapons(&mut world, &mut harness.ctx());
        assert!(!world.is_alive(tile));
        assert!(world.is_alive(sword));
        assert_eq!(world.transforms.get(sword).unwrap().position, v(10.0, 0.0));
        assert_eq!(harness.events.tile_broken.len(), 1);
    }

    #[test]
    fn test_enemy_bullet_stops_at_wall() {
        let mut world = World::new();
        let mut harness = Harness::new();
        let wall = world.spawn_tile(v(0.0, 0.0), BoundingBox::square(32.0), TileKind::Solid);
        let bullet = weapon_at(&mut world, Tag::EnemyBullet, v(10.0, 0.0), Entity::NULL, 1, true);
        world.sync();

        resolve_weapons(&mut world, &mut harness.ctx());
        assert!(!world.is_alive(bullet));
        assert!(world.is_alive(wall));
        assert!(harness.events.tile_broken.is_empty());
    }

    #[test]
    fn test_enemy_sword_breaks_tile() {
        let mut world = World::new();
        let mut harness = Harness::new();
        let owner = world.create(Tag::Enemy);
        let tile = world.spawn_tile(
            v(0.0, 0.0),
            BoundingBox::square(32.0),
            TileKind::Breakable { drop: None },
        );
        let sword = weapon_at(&mut world, Tag::EnemySword, v(10.0, 0.0), owner, 1, false);
        world.sync();

        resolve_weapons(&mut world, &mut harness.ctx());
        assert!(!world.is_alive(tile));
        assert!(world.is_alive(sword));
        assert_eq!(harness.events.tile_broken.len(), 1);
        assert_eq!(harness.events.tile_broken.iter().next().unwrap().by, owner);
    }

    #[test]
    fn test_weapon_targets() {
        assert_eq!(weapon_target(Tag::Sword), Some(Tag::Enemy));
        assert_eq!(weapon_target(Tag::EnemyBullet), Some(Tag::Player));
        assert_eq!(weapon_target(Tag::Tile), None);
    }
}
