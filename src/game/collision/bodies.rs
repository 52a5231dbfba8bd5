//! Passes 3 and 4: body-to-body separation.

use macroquad::math::Vec2;

use crate::config::SimConfig;
use crate::game::components::AiState;
use crate::game::entity::{Entity, Tag};
use crate::game::geometry::{overlap, separation_sign, Axis};
use crate::game::world::World;

fn axis_value(v: Vec2, axis: Axis) -> f32 {
    match axis {
        Axis::X => v.x,
        Axis::Y => v.y,
    }
}

fn axis_mut(v: &mut Vec2, axis: Axis) -> &mut f32 {
    match axis {
        Axis::X => &mut v.x,
        Axis::Y => &mut v.y,
    }
}

/// Pass 3: push overlapping enemies apart by half the overlap each and stop
/// both on the resolved axis.
pub fn resolve_enemy_enemy(world: &mut World) {
    let count = world.count(Tag::Enemy);
    for i in 0..count {
        for j in (i + 1)..count {
            let a = world.query(Tag::Enemy)[i];
            let b = world.query(Tag::Enemy)[j];
            if !world.is_alive(a) || !world.is_alive(b) {
                continue;
            }
            let (Some(rect_a), Some(rect_b)) = (world.world_rect(a), world.world_rect(b)) else {
                continue;
            };
            let o = overlap(rect_a, rect_b);
            if o.x <= 0.0 || o.y <= 0.0 {
                continue;
            }

            let axis = Axis::of_least_overlap(o);
            let sign = separation_sign(
                axis_value(rect_a.center(), axis),
                axis_value(rect_b.center(), axis),
            );
            let half = axis_value(o, axis) / 2.0;
            if let Some(t) = world.transforms.get_mut(a) {
                *axis_mut(&mut t.position, axis) += sign * half;
                *axis_mut(&mut t.velocity, axis) = 0.0;
            }
            if let Some(t) = world.transforms.get_mut(b) {
                *axis_mut(&mut t.position, axis) -= sign * half;
                *axis_mut(&mut t.velocity, axis) = 0.0;
            }
        }
    }
}

/// Pass 4: bounce players and enemies apart. Enemies mid-attack are skipped
/// so their swing is not interrupted.
pub fn resolve_player_enemy(world: &mut World, config: &SimConfig) {
    for i in 0..world.count(Tag::Player) {
        let player = world.query(Tag::Player)[i];
        if !world.is_alive(player) {
            continue;
        }
        for j in 0..world.count(Tag::Enemy) {
            let enemy = world.query(Tag::Enemy)[j];
            if !world.is_alive(enemy) {
                continue;
            }
            if world.ai.get(enemy).is_some_and(|ai| ai.state == AiState::Attack) {
                continue;
            }
            bounce_apart(world, config, player, enemy);
        }
    }
}

fn bounce_apart(world: &mut World, config: &SimConfig, player: Entity, enemy: Entity) {
    let (Some(player_rect), Some(enemy_rect)) = (world.world_rect(player), world.world_rect(enemy)) else {
        return;
    };
    let o = overlap(player_rect, enemy_rect);
    if o.x <= 0.0 || o.y <= 0.0 {
        return;
    }
    let contact = &config.contact;
    let player_center = player_rect.center();
    let enemy_center = enemy_rect.center();

    match Axis::of_least_overlap(o) {
        Axis::X => {
            let sign = separation_sign(player_center.x, enemy_center.x);
            let half = o.x / 2.0;
            if let Some(t) = world.transforms.get_mut(player) {
                t.position.x += sign * half;
                t.velocity.x = sign * t.velocity.x.abs().max(contact.min_bounce_speed);
            }
            if let Some(t) = world.transforms.get_mut(enemy) {
                t.position.x -= sign * half;
                t.velocity.x = -sign * t.velocity.x.abs().max(contact.min_bounce_speed);
            }
        }
        Axis::Y => {
            let separation = (o.y * contact.separation_factor).max(contact.min_separation);
            let (upper, lower) = if player_center.y < enemy_center.y {
                (player, enemy)
            } else {
                (enemy, player)
            };
            let lower_grounded = world.states.get(lower).is_some_and(|s| s.on_ground);

            if lower_grounded {
                if let Some(t) = world.transforms.get_mut(upper) {
                    t.position.y -= separation;
                    t.velocity.y = -contact.vertical_kick;
                }
            } else {
                let half = separation / 2.0;
                if let Some(t) = world.transforms.get_mut(upper) {
                    t.position.y -= half;
                    t.velocity.y = -contact.vertical_kick;
                }
                if let Some(t) = world.transforms.get_mut(lower) {
                    t.position.y += half;
                    t.velocity.y = contact.vertical_kick;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::v;
    use super::*;
    use crate::game::components::{EnemyAi, EnemyClass};
    use crate::game::transform::BoundingBox;

    fn enemy_at(world: &mut World, position: Vec2) -> Entity {
        let ai = EnemyAi::new(EnemyClass::Normal, 200.0, 40.0, 1.0);
        world.spawn_enemy(position, BoundingBox::square(40.0), ai, 0.0)
    }

    fn position(world: &World, e: Entity) -> Vec2 {
        world.transforms.get(e).unwrap().position
    }

    #[test]
    fn test_coincident_enemies_split_evenly() {
        let mut world = World::new();
        let a = enemy_at(&mut world, v(50.0, 50.0));
        let b = enemy_at(&mut world, v(50.0, 50.0));
        world.transforms.get_mut(a).unwrap().velocity = v(10.0, 20.0);
        world.sync();

        resolve_enemy_enemy(&mut world);

        // Equal overlap on both axes resolves on Y, half each
        assert_eq!(position(&world, a), v(50.0, 30.0));
        assert_eq!(position(&world, b), v(50.0, 70.0));
        assert_eq!(world.transforms.get(a).unwrap().velocity, v(10.0, 0.0));
        let residual = overlap(world.world_rect(a).unwrap(), world.world_rect(b).unwrap());
        assert!(residual.y.abs() < 1e-4);
    }

    #[test]
    fn test_enemies_split_horizontally() {
        let mut world = World::new();
        let a = enemy_at(&mut world, v(0.0, 0.0));
        let b = enemy_at(&mut world, v(30.0, 0.0));
        world.sync();

        resolve_enemy_enemy(&mut world);
        assert_eq!(position(&world, a), v(-5.0, 0.0));
        assert_eq!(position(&world, b), v(35.0, 0.0));
    }

    #[test]
    fn test_dead_enemy_is_not_separated() {
        let mut world = World::new();
        let a = enemy_at(&mut world, v(0.0, 0.0));
        let b = enemy_at(&mut world, v(30.0, 0.0));
        world.sync();
        world.destroy(b);

        resolve_enemy_enemy(&mut world);
        assert_eq!(position(&world, a), v(0.0, 0.0));
    }

    #[test]
    fn test_side_bump_enforces_min_bounce() {
        let config = SimConfig::default();
        let mut world = World::new();
        let player = world.spawn_player(v(0.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        let enemy = enemy_at(&mut world, v(30.0, 0.0));
        world.transforms.get_mut(player).unwrap().velocity = v(40.0, 0.0);
        world.sync();

        resolve_player_enemy(&mut world, &config);

        let min = config.contact.min_bounce_speed;
        assert_eq!(position(&world, player), v(-5.0, 0.0));
        assert_eq!(position(&world, enemy), v(35.0, 0.0));
        assert_eq!(world.transforms.get(player).unwrap().velocity.x, -min);
        assert_eq!(world.transforms.get(enemy).unwrap().velocity.x, min);
    }

    #[test]
    fn test_stomp_on_grounded_enemy_moves_only_player() {
        let config = SimConfig::default();
        let mut world = World::new();
        let player = world.spawn_player(v(0.0, -36.0), BoundingBox::square(40.0), 5, 0.0);
        let enemy = enemy_at(&mut world, v(0.0, 0.0));
        world.states.get_mut(enemy).unwrap().on_ground = true;
        world.sync();

        resolve_player_enemy(&mut world, &config);

        // overlap 4 * 1.1 = 4.4 > min separation
        assert!((position(&world, player).y + 40.4).abs() < 1e-4);
        assert_eq!(position(&world, enemy), v(0.0, 0.0));
        assert_eq!(world.transforms.get(player).unwrap().velocity.y, -config.contact.vertical_kick);
        assert_eq!(world.transforms.get(enemy).unwrap().velocity.y, 0.0);
    }

    #[test]
    fn test_airborne_vertical_contact_moves_both() {
        let config = SimConfig::default();
        let mut world = World::new();
        let enemy = enemy_at(&mut world, v(0.0, -39.0));
        let player = world.spawn_player(v(0.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        world.sync();

        resolve_player_enemy(&mut world, &config);

        // overlap 1 * 1.1 < min separation 2, split 1/1
        let kick = config.contact.vertical_kick;
        assert!((position(&world, enemy).y + 40.0).abs() < 1e-4);
        assert!((position(&world, player).y - 1.0).abs() < 1e-4);
        assert_eq!(world.transforms.get(enemy).unwrap().velocity.y, -kick);
        assert_eq!(world.transforms.get(player).unwrap().velocity.y, kick);
    }

    #[test]
    fn test_attacking_enemy_is_skipped() {
        let config = SimConfig::default();
        let mut world = World::new();
        let player = world.spawn_player(v(0.0, 0.0), BoundingBox::square(40.0), 5, 0.0);
        let enemy = enemy_at(&mut world, v(30.0, 0.0));
        world.ai.get_mut(enemy).unwrap().state = AiState::Attack;
        world.sync();

        resolve_player_enemy(&mut world, &config);
        assert_eq!(position(&world, player), v(0.0, 0.0));
        assert_eq!(position(&world, enemy), v(30.0, 0.0));
    }
}
