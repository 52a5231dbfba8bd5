//! Enemy AI
//!
//! One state machine per enemy, updated before movement and collision:
//!
//! ```text
//! Idle/Patrol --sees player--> Recognition --timer--> Follow
//!                  (or straight to Follow with no recognition time)
//! Follow --in attack radius, cooldown done--> Attack --timer--> Follow
//! Follow/Recognition --out of sight past grace period--> Patrol or Idle
//! Knockback (entered by the collision resolver) --timer--> Follow, Patrol or Idle
//! ```
//!
//! Enemies run their own gravity and their own ground scan. The scan result
//! lives in `EnemyAi::grounded` and is independent of the resolver's
//! `State::on_ground`.

use macroquad::math::{Rect, Vec2};

use super::components::{AiState, Animation, Behavior, EnemyAi};
use super::entity::{Entity, Tag};
use super::geometry::{intersects, path_blocked};
use super::spawn::{SpawnKind, SpawnRequest, Spawner};
use super::transform::Transform;
use super::world::World;
use crate::assets::AnimationLibrary;
use crate::config::SimConfig;

/// Side effects the state machine asks for after an update.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AiAction {
    None,
    Swing { facing: f32 },
}

/// Update every live enemy: ground scan, sight, state machine, gravity and
/// animation.
pub fn update_enemies(
    world: &mut World,
    config: &SimConfig,
    spawner: &mut dyn Spawner,
    assets: &dyn AnimationLibrary,
    dt: f32,
) {
    for i in 0..world.count(Tag::Enemy) {
        let enemy = world.query(Tag::Enemy)[i];
        if !world.is_alive(enemy) {
            continue;
        }
        let (Some(rect), Some(mut transform)) = (world.world_rect(enemy), world.transforms.get(enemy).copied()) else {
            continue;
        };
        let gravity = world
            .gravity
            .get(enemy)
            .map_or(config.physics.gravity, |g| g.acceleration);

        let grounded = probe_ground(world, rect, config.ai.ground_probe);
        let target = world.ai.get(enemy).and_then(|ai| find_target(world, ai, transform.position));

        let Some(ai) = world.ai.get_mut(enemy) else {
            continue;
        };
        ai.grounded = grounded;
        let before = ai.state;
        let action = think(ai, &mut transform, target, config, dt);
        if ai.state != before {
            log::trace!("enemy {} {} -> {}", enemy, before.name(), ai.state.name());
        }
        let facing = ai.facing;
        let clip = format!("{}_{}", ai.class.clip_prefix(), ai.state.name());

        fall(&mut transform, grounded, gravity, config.physics.max_fall_speed, dt);
        world.transforms.insert(enemy, transform);
        if let Some(state) = world.states.get_mut(enemy) {
            state.facing = facing;
        }

        if let AiAction::Swing { facing } = action {
            spawner.spawn(
                world,
                SpawnRequest::new(enemy, transform.position, SpawnKind::EnemySword { facing }),
            );
        }
        sync_animation(world, enemy, &clip, assets);
    }
}

/// True if a rect shifted `probe` pixels down touches any solid tile.
pub fn probe_ground(world: &World, rect: Rect, probe: f32) -> bool {
    let feet = Rect::new(rect.x, rect.y + probe, rect.w, rect.h);
    blocking_tiles(world).any(|tile| intersects(feet, tile))
}

/// Rects of live tiles that block movement and sight. Doors do neither.
fn blocking_tiles(world: &World) -> impl Iterator<Item = Rect> + '_ {
    world
        .query(Tag::Tile)
        .iter()
        .copied()
        .filter(move |&tile| world.is_alive(tile))
        .filter(move |&tile| !world.tiles.get(tile).is_some_and(|t| t.door_target().is_some()))
        .filter_map(move |tile| world.world_rect(tile))
}

/// Position of the first live player within sight range and with a clear
/// line of sight. Passive enemies never see anyone.
pub fn find_target(world: &World, ai: &EnemyAi, eye: Vec2) -> Option<Vec2> {
    if ai.behavior == Behavior::Passive {
        return None;
    }
    world
        .query(Tag::Player)
        .iter()
        .copied()
        .filter(|&player| world.is_alive(player))
        .filter_map(|player| world.transforms.get(player).map(|t| t.position))
        .find(|&target| {
            eye.distance(target) <= ai.sight_range && !path_blocked(eye, target, blocking_tiles(world))
        })
}

fn direction_to(from: f32, to: f32) -> f32 {
    if to < from {
        -1.0
    } else {
        1.0
    }
}

/// Advance the state machine by one frame and set horizontal velocity.
fn think(ai: &mut EnemyAi, transform: &mut Transform, target: Option<Vec2>, config: &SimConfig, dt: f32) -> AiAction {
    let timers = &mut ai.timers;
    timers.attack = (timers.attack - dt).max(0.0);
    timers.cooldown = (timers.cooldown - dt).max(0.0);
    timers.knockback = (timers.knockback - dt).max(0.0);
    timers.recognition = (timers.recognition - dt).max(0.0);
    if target.is_some() {
        timers.lost_sight = 0.0;
    } else {
        timers.lost_sight += dt;
    }
    let gave_up = target.is_none() && ai.timers.lost_sight > ai.grace_period;
    let position = transform.position;

    match ai.state {
        AiState::Defeated => {}
        AiState::Knockback => {
            if ai.timers.knockback <= 0.0 {
                ai.state = if target.is_some() { AiState::Follow } else { ai.resting_state() };
            }
        }
        AiState::Idle | AiState::Patrol => {
            if let Some(target) = target {
                ai.facing = direction_to(position.x, target.x);
                transform.velocity.x = 0.0;
                if ai.recognition_time > 0.0 {
                    ai.timers.recognition = ai.recognition_time;
                    ai.state = AiState::Recognition;
                } else {
                    ai.state = AiState::Follow;
                }
            } else if ai.state == AiState::Patrol {
                patrol(ai, transform, config.ai.patrol_threshold);
            } else {
                transform.velocity.x = 0.0;
            }
        }
        AiState::Recognition => {
            transform.velocity.x = 0.0;
            if let Some(target) = target {
                ai.facing = direction_to(position.x, target.x);
            }
            if gave_up {
                ai.state = ai.resting_state();
            } else if ai.timers.recognition <= 0.0 {
                ai.state = AiState::Follow;
            }
        }
        AiState::Follow => match target {
            Some(target) => {
                ai.facing = direction_to(position.x, target.x);
                if position.distance(target) <= ai.attack_radius && ai.timers.cooldown <= 0.0 {
                    transform.velocity.x = 0.0;
                    ai.timers.attack = config.ai.attack_duration;
                    ai.state = AiState::Attack;
                    return AiAction::Swing { facing: ai.facing };
                }
                transform.velocity.x = ai.facing * ai.speed;
            }
            None => {
                transform.velocity.x = 0.0;
                if gave_up {
                    ai.state = ai.resting_state();
                }
            }
        },
        AiState::Attack => {
            transform.velocity.x = 0.0;
            if ai.timers.attack <= 0.0 {
                ai.timers.cooldown = config.ai.attack_cooldown;
                ai.state = if target.is_some() { AiState::Follow } else { ai.resting_state() };
            }
        }
    }
    AiAction::None
}

/// Walk toward the current patrol point, moving on once within `threshold`.
fn patrol(ai: &mut EnemyAi, transform: &mut Transform, threshold: f32) {
    let Some(point) = ai.current_patrol_point() else {
        transform.velocity.x = 0.0;
        return;
    };
    let dx = point.x - transform.position.x;
    if dx.abs() <= threshold {
        ai.advance_patrol();
        transform.velocity.x = 0.0;
        return;
    }
    ai.facing = dx.signum();
    transform.velocity.x = ai.facing * ai.speed;
}

/// Accumulate gravity while airborne; landing kills downward speed.
fn fall(transform: &mut Transform, grounded: bool, gravity: f32, max_fall_speed: f32, dt: f32) {
    if grounded {
        if transform.velocity.y > 0.0 {
            transform.velocity.y = 0.0;
        }
    } else {
        transform.velocity.y = (transform.velocity.y + gravity * dt).min(max_fall_speed);
    }
}

/// Switch to the clip for the current state. A missing clip keeps whatever
/// is playing.
fn sync_animation(world: &mut World, enemy: Entity, clip_name: &str, assets: &dyn AnimationLibrary) {
    if world.animations.get(enemy).is_some_and(|a| a.clip == clip_name) {
        return;
    }
    let Some(clip) = assets.fetch(clip_name) else {
        log::debug!("no animation '{}' for enemy {}", clip_name, enemy);
        return;
    };
    match world.animations.get_mut(enemy) {
        Some(animation) => animation.play(clip),
        None => world.animations.insert(enemy, Animation::from_clip(clip)),
    }
}
