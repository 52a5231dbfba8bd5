//! Player Control and Integration
//!
//! Runs after AI and before collision:
//! - `control_players` turns the frame's input into velocity, modes and
//!   weapon spawns
//! - `apply_gravity` accelerates every non-enemy body that has Gravity
//!   (enemies fall under their own AI)
//! - `integrate` moves everything by its velocity

use macroquad::math::Vec2;

use super::components::{Mode, State};
use super::entity::{Entity, Tag};
use super::spawn::{SpawnKind, SpawnRequest, Spawner};
use super::world::World;
use crate::config::SimConfig;
use crate::input::{Action, InputSnapshot};

/// Apply one frame of input to every live player.
pub fn control_players(world: &mut World, config: &SimConfig, spawner: &mut dyn Spawner, input: &InputSnapshot, dt: f32) {
    for i in 0..world.count(Tag::Player) {
        let player = world.query(Tag::Player)[i];
        if !world.is_alive(player) {
            continue;
        }
        let (Some(mut transform), Some(mut state)) =
            (world.transforms.get(player).copied(), world.states.get(player).copied())
        else {
            continue;
        };

        state.timers.tick(dt);
        expire_actions(&mut state, input);

        let mut spawns = Vec::new();
        if input.suspended {
            transform.velocity.x = 0.0;
        } else if !state.holds_action() || state.is(Mode::Attack) {
            steer(&mut state, &mut transform.velocity, input, config);
            if input.action_down(Action::Attack) && !state.is(Mode::Attack) {
                state.mode = Mode::Attack;
                state.timers.attack = config.combat.attack_duration;
                spawns.push(SpawnKind::Sword { facing: state.facing });
            }
            if input.action_down(Action::Shoot) && state.timers.shoot <= 0.0 {
                state.timers.shoot = config.combat.shoot_cooldown;
                spawns.push(SpawnKind::PlayerBullet {
                    direction: Vec2::new(state.facing, 0.0),
                });
            }
        }

        world.transforms.insert(player, transform);
        world.states.insert(player, state);
        for kind in spawns {
            spawner.spawn(world, SpawnRequest::new(player, transform.position, kind));
        }
    }
}

/// Drop out of timed or held modes once they are over.
fn expire_actions(state: &mut State, input: &InputSnapshot) {
    let over = match state.mode {
        Mode::Attack => state.timers.attack <= 0.0,
        Mode::Knockback => state.timers.knockback <= 0.0,
        Mode::Defense => !input.action_down(Action::Guard) || input.suspended,
        _ => false,
    };
    if over {
        state.mode = if state.on_ground { Mode::Idle } else { Mode::Air };
    }
}

/// Run, jump and guard. Guarding roots the player in place.
fn steer(state: &mut State, velocity: &mut Vec2, input: &InputSnapshot, config: &SimConfig) {
    let physics = &config.physics;
    if input.action_down(Action::Guard) && state.on_ground && !state.is(Mode::Attack) {
        state.mode = Mode::Defense;
        velocity.x = 0.0;
        return;
    }

    let direction = input.horizontal();
    velocity.x = direction * physics.run_speed;
    if direction != 0.0 {
        state.facing = direction;
    }

    if input.action_down(Action::Jump) && state.on_ground && state.timers.jump <= 0.0 {
        velocity.y = -physics.jump_velocity;
        state.on_ground = false;
        state.timers.jump = physics.jump_cooldown;
    }
}

/// Gravity for players, fragments and anything else with a Gravity
/// component that is not an enemy. Vertical speed is clamped both ways.
pub fn apply_gravity(world: &mut World, config: &SimConfig, dt: f32) {
    let physics = &config.physics;
    let bodies: Vec<(Entity, f32)> = world
        .gravity
        .iter()
        .filter(|(entity, _)| !world.ai.contains(*entity))
        .map(|(entity, gravity)| (entity, gravity.acceleration))
        .collect();

    for (entity, acceleration) in bodies {
        if !world.is_alive(entity) {
            continue;
        }
        if let Some(transform) = world.transforms.get_mut(entity) {
            let vy = transform.velocity.y + acceleration * dt;
            transform.velocity.y = vy.clamp(-physics.max_upward_speed, physics.max_fall_speed);
        }
    }
}

/// Move every live entity by its velocity.
pub fn integrate(world: &mut World, dt: f32) {
    for i in 0..world.live().len() {
        let entity = world.live()[i];
        if !world.is_alive(entity) {
            continue;
        }
        if let Some(transform) = world.transforms.get_mut(entity) {
            let velocity = transform.velocity;
            transform.translate(velocity * dt);
        }
    }
}
