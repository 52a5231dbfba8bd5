//! Knockback Impulses
//!
//! A hit reaction is an instantaneous velocity change plus a switch of the
//! generic state to `Knockback`. The upward component is always half the
//! strength, independent of the direction.

use macroquad::math::Vec2;
use rand::{Rng, RngCore};

use super::components::Mode;
use super::entity::Entity;
use super::world::World;

/// Fraction of the strength applied upward.
pub const UPWARD_BIAS: f32 = 0.5;

/// Apply a knockback impulse. Requires Transform and State; returns false
/// (and changes nothing) if either is missing.
pub fn apply_knockback(world: &mut World, entity: Entity, direction: Vec2, strength: f32) -> bool {
    let (Some(transform), Some(state)) = (world.transforms.get_mut(entity), world.states.get_mut(entity)) else {
        return false;
    };
    transform.velocity = Vec2::new(direction.x * strength, -strength * UPWARD_BIAS);
    state.mode = Mode::Knockback;
    true
}

/// Horizontal unit direction pushing `target` away from `source`.
pub fn knockback_direction(source: Vec2, target: Vec2) -> Vec2 {
    if target.x < source.x {
        Vec2::new(-1.0, 0.0)
    } else {
        Vec2::new(1.0, 0.0)
    }
}

/// Roll a 1-in-`chance` critical knockback.
pub fn roll_critical(rng: &mut dyn RngCore, chance: u32) -> bool {
    rng.gen_ratio(1, chance.max(1))
}
