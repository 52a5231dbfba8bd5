//! End-of-frame timers: lifespans, invulnerability windows, animation
//! playback. Runs after collision so a weapon gets its last frame of hits
//! before it expires.

use super::entity::{Entity, Tag};
use super::world::World;

/// Tick the Lifespan of every transient entity and destroy the ones whose
/// time ran out. Lifespans on other tags are left alone. Returns how many
/// expired.
pub fn expire_transients(world: &mut World, dt: f32) -> usize {
    let transient: Vec<Entity> = world
        .lifespans
        .iter()
        .map(|(entity, _)| entity)
        .filter(|&entity| world.tag(entity).is_some_and(Tag::is_transient))
        .collect();

    let mut expired: Vec<Entity> = Vec::new();
    for entity in transient {
        let Some(lifespan) = world.lifespans.get_mut(entity) else {
            continue;
        };
        lifespan.tick(dt);
        if lifespan.expired() {
            expired.push(entity);
        }
    }
    expired.into_iter().filter(|&entity| world.destroy(entity)).count()
}

/// Count down invulnerability windows.
pub fn tick_health(world: &mut World, dt: f32) {
    for (_entity, health) in world.health.iter_mut() {
        health.tick(dt);
    }
}

pub fn tick_animations(world: &mut World, dt: f32) {
    for (_entity, animation) in world.animations.iter_mut() {
        animation.tick(dt);
    }
}
