//! Spawner Service
//!
//! Systems ask for new entities by intent ("a sword for this player, here")
//! and get back a handle, or `None` if the spawn could not be satisfied.
//! The caller never builds the entity layout itself.
//!
//! Spawned entities are queued like any other creation and become visible
//! to queries at the next `World::sync()`.

use std::f32::consts::PI;
use std::rc::Rc;

use macroquad::math::Vec2;

use super::components::{Animation, Gravity, Lifespan, PickupKind, Weapon};
use super::entity::{Entity, Tag};
use super::transform::{BoundingBox, Transform};
use super::world::World;
use crate::assets::AnimationLibrary;
use crate::config::SimConfig;

/// What to spawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnKind {
    /// Player melee swing; `facing` is -1.0 or 1.0
    Sword { facing: f32 },
    EnemySword { facing: f32 },
    PlayerBullet { direction: Vec2 },
    EnemyBullet { direction: Vec2 },
    /// One piece of a shattered tile
    Fragment { index: u32, count: u32 },
    Item(PickupKind),
    Grave,
}

/// A semantic spawn request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    /// Entity responsible for the spawn (`Entity::NULL` for none)
    pub owner: Entity,
    pub position: Vec2,
    pub kind: SpawnKind,
}

impl SpawnRequest {
    pub fn new(owner: Entity, position: Vec2, kind: SpawnKind) -> Self {
        Self { owner, position, kind }
    }
}

/// Creates entities on behalf of the simulation systems.
pub trait Spawner {
    fn spawn(&mut self, world: &mut World, request: SpawnRequest) -> Option<Entity>;
}

/// Default spawner: builds every kind from the session config and refuses
/// any spawn whose animation clip is missing.
pub struct StandardSpawner {
    config: Rc<SimConfig>,
    assets: Rc<dyn AnimationLibrary>,
}

impl StandardSpawner {
    pub fn new(config: Rc<SimConfig>, assets: Rc<dyn AnimationLibrary>) -> Self {
        Self { config, assets }
    }

    fn clip_name(kind: &SpawnKind) -> &'static str {
        match kind {
            SpawnKind::Sword { .. } => "sword",
            SpawnKind::EnemySword { .. } => "enemy_sword",
            SpawnKind::PlayerBullet { .. } => "player_bullet",
            SpawnKind::EnemyBullet { .. } => "enemy_bullet",
            SpawnKind::Fragment { .. } => "fragment",
            SpawnKind::Item(item) => item.clip_name(),
            SpawnKind::Grave => "grave",
        }
    }
}

/// Spread fragments over the upper half circle, left to right.
fn fragment_direction(index: u32, count: u32) -> Vec2 {
    let count = count.max(1) as f32;
    let angle = PI + PI * (index as f32 + 0.5) / count;
    Vec2::new(angle.cos(), angle.sin())
}

impl Spawner for StandardSpawner {
    fn spawn(&mut self, world: &mut World, request: SpawnRequest) -> Option<Entity> {
        let clip_name = Self::clip_name(&request.kind);
        let Some(clip) = self.assets.fetch(clip_name) else {
            log::warn!("missing animation '{}', skipping {:?} spawn", clip_name, request.kind);
            return None;
        };
        let animation = Animation::from_clip(clip);
        let spawning = &self.config.spawning;
        let combat = &self.config.combat;

        let entity = match request.kind {
            SpawnKind::Sword { facing } | SpawnKind::EnemySword { facing } => {
                let tag = if matches!(request.kind, SpawnKind::Sword { .. }) {
                    Tag::Sword
                } else {
                    Tag::EnemySword
                };
                let damage = match world.ai.get(request.owner) {
                    Some(ai) if tag == Tag::EnemySword => ai.damage,
                    _ => combat.weapon_damage,
                };
                let entity = world.create(tag);
                let offset = Vec2::new(facing.signum() * spawning.weapon_reach, 0.0);
                world.transforms.insert(entity, Transform::from_position(request.position + offset));
                world.bounds.insert(entity, BoundingBox::square(spawning.weapon_size));
                world.lifespans.insert(entity, Lifespan::new(spawning.weapon_lifespan));
                world.weapons.insert(entity, Weapon { owner: request.owner, damage, ranged: false });
                entity
            }
            SpawnKind::PlayerBullet { direction } | SpawnKind::EnemyBullet { direction } => {
                let tag = if matches!(request.kind, SpawnKind::PlayerBullet { .. }) {
                    Tag::PlayerBullet
                } else {
                    Tag::EnemyBullet
                };
                let entity = world.create(tag);
                let velocity = direction.normalize_or_zero() * spawning.bullet_speed;
                world.transforms.insert(
                    entity,
                    Transform::from_position(request.position).with_velocity(velocity),
                );
                world.bounds.insert(entity, BoundingBox::square(spawning.bullet_size));
                world.lifespans.insert(entity, Lifespan::new(spawning.bullet_lifespan));
                world.weapons.insert(
                    entity,
                    Weapon { owner: request.owner, damage: combat.bullet_damage, ranged: true },
                );
                entity
            }
            SpawnKind::Fragment { index, count } => {
                let entity = world.create(Tag::Fragment);
                let velocity = fragment_direction(index, count) * spawning.fragment_speed;
                world.transforms.insert(
                    entity,
                    Transform::from_position(request.position).with_velocity(velocity),
                );
                world.bounds.insert(entity, BoundingBox::square(spawning.fragment_size));
                world.lifespans.insert(entity, Lifespan::new(spawning.fragment_lifespan));
                world.gravity.insert(entity, Gravity::new(self.config.physics.gravity));
                entity
            }
            SpawnKind::Item(kind) => world.spawn_collectable(
                request.position,
                BoundingBox::square(spawning.item_size),
                kind,
            ),
            SpawnKind::Grave => {
                let entity = world.create(Tag::Grave);
                world.transforms.insert(entity, Transform::from_position(request.position));
                world.bounds.insert(entity, BoundingBox::square(spawning.grave_size));
                entity
            }
        };

        world.animations.insert(entity, animation);
        Some(entity)
    }
}
