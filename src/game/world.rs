//! Game World
//!
//! The World is the central container for all simulation state:
//! - Entity allocation and lifetime tracking
//! - Component storage for all component types
//! - The live list and tag-indexed buckets used by every system
//! - Deferred creation/destruction, applied once per frame by `sync()`
//!
//! Component types are fixed at compile time. Storages are typed fields
//! rather than a HashMap<TypeId, ...>, so systems can borrow two different
//! storages mutably at once (`world.transforms` and `world.states`).

use macroquad::math::{Rect, Vec2};

use super::component::{Component, ComponentStorage};
use super::components::*;
use super::entity::{Entity, EntityAllocator, Tag};
use super::transform::{BoundingBox, Transform};

/// The simulation world containing all entities and their components.
pub struct World {
    entities: EntityAllocator,

    /// Created this frame, invisible to queries until the next sync
    pending: Vec<Entity>,

    /// Every promoted entity, in insertion order
    live: Vec<Entity>,

    /// Promoted entities grouped by tag, in insertion order
    buckets: [Vec<Entity>; Tag::COUNT],

    // =========================================================================
    // Spatial
    // =========================================================================
    pub transforms: ComponentStorage<Transform>,
    pub bounds: ComponentStorage<BoundingBox>,
    pub gravity: ComponentStorage<Gravity>,

    // =========================================================================
    // Gameplay
    // =========================================================================
    pub health: ComponentStorage<Health>,
    pub states: ComponentStorage<State>,
    pub ai: ComponentStorage<EnemyAi>,
    pub weapons: ComponentStorage<Weapon>,
    pub lifespans: ComponentStorage<Lifespan>,

    // =========================================================================
    // Level Content
    // =========================================================================
    pub tiles: ComponentStorage<Tile>,
    pub collectables: ComponentStorage<Collectable>,

    // =========================================================================
    // Presentation
    // =========================================================================
    pub animations: ComponentStorage<Animation>,
}

macro_rules! impl_component {
    ($($ty:ty => $field:ident),* $(,)?) => {
        $(
            impl Component for $ty {
                fn storage(world: &World) -> &ComponentStorage<Self> {
                    &world.$field
                }
                fn storage_mut(world: &mut World) -> &mut ComponentStorage<Self> {
                    &mut world.$field
                }
            }
        )*
    };
}

impl_component! {
    Transform => transforms,
    BoundingBox => bounds,
    Gravity => gravity,
    Health => health,
    State => states,
    EnemyAi => ai,
    Weapon => weapons,
    Lifespan => lifespans,
    Tile => tiles,
    Collectable => collectables,
    Animation => animations,
}

impl World {
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            pending: Vec::new(),
            live: Vec::new(),
            buckets: std::array::from_fn(|_| Vec::new()),

            transforms: ComponentStorage::new(),
            bounds: ComponentStorage::new(),
            gravity: ComponentStorage::new(),

            health: ComponentStorage::new(),
            states: ComponentStorage::new(),
            ai: ComponentStorage::new(),
            weapons: ComponentStorage::new(),
            lifespans: ComponentStorage::new(),

            tiles: ComponentStorage::new(),
            collectables: ComponentStorage::new(),

            animations: ComponentStorage::new(),
        }
    }

    // =========================================================================
    // Entity Management
    // =========================================================================

    /// Create an entity. Components may be attached right away, but the
    /// entity stays out of every query until the next `sync()`.
    pub fn create(&mut self, tag: Tag) -> Entity {
        let entity = self.entities.allocate(tag);
        self.pending.push(entity);
        entity
    }

    /// Mark an entity dead. It stays in the live list and its tag bucket
    /// (and keeps its components) until the next `sync()`.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        self.entities.kill(entity)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn tag(&self, entity: Entity) -> Option<Tag> {
        self.entities.tag(entity)
    }

    /// The single per-frame synchronization point:
    /// 1. promote pending entities into the live list and their tag bucket
    /// 2. sweep dead entities out of the live list and every bucket, freeing
    ///    their component slots
    pub fn sync(&mut self) {
        let promoted = self.pending.len();
        for entity in self.pending.drain(..) {
            if let Some(tag) = self.entities.tag(entity) {
                self.live.push(entity);
                self.buckets[tag.bucket()].push(entity);
            }
        }

        let mut live = std::mem::take(&mut self.live);
        let before = live.len();
        live.retain(|&entity| {
            if self.entities.is_alive(entity) {
                true
            } else {
                self.sweep(entity);
                false
            }
        });
        let swept = before - live.len();
        self.live = live;

        let entities = &self.entities;
        for bucket in &mut self.buckets {
            bucket.retain(|&entity| entities.is_alive(entity));
        }

        if promoted > 0 || swept > 0 {
            log::trace!("sync: promoted {} swept {} live {}", promoted, swept, self.live.len());
        }
    }

    /// Free a dead entity's slot and every component attached to it.
    fn sweep(&mut self, entity: Entity) {
        let idx = entity.index();
        if !self.entities.release(entity) {
            return;
        }
        self.transforms.clear_slot(idx);
        self.bounds.clear_slot(idx);
        self.gravity.clear_slot(idx);
        self.health.clear_slot(idx);
        self.states.clear_slot(idx);
        self.ai.clear_slot(idx);
        self.weapons.clear_slot(idx);
        self.lifespans.clear_slot(idx);
        self.tiles.clear_slot(idx);
        self.collectables.clear_slot(idx);
        self.animations.clear_slot(idx);
    }

    /// Live entities with this tag, in insertion order. Includes entities
    /// destroyed earlier this frame; check `is_alive` before acting.
    pub fn query(&self, tag: Tag) -> &[Entity] {
        &self.buckets[tag.bucket()]
    }

    pub fn count(&self, tag: Tag) -> usize {
        self.buckets[tag.bucket()].len()
    }

    /// Every promoted entity, in insertion order.
    pub fn live(&self) -> &[Entity] {
        &self.live
    }

    /// First entity with this tag that is still alive.
    pub fn first_alive(&self, tag: Tag) -> Option<Entity> {
        self.query(tag).iter().copied().find(|&e| self.is_alive(e))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of entities created and not yet destroyed (pending included).
    pub fn entity_count(&self) -> u32 {
        self.entities.alive_count()
    }

    /// Wipe everything and restart the id counter. Only valid between
    /// independent play sessions.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.pending.clear();
        self.live.clear();
        for bucket in &mut self.buckets {
            bucket.clear();
        }
        self.transforms.clear();
        self.bounds.clear();
        self.gravity.clear();
        self.health.clear();
        self.states.clear();
        self.ai.clear();
        self.weapons.clear();
        self.lifespans.clear();
        self.tiles.clear();
        self.collectables.clear();
        self.animations.clear();
    }

    // =========================================================================
    // Typed Component Access
    // =========================================================================

    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) {
        if self.entities.is_current(entity) {
            T::storage_mut(self).insert(entity, component);
        }
    }

    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        T::storage_mut(self).remove(entity)
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        T::storage(self).get(entity)
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        T::storage_mut(self).get_mut(entity)
    }

    /// Whether the entity actually carries a `T`.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        T::storage(self).contains(entity)
    }

    /// World rectangle (position ± half-size) if the entity has both a
    /// transform and a bounding box.
    pub fn world_rect(&self, entity: Entity) -> Option<Rect> {
        let transform = self.transforms.get(entity)?;
        let bounds = self.bounds.get(entity)?;
        Some(bounds.rect_at(transform.position))
    }

    // =========================================================================
    // Convenience Spawners
    // =========================================================================

    /// Create a player with the standard component layout.
    pub fn spawn_player(&mut self, position: Vec2, size: BoundingBox, max_health: i32, gravity: f32) -> Entity {
        let entity = self.create(Tag::Player);
        self.transforms.insert(entity, Transform::from_position(position));
        self.bounds.insert(entity, size);
        self.health.insert(entity, Health::new(max_health));
        self.states.insert(entity, State::new(Mode::Idle));
        self.gravity.insert(entity, Gravity::new(gravity));
        entity
    }

    /// Create an enemy; health comes from the class profile.
    pub fn spawn_enemy(&mut self, position: Vec2, size: BoundingBox, ai: EnemyAi, gravity: f32) -> Entity {
        let entity = self.create(Tag::Enemy);
        self.transforms.insert(entity, Transform::from_position(position));
        self.bounds.insert(entity, size);
        self.health.insert(entity, Health::new(ai.class.profile().max_health));
        self.states.insert(entity, State::new(Mode::Idle));
        self.gravity.insert(entity, Gravity::new(gravity));
        self.ai.insert(entity, ai);
        entity
    }

    /// Create a tile. Containers start in the inactive mode.
    pub fn spawn_tile(&mut self, position: Vec2, size: BoundingBox, kind: TileKind) -> Entity {
        let entity = self.create(Tag::Tile);
        self.transforms.insert(entity, Transform::from_position(position));
        self.bounds.insert(entity, size);
        if matches!(kind, TileKind::Container { .. }) {
            self.states.insert(entity, State::new(Mode::Inactive));
        }
        self.tiles.insert(entity, Tile::new(kind));
        entity
    }

    pub fn spawn_collectable(&mut self, position: Vec2, size: BoundingBox, kind: PickupKind) -> Entity {
        let entity = self.create(Tag::Collectable);
        self.transforms.insert(entity, Transform::from_position(position));
        self.bounds.insert(entity, size);
        self.collectables.insert(entity, Collectable { kind });
        entity
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
