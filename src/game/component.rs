//! Component Storage
//!
//! Components are plain data attached to entities. This module provides
//! `ComponentStorage<T>` - a sparse array that maps entity slots to
//! component data - and the `Component` trait that ties each declared
//! component type to its storage inside the `World`.
//!
//! Every slot is an `Option`, so "does this entity have a Transform" answers
//! whether one was actually inserted, not whether the type exists. Accessing
//! a type that was never declared fails to compile because it has no
//! `Component` impl.

use super::entity::Entity;
use super::world::World;

/// A component type the world knows how to store.
pub trait Component: Sized + 'static {
    fn storage(world: &World) -> &ComponentStorage<Self>;
    fn storage_mut(world: &mut World) -> &mut ComponentStorage<Self>;
}

/// Sparse storage for a single component type.
///
/// Each filled slot remembers the id of the entity that owns it, so a stale
/// handle whose slot has been reused never reads somebody else's data.
pub struct ComponentStorage<T> {
    /// Sparse array indexed by entity.index()
    data: Vec<Option<(u64, T)>>,
}

impl<T> ComponentStorage<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    fn ensure_capacity(&mut self, index: usize) {
        if index >= self.data.len() {
            self.data.resize_with(index + 1, || None);
        }
    }

    /// Insert a component for an entity, replacing any existing one.
    pub fn insert(&mut self, entity: Entity, component: T) {
        let idx = entity.index() as usize;
        self.ensure_capacity(idx);
        self.data[idx] = Some((entity.id(), component));
    }

    /// Remove a component from an entity, returning it if present.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        if !self.contains(entity) {
            return None;
        }
        self.data[entity.index() as usize].take().map(|(_, c)| c)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        match self.data.get(entity.index() as usize) {
            Some(Some((id, c))) if *id == entity.id() => Some(c),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        match self.data.get_mut(entity.index() as usize) {
            Some(Some((id, c))) if *id == entity.id() => Some(c),
            _ => None,
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    /// Iterate over all (entity, component) pairs, including entities that
    /// are dead but not yet swept.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.data.iter().enumerate().filter_map(|(idx, slot)| {
            slot.as_ref()
                .map(|(id, c)| (Entity::new(idx as u32, *id), c))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> {
        self.data.iter_mut().enumerate().filter_map(|(idx, slot)| {
            slot.as_mut()
                .map(|(id, c)| (Entity::new(idx as u32, *id), c))
        })
    }

    /// Clear whatever occupies a slot. Called when an entity is swept.
    pub fn clear_slot(&mut self, index: u32) {
        if let Some(slot) = self.data.get_mut(index as usize) {
            *slot = None;
        }
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Number of entities that have this component.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|slot| slot.is_some()).count()
    }
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}
