//! Entity Handles and Allocation
//!
//! Entities are lightweight identifiers that reference simulated objects.
//! Each handle carries the slot it lives in plus a session-unique id:
//! - Ids are handed out monotonically and never repeat within a session
//! - Slots are reused after an entity is swept, but the id changes
//! - A handle whose id no longer matches its slot is stale and resolves to nothing
//!
//! This matters for combat: a weapon that remembers its owner must not
//! accidentally point at a fragment that reused the owner's slot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A unique identifier for a simulated entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    /// Index into the slot arrays
    index: u32,
    /// Session-unique id, doubles as the slot generation
    id: u64,
}

impl Entity {
    pub(crate) fn new(index: u32, id: u64) -> Self {
        Self { index, id }
    }

    /// Slot index (for component array access).
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Session-unique id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// A null/invalid entity reference ("no owner", "no target").
    pub const NULL: Entity = Entity { index: u32::MAX, id: u64::MAX };

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Entity::NULL
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// Category used to classify and bulk-query entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Player,
    Enemy,
    Tile,
    Decoration,
    /// Player melee weapon
    Sword,
    /// Enemy melee weapon
    EnemySword,
    PlayerBullet,
    EnemyBullet,
    /// Debris from a broken tile
    Fragment,
    Collectable,
    /// Left behind by a defeated enemy
    Grave,
}

impl Tag {
    pub const COUNT: usize = 11;

    pub const ALL: [Tag; Tag::COUNT] = [
        Tag::Player,
        Tag::Enemy,
        Tag::Tile,
        Tag::Decoration,
        Tag::Sword,
        Tag::EnemySword,
        Tag::PlayerBullet,
        Tag::EnemyBullet,
        Tag::Fragment,
        Tag::Collectable,
        Tag::Grave,
    ];

    /// Bucket index for tag-indexed storage.
    pub fn bucket(self) -> usize {
        self as usize
    }

    /// Transient entities are destroyed when their lifespan runs out.
    /// Every other tag ignores the Lifespan component.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Tag::Sword | Tag::EnemySword | Tag::PlayerBullet | Tag::EnemyBullet | Tag::Fragment
        )
    }

    /// Weapons owned by the enemy side.
    pub fn is_enemy_weapon(self) -> bool {
        matches!(self, Tag::EnemySword | Tag::EnemyBullet)
    }

    pub fn name(self) -> &'static str {
        match self {
            Tag::Player => "player",
            Tag::Enemy => "enemy",
            Tag::Tile => "tile",
            Tag::Decoration => "decoration",
            Tag::Sword => "sword",
            Tag::EnemySword => "enemySword",
            Tag::PlayerBullet => "playerBullet",
            Tag::EnemyBullet => "enemyBullet",
            Tag::Fragment => "fragment",
            Tag::Collectable => "collectable",
            Tag::Grave => "grave",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tag::ALL
            .iter()
            .copied()
            .find(|tag| tag.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tag '{}'", s))
    }
}

/// Bookkeeping for one occupied slot.
#[derive(Debug, Clone, Copy)]
struct Slot {
    id: u64,
    tag: Tag,
    alive: bool,
}

/// Allocates and tracks entity lifetimes.
///
/// Destroying an entity only flips its aliveness flag; the slot stays
/// occupied (and its components readable) until the world sweeps it with
/// `release`. This is what lets dead entities remain visible for the
/// rest of the frame.
pub struct EntityAllocator {
    slots: Vec<Option<Slot>>,
    /// Free slots available for reuse (LIFO for cache friendliness)
    free_indices: Vec<u32>,
    /// Next id to hand out
    next_id: u64,
    /// Number of allocated entities not yet destroyed
    alive_count: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_indices: Vec::new(),
            next_id: 0,
            alive_count: 0,
        }
    }

    /// Allocate a new live entity with the given tag.
    pub fn allocate(&mut self, tag: Tag) -> Entity {
        let id = self.next_id;
        self.next_id += 1;
        self.alive_count += 1;
        let slot = Slot { id, tag, alive: true };

        if let Some(index) = self.free_indices.pop() {
            self.slots[index as usize] = Some(slot);
            Entity::new(index, id)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Some(slot));
            Entity::new(index, id)
        }
    }

    fn slot(&self, entity: Entity) -> Option<&Slot> {
        if entity.is_null() {
            return None;
        }
        self.slots
            .get(entity.index as usize)
            .and_then(|s| s.as_ref())
            .filter(|s| s.id == entity.id)
    }

    /// Mark an entity dead. Returns true if it was alive.
    pub fn kill(&mut self, entity: Entity) -> bool {
        if entity.is_null() {
            return false;
        }
        match self.slots.get_mut(entity.index as usize) {
            Some(Some(slot)) if slot.id == entity.id && slot.alive => {
                slot.alive = false;
                self.alive_count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Free the slot of a dead entity so it can be reused.
    /// Returns false if the handle is stale or the entity is still alive.
    pub fn release(&mut self, entity: Entity) -> bool {
        match self.slot(entity) {
            Some(slot) if !slot.alive => {
                self.slots[entity.index as usize] = None;
                self.free_indices.push(entity.index);
                true
            }
            _ => false,
        }
    }

    /// Check if an entity is allocated and not destroyed.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slot(entity).is_some_and(|s| s.alive)
    }

    /// Check if the handle still refers to its slot (alive or not yet swept).
    pub fn is_current(&self, entity: Entity) -> bool {
        self.slot(entity).is_some()
    }

    pub fn tag(&self, entity: Entity) -> Option<Tag> {
        self.slot(entity).map(|s| s.tag)
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }

    /// Forget every entity and restart the id counter.
    /// Only valid between independent play sessions.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_indices.clear();
        self.next_id = 0;
        self.alive_count = 0;
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_kill() {
        let mut alloc = EntityAllocator::new();

        let e1 = alloc.allocate(Tag::Player);
        let e2 = alloc.allocate(Tag::Enemy);
        assert_eq!(alloc.alive_count(), 2);
        assert!(alloc.is_alive(e1));
        assert_eq!(alloc.tag(e2), Some(Tag::Enemy));

        assert!(alloc.kill(e1));
        assert!(!alloc.kill(e1));
        assert_eq!(alloc.alive_count(), 1);
        assert!(!alloc.is_alive(e1));
        // Dead but not swept: the handle still resolves
        assert!(alloc.is_current(e1));
    }

    #[test]
    fn test_release_requires_dead_entity() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.allocate(Tag::Tile);
        assert!(!alloc.release(e));
        alloc.kill(e);
        assert!(alloc.release(e));
        assert!(!alloc.is_current(e));
    }

    #[test]
    fn test_reused_slot_gets_new_id() {
        let mut alloc = EntityAllocator::new();

        let e1 = alloc.allocate(Tag::Fragment);
        alloc.kill(e1);
        alloc.release(e1);

        let e2 = alloc.allocate(Tag::Sword);
        assert_eq!(e2.index(), e1.index());
        assert!(e2.id() > e1.id());
        assert!(!alloc.is_alive(e1));
        assert_eq!(alloc.tag(e1), None);
        assert!(alloc.is_alive(e2));
    }

    #[test]
    fn test_clear_restarts_ids() {
        let mut alloc = EntityAllocator::new();
        alloc.allocate(Tag::Tile);
        alloc.allocate(Tag::Tile);
        alloc.clear();
        assert_eq!(alloc.alive_count(), 0);
        assert_eq!(alloc.allocate(Tag::Player).id(), 0);
    }

    #[test]
    fn test_null_entity() {
        let alloc = EntityAllocator::new();
        assert!(!alloc.is_alive(Entity::NULL));
        assert!(Entity::NULL.is_null());
        assert_eq!(Entity::default(), Entity::NULL);
    }

    #[test]
    fn test_tag_parsing() {
        assert_eq!("enemySword".parse::<Tag>(), Ok(Tag::EnemySword));
        assert_eq!("PLAYER".parse::<Tag>(), Ok(Tag::Player));
        assert!("dragon".parse::<Tag>().is_err());
        assert!(Tag::Fragment.is_transient());
        assert!(!Tag::Grave.is_transient());
    }
}
