//! Event System
//!
//! Systems report what happened during a frame by sending events instead of
//! calling into outside code. The host drains them after the frame:
//! 1. Collision resolver hits a level door → sends LevelTransitionEvent
//! 2. Host reads it and loads the next level
//! 3. Audio/VFX read DamageEvent and TileBrokenEvent for feedback
//!
//! The core never performs a level transition itself.

use macroquad::math::Vec2;

use super::components::PickupKind;
use super::entity::{Entity, Tag};

/// A queue for events of a single type.
/// Events are collected during the frame and drained at specific points.
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    /// Iterate over events without clearing
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    /// Drain all events (returns iterator and clears queue)
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.events.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for all simulation events.
#[derive(Debug, Default)]
pub struct Events {
    /// A player touched a level door
    pub level_transition: EventQueue<LevelTransitionEvent>,

    /// Damage landed on an entity
    pub damage: EventQueue<DamageEvent>,

    /// An entity's health reached zero
    pub death: EventQueue<DeathEvent>,

    /// A pickup was collected
    pub item_collected: EventQueue<ItemCollectedEvent>,

    /// A breakable tile shattered
    pub tile_broken: EventQueue<TileEvent>,

    /// A container tile opened
    pub container_opened: EventQueue<TileEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all event queues. Call at the start of a frame.
    pub fn clear_all(&mut self) {
        self.level_transition.clear();
        self.damage.clear();
        self.death.clear();
        self.item_collected.clear();
        self.tile_broken.clear();
        self.container_opened.clear();
    }
}

// =============================================================================
// Event Types
// =============================================================================

/// Request to move to another level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelTransitionEvent {
    pub player: Entity,
    /// Target level identifier carried by the door
    pub target: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageEvent {
    pub target: Entity,
    /// Owner of the weapon that landed the hit (`Entity::NULL` if unowned)
    pub source: Entity,
    pub amount: i32,
    /// Health left after the hit
    pub remaining: i32,
    /// Whether the hit rolled a critical knockback
    pub knockback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathEvent {
    pub entity: Entity,
    pub tag: Tag,
    pub killer: Option<Entity>,
    /// Where they died (for drops, VFX)
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemCollectedEvent {
    /// The pickup entity (destroyed)
    pub item: Entity,
    pub collector: Entity,
    /// Copied since the entity will be gone
    pub kind: PickupKind,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileEvent {
    pub tile: Entity,
    /// Body, weapon owner, or unowned weapon that triggered it
    pub by: Entity,
    pub position: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_queue() {
        let mut queue: EventQueue<i32> = EventQueue::new();

        queue.send(1);
        queue.send(2);
        queue.send(3);

        assert_eq!(queue.len(), 3);

        let collected: Vec<_> = queue.drain().collect();
        assert_eq!(collected, vec![1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_events_container() {
        let mut events = Events::new();

        events.level_transition.send(LevelTransitionEvent {
            player: Entity::default(),
            target: "levels/cave.ron".to_string(),
        });
        assert_eq!(events.level_transition.len(), 1);

        events.clear_all();
        assert!(events.level_transition.is_empty());
    }
}
