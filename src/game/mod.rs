//! Game Simulation Module
//!
//! A small ECS-style simulation core for a 2D action platformer:
//! players, enemies, tiles, weapons and pickups, advanced one fixed frame
//! at a time.
//!
//! Key concepts:
//! - Entity: slot index plus a session-unique id, so stale handles miss
//! - Component: plain data structs attached to entities
//! - World: typed component storages, tag buckets, deferred create/destroy
//! - Event: what happened this frame, for the host to act on
//!
//! Design philosophy:
//! - Simple over flexible (we know what game we're making)
//! - No runtime type registration (compile-time known components)
//! - Systems are free functions over `&mut World`

pub mod ai;
pub mod collision;
pub mod component;
pub mod components;
pub mod entity;
pub mod event;
pub mod geometry;
pub mod knockback;
pub mod lifespan;
pub mod movement;
pub mod runtime;
pub mod spawn;
pub mod transform;
pub mod world;

// Re-export main types
pub use entity::{Entity, Tag};
pub use event::Events;
pub use runtime::Simulation;
pub use world::World;
