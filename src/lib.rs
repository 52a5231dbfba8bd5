//! Knightfall: per-frame simulation core for a 2D tile-based action game
//!
//! Players, enemies, breakable tiles, weapons and pickups on a flat 2D
//! plane, stepped one fixed frame at a time. No rendering or audio; the
//! host reads positions, animation frames and events after each step.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod assets;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod scenario;
