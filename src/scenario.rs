//! Scenario Files
//!
//! A scenario is a level that has already been expanded into positioned,
//! tagged entity records, plus an optional input script for headless runs.
//! Text level formats are parsed elsewhere; this only places entities.
//!
//! ```ron
//! (
//!     name: "stomp",
//!     entities: [
//!         (tag: "player", position: Some((100.0, 100.0)), size: Some((40.0, 40.0))),
//!         (tag: "tile", position: Some((100.0, 200.0)), size: Some((400.0, 32.0))),
//!         (tag: "tile", position: Some((200.0, 150.0)), size: Some((32.0, 32.0)),
//!             tile: Some(Breakable(drop: Some(Gem)))),
//!         (tag: "enemy", position: Some((300.0, 160.0)), size: Some((40.0, 40.0)),
//!             enemy: Some((class: Normal, sight_range: Some(250.0), attack_radius: Some(40.0),
//!                          grace_period: Some(1.0)))),
//!     ],
//!     inputs: [(start: 0, frames: 60, hold: [MoveRight])],
//! )
//! ```
//!
//! A record that is incomplete or nonsensical (unknown tag, missing size,
//! enemy without AI data, ...) is skipped with a warning. Only an unreadable
//! or syntactically broken file is an error.

use std::fs;
use std::path::Path;

use macroquad::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::ScenarioError;
use crate::game::components::{Behavior, EnemyAi, EnemyClass, PickupKind, TileKind};
use crate::game::entity::{Entity, Tag};
use crate::game::transform::{BoundingBox, Transform};
use crate::game::world::World;
use crate::input::{Action, InputSnapshot};

/// Per-enemy AI data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyRecord {
    pub class: EnemyClass,
    #[serde(default)]
    pub behavior: Behavior,
    #[serde(default)]
    pub sight_range: Option<f32>,
    #[serde(default)]
    pub attack_radius: Option<f32>,
    #[serde(default)]
    pub grace_period: Option<f32>,
    #[serde(default)]
    pub recognition_time: f32,
    #[serde(default)]
    pub patrol: Vec<(f32, f32)>,
}

impl EnemyRecord {
    fn build(&self) -> Result<EnemyAi, String> {
        let sight_range = self.sight_range.ok_or("enemy is missing sight_range")?;
        let attack_radius = self.attack_radius.ok_or("enemy is missing attack_radius")?;
        let grace_period = self.grace_period.ok_or("enemy is missing grace_period")?;
        for (name, value) in [
            ("sight_range", sight_range),
            ("attack_radius", attack_radius),
            ("grace_period", grace_period),
            ("recognition_time", self.recognition_time),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("enemy {} must be finite and non-negative, got {}", name, value));
            }
        }
        if let Some(&(x, y)) = self.patrol.iter().find(|(x, y)| !(x.is_finite() && y.is_finite())) {
            return Err(format!("enemy patrol point ({}, {}) is not finite", x, y));
        }
        let patrol = self.patrol.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
        Ok(EnemyAi::new(self.class, sight_range, attack_radius, grace_period)
            .with_behavior(self.behavior)
            .with_recognition_time(self.recognition_time)
            .with_patrol(patrol))
    }
}

/// One pre-expanded level entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub tag: String,
    #[serde(default)]
    pub position: Option<(f32, f32)>,
    #[serde(default)]
    pub size: Option<(f32, f32)>,
    /// Tiles only; defaults to a plain solid tile
    #[serde(default)]
    pub tile: Option<TileKind>,
    /// Collectables only
    #[serde(default)]
    pub pickup: Option<PickupKind>,
    /// Enemies only
    #[serde(default)]
    pub enemy: Option<EnemyRecord>,
}

impl EntityRecord {
    /// Place this record in the world, or explain why it can't be.
    pub fn spawn(&self, world: &mut World, config: &SimConfig) -> Result<Entity, String> {
        let tag: Tag = self.tag.parse()?;
        if tag.is_transient() {
            return Err(format!("'{}' entities are spawned at runtime, not placed", tag));
        }
        let (x, y) = self.position.ok_or("missing position")?;
        let (w, h) = self.size.ok_or("missing size")?;
        if !(x.is_finite() && y.is_finite()) {
            return Err(format!("position ({}, {}) is not finite", x, y));
        }
        if !(w.is_finite() && h.is_finite()) || w <= 0.0 || h <= 0.0 {
            return Err(format!("size ({}, {}) must be positive", w, h));
        }
        let position = Vec2::new(x, y);
        let bounds = BoundingBox::new(w, h);

        let entity = match tag {
            Tag::Player => world.spawn_player(
                position,
                bounds,
                config.combat.player_max_health,
                config.physics.gravity,
            ),
            Tag::Enemy => {
                let ai = self.enemy.as_ref().ok_or("enemy without AI data")?.build()?;
                world.spawn_enemy(position, bounds, ai, config.physics.gravity)
            }
            Tag::Tile => {
                let kind = self.tile.clone().unwrap_or(TileKind::Solid);
                world.spawn_tile(position, bounds, kind)
            }
            Tag::Collectable => {
                let kind = self.pickup.ok_or("collectable without pickup kind")?;
                world.spawn_collectable(position, bounds, kind)
            }
            _ => {
                let entity = world.create(tag);
                world.insert(entity, Transform::from_position(position));
                world.insert(entity, bounds);
                entity
            }
        };
        Ok(entity)
    }
}

/// Input held over a range of frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedInput {
    pub start: u64,
    pub frames: u64,
    #[serde(default)]
    pub hold: Vec<Action>,
    #[serde(default)]
    pub suspended: bool,
}

impl ScriptedInput {
    fn covers(&self, frame: u64) -> bool {
        frame >= self.start && frame - self.start < self.frames
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub entities: Vec<EntityRecord>,
    #[serde(default)]
    pub inputs: Vec<ScriptedInput>,
}

/// What `Scenario::populate` did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateReport {
    pub spawned: usize,
    pub skipped: usize,
}

impl Scenario {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::from_ron_str(&contents)?;
        log::info!(
            "loaded scenario '{}' ({} records) from {}",
            scenario.name,
            scenario.entities.len(),
            path.display()
        );
        Ok(scenario)
    }

    pub fn from_ron_str(contents: &str) -> Result<Self, ScenarioError> {
        Ok(ron::from_str(contents)?)
    }

    /// Queue every valid record into the world. Entities become visible at
    /// the next `World::sync()`.
    pub fn populate(&self, world: &mut World, config: &SimConfig) -> PopulateReport {
        let mut report = PopulateReport::default();
        for (index, record) in self.entities.iter().enumerate() {
            match record.spawn(world, config) {
                Ok(_) => report.spawned += 1,
                Err(reason) => {
                    log::warn!("skipping entity record {} ('{}'): {}", index, record.tag, reason);
                    report.skipped += 1;
                }
            }
        }
        report
    }

    /// Input for a frame: the union of every script covering it.
    pub fn input_at(&self, frame: u64) -> InputSnapshot {
        let mut input = InputSnapshot::idle();
        for script in self.inputs.iter().filter(|s| s.covers(frame)) {
            for &action in &script.hold {
                input.press(action);
            }
            input.suspended |= script.suspended;
        }
        input
    }
}
