//! Simulation Tuning
//!
//! Every fixed constant the systems use lives here, grouped by concern.
//! Each section has `#[serde(default)]`, so a RON file only needs to list
//! the values it overrides:
//!
//! ```ron
//! (
//!     combat: (knockback_chance: 2),
//!     scoring: (heal_amount: 3),
//! )
//! ```
//!
//! Units are pixels and seconds, y grows downward.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration for players and enemies
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub max_upward_speed: f32,
    /// Horizontal speed above which a grounded player counts as running
    pub run_threshold: f32,
    pub run_speed: f32,
    pub jump_velocity: f32,
    pub jump_cooldown: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 1800.0,
            max_fall_speed: 900.0,
            max_upward_speed: 900.0,
            run_threshold: 10.0,
            run_speed: 240.0,
            jump_velocity: 620.0,
            jump_cooldown: 0.15,
        }
    }
}

/// Player/enemy body contact response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Lower bound on horizontal speed after a side bump
    pub min_bounce_speed: f32,
    /// Vertical separation = max(overlap * factor, min_separation)
    pub separation_factor: f32,
    pub min_separation: f32,
    /// Vertical speed given to bodies separated on Y
    pub vertical_kick: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            min_bounce_speed: 150.0,
            separation_factor: 1.1,
            min_separation: 2.0,
            vertical_kick: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub player_max_health: i32,
    pub weapon_damage: i32,
    pub bullet_damage: i32,
    pub invulnerability_window: f32,
    /// Critical knockback fires with probability 1 / knockback_chance
    pub knockback_chance: u32,
    pub knockback_strength: f32,
    pub knockback_duration: f32,
    /// How long the player stays in the attack mode after a swing
    pub attack_duration: f32,
    pub shoot_cooldown: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            player_max_health: 10,
            weapon_damage: 1,
            bullet_damage: 1,
            invulnerability_window: 0.5,
            knockback_chance: 4,
            knockback_strength: 300.0,
            knockback_duration: 0.3,
            attack_duration: 0.25,
            shoot_cooldown: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Score converted into healing once reached
    pub threshold: i32,
    /// Heal applied to every player per conversion
    pub heal_amount: i32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: 100,
            heal_amount: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub fragment_count: u32,
    pub fragment_speed: f32,
    pub fragment_lifespan: f32,
    pub fragment_size: f32,
    pub weapon_lifespan: f32,
    /// Horizontal offset of a sword from its owner's center
    pub weapon_reach: f32,
    pub weapon_size: f32,
    pub bullet_lifespan: f32,
    pub bullet_speed: f32,
    pub bullet_size: f32,
    pub item_size: f32,
    pub grave_size: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            fragment_count: 4,
            fragment_speed: 180.0,
            fragment_lifespan: 0.8,
            fragment_size: 16.0,
            weapon_lifespan: 0.2,
            weapon_reach: 48.0,
            weapon_size: 40.0,
            bullet_lifespan: 1.5,
            bullet_speed: 480.0,
            bullet_size: 12.0,
            item_size: 32.0,
            grave_size: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Distance at which a patrol point counts as reached
    pub patrol_threshold: f32,
    pub attack_duration: f32,
    pub attack_cooldown: f32,
    pub knockback_duration: f32,
    /// How far below its feet an enemy probes for ground
    pub ground_probe: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            patrol_threshold: 4.0,
            attack_duration: 0.4,
            attack_cooldown: 1.0,
            knockback_duration: 0.4,
            ground_probe: 1.0,
        }
    }
}

/// All tuning for one simulation session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub physics: PhysicsConfig,
    pub contact: ContactConfig,
    pub combat: CombatConfig,
    pub scoring: ScoringConfig,
    pub spawning: SpawnConfig,
    pub ai: AiConfig,
}

impl SimConfig {
    /// Load and validate a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron_str(&contents)?;
        log::info!("loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a config from RON text.
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the simulation produce NaN or stall.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("physics.gravity", self.physics.gravity),
            ("physics.max_fall_speed", self.physics.max_fall_speed),
            ("physics.max_upward_speed", self.physics.max_upward_speed),
            ("physics.run_threshold", self.physics.run_threshold),
            ("physics.run_speed", self.physics.run_speed),
            ("physics.jump_velocity", self.physics.jump_velocity),
            ("physics.jump_cooldown", self.physics.jump_cooldown),
            ("contact.min_bounce_speed", self.contact.min_bounce_speed),
            ("contact.separation_factor", self.contact.separation_factor),
            ("contact.min_separation", self.contact.min_separation),
            ("contact.vertical_kick", self.contact.vertical_kick),
            ("combat.invulnerability_window", self.combat.invulnerability_window),
            ("combat.knockback_strength", self.combat.knockback_strength),
            ("combat.knockback_duration", self.combat.knockback_duration),
            ("combat.attack_duration", self.combat.attack_duration),
            ("combat.shoot_cooldown", self.combat.shoot_cooldown),
            ("spawning.fragment_speed", self.spawning.fragment_speed),
            ("spawning.fragment_lifespan", self.spawning.fragment_lifespan),
            ("spawning.fragment_size", self.spawning.fragment_size),
            ("spawning.weapon_lifespan", self.spawning.weapon_lifespan),
            ("spawning.weapon_reach", self.spawning.weapon_reach),
            ("spawning.weapon_size", self.spawning.weapon_size),
            ("spawning.bullet_lifespan", self.spawning.bullet_lifespan),
            ("spawning.bullet_speed", self.spawning.bullet_speed),
            ("spawning.bullet_size", self.spawning.bullet_size),
            ("spawning.item_size", self.spawning.item_size),
            ("spawning.grave_size", self.spawning.grave_size),
            ("ai.patrol_threshold", self.ai.patrol_threshold),
            ("ai.attack_duration", self.ai.attack_duration),
            ("ai.attack_cooldown", self.ai.attack_cooldown),
            ("ai.knockback_duration", self.ai.knockback_duration),
            ("ai.ground_probe", self.ai.ground_probe),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        for (name, value) in [
            ("combat.weapon_damage", self.combat.weapon_damage),
            ("combat.bullet_damage", self.combat.bullet_damage),
            ("scoring.heal_amount", self.scoring.heal_amount),
        ] {
            if value < 0 {
                return Err(ConfigError::Validation(format!("{} must be non-negative, got {}", name, value)));
            }
        }
        if self.combat.knockback_chance == 0 {
            return Err(ConfigError::Validation(
                "combat.knockback_chance must be at least 1".to_string(),
            ));
        }
        if self.scoring.threshold <= 0 {
            return Err(ConfigError::Validation(format!(
                "scoring.threshold must be positive, got {}",
                self.scoring.threshold
            )));
        }
        if self.combat.player_max_health <= 0 {
            return Err(ConfigError::Validation(format!(
                "combat.player_max_health must be positive, got {}",
                self.combat.player_max_health
            )));
        }
        Ok(())
    }
}
