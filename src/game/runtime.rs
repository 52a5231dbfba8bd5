//! Simulation Runtime
//!
//! Owns the world and everything the systems share, and runs one frame at a
//! time in a fixed order. Single-threaded; correctness depends on the order:
//!
//! input → sync → AI → gravity/integration → collision passes 1-7 → timers
//!
//! Events are cleared at the start of every step, so the host reads them
//! between steps.

use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use super::ai::update_enemies;
use super::collision::{resolve_collisions, CollisionContext, Score};
use super::entity::{Entity, Tag};
use super::lifespan::{expire_transients, tick_animations, tick_health};
use super::movement::{apply_gravity, control_players, integrate};
use super::spawn::{Spawner, StandardSpawner};
use super::{Events, World};
use crate::assets::AnimationLibrary;
use crate::config::SimConfig;
use crate::input::InputSnapshot;
use crate::scenario::{PopulateReport, Scenario};

/// One play session.
pub struct Simulation {
    /// ECS world containing all entities
    pub world: World,

    /// Event queues, refilled every step
    pub events: Events,

    /// Shared score counter
    pub score: Score,

    /// Is the simulation advancing? (vs paused)
    pub playing: bool,

    config: Rc<SimConfig>,
    assets: Rc<dyn AnimationLibrary>,
    spawner: Box<dyn Spawner>,
    rng: Box<dyn RngCore>,
    frame: u64,
}

impl Simulation {
    /// New session with the standard spawner and a seeded RNG.
    pub fn new(config: SimConfig, assets: Rc<dyn AnimationLibrary>, seed: u64) -> Self {
        let config = Rc::new(config);
        let spawner = StandardSpawner::new(config.clone(), assets.clone());
        Self {
            world: World::new(),
            events: Events::new(),
            score: Score::default(),
            playing: true,
            config,
            assets,
            spawner: Box::new(spawner),
            rng: Box::new(StdRng::seed_from_u64(seed)),
            frame: 0,
        }
    }

    /// Replace the spawner (tests, alternative content).
    pub fn with_spawner(mut self, spawner: Box<dyn Spawner>) -> Self {
        self.spawner = spawner;
        self
    }

    /// Replace the random source used for critical knockback rolls.
    pub fn with_rng(mut self, rng: Box<dyn RngCore>) -> Self {
        self.rng = rng;
        self
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Number of steps run since creation or the last reset.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// First live player, if any.
    pub fn player(&self) -> Option<Entity> {
        self.world.first_alive(Tag::Player)
    }

    /// Queue a scenario's entities. They appear after the next step's sync.
    pub fn load_scenario(&mut self, scenario: &Scenario) -> PopulateReport {
        let report = scenario.populate(&mut self.world, &self.config);
        log::info!(
            "scenario '{}': {} entities queued, {} skipped",
            scenario.name,
            report.spawned,
            report.skipped
        );
        report
    }

    /// Toggle play/pause state
    pub fn toggle_playing(&mut self) {
        self.playing = !self.playing;
    }

    /// Wipe the session: entities, events, score and frame counter.
    pub fn reset(&mut self) {
        self.world.clear();
        self.events.clear_all();
        self.score = Score::default();
        self.frame = 0;
    }

    /// Run one frame of game simulation
    pub fn step(&mut self, input: &InputSnapshot, dt: f32) {
        if !self.playing {
            return;
        }
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("ignoring step with invalid dt {}", dt);
            return;
        }
        let config = self.config.clone();
        self.events.clear_all();

        // =====================================================================
        // Input: player control and weapon spawns
        // =====================================================================
        control_players(&mut self.world, &config, self.spawner.as_mut(), input, dt);

        // =====================================================================
        // Sync: promote new entities, sweep last frame's dead
        // =====================================================================
        self.world.sync();

        // =====================================================================
        // Enemy AI
        // =====================================================================
        update_enemies(
            &mut self.world,
            &config,
            self.spawner.as_mut(),
            self.assets.as_ref(),
            dt,
        );

        // =====================================================================
        // Movement
        // =====================================================================
        apply_gravity(&mut self.world, &config, dt);
        integrate(&mut self.world, dt);

        // =====================================================================
        // Collision
        // =====================================================================
        let mut ctx = CollisionContext {
            config: &config,
            score: &mut self.score,
            events: &mut self.events,
            spawner: self.spawner.as_mut(),
            rng: self.rng.as_mut(),
        };
        resolve_collisions(&mut self.world, &mut ctx);

        // =====================================================================
        // Timers: lifespans, invulnerability, animation
        // =====================================================================
        let expired = expire_transients(&mut self.world, dt);
        tick_health(&mut self.world, dt);
        tick_animations(&mut self.world, dt);

        if expired > 0 {
            log::trace!("frame {}: {} transients expired", self.frame, expired);
        }
        self.frame += 1;
    }
}
