//! Game Components
//!
//! All the component types the simulation stores per entity.
//! Components are plain data structs - behavior lives in systems.

use macroquad::math::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use crate::assets::AnimationClip;

// =============================================================================
// Combat Components
// =============================================================================

/// Health component for damageable entities
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
    /// Seconds of invulnerability remaining after a hit
    pub invulnerability: f32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(0);
        Self {
            current: max,
            max,
            invulnerability: 0.0,
        }
    }

    /// Apply damage unless invulnerable. Returns true if the hit landed.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.invulnerability > 0.0 {
            return false;
        }
        self.current = self.current.saturating_sub(amount).min(self.max).max(0);
        true
    }

    pub fn heal(&mut self, amount: i32) {
        self.current = self.current.saturating_add(amount).min(self.max).max(0);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    pub fn set_invulnerable(&mut self, seconds: f32) {
        self.invulnerability = seconds.max(0.0);
    }

    pub fn tick(&mut self, dt: f32) {
        self.invulnerability = (self.invulnerability - dt).max(0.0);
    }
}

/// Damage-dealing attachment for swords and bullets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    /// Who swung or fired it
    pub owner: Entity,
    pub damage: i32,
    /// Bullets are consumed on impact, melee weapons are not
    pub ranged: bool,
}

// =============================================================================
// Generic State (players, and tiles such as containers)
// =============================================================================

/// Generic mode tag shared by players and stateful tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Run,
    Air,
    Attack,
    Defense,
    Knockback,
    /// Container tile not yet opened
    Inactive,
    /// Container tile already opened
    Activated,
}

/// Independent countdown timers, all in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StateTimers {
    pub attack: f32,
    /// Blocks re-jumping right after takeoff
    pub jump: f32,
    pub knockback: f32,
    pub shoot: f32,
}

impl StateTimers {
    pub fn tick(&mut self, dt: f32) {
        for timer in [
            &mut self.attack,
            &mut self.jump,
            &mut self.knockback,
            &mut self.shoot,
        ] {
            *timer = (*timer - dt).max(0.0);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    pub mode: Mode,
    /// Maintained by the collision resolver
    pub on_ground: bool,
    /// -1.0 = left, 1.0 = right
    pub facing: f32,
    pub timers: StateTimers,
}

impl State {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            on_ground: false,
            facing: 1.0,
            timers: StateTimers::default(),
        }
    }

    pub fn is(&self, mode: Mode) -> bool {
        self.mode == mode
    }

    /// Modes that locomotion (run/idle/air) must not overwrite.
    pub fn holds_action(&self) -> bool {
        match self.mode {
            Mode::Attack | Mode::Defense => true,
            Mode::Knockback => self.timers.knockback > 0.0,
            _ => false,
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new(Mode::Idle)
    }
}

// =============================================================================
// Enemy AI
// =============================================================================

/// Enemy classes, each with its own base stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyClass {
    Fast,
    Normal,
    Strong,
    Elite,
    Emperor,
    Super,
}

/// Base stats for an enemy class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyProfile {
    pub speed: f32,
    pub max_health: i32,
    pub damage: i32,
}

impl EnemyClass {
    pub fn profile(self) -> EnemyProfile {
        let (speed, max_health, damage) = match self {
            EnemyClass::Fast => (180.0, 2, 1),
            EnemyClass::Normal => (120.0, 3, 1),
            EnemyClass::Strong => (80.0, 6, 2),
            EnemyClass::Elite => (140.0, 8, 2),
            EnemyClass::Emperor => (100.0, 15, 3),
            EnemyClass::Super => (160.0, 12, 3),
        };
        EnemyProfile { speed, max_health, damage }
    }

    /// Prefix for animation clip names ("normal_follow", ...).
    pub fn clip_prefix(self) -> &'static str {
        match self {
            EnemyClass::Fast => "fast",
            EnemyClass::Normal => "normal",
            EnemyClass::Strong => "strong",
            EnemyClass::Elite => "elite",
            EnemyClass::Emperor => "emperor",
            EnemyClass::Super => "super",
        }
    }
}

/// How an enemy reacts to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Behavior {
    /// Acquires the player on sight and fights
    #[default]
    Aggressive,
    /// Never acquires the player; idles or patrols
    Passive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiState {
    #[default]
    Idle,
    /// Spotted the player, about to give chase
    Recognition,
    Patrol,
    Follow,
    Attack,
    Knockback,
    /// Terminal, observed by external systems only
    Defeated,
}

impl AiState {
    pub fn name(self) -> &'static str {
        match self {
            AiState::Idle => "idle",
            AiState::Recognition => "recognition",
            AiState::Patrol => "patrol",
            AiState::Follow => "follow",
            AiState::Attack => "attack",
            AiState::Knockback => "knockback",
            AiState::Defeated => "defeated",
        }
    }
}

/// Combat and sight timers, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AiTimers {
    /// Time left in the current attack
    pub attack: f32,
    /// Time until the next attack may start
    pub cooldown: f32,
    pub knockback: f32,
    /// Time since the player was last seen
    pub lost_sight: f32,
    pub recognition: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyAi {
    pub class: EnemyClass,
    pub behavior: Behavior,
    pub state: AiState,
    pub patrol_points: Vec<Vec2>,
    pub patrol_index: usize,
    pub timers: AiTimers,
    /// Line-of-sight distance
    pub sight_range: f32,
    pub attack_radius: f32,
    /// How long the player may stay out of sight before the chase is dropped
    pub grace_period: f32,
    /// Pause between spotting the player and following; 0 follows immediately
    pub recognition_time: f32,
    pub speed: f32,
    pub damage: i32,
    /// -1.0 = left, 1.0 = right
    pub facing: f32,
    /// Ground flag from the AI's own tile scan (not the resolver's)
    pub grounded: bool,
}

impl EnemyAi {
    pub fn new(class: EnemyClass, sight_range: f32, attack_radius: f32, grace_period: f32) -> Self {
        let profile = class.profile();
        Self {
            class,
            behavior: Behavior::default(),
            state: AiState::Idle,
            patrol_points: Vec::new(),
            patrol_index: 0,
            timers: AiTimers::default(),
            sight_range,
            attack_radius,
            grace_period,
            recognition_time: 0.0,
            speed: profile.speed,
            damage: profile.damage,
            facing: -1.0,
            grounded: false,
        }
    }

    pub fn with_patrol(mut self, points: Vec<Vec2>) -> Self {
        if !points.is_empty() {
            self.state = AiState::Patrol;
        }
        self.patrol_points = points;
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_recognition_time(mut self, seconds: f32) -> Self {
        self.recognition_time = seconds.max(0.0);
        self
    }

    pub fn has_patrol(&self) -> bool {
        !self.patrol_points.is_empty()
    }

    /// Resting state when there is nothing to chase.
    pub fn resting_state(&self) -> AiState {
        if self.has_patrol() {
            AiState::Patrol
        } else {
            AiState::Idle
        }
    }

    pub fn current_patrol_point(&self) -> Option<Vec2> {
        self.patrol_points
            .get(self.patrol_index % self.patrol_points.len().max(1))
            .copied()
    }

    /// Advance to the next patrol point, wrapping around.
    pub fn advance_patrol(&mut self) {
        if self.has_patrol() {
            self.patrol_index = (self.patrol_index + 1) % self.patrol_points.len();
        }
    }
}

// =============================================================================
// Lifetime / Physics
// =============================================================================

/// Remaining lifetime for transient entities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifespan {
    pub remaining: f32,
    pub total: f32,
}

impl Lifespan {
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds,
            total: seconds,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining -= dt;
    }

    pub fn expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// Downward acceleration applied while airborne (units per second squared).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub acceleration: f32,
}

impl Gravity {
    pub fn new(acceleration: f32) -> Self {
        Self { acceleration }
    }
}

// =============================================================================
// Tiles and Pickups
// =============================================================================

/// What a tile does when interacted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TileKind {
    /// Plain wall/floor
    Solid,
    /// Shatters into fragments when struck, possibly dropping an item
    Breakable { drop: Option<PickupKind> },
    /// Opens once when struck and releases its item
    Container { item: PickupKind },
    /// Touching it requests a transition to another level
    LevelDoor { target: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub kind: TileKind,
}

impl Tile {
    pub fn new(kind: TileKind) -> Self {
        Self { kind }
    }

    pub fn door_target(&self) -> Option<&str> {
        match &self.kind {
            TileKind::LevelDoor { target } => Some(target),
            _ => None,
        }
    }

    /// Reacts to being struck from below or by a weapon.
    pub fn is_reactive(&self) -> bool {
        matches!(self.kind, TileKind::Breakable { .. } | TileKind::Container { .. })
    }
}

/// Collectable item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    Heart,
    BigHeart,
    Coin,
    Gem,
    Crown,
}

/// What collecting a pickup does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupEffect {
    Heal(i32),
    Score(i32),
}

impl PickupKind {
    pub fn effect(self) -> PickupEffect {
        match self {
            PickupKind::Heart => PickupEffect::Heal(1),
            PickupKind::BigHeart => PickupEffect::Heal(3),
            PickupKind::Coin => PickupEffect::Score(10),
            PickupKind::Gem => PickupEffect::Score(50),
            PickupKind::Crown => PickupEffect::Score(100),
        }
    }

    pub fn clip_name(self) -> &'static str {
        match self {
            PickupKind::Heart => "item_heart",
            PickupKind::BigHeart => "item_big_heart",
            PickupKind::Coin => "item_coin",
            PickupKind::Gem => "item_gem",
            PickupKind::Crown => "item_crown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collectable {
    pub kind: PickupKind,
}

// =============================================================================
// Animation
// =============================================================================

/// Current animation clip and playback position.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub clip: String,
    pub frame: usize,
    pub frame_count: usize,
    /// Frames per second
    pub fps: f32,
    elapsed: f32,
}

impl Animation {
    pub fn from_clip(clip: &AnimationClip) -> Self {
        Self {
            clip: clip.name.clone(),
            frame: 0,
            frame_count: clip.frame_count.max(1),
            fps: clip.fps,
            elapsed: 0.0,
        }
    }

    /// Switch to another clip, restarting playback. No-op if already playing it.
    pub fn play(&mut self, clip: &AnimationClip) {
        if self.clip != clip.name {
            *self = Self::from_clip(clip);
        }
    }

    /// Advance playback by `dt`, skipping as many frames as fit.
    pub fn tick(&mut self, dt: f32) {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return;
        }
        self.elapsed += dt;
        let frame_time = 1.0 / self.fps;
        if self.elapsed < frame_time {
            return;
        }
        let frame_count = self.frame_count.max(1);
        let steps = (self.elapsed / frame_time) as usize;
        self.elapsed %= frame_time;
        self.frame = (self.frame % frame_count + steps % frame_count) % frame_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_respects_invulnerability() {
        let mut health = Health::new(5);
        health.set_invulnerable(0.5);
        assert!(!health.take_damage(3));
        assert_eq!(health.current, 5);

        health.tick(0.5);
        assert!(health.take_damage(3));
        assert_eq!(health.current, 2);
    }

    #[test]
    fn test_damage_floors_at_zero_and_heal_caps() {
        let mut health = Health::new(4);
        health.take_damage(10);
        assert_eq!(health.current, 0);
        assert!(health.is_dead());

        health.heal(2);
        assert_eq!(health.current, 2);
        health.heal(100);
        assert_eq!(health.current, 4);
    }

    #[test]
    fn test_health_stays_in_range_for_negative_amounts() {
        let mut health = Health::new(3);
        health.take_damage(-5);
        assert_eq!(health.current, 3);

        health.heal(-10);
        assert_eq!(health.current, 0);

        health.heal(i32::MAX);
        assert_eq!(health.current, 3);
        health.take_damage(i32::MIN);
        assert_eq!(health.current, 3);
    }

    #[test]
    fn test_state_timers_floor_at_zero() {
        let mut state = State::default();
        state.timers.attack = 0.2;
        state.timers.knockback = 1.0;
        state.timers.tick(0.5);
        assert_eq!(state.timers.attack, 0.0);
        assert_eq!(state.timers.knockback, 0.5);
    }

    #[test]
    fn test_holds_action() {
        let mut state = State::new(Mode::Knockback);
        assert!(!state.holds_action());
        state.timers.knockback = 0.3;
        assert!(state.holds_action());
        assert!(State::new(Mode::Attack).holds_action());
        assert!(!State::new(Mode::Run).holds_action());
    }

    #[test]
    fn test_patrol_wraps() {
        let mut ai = EnemyAi::new(EnemyClass::Normal, 300.0, 40.0, 1.0)
            .with_patrol(vec![Vec2::ZERO, Vec2::new(100.0, 0.0)]);
        assert_eq!(ai.state, AiState::Patrol);
        ai.advance_patrol();
        assert_eq!(ai.current_patrol_point(), Some(Vec2::new(100.0, 0.0)));
        ai.advance_patrol();
        assert_eq!(ai.current_patrol_point(), Some(Vec2::ZERO));
    }

    #[test]
    fn test_no_patrol_rests_idle() {
        let ai = EnemyAi::new(EnemyClass::Fast, 300.0, 40.0, 1.0);
        assert_eq!(ai.resting_state(), AiState::Idle);
        assert_eq!(ai.current_patrol_point(), None);
    }

    #[test]
    fn test_pickup_lookup() {
        assert_eq!(PickupKind::Heart.effect(), PickupEffect::Heal(1));
        assert_eq!(PickupKind::Gem.effect(), PickupEffect::Score(50));
    }

    #[test]
    fn test_lifespan_expiry() {
        let mut life = Lifespan::new(0.25);
        life.tick(0.1);
        assert!(!life.expired());
        life.tick(0.15);
        assert!(life.expired());
    }

    #[test]
    fn test_animation_advances_and_wraps() {
        let clip = AnimationClip::new("run", 3, 10.0);
        let mut anim = Animation::from_clip(&clip);
        anim.tick(0.25);
        assert_eq!(anim.frame, 2);
        anim.tick(0.1);
        assert_eq!(anim.frame, 0);
    }

    #[test]
    fn test_animation_tick_with_extreme_fps_terminates() {
        let mut fast = Animation::from_clip(&AnimationClip::new("blur", 2, f32::MAX));
        fast.tick(0.016);
        assert!(fast.frame < 2);

        let mut endless = Animation::from_clip(&AnimationClip::new("x", 2, f32::INFINITY));
        endless.tick(0.016);
        assert_eq!(endless.frame, 0);
    }
}
