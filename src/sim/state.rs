//! Game state and core simulation types
//!
//! Entity records are pure state holders; all behavior beyond simple state
//! transitions (damage, bounce accounting, expiry) lives in the sibling
//! modules. Everything here must stay deterministic and serializable.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::maths::Problem;
use crate::{lane_y, slot_x};

/// Difficulty tag driving damage scaling and collision eligibility.
///
/// `Wrong` marks the penalty monsters spawned on incorrect answers; towers
/// and their projectiles never carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Cluster,
    Wrong,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Cluster => "cluster",
            Difficulty::Wrong => "wrong",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "cluster" => Some(Difficulty::Cluster),
            "wrong" => Some(Difficulty::Wrong),
            _ => None,
        }
    }

    /// Points awarded when a monster of this difficulty dies
    pub fn points(&self) -> u64 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 20,
            Difficulty::Hard => 30,
            Difficulty::Cluster => 50,
            Difficulty::Wrong => 25,
        }
    }

    /// Starting health for a monster of this difficulty
    pub fn monster_health(&self) -> i32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::Cluster => 3,
            Difficulty::Wrong => 3,
        }
    }
}

/// Play-field bounds handed to strategies and expiry checks
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: FIELD_HEIGHT,
        }
    }
}

/// Tower behavioral variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Archetype {
    Standard,
    Spread,
    Sniper,
}

/// Projectile behavioral variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectileKind {
    #[default]
    Bullet,
    Cluster,
}

/// Sub-spawn parameters carried by cluster shells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub count: u32,
    pub damage: i32,
    pub speed: f32,
}

/// Resolved per-difficulty tower configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TowerSpec {
    pub archetype: Archetype,
    /// Base cooldown between shots, milliseconds
    pub cooldown_ms: f32,
    /// Targeting range (Sniper only; unused by the other archetypes)
    pub range: f32,
    pub projectile_count: u32,
    pub spread_angle_deg: f32,
    pub damage: i32,
    pub projectile_speed: f32,
    pub projectile_kind: ProjectileKind,
    pub cluster: Option<ClusterSpec>,
    /// Cooldown multiplier applied per correct answer while active
    pub rate_scale: f32,
    /// Cooldown floor as a fraction of the base duration
    pub min_cooldown_frac: f32,
}

impl TowerSpec {
    /// Look up the configuration for a tower difficulty.
    ///
    /// `Wrong` is not a placeable difficulty; requesting it is a
    /// configuration error that falls back to the Easy/Standard spec.
    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                archetype: Archetype::Standard,
                cooldown_ms: 2000.0,
                range: 0.0,
                projectile_count: 1,
                spread_angle_deg: 0.0,
                damage: 1,
                projectile_speed: 300.0,
                projectile_kind: ProjectileKind::Bullet,
                cluster: None,
                rate_scale: 0.85,
                min_cooldown_frac: 0.3,
            },
            Difficulty::Medium => Self {
                archetype: Archetype::Spread,
                cooldown_ms: 2500.0,
                range: 0.0,
                projectile_count: 3,
                spread_angle_deg: 30.0,
                damage: 1,
                projectile_speed: 280.0,
                projectile_kind: ProjectileKind::Bullet,
                cluster: None,
                rate_scale: 0.9,
                min_cooldown_frac: 0.3,
            },
            Difficulty::Hard => Self {
                archetype: Archetype::Sniper,
                cooldown_ms: 3000.0,
                range: 400.0,
                projectile_count: 1,
                spread_angle_deg: 0.0,
                damage: 2,
                projectile_speed: 500.0,
                projectile_kind: ProjectileKind::Bullet,
                cluster: None,
                rate_scale: 0.9,
                min_cooldown_frac: 0.3,
            },
            Difficulty::Cluster => Self {
                archetype: Archetype::Standard,
                cooldown_ms: 3500.0,
                range: 0.0,
                projectile_count: 1,
                spread_angle_deg: 0.0,
                damage: 0,
                projectile_speed: 250.0,
                projectile_kind: ProjectileKind::Cluster,
                cluster: Some(ClusterSpec {
                    count: 5,
                    damage: 1,
                    speed: 300.0,
                }),
                rate_scale: 0.9,
                min_cooldown_frac: 0.3,
            },
            Difficulty::Wrong => {
                log::warn!("'wrong' is not a placeable tower difficulty, using easy");
                Self::for_difficulty(Difficulty::Easy)
            }
        }
    }
}

/// Tower firing state. Activation is one-way within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    /// Assigned a problem, does not fire
    Dormant,
    /// Fires whenever the cooldown expires
    Active,
}

/// A tower entity, fixed to one (lane, slot) cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tower {
    pub id: u32,
    pub lane: usize,
    pub slot: usize,
    pub difficulty: Difficulty,
    pub spec: TowerSpec,
    /// Current cooldown duration (shrinks with correct answers)
    pub cooldown_ms: f32,
    /// Time until the next shot is allowed
    pub cooldown_left_ms: f32,
    pub activation: Activation,
    /// Problem currently displayed on this tower, from the maths provider
    pub problem: Option<Problem>,
}

impl Tower {
    pub fn new(id: u32, lane: usize, slot: usize, difficulty: Difficulty) -> Self {
        let spec = TowerSpec::for_difficulty(difficulty);
        // The fallback spec must agree with the tag projectiles inherit
        let difficulty = if difficulty == Difficulty::Wrong {
            Difficulty::Easy
        } else {
            difficulty
        };
        Self {
            id,
            lane,
            slot,
            difficulty,
            spec,
            cooldown_ms: spec.cooldown_ms,
            cooldown_left_ms: spec.cooldown_ms,
            activation: Activation::Dormant,
            problem: None,
        }
    }

    /// World position of the tower center
    pub fn pos(&self) -> Vec2 {
        Vec2::new(slot_x(self.slot), lane_y(self.lane))
    }

    pub fn is_active(&self) -> bool {
        self.activation == Activation::Active
    }

    /// One-way transition; returns true only on the first call
    pub fn activate(&mut self) -> bool {
        if self.activation == Activation::Dormant {
            self.activation = Activation::Active;
            true
        } else {
            false
        }
    }

    /// Shrink the cooldown duration per the archetype schedule (called on
    /// each correct answer after activation). Bounded below by the floor.
    pub fn boost_fire_rate(&mut self) {
        let floor = self.spec.cooldown_ms * self.spec.min_cooldown_frac;
        self.cooldown_ms = (self.cooldown_ms * self.spec.rate_scale).max(floor);
    }

    pub fn advance_cooldown(&mut self, dt_ms: f32) {
        self.cooldown_left_ms = (self.cooldown_left_ms - dt_ms).max(0.0);
    }

    pub fn can_fire(&self) -> bool {
        self.is_active() && self.cooldown_left_ms <= 0.0
    }

    /// Rearm after firing, at the current (possibly reduced) duration
    pub fn reset_cooldown(&mut self) {
        self.cooldown_left_ms = self.cooldown_ms;
    }

    pub fn set_problem(&mut self, problem: Problem) {
        self.problem = Some(problem);
    }
}

/// A monster entity, moving right-to-left across the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub difficulty: Difficulty,
    pub health: i32,
    pub max_health: i32,
    /// Immovable bodies (the wrong variant) are never pushed by impacts
    pub immovable: bool,
    pub alive: bool,
}

impl Monster {
    /// Spawn at the right edge. Angle 0 = straight left; positive angles
    /// add a downward component, negative upward (y-down coordinates).
    pub fn new(id: u32, difficulty: Difficulty, y: f32, angle_deg: f32, speed_mult: f32) -> Self {
        let health = difficulty.monster_health();
        let speed = MONSTER_BASE_SPEED * speed_mult;
        let angle = angle_deg.to_radians();
        Self {
            id,
            pos: Vec2::new(CANVAS_WIDTH + MONSTER_RADIUS, y),
            vel: Vec2::new(-speed * angle.cos(), speed * angle.sin()),
            difficulty,
            health,
            max_health: health,
            immovable: difficulty == Difficulty::Wrong,
            alive: true,
        }
    }

    /// Apply damage, clamped at zero health. Returns true exactly once,
    /// on the hit that kills. Dead monsters ignore further damage.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = (self.health - amount).max(0);
        if self.health == 0 {
            self.alive = false;
            true
        } else {
            false
        }
    }

    /// A monster expires by reaching the defender line on the left; the
    /// surrounding loop charges a life for it.
    pub fn is_expired(&self, _bounds: Bounds) -> bool {
        self.pos.x < 0.0
    }
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Inherited from the firing tower, or `Cluster` for shells
    pub difficulty: Difficulty,
    pub damage: i32,
    pub kind: ProjectileKind,
    /// Sub-spawn parameters (cluster kind only)
    pub cluster: Option<ClusterSpec>,
    pub bounce_count: u32,
    pub max_bounces: u32,
    pub alive: bool,
}

impl Projectile {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, difficulty: Difficulty, damage: i32) -> Self {
        Self {
            id,
            pos,
            vel,
            difficulty,
            damage,
            kind: ProjectileKind::Bullet,
            cluster: None,
            bounce_count: 0,
            max_bounces: PROJECTILE_MAX_BOUNCES,
            alive: true,
        }
    }

    pub fn new_cluster(id: u32, pos: Vec2, vel: Vec2, spec: ClusterSpec) -> Self {
        Self {
            id,
            pos,
            vel,
            difficulty: Difficulty::Cluster,
            // Cluster shells deal no direct damage; the burst does the work
            damage: 0,
            kind: ProjectileKind::Cluster,
            cluster: Some(spec),
            bounce_count: 0,
            max_bounces: PROJECTILE_MAX_BOUNCES,
            alive: true,
        }
    }

    /// Count a reflection event. Returns true when the projectile is
    /// destroyed (on the bounce that reaches the maximum, never before).
    pub fn register_bounce(&mut self) -> bool {
        if !self.alive {
            return true;
        }
        self.bounce_count += 1;
        if self.bounce_count >= self.max_bounces {
            self.alive = false;
            true
        } else {
            false
        }
    }

    pub fn destroy(&mut self) {
        self.alive = false;
    }

    /// Projectiles leave play through the left/right edges
    pub fn is_expired(&self, bounds: Bounds) -> bool {
        self.pos.x < -OFFSCREEN_MARGIN || self.pos.x > bounds.width + OFFSCREEN_MARGIN
    }
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    GameOver,
}

/// Score/lives sub-interface handed to collision resolution.
///
/// The combat core only ever sees this slice of the session, never the
/// full settings/audio context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Ledger {
    pub score: u64,
    pub lives: u8,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            score: 0,
            lives: START_LIVES,
        }
    }

    pub fn award(&mut self, points: u64) {
        self.score += points;
    }

    /// Charge a life; returns true when the session is over
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.lives == 0
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete combat state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub bounds: Bounds,
    pub ledger: Ledger,
    /// Tower pool, in placement order (stable iteration)
    pub towers: Vec<Tower>,
    /// Monster pool, in spawn order
    pub monsters: Vec<Monster>,
    /// Projectile pool, in spawn order
    pub projectiles: Vec<Projectile>,
    /// Cell occupancy: slots[lane][slot] = tower id
    pub slots: Vec<Vec<Option<u32>>>,
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            time_ticks: 0,
            phase: GamePhase::Playing,
            bounds: Bounds::default(),
            ledger: Ledger::new(),
            towers: Vec::new(),
            monsters: Vec::new(),
            projectiles: Vec::new(),
            slots: vec![vec![None; SLOTS_PER_LANE]; LANE_COUNT],
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Assign a difficulty to a slot cell. Any existing tower in the cell is
    /// torn down first; `None` just clears the cell. Returns the new tower's
    /// id so the caller can hand it a problem.
    pub fn place_tower(
        &mut self,
        lane: usize,
        slot: usize,
        difficulty: Option<Difficulty>,
    ) -> Option<u32> {
        if lane >= LANE_COUNT || slot >= SLOTS_PER_LANE {
            log::warn!("tower placement out of grid: lane {lane}, slot {slot}");
            return None;
        }

        if let Some(old_id) = self.slots[lane][slot].take() {
            self.towers.retain(|t| t.id != old_id);
        }

        let difficulty = difficulty?;
        let id = self.next_entity_id();
        self.towers.push(Tower::new(id, lane, slot, difficulty));
        self.slots[lane][slot] = Some(id);
        Some(id)
    }

    pub fn tower_mut(&mut self, id: u32) -> Option<&mut Tower> {
        self.towers.iter_mut().find(|t| t.id == id)
    }

    /// Accept an already-constructed monster from the spawn scheduler
    pub fn spawn_monster(
        &mut self,
        difficulty: Difficulty,
        y: f32,
        angle_deg: f32,
        speed_mult: f32,
    ) -> u32 {
        let id = self.next_entity_id();
        self.monsters
            .push(Monster::new(id, difficulty, y, angle_deg, speed_mult));
        id
    }
}
