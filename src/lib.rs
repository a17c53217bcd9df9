//! Sum Siege - a lane-based maths tower-defense combat core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, targeting, collisions, tick)
//! - `maths`: Arithmetic problem provider interface + built-in fallback
//! - `waves`: Cadence-driven monster spawn scheduling
//! - `settings`: Session preferences (audio flags, year level, problem type)

pub mod maths;
pub mod session;
pub mod settings;
pub mod sim;
pub mod waves;

pub use session::SessionContext;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Canvas dimensions (full window, including the input strip)
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;
    /// Play-field height; the strip below it hosts the answer input UI,
    /// so combat physics never uses the full canvas height
    pub const FIELD_HEIGHT: f32 = 520.0;

    /// Lane grid
    pub const LANE_COUNT: usize = 5;
    pub const SLOTS_PER_LANE: usize = 3;

    /// Projectile defaults
    pub const PROJECTILE_RADIUS: f32 = 4.0;
    pub const PROJECTILE_MAX_BOUNCES: u32 = 3;
    /// How far past the left/right edge a projectile may travel before despawn
    pub const OFFSCREEN_MARGIN: f32 = 50.0;
    /// Projectiles spawn this far ahead of the tower center (avoids
    /// colliding with anything sitting on the tower itself)
    pub const MUZZLE_OFFSET: f32 = 30.0;

    /// Monster defaults
    pub const MONSTER_RADIUS: f32 = 16.0;
    pub const MONSTER_BASE_SPEED: f32 = 50.0;
    /// Wrong-answer monsters move this much faster than the wave baseline
    pub const WRONG_SPEED_MULT: f32 = 2.0;

    /// Vertical velocity jitter for Standard tower shots (px/s)
    pub const STANDARD_JITTER: f32 = 30.0;

    /// Player lives at session start
    pub const START_LIVES: u8 = 3;
}

/// Center y of a lane (lanes split the play field evenly)
#[inline]
pub fn lane_y(lane: usize) -> f32 {
    let lane_height = consts::FIELD_HEIGHT / consts::LANE_COUNT as f32;
    lane_height * (lane as f32 + 0.5)
}

/// Center x of a tower slot (slots sit on the left, defender side)
#[inline]
pub fn slot_x(slot: usize) -> f32 {
    60.0 + slot as f32 * 80.0
}

/// Deterministic per-tick pseudo-random in [0, 1) from a pair of counters.
/// The sim avoids threading an RNG through hot paths; hashing the tick
/// counter keeps replays byte-identical for the same seed and inputs.
#[inline]
pub fn hash_unit(ticks: u64, salt: u32) -> f32 {
    let hash = (ticks as u32)
        .wrapping_mul(2654435761)
        .wrapping_add(salt.wrapping_mul(7919));
    (hash % 1000) as f32 / 1000.0
}
