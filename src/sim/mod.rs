//! Deterministic simulation module
//!
//! All combat logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded or hash-derived randomness only
//! - Stable iteration order (pools keep entity-id order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod targeting;
pub mod tick;

pub use collision::{Contact, Resolution, burst_bullets, detect_contacts, resolve};
pub use state::{
    Activation, Archetype, Bounds, ClusterSpec, Difficulty, GamePhase, GameState, Ledger, Monster,
    Projectile, ProjectileKind, Tower, TowerSpec,
};
pub use targeting::{fire, firing_vectors};
pub use tick::{PlaceCommand, TickEvents, TickInput, tick};
