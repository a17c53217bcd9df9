//! Cadence-driven monster spawn scheduling
//!
//! The combat core only consumes ready-made monsters; this scheduler decides
//! when to hand one over, which difficulty it carries, and the entry angle.
//! All randomness comes from one seeded stream so a session replays exactly.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{FIELD_HEIGHT, MONSTER_RADIUS, WRONG_SPEED_MULT};
use crate::sim::{Difficulty, GameState};

/// Seconds between spawns inside a wave
const SPAWN_INTERVAL: f32 = 2.0;
/// Rest period between waves
const WAVE_REST: f32 = 3.0;
/// Spawn angles stay shallow so monsters cross the field, not hug an edge
const MAX_SPAWN_ANGLE: f32 = 30.0;

#[derive(Debug, Clone)]
pub struct WaveScheduler {
    rng: Pcg32,
    wave_index: u32,
    /// Monsters still owed for the current wave
    remaining: u32,
    /// Seconds until the next spawn
    spawn_timer: f32,
    /// Seconds of rest left before the next wave starts
    rest_timer: f32,
}

impl WaveScheduler {
    pub fn new(seed: u64) -> Self {
        let mut scheduler = Self {
            rng: Pcg32::seed_from_u64(seed),
            wave_index: 0,
            remaining: 0,
            spawn_timer: 0.0,
            rest_timer: 0.0,
        };
        scheduler.start_wave();
        scheduler
    }

    pub fn wave_index(&self) -> u32 {
        self.wave_index
    }

    fn start_wave(&mut self) {
        self.remaining = Self::monsters_in_wave(self.wave_index);
        self.spawn_timer = 0.0;
        log::info!(
            "wave {} incoming: {} monsters",
            self.wave_index,
            self.remaining
        );
    }

    fn monsters_in_wave(wave: u32) -> u32 {
        (4 + wave).min(16)
    }

    /// Baseline speed multiplier ramps gently with the wave index
    fn speed_mult(&self) -> f32 {
        1.0 + self.wave_index as f32 * 0.05
    }

    /// Difficulty mix shifts toward the hard end as waves progress;
    /// cluster monsters join from wave 3
    fn roll_difficulty(&mut self) -> Difficulty {
        let ramp = self.wave_index.min(6);
        let roll = self.rng.random_range(0..12);
        if self.wave_index >= 3 && roll >= 11 {
            Difficulty::Cluster
        } else if roll >= 10 - ramp.min(3) {
            Difficulty::Hard
        } else if roll >= 6 - ramp.min(2) {
            Difficulty::Medium
        } else {
            Difficulty::Easy
        }
    }

    fn roll_entry(&mut self) -> (f32, f32) {
        let y = self
            .rng
            .random_range(MONSTER_RADIUS..FIELD_HEIGHT - MONSTER_RADIUS);
        let angle = self.rng.random_range(-MAX_SPAWN_ANGLE..MAX_SPAWN_ANGLE);
        (y, angle)
    }

    /// Advance the schedule and hand any due monsters to the combat state
    pub fn update(&mut self, dt: f32, state: &mut GameState) {
        if self.rest_timer > 0.0 {
            self.rest_timer -= dt;
            if self.rest_timer <= 0.0 {
                self.start_wave();
            }
            return;
        }

        if self.remaining == 0 {
            // Wave fully delivered; rest, then escalate
            self.wave_index += 1;
            self.rest_timer = WAVE_REST;
            return;
        }

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            let difficulty = self.roll_difficulty();
            let (y, angle) = self.roll_entry();
            state.spawn_monster(difficulty, y, angle, self.speed_mult());
            self.remaining -= 1;
            self.spawn_timer = SPAWN_INTERVAL;
        }
    }

    /// Penalty spawn for an incorrect answer: fast, immovable, and angled
    /// steeply enough to bounce its way across the field
    pub fn spawn_wrong_monster(&mut self, state: &mut GameState) {
        let (y, _) = self.roll_entry();
        let angle = self.rng.random_range(-45.0..45.0);
        let id = state.spawn_monster(
            Difficulty::Wrong,
            y,
            angle,
            self.speed_mult() * WRONG_SPEED_MULT,
        );
        log::info!("wrong answer: penalty monster {id} spawned");
    }
}
