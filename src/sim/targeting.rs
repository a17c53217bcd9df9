//! Per-archetype targeting strategies and the projectile factory
//!
//! Each strategy is a pure function over (tower state, monster pool, bounds)
//! producing zero or more firing velocity vectors. An empty monster pool is
//! never an error: Standard and Spread ignore targets entirely, Sniper
//! degrades to a straight horizontal shot.

use glam::Vec2;

use super::state::{Bounds, Monster, Projectile, ProjectileKind, Tower};
use crate::consts::{MUZZLE_OFFSET, STANDARD_JITTER};
use crate::hash_unit;

/// Compute the firing vectors for a ready tower.
///
/// `ticks` feeds the deterministic jitter hash so identical states produce
/// identical shots.
pub fn firing_vectors(
    tower: &Tower,
    monsters: &[Monster],
    _bounds: Bounds,
    ticks: u64,
) -> Vec<Vec2> {
    use super::state::Archetype::*;
    match tower.spec.archetype {
        Standard => vec![standard_vector(tower, ticks)],
        Spread => spread_vectors(tower),
        Sniper => vec![sniper_vector(tower, monsters)],
    }
}

/// One shot toward the far boundary with bounded vertical jitter.
/// The jitter models imprecision, not targeting.
fn standard_vector(tower: &Tower, ticks: u64) -> Vec2 {
    let jitter = (hash_unit(ticks, tower.id) - 0.5) * 2.0 * STANDARD_JITTER;
    Vec2::new(tower.spec.projectile_speed, jitter)
}

/// N shots fanned symmetrically about the horizontal axis.
/// With fewer than two shots the fan collapses to a single straight shot.
fn spread_vectors(tower: &Tower) -> Vec<Vec2> {
    let count = tower.spec.projectile_count;
    let speed = tower.spec.projectile_speed;

    if count <= 1 {
        return vec![Vec2::new(speed, 0.0)];
    }

    let total_spread = tower.spec.spread_angle_deg.to_radians();
    let angle_step = total_spread / (count - 1) as f32;
    let start_angle = -total_spread / 2.0;

    (0..count)
        .map(|i| {
            let angle = start_angle + i as f32 * angle_step;
            Vec2::new(angle.cos() * speed, angle.sin() * speed)
        })
        .collect()
}

/// One shot at the nearest living monster in range, else straight ahead.
/// Distance ties break toward the first monster enumerated.
fn sniper_vector(tower: &Tower, monsters: &[Monster]) -> Vec2 {
    let speed = tower.spec.projectile_speed;
    let origin = tower.pos();
    let max_distance_sq = tower.spec.range * tower.spec.range;

    let mut best: Option<(f32, Vec2)> = None;
    for monster in monsters {
        if !monster.alive {
            continue;
        }
        let distance_sq = origin.distance_squared(monster.pos);
        if distance_sq > max_distance_sq {
            continue;
        }
        match best {
            Some((best_sq, _)) if distance_sq >= best_sq => {}
            _ => best = Some((distance_sq, monster.pos)),
        }
    }

    match best {
        Some((_, target)) => {
            let angle = (target.y - origin.y).atan2(target.x - origin.x);
            Vec2::new(angle.cos() * speed, angle.sin() * speed)
        }
        None => Vec2::new(speed, 0.0),
    }
}

/// Build one projectile per firing vector, registered under fresh ids.
///
/// The constructor dispatches on the tower's projectile kind; a cluster
/// kind without sub-spawn parameters is a configuration error recovered by
/// falling back to a plain bullet. Origins are offset forward of the tower
/// center so a shot never collides with its own cell.
pub fn fire(tower: &Tower, vectors: &[Vec2], mut next_id: impl FnMut() -> u32) -> Vec<Projectile> {
    let origin = tower.pos() + Vec2::new(MUZZLE_OFFSET, 0.0);

    vectors
        .iter()
        .map(|&vel| match tower.spec.projectile_kind {
            ProjectileKind::Bullet => Projectile::new(
                next_id(),
                origin,
                vel,
                tower.difficulty,
                tower.spec.damage,
            ),
            ProjectileKind::Cluster => match tower.spec.cluster {
                Some(spec) => Projectile::new_cluster(next_id(), origin, vel, spec),
                None => {
                    log::warn!(
                        "tower {} has cluster kind without cluster params, firing bullet",
                        tower.id
                    );
                    Projectile::new(next_id(), origin, vel, tower.difficulty, tower.spec.damage)
                }
            },
        })
        .collect()
}
