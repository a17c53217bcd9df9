//! Collision contacts and the difficulty-matching resolution rule
//!
//! The broad phase here is a stand-in for the external physics collaborator:
//! it reports overlapping (projectile, monster) pairs and nothing else. The
//! core never does spatial partitioning. Resolution is where the actual
//! combat rules live.

use std::f32::consts::TAU;

use glam::Vec2;

use super::state::{ClusterSpec, Difficulty, Ledger, Monster, Projectile, ProjectileKind};
use crate::consts::{MONSTER_RADIUS, PROJECTILE_RADIUS};

/// An overlapping (projectile, monster) pair reported by the broad phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub projectile: u32,
    pub monster: u32,
}

/// Report all currently overlapping pairs by id, in stable pool order.
///
/// Pairwise circle tests; entity counts stay small enough that anything
/// smarter belongs in a real broad-phase collaborator.
pub fn detect_contacts(projectiles: &[Projectile], monsters: &[Monster]) -> Vec<Contact> {
    let reach = PROJECTILE_RADIUS + MONSTER_RADIUS;
    let reach_sq = reach * reach;

    let mut contacts = Vec::new();
    for projectile in projectiles {
        if !projectile.alive {
            continue;
        }
        for monster in monsters {
            if !monster.alive {
                continue;
            }
            if projectile.pos.distance_squared(monster.pos) <= reach_sq {
                contacts.push(Contact {
                    projectile: projectile.id,
                    monster: monster.id,
                });
            }
        }
    }
    contacts
}

/// Outcome of resolving one contact
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolution {
    pub damage_applied: i32,
    pub died: bool,
    pub deflected: bool,
    /// A cluster shell burst here: spawn its bullets from this point.
    /// Deferred so the caller can register them once pool borrows end.
    pub burst: Option<(Vec2, ClusterSpec)>,
}

impl Resolution {
    /// A pair that went stale earlier in the tick resolves to nothing
    fn stale() -> Self {
        Self::default()
    }
}

/// Resolve one projectile-monster contact.
///
/// Rules, in order:
/// - either entity already destroyed this tick: silent no-op;
/// - cluster shells deal no direct damage, burst into bullets and die;
/// - matching tags (or a `Wrong` monster, which any bullet can hurt):
///   damage, bounce accounting, score on a kill;
/// - mismatched tags: deflect by inverting only the vertical velocity.
pub fn resolve(projectile: &mut Projectile, monster: &mut Monster, ledger: &mut Ledger) -> Resolution {
    if !projectile.alive || !monster.alive {
        return Resolution::stale();
    }

    if projectile.kind == ProjectileKind::Cluster {
        let burst = match projectile.cluster {
            Some(spec) => Some((projectile.pos, spec)),
            None => {
                log::warn!("cluster shell {} missing sub-spawn params", projectile.id);
                None
            }
        };
        projectile.destroy();
        log::debug!(
            "cluster shell {} burst on monster {}",
            projectile.id,
            monster.id
        );
        return Resolution {
            damage_applied: 0,
            died: false,
            deflected: false,
            burst,
        };
    }

    let damageable =
        projectile.difficulty == monster.difficulty || monster.difficulty == Difficulty::Wrong;

    if damageable {
        let died = monster.apply_damage(projectile.damage);
        projectile.register_bounce();
        if died {
            ledger.award(monster.difficulty.points());
        }
        Resolution {
            damage_applied: projectile.damage,
            died,
            deflected: false,
            burst: None,
        }
    } else {
        // No damage: deflect vertically, leave horizontal travel alone
        projectile.vel.y = -projectile.vel.y;
        projectile.register_bounce();
        Resolution {
            damage_applied: 0,
            died: false,
            deflected: true,
            burst: None,
        }
    }
}

/// Build the sub-projectiles for a cluster impact: bullets radiating from
/// the impact point, evenly spaced over the full circle.
pub fn burst_bullets(
    origin: Vec2,
    spec: ClusterSpec,
    mut next_id: impl FnMut() -> u32,
) -> Vec<Projectile> {
    (0..spec.count)
        .map(|i| {
            let angle = TAU * i as f32 / spec.count as f32;
            let vel = Vec2::new(angle.cos(), angle.sin()) * spec.speed;
            Projectile::new(next_id(), origin, vel, Difficulty::Cluster, spec.damage)
        })
        .collect()
}
