//! Fixed timestep simulation tick
//!
//! One logical update per tick, strictly ordered for determinism:
//! cooldowns and firing over the tower pool, movement integration, contact
//! detection and resolution over a pair snapshot, then boundary handling
//! and expiry reaping. Nothing in here may panic the loop; bad inputs cost
//! at most one dropped interaction.

use super::collision;
use super::state::{Bounds, Difficulty, GamePhase, GameState, Monster, Projectile};
use super::targeting;
use crate::consts::{MONSTER_RADIUS, PROJECTILE_RADIUS};
use crate::maths::MathsSession;

/// Assign a difficulty to a slot cell (`None` clears it)
#[derive(Debug, Clone)]
pub struct PlaceCommand {
    pub lane: usize,
    pub slot: usize,
    pub difficulty: Option<Difficulty>,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Raw answer text submitted through the input strip
    pub answer: Option<String>,
    /// Tower placement request
    pub place: Option<PlaceCommand>,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode: answer one tower's problem automatically
    pub autoplay: bool,
}

/// What happened during a tick, for the surrounding scene
#[derive(Debug, Clone, Copy, Default)]
pub struct TickEvents {
    /// Some(correct) when an answer was processed this tick
    pub answer_correct: Option<bool>,
    /// Monsters that reached the defender line this tick
    pub lives_lost: u32,
    /// The session ended this tick
    pub game_over: bool,
}

/// Advance the combat state by one fixed timestep
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    maths: &mut MathsSession,
    dt: f32,
) -> TickEvents {
    let mut events = TickEvents::default();

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return events;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::GameOver => {}
        }
    }

    match state.phase {
        GamePhase::Paused | GamePhase::GameOver => return events,
        GamePhase::Playing => {}
    }

    state.time_ticks += 1;

    // Tower placement requests arrive before anything fires this tick
    if let Some(cmd) = &input.place {
        if let Some(id) = state.place_tower(cmd.lane, cmd.slot, cmd.difficulty) {
            let difficulty = state
                .tower_mut(id)
                .map(|t| t.difficulty)
                .unwrap_or(Difficulty::Easy);
            let problem = maths.generate_for(difficulty);
            if let Some(tower) = state.tower_mut(id) {
                log::info!(
                    "placed {} tower {} at lane {}, slot {}",
                    difficulty.as_str(),
                    id,
                    cmd.lane,
                    cmd.slot
                );
                tower.set_problem(problem);
            }
        }
    }

    // Demo autoplay answers one tower's problem, rotating through the pool
    let answer = if input.autoplay && input.answer.is_none() {
        pick_autoplay_answer(state)
    } else {
        input.answer.clone()
    };
    if let Some(answer) = answer {
        events.answer_correct = Some(submit_answer(state, maths, &answer));
    }

    // 1. Cooldowns advance and ready towers fire, in stable pool order
    let dt_ms = dt * 1000.0;
    for tower in &mut state.towers {
        tower.advance_cooldown(dt_ms);
    }
    let ready: Vec<u32> = state
        .towers
        .iter()
        .filter(|t| t.can_fire())
        .map(|t| t.id)
        .collect();
    for tower_id in ready {
        let Some(tower) = state.towers.iter().find(|t| t.id == tower_id) else {
            continue;
        };
        let tower = tower.clone();
        let vectors =
            targeting::firing_vectors(&tower, &state.monsters, state.bounds, state.time_ticks);
        let shots = targeting::fire(&tower, &vectors, || state.next_entity_id());
        log::debug!("tower {} fired {} projectile(s)", tower_id, shots.len());
        state.projectiles.extend(shots);
        if let Some(tower) = state.tower_mut(tower_id) {
            tower.reset_cooldown();
        }
    }

    // 2. Movement integration
    for monster in &mut state.monsters {
        if monster.alive {
            monster.pos += monster.vel * dt;
        }
    }
    for projectile in &mut state.projectiles {
        if projectile.alive {
            projectile.pos += projectile.vel * dt;
        }
    }

    // 3. Resolve the contact snapshot. Pairs whose entities died earlier in
    // the loop resolve as no-ops; cluster bursts are registered afterwards
    // so the pair snapshot is never mutated mid-iteration.
    let contacts = collision::detect_contacts(&state.projectiles, &state.monsters);
    let mut bursts = Vec::new();
    for contact in contacts {
        let Some(pi) = state
            .projectiles
            .iter()
            .position(|p| p.id == contact.projectile)
        else {
            continue;
        };
        let Some(mi) = state.monsters.iter().position(|m| m.id == contact.monster) else {
            continue;
        };
        let resolution = collision::resolve(
            &mut state.projectiles[pi],
            &mut state.monsters[mi],
            &mut state.ledger,
        );
        if let Some(burst) = resolution.burst {
            bursts.push(burst);
        }
    }
    for (origin, spec) in bursts {
        let bullets = collision::burst_bullets(origin, spec, || state.next_entity_id());
        state.projectiles.extend(bullets);
    }

    // 4. Boundary handling, lives, expiry reaping
    let bounds = state.bounds;
    for monster in &mut state.monsters {
        if !monster.alive {
            continue;
        }
        bounce_monster(monster, bounds);
        if monster.is_expired(bounds) {
            monster.alive = false;
            events.lives_lost += 1;
            log::info!("monster {} reached the defender line", monster.id);
        }
    }
    for _ in 0..events.lives_lost {
        if state.ledger.lose_life() {
            state.phase = GamePhase::GameOver;
            events.game_over = true;
            log::info!("game over, final score {}", state.ledger.score);
            break;
        }
    }

    for projectile in &mut state.projectiles {
        if !projectile.alive {
            continue;
        }
        bounce_projectile(projectile, bounds);
        if projectile.is_expired(bounds) {
            projectile.destroy();
        }
    }

    // Reap once per tick; destroyed entities never survive into the next
    state.monsters.retain(|m| m.alive);
    state.projectiles.retain(|p| p.alive);

    events
}

/// Check one submission against every tower. The first correct answer
/// activates a tower; later ones shrink its cooldown and every match gets
/// a fresh problem.
fn submit_answer(state: &mut GameState, maths: &mut MathsSession, answer: &str) -> bool {
    let mut any_correct = false;
    for tower in &mut state.towers {
        let Some(problem) = tower.problem.clone() else {
            continue;
        };
        if !maths.check_answer(&problem, answer) {
            continue;
        }
        any_correct = true;
        if tower.activate() {
            log::info!("tower {} activated", tower.id);
        } else {
            tower.boost_fire_rate();
            log::debug!("tower {} cooldown now {:.0} ms", tower.id, tower.cooldown_ms);
        }
        tower.set_problem(maths.generate_for(tower.difficulty));
    }
    any_correct
}

/// Rotate through towers with assigned problems so demo sessions exercise
/// the whole pool, not just the first tower placed
fn pick_autoplay_answer(state: &GameState) -> Option<String> {
    let candidates: Vec<&str> = state
        .towers
        .iter()
        .filter_map(|t| t.problem.as_ref().map(|p| p.formatted_answer.as_str()))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let index = state.time_ticks as usize % candidates.len();
    Some(candidates[index].to_string())
}

/// Vertical containment for monsters: position snaps to the play-field
/// edge before the velocity flips, so a body can never oscillate across
/// the boundary. Monsters have no horizontal containment.
fn bounce_monster(monster: &mut Monster, bounds: Bounds) {
    let radius = MONSTER_RADIUS;
    if monster.pos.y - radius <= 0.0 {
        monster.pos.y = radius;
        monster.vel.y = monster.vel.y.abs();
    } else if monster.pos.y + radius >= bounds.height {
        monster.pos.y = bounds.height - radius;
        monster.vel.y = -monster.vel.y.abs();
    }
}

/// Same snap-then-reflect rule for projectiles, with bounce accounting;
/// the counter destroys the projectile once it hits its maximum
fn bounce_projectile(projectile: &mut Projectile, bounds: Bounds) {
    let radius = PROJECTILE_RADIUS;
    if projectile.pos.y - radius <= 0.0 {
        projectile.pos.y = radius;
        projectile.vel.y = projectile.vel.y.abs();
        projectile.register_bounce();
    } else if projectile.pos.y + radius >= bounds.height {
        projectile.pos.y = bounds.height - radius;
        projectile.vel.y = -projectile.vel.y.abs();
        projectile.register_bounce();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{FIELD_HEIGHT, SIM_DT, START_LIVES};
    use crate::maths::ProblemType;
    use glam::Vec2;

    fn maths() -> MathsSession {
        MathsSession::with_fallback(1, "year1", ProblemType::All)
    }

    fn place_via_tick(state: &mut GameState, maths: &mut MathsSession, lane: usize, slot: usize) {
        let input = TickInput {
            place: Some(PlaceCommand {
                lane,
                slot,
                difficulty: Some(Difficulty::Easy),
            }),
            ..Default::default()
        };
        tick(state, &input, maths, SIM_DT);
    }

    #[test]
    fn test_matching_kill_awards_score_and_keeps_projectile() {
        let mut state = GameState::new(5);
        let mut maths = maths();

        let impact = Vec2::new(400.0, 200.0);
        let pid = state.next_entity_id();
        state.projectiles.push(Projectile::new(
            pid,
            impact,
            Vec2::new(300.0, 0.0),
            Difficulty::Easy,
            1,
        ));
        let mid = state.spawn_monster(Difficulty::Easy, 200.0, 0.0, 1.0);
        state.monsters.iter_mut().find(|m| m.id == mid).unwrap().pos = impact;

        let events = tick(&mut state, &TickInput::default(), &mut maths, SIM_DT);

        assert_eq!(state.ledger.score, Difficulty::Easy.points());
        assert!(state.monsters.is_empty(), "dead monster reaped this tick");
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].bounce_count, 1);
        assert_eq!(events.lives_lost, 0);
    }

    #[test]
    fn test_boundary_round_trip_preserves_vertical_speed() {
        let mut state = GameState::new(5);
        let mut maths = maths();

        let pid = state.next_entity_id();
        let mut shot = Projectile::new(
            pid,
            Vec2::new(400.0, PROJECTILE_RADIUS + 0.2),
            Vec2::new(10.0, -100.0),
            Difficulty::Easy,
            1,
        );
        shot.max_bounces = 5;
        state.projectiles.push(shot);

        tick(&mut state, &TickInput::default(), &mut maths, SIM_DT);

        let shot = &state.projectiles[0];
        assert_eq!(shot.pos.y, PROJECTILE_RADIUS, "snapped exactly to the boundary");
        assert_eq!(shot.vel.y, 100.0, "magnitude preserved, sign flipped");
        assert_eq!(shot.bounce_count, 1);
    }

    #[test]
    fn test_monster_bounces_without_bounce_accounting() {
        let mut state = GameState::new(5);
        let mut maths = maths();

        let mid = state.spawn_monster(Difficulty::Wrong, FIELD_HEIGHT - MONSTER_RADIUS, 45.0, 2.0);
        let monster = state.monsters.iter_mut().find(|m| m.id == mid).unwrap();
        monster.pos.x = 400.0;
        assert!(monster.vel.y > 0.0);

        tick(&mut state, &TickInput::default(), &mut maths, SIM_DT);

        let monster = &state.monsters[0];
        assert_eq!(monster.pos.y, FIELD_HEIGHT - MONSTER_RADIUS);
        assert!(monster.vel.y < 0.0, "reflected upward off the bottom edge");
        assert!(monster.alive);
    }

    #[test]
    fn test_defender_line_costs_a_life_and_ends_the_game() {
        let mut state = GameState::new(5);
        let mut maths = maths();

        let mid = state.spawn_monster(Difficulty::Easy, 200.0, 0.0, 1.0);
        state.monsters.iter_mut().find(|m| m.id == mid).unwrap().pos.x = -1.0;

        let events = tick(&mut state, &TickInput::default(), &mut maths, SIM_DT);
        assert_eq!(events.lives_lost, 1);
        assert_eq!(state.ledger.lives, START_LIVES - 1);
        assert!(state.monsters.is_empty());
        assert!(!events.game_over);

        // Drain the remaining lives
        state.ledger.lives = 1;
        let mid = state.spawn_monster(Difficulty::Easy, 200.0, 0.0, 1.0);
        state.monsters.iter_mut().find(|m| m.id == mid).unwrap().pos.x = -1.0;

        let events = tick(&mut state, &TickInput::default(), &mut maths, SIM_DT);
        assert!(events.game_over);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_activation_then_cooldown_reduction() {
        let mut state = GameState::new(5);
        let mut maths = maths();
        place_via_tick(&mut state, &mut maths, 0, 0);

        let tower = &state.towers[0];
        let base_cooldown = tower.cooldown_ms;
        assert!(!tower.is_active());
        let first_answer = tower.problem.clone().unwrap().formatted_answer;

        // First correct answer activates, does not touch the cooldown
        let input = TickInput {
            answer: Some(first_answer),
            ..Default::default()
        };
        let events = tick(&mut state, &input, &mut maths, SIM_DT);
        assert_eq!(events.answer_correct, Some(true));
        assert!(state.towers[0].is_active());
        assert_eq!(state.towers[0].cooldown_ms, base_cooldown);

        // Second correct answer shrinks it
        let second_answer = state.towers[0].problem.clone().unwrap().formatted_answer;
        let input = TickInput {
            answer: Some(second_answer),
            ..Default::default()
        };
        let events = tick(&mut state, &input, &mut maths, SIM_DT);
        assert_eq!(events.answer_correct, Some(true));
        assert!(state.towers[0].cooldown_ms < base_cooldown);
    }

    #[test]
    fn test_wrong_answer_reported_without_upgrades() {
        let mut state = GameState::new(5);
        let mut maths = maths();
        place_via_tick(&mut state, &mut maths, 0, 0);

        let input = TickInput {
            answer: Some("not a number".into()),
            ..Default::default()
        };
        let events = tick(&mut state, &input, &mut maths, SIM_DT);
        assert_eq!(events.answer_correct, Some(false));
        assert!(!state.towers[0].is_active());
    }

    #[test]
    fn test_active_tower_fires_and_rearms() {
        let mut state = GameState::new(5);
        let mut maths = maths();
        place_via_tick(&mut state, &mut maths, 2, 0);

        {
            let tower = &mut state.towers[0];
            tower.activate();
            tower.cooldown_left_ms = 0.0;
        }

        tick(&mut state, &TickInput::default(), &mut maths, SIM_DT);

        assert_eq!(state.projectiles.len(), 1);
        let tower = &state.towers[0];
        assert_eq!(tower.cooldown_left_ms, tower.cooldown_ms, "rearmed after firing");
        let shot = &state.projectiles[0];
        assert_eq!(shot.difficulty, Difficulty::Easy);
        assert!(shot.pos.x > tower.pos().x, "muzzle offset ahead of the tower");
    }

    #[test]
    fn test_dormant_tower_never_fires() {
        let mut state = GameState::new(5);
        let mut maths = maths();
        place_via_tick(&mut state, &mut maths, 2, 0);
        state.towers[0].cooldown_left_ms = 0.0;

        for _ in 0..200 {
            tick(&mut state, &TickInput::default(), &mut maths, SIM_DT);
        }
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_cluster_impact_registers_burst() {
        let mut state = GameState::new(5);
        let mut maths = maths();

        let impact = Vec2::new(400.0, 250.0);
        let spec = crate::sim::state::TowerSpec::for_difficulty(Difficulty::Cluster)
            .cluster
            .unwrap();
        let pid = state.next_entity_id();
        state
            .projectiles
            .push(Projectile::new_cluster(pid, impact, Vec2::new(250.0, 0.0), spec));
        let mid = state.spawn_monster(Difficulty::Hard, 250.0, 0.0, 1.0);
        state.monsters.iter_mut().find(|m| m.id == mid).unwrap().pos = impact;

        tick(&mut state, &TickInput::default(), &mut maths, SIM_DT);

        // Shell gone, five bullets radiating from the impact point
        assert_eq!(state.projectiles.len(), spec.count as usize);
        assert!(state
            .projectiles
            .iter()
            .all(|p| p.kind == crate::sim::state::ProjectileKind::Bullet));
        assert_eq!(state.monsters[0].health, state.monsters[0].max_health);
    }

    #[test]
    fn test_pause_freezes_the_clock() {
        let mut state = GameState::new(5);
        let mut maths = maths();

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, &mut maths, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let ticks_before = state.time_ticks;
        tick(&mut state, &TickInput::default(), &mut maths, SIM_DT);
        assert_eq!(state.time_ticks, ticks_before);

        tick(&mut state, &pause, &mut maths, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_identical_seeds_and_inputs_replay_identically() {
        let run = || {
            let mut state = GameState::new(99);
            let mut maths = MathsSession::with_fallback(99, "year2", ProblemType::All);
            place_via_tick(&mut state, &mut maths, 1, 0);
            state.spawn_monster(Difficulty::Easy, 180.0, 10.0, 1.0);
            state.spawn_monster(Difficulty::Hard, 320.0, -20.0, 1.2);

            for i in 0..600u32 {
                let input = TickInput {
                    autoplay: i % 40 == 0,
                    ..Default::default()
                };
                tick(&mut state, &input, &mut maths, SIM_DT);
            }
            state
        };

        let a = run();
        let b = run();

        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.ledger.score, b.ledger.score);
        assert_eq!(a.projectiles.len(), b.projectiles.len());
        assert_eq!(a.monsters.len(), b.monsters.len());
        for (pa, pb) in a.projectiles.iter().zip(&b.projectiles) {
            assert_eq!(pa.id, pb.id);
            assert_eq!(pa.pos, pb.pos);
            assert_eq!(pa.vel, pb.vel);
        }
    }
}
