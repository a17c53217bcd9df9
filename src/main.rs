//! Sum Siege entry point
//!
//! Headless demo driver: runs a seeded session with the autopilot answering
//! tower problems, which smoke-tests the whole combat loop from the command
//! line. A real frontend would pump the same `tick` from its frame loop.

use sum_siege::consts::SIM_DT;
use sum_siege::maths::{MathsSession, ProblemType};
use sum_siege::sim::{Difficulty, GameState, PlaceCommand, TickInput, tick};
use sum_siege::waves::WaveScheduler;
use sum_siege::{SessionContext, Settings};

/// Demo session length in simulated seconds
const DEMO_SECONDS: f32 = 120.0;

/// Usage: sum-siege [base-year] [problem-type] [loadout]
/// e.g. `sum-siege year3 multiplication easy,easy,hard,cluster`
fn parse_args(settings: &mut Settings) -> Vec<Difficulty> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if let Some(year) = args.first() {
        settings.base_year = year.clone();
    }
    if let Some(kind) = args.get(1) {
        settings.problem_type = ProblemType::from_str(kind).unwrap_or_else(|| {
            log::warn!("unknown problem type '{kind}', using all");
            ProblemType::All
        });
    }

    match args.get(2) {
        Some(loadout) => loadout
            .split(',')
            .map(|name| {
                Difficulty::from_str(name).unwrap_or_else(|| {
                    log::warn!("unknown tower difficulty '{name}', using easy");
                    Difficulty::Easy
                })
            })
            .collect(),
        None => vec![
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Cluster,
        ],
    }
}

fn main() {
    env_logger::init();
    log::info!("Sum Siege (headless demo) starting...");

    let seed = 0xC0FFEE;
    let mut settings = Settings::default();
    let loadout = parse_args(&mut settings);
    let mut context = SessionContext::new(settings);
    let mut state = GameState::new(seed);
    let mut maths = MathsSession::with_fallback(
        seed,
        &context.settings.base_year,
        context.settings.problem_type,
    );
    let mut scheduler = WaveScheduler::new(seed);

    let total_ticks = (DEMO_SECONDS / SIM_DT) as u64;
    for i in 0..total_ticks {
        let mut input = TickInput::default();

        // One tower per lane, placed over the opening ticks
        if let Some(&difficulty) = loadout.get(i as usize) {
            input.place = Some(PlaceCommand {
                lane: i as usize % sum_siege::consts::LANE_COUNT,
                slot: i as usize / sum_siege::consts::LANE_COUNT,
                difficulty: Some(difficulty),
            });
        }

        // The autopilot answers a problem twice a second, and fumbles one
        // on purpose every ten seconds to exercise the penalty path
        if i % 1200 == 600 {
            input.answer = Some("nope".to_string());
        } else {
            input.autoplay = i % 60 == 0;
        }

        let events = tick(&mut state, &input, &mut maths, SIM_DT);

        if events.answer_correct == Some(false) {
            if context.sound_enabled() {
                log::debug!("sfx: wrong-answer buzzer");
            }
            scheduler.spawn_wrong_monster(&mut state);
        }

        scheduler.update(SIM_DT, &mut state);

        if events.game_over {
            break;
        }
    }

    context.finish(&state.ledger);
    log::info!(
        "demo finished at tick {} on wave {}",
        state.time_ticks,
        scheduler.wave_index()
    );

    match serde_json::to_string_pretty(&state.ledger) {
        Ok(json) => println!("{json}"),
        Err(e) => log::warn!("failed to serialize final ledger: {e}"),
    }
}
