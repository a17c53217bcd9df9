//! Arithmetic problem provider interface
//!
//! The curriculum provider is an external collaborator consumed through the
//! `ProblemSource` trait. A seeded built-in generator doubles as the default
//! provider and as the recovery path when a provider fails, so gameplay
//! never stalls on maths errors.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::Difficulty;

/// School-year ladder, easiest first
pub const YEAR_LEVELS: [&str; 7] = [
    "reception", "year1", "year2", "year3", "year4", "year5", "year6",
];

/// Problem category filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProblemType {
    #[default]
    All,
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl ProblemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemType::All => "all",
            ProblemType::Addition => "addition",
            ProblemType::Subtraction => "subtraction",
            ProblemType::Multiplication => "multiplication",
            ProblemType::Division => "division",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "all" => Some(ProblemType::All),
            "addition" => Some(ProblemType::Addition),
            "subtraction" => Some(ProblemType::Subtraction),
            "multiplication" => Some(ProblemType::Multiplication),
            "division" => Some(ProblemType::Division),
            _ => None,
        }
    }
}

/// An arithmetic problem as displayed on a tower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub expression: String,
    pub answer: f64,
    pub formatted_answer: String,
}

/// External curriculum provider. `None` signals provider failure; the
/// session recovers via the built-in generator rather than surfacing it.
pub trait ProblemSource {
    fn generate(&mut self, year_level: &str, problem_type: ProblemType) -> Option<Problem>;
}

/// Built-in problem generator with a deterministic seeded stream
#[derive(Debug, Clone)]
pub struct FallbackMaths {
    rng: Pcg32,
}

impl FallbackMaths {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Operand ceiling grows with the school year
    fn operand_max(year_index: usize) -> i64 {
        match year_index {
            0 | 1 => 5,
            2 | 3 => 10,
            _ => 12,
        }
    }

    /// Generate a problem; unlike an external provider this never fails
    pub fn problem(&mut self, year_level: &str, problem_type: ProblemType) -> Problem {
        let year_index = YEAR_LEVELS
            .iter()
            .position(|y| *y == year_level)
            .unwrap_or(1);
        let max = Self::operand_max(year_index);

        let kind = match problem_type {
            ProblemType::All => match self.rng.random_range(0..4) {
                0 => ProblemType::Addition,
                1 => ProblemType::Subtraction,
                2 => ProblemType::Multiplication,
                _ => ProblemType::Division,
            },
            other => other,
        };

        let a = self.rng.random_range(1..=max);
        let b = self.rng.random_range(1..=max);

        let (expression, answer) = match kind {
            ProblemType::Addition | ProblemType::All => (format!("{a} + {b}"), a + b),
            ProblemType::Subtraction => {
                let (hi, lo) = (a.max(b), a.min(b));
                (format!("{hi} - {lo}"), hi - lo)
            }
            ProblemType::Multiplication => (format!("{a} x {b}"), a * b),
            ProblemType::Division => (format!("{} / {b}", a * b), a),
        };

        Problem {
            expression,
            answer: answer as f64,
            formatted_answer: answer.to_string(),
        }
    }
}

impl ProblemSource for FallbackMaths {
    fn generate(&mut self, year_level: &str, problem_type: ProblemType) -> Option<Problem> {
        Some(self.problem(year_level, problem_type))
    }
}

/// Session-level maths state: year ladder position, type filter, and the
/// provider-failure cascade (typed, then untyped, then built-in).
pub struct MathsSession {
    provider: Box<dyn ProblemSource>,
    fallback: FallbackMaths,
    base_year_index: usize,
    problem_type: ProblemType,
}

impl MathsSession {
    pub fn new(provider: Box<dyn ProblemSource>, base_year: &str, problem_type: ProblemType) -> Self {
        let base_year_index = match YEAR_LEVELS.iter().position(|y| *y == base_year) {
            Some(index) => index,
            None => {
                log::warn!("unknown year level '{base_year}', defaulting to year1");
                1
            }
        };
        Self {
            provider,
            fallback: FallbackMaths::new(0x5eed),
            base_year_index,
            problem_type,
        }
    }

    /// Session backed entirely by the built-in generator
    pub fn with_fallback(seed: u64, base_year: &str, problem_type: ProblemType) -> Self {
        Self::new(Box::new(FallbackMaths::new(seed)), base_year, problem_type)
    }

    /// Year level for a tower difficulty, offset from the base year:
    /// easy = base - 1, medium = base, hard = base + 1, cluster = base + 2
    pub fn year_for(&self, difficulty: Difficulty) -> &'static str {
        let offset: isize = match difficulty {
            Difficulty::Easy | Difficulty::Wrong => -1,
            Difficulty::Medium => 0,
            Difficulty::Hard => 1,
            Difficulty::Cluster => 2,
        };
        let index = (self.base_year_index as isize + offset)
            .clamp(0, YEAR_LEVELS.len() as isize - 1) as usize;
        YEAR_LEVELS[index]
    }

    /// Generate a problem for a tower, falling back through the cascade on
    /// provider failure so the tower is never left without one.
    pub fn generate_for(&mut self, difficulty: Difficulty) -> Problem {
        let year = self.year_for(difficulty);

        if let Some(problem) = self.provider.generate(year, self.problem_type) {
            return problem;
        }
        if self.problem_type != ProblemType::All {
            if let Some(problem) = self.provider.generate(year, ProblemType::All) {
                return problem;
            }
        }

        log::warn!(
            "problem provider failed for {year}/{}, using built-in generator",
            self.problem_type.as_str()
        );
        self.fallback.problem(year, self.problem_type)
    }

    /// Tolerant answer check: malformed or empty input is simply wrong,
    /// never an error.
    pub fn check_answer(&self, problem: &Problem, raw: &str) -> bool {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return false;
        }
        match trimmed.parse::<f64>() {
            Ok(value) => (value - problem.answer).abs() < 1e-9,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Provider double that always fails
    struct DeadProvider;

    impl ProblemSource for DeadProvider {
        fn generate(&mut self, _year: &str, _kind: ProblemType) -> Option<Problem> {
            None
        }
    }

    #[test]
    fn test_year_offsets_clamp_to_ladder() {
        let session = MathsSession::with_fallback(1, "reception", ProblemType::All);
        assert_eq!(session.year_for(Difficulty::Easy), "reception");
        assert_eq!(session.year_for(Difficulty::Medium), "reception");
        assert_eq!(session.year_for(Difficulty::Hard), "year1");

        let session = MathsSession::with_fallback(1, "year6", ProblemType::All);
        assert_eq!(session.year_for(Difficulty::Cluster), "year6");
        assert_eq!(session.year_for(Difficulty::Hard), "year6");
        assert_eq!(session.year_for(Difficulty::Easy), "year5");
    }

    #[test]
    fn test_unknown_year_defaults_to_year1() {
        let session = MathsSession::with_fallback(1, "postgrad", ProblemType::All);
        assert_eq!(session.year_for(Difficulty::Medium), "year1");
    }

    #[test]
    fn test_dead_provider_recovers_via_builtin() {
        let mut session =
            MathsSession::new(Box::new(DeadProvider), "year2", ProblemType::Addition);
        let problem = session.generate_for(Difficulty::Medium);
        assert!(!problem.expression.is_empty());
        assert!(session.check_answer(&problem, &problem.formatted_answer));
    }

    #[test]
    fn test_check_answer_tolerates_garbage() {
        let session = MathsSession::with_fallback(1, "year1", ProblemType::All);
        let problem = Problem {
            expression: "2 + 2".into(),
            answer: 4.0,
            formatted_answer: "4".into(),
        };

        assert!(session.check_answer(&problem, "4"));
        assert!(session.check_answer(&problem, "  4.0  "));
        assert!(!session.check_answer(&problem, ""));
        assert!(!session.check_answer(&problem, "   "));
        assert!(!session.check_answer(&problem, "four"));
        assert!(!session.check_answer(&problem, "4abc"));
        assert!(!session.check_answer(&problem, "5"));
    }

    #[test]
    fn test_builtin_generator_is_seeded_and_consistent() {
        let mut a = FallbackMaths::new(42);
        let mut b = FallbackMaths::new(42);
        for _ in 0..20 {
            assert_eq!(
                a.problem("year3", ProblemType::All),
                b.problem("year3", ProblemType::All)
            );
        }
    }

    #[test]
    fn test_builtin_answers_are_self_consistent() {
        let session = MathsSession::with_fallback(7, "year4", ProblemType::All);
        let mut generator = FallbackMaths::new(7);
        for kind in [
            ProblemType::Addition,
            ProblemType::Subtraction,
            ProblemType::Multiplication,
            ProblemType::Division,
        ] {
            for _ in 0..50 {
                let problem = generator.problem("year4", kind);
                assert!(
                    session.check_answer(&problem, &problem.formatted_answer),
                    "generated answer must validate: {}",
                    problem.expression
                );
                // Subtraction never goes negative, division stays integral
                assert!(problem.answer >= 0.0);
                assert_eq!(problem.answer.fract(), 0.0);
            }
        }
    }
}
