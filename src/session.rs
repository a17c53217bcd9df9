//! Session context
//!
//! Explicitly passed object replacing the implicit cross-scene registry:
//! created at session start, discarded at session end. The combat core never
//! sees this whole object; it works against the `Ledger` sub-interface and
//! the context collects the result at the end.

use crate::settings::Settings;
use crate::sim::Ledger;

#[derive(Debug, Clone)]
pub struct SessionContext {
    pub settings: Settings,
    /// Recorded exactly once, when the session ends
    final_score: Option<u64>,
}

impl SessionContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            final_score: None,
        }
    }

    pub fn sound_enabled(&self) -> bool {
        self.settings.sound_enabled
    }

    pub fn music_enabled(&self) -> bool {
        self.settings.music_enabled
    }

    /// Hand the final ledger over at game over. The first call wins;
    /// repeated game-over signals cannot rewrite history.
    pub fn finish(&mut self, ledger: &Ledger) {
        if self.final_score.is_none() {
            self.final_score = Some(ledger.score);
            log::info!("session finished with score {}", ledger.score);
        }
    }

    pub fn final_score(&self) -> Option<u64> {
        self.final_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_finish_wins() {
        let mut ctx = SessionContext::new(Settings::default());
        assert_eq!(ctx.final_score(), None);

        let mut ledger = Ledger::new();
        ledger.award(120);
        ctx.finish(&ledger);

        ledger.award(500);
        ctx.finish(&ledger);

        assert_eq!(ctx.final_score(), Some(120));
    }
}
