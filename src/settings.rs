//! Session preferences
//!
//! Audio toggles plus the maths configuration chosen in the menu. Storage
//! is the embedder's concern; JSON round-trips are provided so any backend
//! can persist them.

use serde::{Deserialize, Serialize};

use crate::maths::ProblemType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // === Audio ===
    pub sound_enabled: bool,
    pub music_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,

    // === Maths ===
    /// Base school year the difficulty ladder is anchored to
    pub base_year: String,
    /// Problem category filter
    pub problem_type: ProblemType,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_enabled: true,
            master_volume: 0.8,
            base_year: "year1".to_string(),
            problem_type: ProblemType::All,
        }
    }
}

impl Settings {
    pub fn to_json(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("failed to serialize settings: {e}");
                String::new()
            }
        }
    }

    /// Invalid JSON falls back to defaults rather than failing the session
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("invalid settings JSON, using defaults: {e}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let mut settings = Settings::default();
        settings.sound_enabled = false;
        settings.base_year = "year4".to_string();
        settings.problem_type = ProblemType::Division;

        let restored = Settings::from_json(&settings.to_json());
        assert!(!restored.sound_enabled);
        assert_eq!(restored.base_year, "year4");
        assert_eq!(restored.problem_type, ProblemType::Division);
    }

    #[test]
    fn test_garbage_json_falls_back_to_defaults() {
        let settings = Settings::from_json("{not json");
        assert!(settings.sound_enabled);
        assert_eq!(settings.base_year, "year1");
    }
}
