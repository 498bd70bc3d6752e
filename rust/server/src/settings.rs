use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Per-match timing and deck options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MatchSettings {
    /// How long to wait for submissions each round, in seconds
    pub pick_timeout_secs: u64,
    /// Pause before the first round and after each round, in seconds
    pub round_delay_secs: u64,
    /// Rounds to play; defaults to one per question card
    pub rounds: Option<usize>,
    /// Shuffle both decks before dealing
    pub shuffle_decks: bool,
    /// Seed for card ids and shuffling; random when unset
    pub seed: Option<u64>,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            pick_timeout_secs: 30,
            round_delay_secs: 5,
            rounds: None,
            shuffle_decks: false,
            seed: None,
        }
    }
}

impl MatchSettings {
    pub fn pick_timeout(&self) -> Duration {
        Duration::from_secs(self.pick_timeout_secs)
    }

    pub fn round_delay(&self) -> Duration {
        Duration::from_secs(self.round_delay_secs)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.pick_timeout_secs == 0 {
            return Err(SettingsError::InvalidValue(
                "pick_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.pick_timeout_secs > 600 {
            return Err(SettingsError::InvalidValue(
                "pick_timeout_secs must be at most 600".to_string(),
            ));
        }
        if self.round_delay_secs > 60 {
            return Err(SettingsError::InvalidValue(
                "round_delay_secs must be at most 60".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}
