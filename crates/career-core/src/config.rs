//! Game configuration, loadable from YAML.

use crate::stats::StartingPlan;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the year-end world event is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventMode {
    /// Walk the event list in order, wrapping around.
    #[default]
    Rotating,
    /// Uniform draw from the session RNG.
    Random,
}

/// Session configuration parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for the deterministic RNG.
    pub rng_seed: u64,
    /// Entry point for the new career.
    pub start: StartingPlan,
    pub event_mode: EventMode,
    /// Ticks between settlement and its world event taking effect.
    pub event_delay_ticks: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rng_seed: 42,
            start: StartingPlan::Hustler,
            event_mode: EventMode::Rotating,
            event_delay_ticks: 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl GameConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }
}
