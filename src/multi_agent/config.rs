use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::forest::ForestConfig;
use crate::agent::DdpgConfig;
use crate::error::{MarlError, Result};

/// Everything a [`TrainingRun`](super::TrainingRun) needs, loadable from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub episodes: usize,
    /// Hard cap on steps per episode; `None` runs until every agent is done
    pub max_steps_per_episode: Option<usize>,
    /// Emit a progress line every `log_every` episodes
    pub log_every: usize,
    /// Run the per-agent updates of a step on the rayon pool
    pub parallel_updates: bool,
    pub agent: DdpgConfig,
    pub env: ForestConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            episodes: 100,
            max_steps_per_episode: None,
            log_every: 1,
            parallel_updates: false,
            agent: DdpgConfig::default(),
            env: ForestConfig::default(),
        }
    }
}

impl TrainingConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: TrainingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Agent settings with dimensions taken from the environment settings.
    pub fn agent_for_env(&self) -> DdpgConfig {
        DdpgConfig {
            state_dim: self.env.state_dim,
            action_dim: self.env.action_dim,
            ..self.agent.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.log_every == 0 {
            return Err(MarlError::invalid_parameter("log_every", "must be positive"));
        }
        if self.max_steps_per_episode == Some(0) {
            return Err(MarlError::invalid_parameter("max_steps_per_episode", "must be positive"));
        }
        if self.env.done_probability == 0.0 && self.max_steps_per_episode.is_none() {
            return Err(MarlError::invalid_parameter(
                "max_steps_per_episode",
                "required when the environment never reports done",
            ));
        }
        self.env.validate()?;
        self.agent_for_env().validate()
    }
}
