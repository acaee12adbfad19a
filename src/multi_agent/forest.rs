use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::environment::{EnvStep, MultiAgentEnvironment, StepInfo};
use crate::error::{MarlError, Result};

/// Settings for [`ForestSurveillanceEnv`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub num_agents: usize,
    pub state_dim: usize,
    pub action_dim: usize,
    /// Chance that an agent reports done on any given step
    pub done_probability: f64,
    pub seed: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        ForestConfig {
            num_agents: 3,
            state_dim: 8,
            action_dim: 2,
            done_probability: 0.05,
            seed: None,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_agents == 0 || self.state_dim == 0 || self.action_dim == 0 {
            return Err(MarlError::invalid_parameter(
                "forest",
                "num_agents, state_dim and action_dim must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.done_probability) {
            return Err(MarlError::invalid_parameter("done_probability", "must lie in [0, 1]"));
        }
        Ok(())
    }
}

/// Placeholder forest-surveillance world.
///
/// States and rewards are drawn uniformly from `[0, 1)` and each agent independently reports
/// done with `done_probability`. Actions are validated for shape and otherwise ignored.
#[derive(Clone, Debug)]
pub struct ForestSurveillanceEnv {
    config: ForestConfig,
    steps: usize,
    rng: StdRng,
}

impl ForestSurveillanceEnv {
    pub fn new(config: ForestConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(ForestSurveillanceEnv { config, steps: 0, rng })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    fn random_states(&mut self) -> Array2<f32> {
        Array2::random_using(
            (self.config.num_agents, self.config.state_dim),
            Uniform::new(0.0f32, 1.0),
            &mut self.rng,
        )
    }
}

impl MultiAgentEnvironment for ForestSurveillanceEnv {
    fn num_agents(&self) -> usize {
        self.config.num_agents
    }

    fn state_dim(&self) -> usize {
        self.config.state_dim
    }

    fn action_dim(&self) -> usize {
        self.config.action_dim
    }

    fn reset(&mut self) -> Array2<f32> {
        self.steps = 0;
        self.random_states()
    }

    fn step(&mut self, actions: &[Array1<f32>]) -> Result<EnvStep> {
        if actions.len() != self.config.num_agents {
            return Err(MarlError::dimension_mismatch(
                format!("{} actions", self.config.num_agents),
                format!("{} actions", actions.len()),
            ));
        }
        if let Some(bad) = actions.iter().find(|a| a.len() != self.config.action_dim) {
            return Err(MarlError::dimension_mismatch(
                format!("action of length {}", self.config.action_dim),
                format!("action of length {}", bad.len()),
            ));
        }

        self.steps += 1;
        let next_states = self.random_states();
        let rewards = Array1::random_using(self.config.num_agents, Uniform::new(0.0f32, 1.0), &mut self.rng);
        let p = self.config.done_probability;
        let dones = (0..self.config.num_agents).map(|_| self.rng.gen_bool(p)).collect();

        let mut info = StepInfo::new();
        info.insert("step".to_string(), self.steps as f32);

        Ok(EnvStep {
            next_states,
            rewards,
            dones,
            info,
        })
    }
}
