use ndarray::{Array1, Array2};
use std::collections::HashMap;

use crate::error::Result;

/// Free-form diagnostics returned by an environment step
pub type StepInfo = HashMap<String, f32>;

/// Result of one joint environment step
#[derive(Clone, Debug)]
pub struct EnvStep {
    /// One row per agent
    pub next_states: Array2<f32>,
    pub rewards: Array1<f32>,
    pub dones: Vec<bool>,
    pub info: StepInfo,
}

impl EnvStep {
    pub fn all_done(&self) -> bool {
        self.dones.iter().all(|&d| d)
    }
}

/// Simultaneous-move environment driving a fixed set of agents.
///
/// Every agent sees a state of `state_dim` components and answers with an action of
/// `action_dim` components; the environment advances all agents in one `step`.
pub trait MultiAgentEnvironment {
    /// Get number of agents
    fn num_agents(&self) -> usize;

    fn state_dim(&self) -> usize;

    fn action_dim(&self) -> usize;

    /// Reset environment, returning one initial state row per agent
    fn reset(&mut self) -> Array2<f32>;

    /// Step environment with one action per agent, in agent order
    fn step(&mut self, actions: &[Array1<f32>]) -> Result<EnvStep>;
}
