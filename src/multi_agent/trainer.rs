use log::{debug, info};
use ndarray::parallel::prelude::*;
use ndarray::{Array1, Array2};

use super::config::TrainingConfig;
use super::environment::{EnvStep, MultiAgentEnvironment};
use super::forest::ForestSurveillanceEnv;
use crate::agent::{DdpgAgent, UpdateStats};
use crate::error::{MarlError, Result};
use crate::replay_buffer::Transition;

/// Per-episode outcome
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    /// Undiscounted reward collected by each agent before it reported done
    pub agent_returns: Vec<f32>,
    /// Number of successful agent updates during the episode
    pub updates: usize,
    pub mean_critic_loss: Option<f32>,
    pub mean_actor_loss: Option<f32>,
}

impl EpisodeSummary {
    pub fn total_return(&self) -> f32 {
        self.agent_returns.iter().sum()
    }

    pub fn mean_return(&self) -> f32 {
        if self.agent_returns.is_empty() {
            0.0
        } else {
            self.total_return() / self.agent_returns.len() as f32
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingReport {
    pub episodes: Vec<EpisodeSummary>,
}

impl TrainingReport {
    pub fn total_steps(&self) -> usize {
        self.episodes.iter().map(|e| e.steps).sum()
    }

    pub fn mean_return(&self) -> f32 {
        if self.episodes.is_empty() {
            0.0
        } else {
            self.episodes.iter().map(EpisodeSummary::mean_return).sum::<f32>() / self.episodes.len() as f32
        }
    }

    pub fn last(&self) -> Option<&EpisodeSummary> {
        self.episodes.last()
    }
}

fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f32>() / values.len() as f32)
    }
}

/// One training session: an environment and one independent agent per controlled entity.
///
/// Each step acts for every agent, advances the environment once for all of them, stores
/// every agent's own transition in its own buffer and then updates every agent.
pub struct TrainingRun<E: MultiAgentEnvironment> {
    env: E,
    agents: Vec<DdpgAgent>,
    config: TrainingConfig,
    episodes_completed: usize,
}

impl TrainingRun<ForestSurveillanceEnv> {
    /// Build the environment from `config.env` and the agents from `config.agent`.
    pub fn forest(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let env = ForestSurveillanceEnv::new(config.env.clone())?;
        Self::new(env, config)
    }
}

impl<E: MultiAgentEnvironment> TrainingRun<E> {
    /// Agent dimensions are taken from the environment; agent `i` is seeded with `seed + i`.
    pub fn new(env: E, config: TrainingConfig) -> Result<Self> {
        if config.log_every == 0 {
            return Err(MarlError::invalid_parameter("log_every", "must be positive"));
        }
        if env.num_agents() == 0 {
            return Err(MarlError::invalid_parameter("num_agents", "environment has no agents"));
        }

        let mut base = config.agent.clone();
        base.state_dim = env.state_dim();
        base.action_dim = env.action_dim();

        let agents = (0..env.num_agents())
            .map(|i| {
                let mut agent_config = base.clone();
                agent_config.seed = base.seed.map(|s| s.wrapping_add(i as u64));
                DdpgAgent::new(agent_config)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(TrainingRun {
            env,
            agents,
            config,
            episodes_completed: 0,
        })
    }

    pub fn agents(&self) -> &[DdpgAgent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [DdpgAgent] {
        &mut self.agents
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn episodes_completed(&self) -> usize {
        self.episodes_completed
    }

    /// Run `episodes` episodes and collect their summaries.
    pub fn run(&mut self, episodes: usize) -> Result<TrainingReport> {
        let mut report = TrainingReport::default();
        for _ in 0..episodes {
            report.episodes.push(self.run_episode()?);
        }
        info!(
            "Training finished: {} episodes, {} steps, mean return {:.4}",
            report.episodes.len(),
            report.total_steps(),
            report.mean_return()
        );
        Ok(report)
    }

    /// Run the configured number of episodes.
    pub fn run_configured(&mut self) -> Result<TrainingReport> {
        self.run(self.config.episodes)
    }

    fn check_step(&self, step: &EnvStep) -> Result<()> {
        let n = self.agents.len();
        let expected = (n, self.env.state_dim());
        if step.next_states.dim() != expected || step.rewards.len() != n || step.dones.len() != n {
            return Err(MarlError::dimension_mismatch(
                format!("{n} agents with states of length {}", expected.1),
                format!(
                    "states {:?}, {} rewards, {} done flags",
                    step.next_states.dim(),
                    step.rewards.len(),
                    step.dones.len()
                ),
            ));
        }
        Ok(())
    }

    fn act_all(&mut self, states: &Array2<f32>) -> Result<Vec<Array1<f32>>> {
        self.agents
            .iter_mut()
            .zip(states.rows())
            .map(|(agent, state)| agent.act(state))
            .collect()
    }

    fn update_all(&mut self) -> Result<Vec<Option<UpdateStats>>> {
        if self.config.parallel_updates {
            self.agents
                .par_iter_mut()
                .map(|agent| agent.update_default())
                .collect()
        } else {
            self.agents.iter_mut().map(|agent| agent.update_default()).collect()
        }
    }

    /// Play one episode to completion, learning after every step.
    ///
    /// An agent that reports done stays done for the rest of the episode and stops recording
    /// transitions; the episode ends once all agents are done or the step cap is reached.
    pub fn run_episode(&mut self) -> Result<EpisodeSummary> {
        let n = self.agents.len();
        let mut states = self.env.reset();
        if states.dim() != (n, self.env.state_dim()) {
            return Err(MarlError::dimension_mismatch(
                format!("({n}, {})", self.env.state_dim()),
                format!("{:?}", states.dim()),
            ));
        }

        let mut finished = vec![false; n];
        let mut returns = vec![0.0f32; n];
        let mut critic_losses = Vec::new();
        let mut actor_losses = Vec::new();
        let mut steps = 0;

        while !finished.iter().all(|&f| f) {
            if self.config.max_steps_per_episode.map_or(false, |cap| steps >= cap) {
                debug!("episode {} hit the step cap at {steps}", self.episodes_completed);
                break;
            }

            let actions = self.act_all(&states)?;
            let step = self.env.step(&actions)?;
            self.check_step(&step)?;

            for (i, agent) in self.agents.iter_mut().enumerate() {
                if finished[i] {
                    continue;
                }
                agent.remember(Transition {
                    state: states.row(i).to_owned(),
                    action: actions[i].clone(),
                    reward: step.rewards[i],
                    next_state: step.next_states.row(i).to_owned(),
                    done: step.dones[i],
                })?;
                returns[i] += step.rewards[i];
                finished[i] = step.dones[i];
            }

            for stats in self.update_all()?.into_iter().flatten() {
                critic_losses.push(stats.critic_loss);
                actor_losses.push(stats.actor_loss);
            }

            states = step.next_states;
            steps += 1;
        }

        for agent in &mut self.agents {
            agent.end_episode();
        }

        let summary = EpisodeSummary {
            episode: self.episodes_completed,
            steps,
            agent_returns: returns,
            updates: critic_losses.len(),
            mean_critic_loss: mean(&critic_losses),
            mean_actor_loss: mean(&actor_losses),
        };
        self.episodes_completed += 1;

        if self.episodes_completed % self.config.log_every == 0 {
            info!(
                "Episode {}: steps={}, total reward={:.3}, critic loss={}, actor loss={}",
                summary.episode,
                summary.steps,
                summary.total_return(),
                summary.mean_critic_loss.map_or("n/a".to_string(), |l| format!("{l:.5}")),
                summary.mean_actor_loss.map_or("n/a".to_string(), |l| format!("{l:.5}")),
            );
        }
        Ok(summary)
    }
}
