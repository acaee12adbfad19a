use log::{debug, warn};
use ndarray::{concatenate, s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::DdpgConfig;
use crate::error::{MarlError, Result};
use crate::exploration::GaussianNoise;
use crate::network::NeuralNetwork;
use crate::optimizer::{Optimizer, OptimizerWrapper};
use crate::replay_buffer::{ReplayBuffer, Transition, TransitionBatch};

/// Losses and target statistics of one successful [`DdpgAgent::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpdateStats {
    pub critic_loss: f32,
    pub actor_loss: f32,
    pub mean_q_target: f32,
}

/// Deep Deterministic Policy Gradient agent.
///
/// Owns a live actor/critic pair, a lagged target copy of each, its own replay buffer
/// and its own RNG. Agents never share state.
#[derive(Clone, Debug)]
pub struct DdpgAgent {
    /// Live policy network
    pub actor: NeuralNetwork,
    /// Lagged policy used only for bootstrapped targets
    pub actor_target: NeuralNetwork,
    /// Live value network
    pub critic: NeuralNetwork,
    /// Lagged value network used only for bootstrapped targets
    pub critic_target: NeuralNetwork,
    pub buffer: ReplayBuffer,
    pub noise: GaussianNoise,
    actor_optimizer: OptimizerWrapper,
    critic_optimizer: OptimizerWrapper,
    config: DdpgConfig,
    update_count: usize,
    rng: StdRng,
}

/// Stack `[states | actions]` row-wise into value-network inputs.
fn state_action<'a>(states: ArrayView2<'a, f32>, actions: ArrayView2<'a, f32>) -> Result<Array2<f32>> {
    concatenate(Axis(1), &[states, actions]).map_err(|e| {
        MarlError::dimension_mismatch(
            format!("{} rows", states.nrows()),
            format!("{} rows ({e})", actions.nrows()),
        )
    })
}

impl DdpgAgent {
    pub fn new(config: DdpgConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (hidden, activation, init) = (&config.hidden_sizes, config.hidden_activation, config.weight_init);
        let actor = NeuralNetwork::policy(config.state_dim, config.action_dim, hidden, activation, init, &mut rng)?;
        let critic = NeuralNetwork::value(config.state_dim, config.action_dim, hidden, activation, init, &mut rng)?;

        // Targets start as exact copies so the first bootstrapped targets track the live networks.
        let actor_target = actor.clone();
        let critic_target = critic.clone();

        let clip = if config.clip_actions { actor.output_bounds() } else { None };
        let noise = GaussianNoise::new(config.noise_scale, clip)?;

        Ok(DdpgAgent {
            actor,
            actor_target,
            critic,
            critic_target,
            buffer: ReplayBuffer::new(config.buffer_capacity)?,
            noise,
            actor_optimizer: config.optimizer.build(),
            critic_optimizer: config.optimizer.build(),
            config,
            update_count: 0,
            rng,
        })
    }

    pub fn config(&self) -> &DdpgConfig {
        &self.config
    }

    pub fn update_count(&self) -> usize {
        self.update_count
    }

    fn check_state(&self, state: ArrayView1<f32>) -> Result<()> {
        if state.len() == self.config.state_dim {
            Ok(())
        } else {
            Err(MarlError::dimension_mismatch(
                format!("state of length {}", self.config.state_dim),
                format!("state of length {}", state.len()),
            ))
        }
    }

    /// Deterministic policy action followed by exploration noise.
    pub fn act(&mut self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.check_state(state)?;
        let action = self.actor.forward(state);
        self.noise.perturb(action.view(), &mut self.rng)
    }

    /// Deterministic policy action without noise.
    pub fn act_greedy(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.check_state(state)?;
        Ok(self.actor.forward(state))
    }

    /// Store a transition after checking its dimensions.
    pub fn remember(&mut self, transition: Transition) -> Result<()> {
        self.check_state(transition.state.view())?;
        self.check_state(transition.next_state.view())?;
        if transition.action.len() != self.config.action_dim {
            return Err(MarlError::dimension_mismatch(
                format!("action of length {}", self.config.action_dim),
                format!("action of length {}", transition.action.len()),
            ));
        }
        self.buffer.add(transition);
        Ok(())
    }

    pub fn sample_batch(&mut self, batch_size: usize) -> Result<TransitionBatch> {
        let transitions = self.buffer.sample(batch_size, &mut self.rng)?;
        TransitionBatch::from_transitions(&transitions)
    }

    /// `reward + gamma * Q_target(s', mu_target(s')) * (1 - done)` per row.
    pub fn compute_targets(&self, batch: &TransitionBatch) -> Result<Array1<f32>> {
        let next_actions = self.actor_target.forward_batch(batch.next_states.view());
        let inputs = state_action(batch.next_states.view(), next_actions.view())?;
        let next_q = self.critic_target.forward_batch(inputs.view());
        let continuation = batch.dones.mapv(|d| 1.0 - d);
        Ok(&batch.rewards + &(&next_q.column(0) * &continuation * self.config.gamma))
    }

    /// One descent step on the value loss. Only the live critic changes.
    pub fn critic_step(&mut self, batch: &TransitionBatch) -> Result<f32> {
        // Targets are plain numbers here, nothing flows back into the target networks.
        let targets = self.compute_targets(batch)?.insert_axis(Axis(1));
        let inputs = state_action(batch.states.view(), batch.actions.view())?;

        let (q_values, cache) = self.critic.forward_cached(inputs.view());
        let loss_fn = self.config.critic_loss.loss()?;
        let loss = loss_fn.compute_batch(q_values.view(), targets.view());
        let output_grad = loss_fn.gradient_batch(q_values.view(), targets.view());

        let (mut gradients, _) = self.critic.backward(&cache, output_grad.view());
        self.config.grad_clip.clip(&mut gradients);
        self.critic_optimizer
            .step(&mut self.critic.layers, &gradients, self.config.critic_lr);
        Ok(loss)
    }

    /// One ascent step on `mean Q(s, mu(s))`. The critic is read but never written.
    pub fn actor_step(&mut self, batch: &TransitionBatch) -> Result<f32> {
        let batch_size = batch.len();
        let (actions, actor_cache) = self.actor.forward_cached(batch.states.view());
        let inputs = state_action(batch.states.view(), actions.view())?;
        let (q_values, critic_cache) = self.critic.forward_cached(inputs.view());
        let loss = -q_values.mean().unwrap_or(0.0);

        // d(-mean Q)/dQ, pushed through the frozen critic; its parameter gradients are dropped.
        let q_grad = Array2::from_elem((batch_size, 1), -1.0 / batch_size as f32);
        let (_, input_grad) = self.critic.backward(&critic_cache, q_grad.view());
        let action_grad = input_grad.slice(s![.., self.config.state_dim..]);

        let (mut gradients, _) = self.actor.backward(&actor_cache, action_grad);
        self.config.grad_clip.clip(&mut gradients);
        self.actor_optimizer
            .step(&mut self.actor.layers, &gradients, self.config.actor_lr);
        Ok(loss)
    }

    /// Polyak-average both target networks toward their live counterparts.
    pub fn soft_update_targets(&mut self) -> Result<()> {
        let tau = self.config.tau;
        self.actor_target.soft_update_from(&self.actor, tau)?;
        self.critic_target.soft_update_from(&self.critic, tau)
    }

    /// One full DDPG step on a freshly sampled batch.
    ///
    /// Returns `Ok(None)` without touching anything while the buffer holds fewer than
    /// `batch_size` transitions.
    pub fn update(&mut self, batch_size: usize) -> Result<Option<UpdateStats>> {
        if batch_size == 0 {
            return Err(MarlError::invalid_parameter("batch_size", "must be positive"));
        }
        if self.buffer.len() < batch_size {
            return Ok(None);
        }

        let batch = self.sample_batch(batch_size)?;
        let mean_q_target = self.compute_targets(&batch)?.mean().unwrap_or(0.0);
        let critic_loss = self.critic_step(&batch)?;
        let actor_loss = self.actor_step(&batch)?;
        self.soft_update_targets()?;
        self.update_count += 1;

        if !critic_loss.is_finite() || !actor_loss.is_finite() {
            warn!(
                "non-finite loss at update {}: critic {critic_loss}, actor {actor_loss}",
                self.update_count
            );
        }
        debug!(
            "update {}: critic_loss={critic_loss:.5} actor_loss={actor_loss:.5} q_target={mean_q_target:.4}",
            self.update_count
        );

        Ok(Some(UpdateStats {
            critic_loss,
            actor_loss,
            mean_q_target,
        }))
    }

    /// Update with the configured batch size.
    pub fn update_default(&mut self) -> Result<Option<UpdateStats>> {
        self.update(self.config.batch_size)
    }

    /// Apply the per-episode exploration schedule.
    pub fn end_episode(&mut self) {
        self.noise
            .decay(self.config.noise_decay, self.config.min_noise_scale);
    }
}
