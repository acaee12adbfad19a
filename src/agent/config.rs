use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{MarlError, Result};
use crate::layers::WeightInit;
use crate::loss::CriticLoss;
use crate::optimizer::{GradientClipper, OptimizerKind};
use crate::replay_buffer::DEFAULT_CAPACITY;

/// Hyperparameters of one DDPG agent.
///
/// Every field has a default, so a JSON file only needs to list what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DdpgConfig {
    pub state_dim: usize,
    pub action_dim: usize,
    pub hidden_sizes: Vec<usize>,
    /// Nonlinearity of every hidden layer in both networks
    pub hidden_activation: Activation,
    pub weight_init: WeightInit,
    /// Discount factor
    pub gamma: f32,
    /// Soft update coefficient
    pub tau: f32,
    pub actor_lr: f32,
    pub critic_lr: f32,
    pub buffer_capacity: usize,
    pub batch_size: usize,
    /// Std-dev of the Gaussian exploration noise
    pub noise_scale: f32,
    /// Clamp explored actions back into [-1, 1]
    pub clip_actions: bool,
    /// Per-episode multiplier on `noise_scale`
    pub noise_decay: f32,
    pub min_noise_scale: f32,
    pub optimizer: OptimizerKind,
    pub critic_loss: CriticLoss,
    pub grad_clip: GradientClipper,
    pub seed: Option<u64>,
}

impl Default for DdpgConfig {
    fn default() -> Self {
        DdpgConfig {
            state_dim: 8,
            action_dim: 2,
            hidden_sizes: vec![256, 256],
            hidden_activation: Activation::Relu,
            weight_init: WeightInit::FanInUniform,
            gamma: 0.99,
            tau: 0.01,
            actor_lr: 1e-4,
            critic_lr: 1e-3,
            buffer_capacity: DEFAULT_CAPACITY,
            batch_size: 64,
            noise_scale: 0.1,
            clip_actions: true,
            noise_decay: 1.0,
            min_noise_scale: 0.0,
            optimizer: OptimizerKind::default(),
            critic_loss: CriticLoss::Mse,
            grad_clip: GradientClipper::None,
            seed: None,
        }
    }
}

fn check(ok: bool, name: &str, reason: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(MarlError::invalid_parameter(name, reason))
    }
}

impl DdpgConfig {
    pub fn new(state_dim: usize, action_dim: usize) -> Self {
        DdpgConfig {
            state_dim,
            action_dim,
            ..Default::default()
        }
    }

    pub fn hidden_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.hidden_sizes = sizes;
        self
    }

    pub fn hidden_activation(mut self, activation: Activation) -> Self {
        self.hidden_activation = activation;
        self
    }

    pub fn weight_init(mut self, init: WeightInit) -> Self {
        self.weight_init = init;
        self
    }

    pub fn gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn tau(mut self, tau: f32) -> Self {
        self.tau = tau;
        self
    }

    pub fn learning_rates(mut self, actor_lr: f32, critic_lr: f32) -> Self {
        self.actor_lr = actor_lr;
        self.critic_lr = critic_lr;
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn noise(mut self, scale: f32, clip_actions: bool) -> Self {
        self.noise_scale = scale;
        self.clip_actions = clip_actions;
        self
    }

    pub fn noise_schedule(mut self, decay: f32, min_scale: f32) -> Self {
        self.noise_decay = decay;
        self.min_noise_scale = min_scale;
        self
    }

    pub fn optimizer(mut self, optimizer: OptimizerKind) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn critic_loss(mut self, loss: CriticLoss) -> Self {
        self.critic_loss = loss;
        self
    }

    pub fn grad_clip(mut self, clipper: GradientClipper) -> Self {
        self.grad_clip = clipper;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        check(self.state_dim > 0, "state_dim", "must be positive")?;
        check(self.action_dim > 0, "action_dim", "must be positive")?;
        check(self.hidden_sizes.iter().all(|&h| h > 0), "hidden_sizes", "layer widths must be positive")?;
        check((0.0..=1.0).contains(&self.gamma), "gamma", "must lie in [0, 1]")?;
        check((0.0..=1.0).contains(&self.tau), "tau", "must lie in [0, 1]")?;
        check(self.actor_lr > 0.0 && self.actor_lr.is_finite(), "actor_lr", "must be positive")?;
        check(self.critic_lr > 0.0 && self.critic_lr.is_finite(), "critic_lr", "must be positive")?;
        check(self.buffer_capacity > 0, "buffer_capacity", "must be positive")?;
        check(self.batch_size > 0, "batch_size", "must be positive")?;
        check(self.noise_scale >= 0.0 && self.noise_scale.is_finite(), "noise_scale", "must be non-negative")?;
        check(self.noise_decay > 0.0 && self.noise_decay <= 1.0, "noise_decay", "must lie in (0, 1]")?;
        check(self.min_noise_scale >= 0.0, "min_noise_scale", "must be non-negative")?;
        if let Activation::LeakyRelu { alpha } = self.hidden_activation {
            check(alpha.is_finite() && alpha >= 0.0, "hidden_activation", "leaky relu alpha must be non-negative")?;
        }
        if let WeightInit::Uniform { min, max } = self.weight_init {
            check(min.is_finite() && max.is_finite() && min <= max, "weight_init", "uniform range is empty")?;
        }
        match self.grad_clip {
            GradientClipper::ByValue { min, max } => check(min <= max, "grad_clip", "min exceeds max")?,
            GradientClipper::ByGlobalNorm { max_norm } => check(max_norm > 0.0, "grad_clip", "max_norm must be positive")?,
            GradientClipper::None => {}
        }
        if let CriticLoss::Huber { delta } = self.critic_loss {
            check(delta > 0.0 && delta.is_finite(), "critic_loss", "huber delta must be positive")?;
        }
        Ok(())
    }
}
