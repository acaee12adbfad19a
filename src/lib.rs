//! # qmarl - Independent DDPG Agents for Multi-Agent Continuous Control
//!
//! qmarl trains a fixed set of independent continuous-control agents in a shared,
//! simultaneous-move environment. Every agent is a DDPG learner: a deterministic policy
//! ("actor") and a state-action value function ("critic"), each with a slowly tracking
//! target copy, fed from the agent's own replay buffer and explored with Gaussian
//! perturbations of its actions.
//!
//! ## Key Features
//!
//! - **Plain ndarray networks**: dense layers with explicit forward and backward passes
//! - **DDPG update**: TD targets from target networks, MSE critic regression, deterministic
//!   policy gradient through a frozen critic, Polyak-averaged targets
//! - **Replay buffer**: bounded FIFO with uniform sampling without replacement
//! - **Exploration**: Gaussian action noise with optional clipping and decay
//! - **Training run**: an explicit object owning the environment and all agents
//!
//! ## Quick Start
//!
//! ```rust
//! use qmarl::agent::{DdpgAgent, DdpgConfig};
//! use qmarl::replay_buffer::Transition;
//! use ndarray::Array1;
//!
//! let config = DdpgConfig::new(4, 2).hidden_sizes(vec![32, 32]).seed(0);
//! let mut agent = DdpgAgent::new(config).unwrap();
//!
//! for i in 0..40 {
//!     let state = Array1::from_elem(4, i as f32 / 40.0);
//!     let action = agent.act(state.view()).unwrap();
//!     agent.remember(Transition {
//!         state,
//!         action,
//!         reward: 1.0,
//!         next_state: Array1::from_elem(4, (i + 1) as f32 / 40.0),
//!         done: false,
//!     }).unwrap();
//! }
//!
//! let stats = agent.update(32).unwrap().expect("buffer holds enough samples");
//! assert!(stats.critic_loss.is_finite());
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions (ReLU, Tanh, ...)
//! - [`agent`] - The DDPG agent and its configuration
//! - [`error`] - Error types and result handling
//! - [`exploration`] - Gaussian exploration noise
//! - [`layers`] - Dense layers and weight initialization
//! - [`loss`] - Loss functions for the value network
//! - [`multi_agent`] - Environments and the training loop
//! - [`network`] - Feed-forward function approximators
//! - [`optimizer`] - SGD, Adam and gradient clipping
//! - [`replay_buffer`] - Experience replay

pub mod activations;
pub mod agent;
pub mod error;
pub mod exploration;
pub mod layers;
pub mod loss;
pub mod multi_agent;
pub mod network;
pub mod optimizer;
pub mod replay_buffer;

#[cfg(test)]
mod tests;
