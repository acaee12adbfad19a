//! # Agent Module
//!
//! Independent continuous-control learners. Each [`DdpgAgent`] owns a live actor/critic pair,
//! a lagged target copy of each, a replay buffer and its exploration noise.
//!
//! ## Example
//!
//! ```rust
//! use qmarl::agent::{DdpgAgent, DdpgConfig};
//! use qmarl::replay_buffer::Transition;
//! use ndarray::array;
//!
//! let config = DdpgConfig::new(4, 2).hidden_sizes(vec![32, 32]).seed(7);
//! let mut agent = DdpgAgent::new(config).unwrap();
//!
//! let state = array![0.1, -0.2, 0.3, 0.0];
//! let action = agent.act(state.view()).unwrap();
//!
//! agent.remember(Transition {
//!     state: state.clone(),
//!     action,
//!     reward: 1.0,
//!     next_state: array![0.2, -0.1, 0.3, 0.1],
//!     done: false,
//! }).unwrap();
//!
//! // Not enough data yet: the update is skipped
//! assert!(agent.update(32).unwrap().is_none());
//! ```

pub mod config;
pub mod ddpg;

pub use config::DdpgConfig;
pub use ddpg::{DdpgAgent, UpdateStats};
