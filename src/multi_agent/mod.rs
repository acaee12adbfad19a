//! # Multi-Agent Training Module
//!
//! Simultaneous-move environments and the loop that trains one independent DDPG agent
//! per controlled entity.
//!
//! ## Core Concepts
//!
//! - **Multi-Agent Environment**: every agent acts, then the world advances once for all of them
//! - **Independent learners**: each agent owns its networks, buffer and noise; nothing is shared
//! - **Training run**: an explicit object owning the environment and the agents
//!
//! ## Example
//!
//! ```rust
//! use qmarl::multi_agent::{TrainingConfig, TrainingRun};
//!
//! let mut config = TrainingConfig::default();
//! config.env.done_probability = 0.5;
//! config.env.seed = Some(1);
//! config.agent.hidden_sizes = vec![16, 16];
//! config.agent.batch_size = 4;
//! config.agent.seed = Some(1);
//!
//! let mut run = TrainingRun::forest(config).unwrap();
//! let report = run.run(2).unwrap();
//! assert_eq!(report.episodes.len(), 2);
//! ```

pub mod config;
pub mod environment;
pub mod forest;
pub mod trainer;

pub use config::TrainingConfig;
pub use environment::{EnvStep, MultiAgentEnvironment, StepInfo};
pub use forest::{ForestConfig, ForestSurveillanceEnv};
pub use trainer::{EpisodeSummary, TrainingReport, TrainingRun};
