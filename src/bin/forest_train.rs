//! Train independent DDPG agents in the placeholder forest-surveillance world.
//!
//! Usage: `forest_train [config.json]`. Without an argument the default configuration is used.
//! Set `RUST_LOG=info` (or `debug` for per-update losses) to see progress.

use log::{error, info};
use qmarl::error::Result;
use qmarl::multi_agent::{TrainingConfig, TrainingRun};

fn run() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from {path}");
            TrainingConfig::from_json_file(path)?
        }
        None => TrainingConfig::default(),
    };

    info!(
        "Training {} agents (state_dim={}, action_dim={}) for {} episodes",
        config.env.num_agents, config.env.state_dim, config.env.action_dim, config.episodes
    );
    let mut run = TrainingRun::forest(config)?;
    run.run_configured()?;
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}
