use ndarray::{concatenate, Array1, Array2, Axis};

use crate::activations::Activation;
use crate::agent::{DdpgAgent, DdpgConfig};
use crate::layers::WeightInit;
use crate::optimizer::OptimizerKind;
use crate::replay_buffer::Transition;

fn config(seed: u64) -> DdpgConfig {
    DdpgConfig::new(4, 2).hidden_sizes(vec![32, 32]).seed(seed)
}

fn fill(agent: &mut DdpgAgent, count: usize, reward: f32, done: bool) {
    for i in 0..count {
        let phase = i as f32 / count as f32;
        let state = Array1::from_shape_fn(4, |j| (phase + j as f32 * 0.1).sin());
        let next_state = Array1::from_shape_fn(4, |j| (phase + 0.01 + j as f32 * 0.1).sin());
        let action = agent.act(state.view()).unwrap();
        agent
            .remember(Transition {
                state,
                action,
                reward,
                next_state,
                done,
            })
            .unwrap();
    }
}

/// Mean of `Q(s, mu(s))` under the live networks.
fn mean_policy_value(agent: &DdpgAgent, states: &Array2<f32>) -> f32 {
    let actions = agent.actor.forward_batch(states.view());
    let inputs = concatenate(Axis(1), &[states.view(), actions.view()]).unwrap();
    agent.critic.forward_batch(inputs.view()).mean().unwrap()
}

#[test]
fn test_terminal_targets_equal_reward() {
    let mut agent = DdpgAgent::new(config(3)).unwrap();
    for i in 0..20 {
        agent
            .remember(Transition {
                state: Array1::from_elem(4, 0.5),
                action: Array1::from_elem(2, 0.1),
                reward: i as f32 - 7.5,
                next_state: Array1::from_elem(4, 0.9),
                done: true,
            })
            .unwrap();
    }
    let batch = agent.sample_batch(20).unwrap();
    let targets = agent.compute_targets(&batch).unwrap();
    assert_eq!(targets, batch.rewards);
}

#[test]
fn test_non_terminal_targets_bootstrap() {
    let mut agent = DdpgAgent::new(config(3)).unwrap();
    fill(&mut agent, 10, 0.0, false);
    let batch = agent.sample_batch(10).unwrap();
    let targets = agent.compute_targets(&batch).unwrap();
    // Zero rewards, so any non-zero target comes from the target critic
    assert!(targets.iter().any(|t| *t != 0.0));
}

#[test]
fn test_critic_step_leaves_actor_alone() {
    let mut agent = DdpgAgent::new(config(5)).unwrap();
    fill(&mut agent, 64, 1.0, false);
    let batch = agent.sample_batch(32).unwrap();

    let actor_before = agent.actor.clone();
    let critic_before = agent.critic.clone();
    agent.critic_step(&batch).unwrap();

    assert_eq!(agent.actor, actor_before);
    assert_ne!(agent.critic, critic_before);
}

#[test]
fn test_actor_step_leaves_critic_alone() {
    let mut agent = DdpgAgent::new(config(5)).unwrap();
    fill(&mut agent, 64, 1.0, false);
    let batch = agent.sample_batch(32).unwrap();

    let mut with_actor = agent.clone();
    let mut critic_only = agent.clone();

    with_actor.critic_step(&batch).unwrap();
    with_actor.actor_step(&batch).unwrap();
    critic_only.critic_step(&batch).unwrap();

    // The policy gradient must not leak into the critic's parameters
    assert_eq!(with_actor.critic, critic_only.critic);
    assert_ne!(with_actor.actor, critic_only.actor);
    assert_eq!(with_actor.critic_target, agent.critic_target);
    assert_eq!(with_actor.actor_target, agent.actor_target);
}

#[test]
fn test_tau_one_copies_live_networks() {
    let mut agent = DdpgAgent::new(config(8).tau(1.0)).unwrap();
    fill(&mut agent, 40, 1.0, false);
    agent.update(16).unwrap().unwrap();
    assert_eq!(agent.actor_target, agent.actor);
    assert_eq!(agent.critic_target, agent.critic);
}

#[test]
fn test_tau_zero_freezes_targets() {
    let mut agent = DdpgAgent::new(config(8).tau(0.0)).unwrap();
    let actor_target = agent.actor_target.clone();
    let critic_target = agent.critic_target.clone();
    fill(&mut agent, 40, 1.0, false);
    for _ in 0..3 {
        agent.update(16).unwrap().unwrap();
    }
    assert_eq!(agent.actor_target, actor_target);
    assert_eq!(agent.critic_target, critic_target);
    assert_ne!(agent.critic, critic_target);
}

#[test]
fn test_soft_update_interpolates() {
    let mut agent = DdpgAgent::new(config(9).tau(0.25)).unwrap();
    fill(&mut agent, 40, 1.0, false);
    let batch = agent.sample_batch(16).unwrap();
    agent.critic_step(&batch).unwrap();

    let before = agent.critic_target.clone();
    agent.soft_update_targets().unwrap();

    for ((target, old), live) in agent
        .critic_target
        .layers
        .iter()
        .zip(before.layers.iter())
        .zip(agent.critic.layers.iter())
    {
        for ((t, o), l) in target.weights.iter().zip(old.weights.iter()).zip(live.weights.iter()) {
            assert!((t - (0.25 * l + 0.75 * o)).abs() < 1e-6);
        }
    }
}

#[test]
fn test_update_without_enough_data_is_noop() {
    let mut agent = DdpgAgent::new(config(11)).unwrap();
    fill(&mut agent, 10, 1.0, false);
    let snapshot = agent.clone();

    assert!(agent.update(32).unwrap().is_none());

    assert_eq!(agent.update_count(), 0);
    assert_eq!(agent.buffer.len(), 10);
    assert_eq!(agent.actor, snapshot.actor);
    assert_eq!(agent.critic, snapshot.critic);
    assert_eq!(agent.actor_target, snapshot.actor_target);
    assert_eq!(agent.critic_target, snapshot.critic_target);
}

#[test]
fn test_update_counts_and_stats() {
    let mut agent = DdpgAgent::new(config(12).batch_size(8)).unwrap();
    fill(&mut agent, 8, 0.5, false);
    let stats = agent.update_default().unwrap().unwrap();
    assert_eq!(agent.update_count(), 1);
    assert!(stats.critic_loss >= 0.0);
    assert!(stats.actor_loss.is_finite());
    assert!(stats.mean_q_target.is_finite());
}

#[test]
fn test_constant_reward_learning_is_stable() {
    let mut agent = DdpgAgent::new(DdpgConfig::new(4, 2).hidden_sizes(vec![64, 64]).seed(2024)).unwrap();
    fill(&mut agent, 100, 1.0, false);

    let losses: Vec<f32> = (0..50)
        .map(|_| agent.update(32).unwrap().unwrap().critic_loss)
        .collect();

    assert!(losses.iter().all(|l| l.is_finite()));
    assert!(agent.actor.is_finite() && agent.critic.is_finite());

    let window = 10;
    let first: f32 = losses[..window].iter().sum::<f32>() / window as f32;
    let last: f32 = losses[losses.len() - window..].iter().sum::<f32>() / window as f32;
    assert!(last <= first, "critic loss grew from {first} to {last}");
}

#[test]
fn test_noise_decays_per_episode() {
    let mut agent = DdpgAgent::new(config(1).noise(0.4, true).noise_schedule(0.5, 0.15)).unwrap();
    agent.end_episode();
    assert!((agent.noise.scale - 0.2).abs() < 1e-6);
    agent.end_episode();
    assert!((agent.noise.scale - 0.15).abs() < 1e-6);
}

#[test]
fn test_actor_step_raises_policy_value() {
    let mut agent = DdpgAgent::new(
        config(21)
            .optimizer(OptimizerKind::Sgd)
            .learning_rates(1e-2, 1e-3),
    )
    .unwrap();
    fill(&mut agent, 64, 1.0, false);
    let batch = agent.sample_batch(32).unwrap();

    let before = mean_policy_value(&agent, &batch.states);
    let actor_loss = agent.actor_step(&batch).unwrap();
    let after = mean_policy_value(&agent, &batch.states);

    assert!((actor_loss + before).abs() < 1e-5);
    assert!(after > before, "mean Q fell from {before} to {after}");
}

#[test]
fn test_targets_come_from_target_networks() {
    let mut agent = DdpgAgent::new(config(31)).unwrap();
    fill(&mut agent, 32, 0.5, false);
    let batch = agent.sample_batch(32).unwrap();
    let targets = agent.compute_targets(&batch).unwrap();

    for layer in agent.actor.layers.iter_mut().chain(agent.critic.layers.iter_mut()) {
        layer.weights.mapv_inplace(|w| w + 0.5);
        layer.biases.fill(0.3);
    }
    assert_eq!(agent.compute_targets(&batch).unwrap(), targets);

    // A shifted target critic moves every non-terminal target by gamma * shift
    if let Some(head) = agent.critic_target.layers.last_mut() {
        head.biases.mapv_inplace(|b| b + 1.0);
    }
    let shifted = agent.compute_targets(&batch).unwrap();
    for (new, old) in shifted.iter().zip(targets.iter()) {
        assert!((new - old - 0.99).abs() < 1e-4);
    }

    if let Some(head) = agent.actor_target.layers.last_mut() {
        head.biases.mapv_inplace(|b| b + 0.5);
    }
    assert_ne!(agent.compute_targets(&batch).unwrap(), shifted);
}

#[test]
fn test_configured_architecture_reaches_networks() {
    let mut agent = DdpgAgent::new(
        config(41)
            .hidden_activation(Activation::Sigmoid)
            .weight_init(WeightInit::HeUniform)
            .noise(5.0, true),
    )
    .unwrap();
    for network in [&agent.actor, &agent.critic, &agent.actor_target, &agent.critic_target] {
        assert_eq!(network.layers[0].activation, Activation::Sigmoid);
        assert_eq!(network.layers[1].activation, Activation::Sigmoid);
        assert!(network.layers[0].biases.iter().all(|&b| b == 0.0));
    }
    assert_eq!(agent.noise.clip, Some((-1.0, 1.0)));

    fill(&mut agent, 40, 1.0, false);
    assert!(agent.buffer.iter().all(|t| t.action.iter().all(|a| (-1.0..=1.0).contains(a))));
    let stats = agent.update(16).unwrap().unwrap();
    assert!(stats.critic_loss.is_finite());
}

#[test]
fn test_unclipped_exploration() {
    let agent = DdpgAgent::new(config(41).noise(0.3, false)).unwrap();
    assert_eq!(agent.noise.clip, None);
}
