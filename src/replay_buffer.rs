use ndarray::{Array1, Array2};
use rand::seq::index;
use rand::Rng;
use std::collections::VecDeque;

use crate::error::{MarlError, Result};

pub const DEFAULT_CAPACITY: usize = 100_000;

/// One `(state, action, reward, next_state, done)` record of environment interaction.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: Array1<f32>,
    pub action: Array1<f32>,
    pub reward: f32,
    pub next_state: Array1<f32>,
    pub done: bool,
}

/// Bounded FIFO store of transitions with uniform sampling.
#[derive(Clone, Debug)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(MarlError::invalid_parameter("capacity", "must be at least 1"));
        }
        Ok(ReplayBuffer {
            buffer: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        })
    }

    /// Append a transition, evicting the oldest one when full.
    pub fn add(&mut self, transition: Transition) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Draw `batch_size` distinct transitions uniformly without replacement.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Result<Vec<&Transition>> {
        if batch_size > self.buffer.len() {
            return Err(MarlError::InsufficientSamples {
                requested: batch_size,
                available: self.buffer.len(),
            });
        }
        Ok(index::sample(rng, self.buffer.len(), batch_size)
            .iter()
            .map(|i| &self.buffer[i])
            .collect())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Sampled transitions stacked row-wise.
#[derive(Clone, Debug)]
pub struct TransitionBatch {
    pub states: Array2<f32>,
    pub actions: Array2<f32>,
    pub rewards: Array1<f32>,
    pub next_states: Array2<f32>,
    /// 1.0 for terminal transitions, 0.0 otherwise
    pub dones: Array1<f32>,
}

impl TransitionBatch {
    pub fn from_transitions(transitions: &[&Transition]) -> Result<Self> {
        let first = transitions
            .first()
            .ok_or_else(|| MarlError::InsufficientSamples { requested: 1, available: 0 })?;
        let state_dim = first.state.len();
        let action_dim = first.action.len();
        let rows = transitions.len();

        let mut states = Array2::zeros((rows, state_dim));
        let mut actions = Array2::zeros((rows, action_dim));
        let mut next_states = Array2::zeros((rows, state_dim));
        let mut rewards = Array1::zeros(rows);
        let mut dones = Array1::zeros(rows);

        for (i, t) in transitions.iter().enumerate() {
            if t.state.len() != state_dim || t.next_state.len() != state_dim || t.action.len() != action_dim {
                return Err(MarlError::dimension_mismatch(
                    format!("state {state_dim}, action {action_dim}"),
                    format!("state {}, action {} at row {i}", t.state.len(), t.action.len()),
                ));
            }
            states.row_mut(i).assign(&t.state);
            actions.row_mut(i).assign(&t.action);
            next_states.row_mut(i).assign(&t.next_state);
            rewards[i] = t.reward;
            dones[i] = if t.done { 1.0 } else { 0.0 };
        }

        Ok(TransitionBatch {
            states,
            actions,
            rewards,
            next_states,
            dones,
        })
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}
