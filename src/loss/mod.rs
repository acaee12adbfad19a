//! Loss functions for fitting the value network.

pub mod functions;

pub use functions::{CriticLoss, HuberLoss, Loss, MSE};
