use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{MarlError, Result};

/// Trait defining the interface for loss functions
pub trait Loss: Send + Sync {
    /// Mean loss over every element of a batch
    fn compute_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32;

    /// Gradient of `compute_batch` with respect to the predictions
    fn gradient_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> Array2<f32>;
}

/// Mean Squared Error loss
pub struct MSE;

impl Loss for MSE {
    fn compute_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32 {
        let diff = &predictions - &targets;
        diff.mapv(|d| d * d).sum() / diff.len().max(1) as f32
    }

    fn gradient_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> Array2<f32> {
        let n = predictions.len().max(1) as f32;
        (&predictions - &targets).mapv(|d| 2.0 * d / n)
    }
}

/// Huber loss (smooth L1)
pub struct HuberLoss {
    delta: f32,
}

impl HuberLoss {
    /// `delta` must be finite and positive.
    pub fn new(delta: f32) -> Result<Self> {
        if !(delta > 0.0 && delta.is_finite()) {
            return Err(MarlError::invalid_parameter(
                "delta".to_string(),
                format!("must be finite and positive, got {delta}"),
            ));
        }
        Ok(HuberLoss { delta })
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }
}

impl Loss for HuberLoss {
    fn compute_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> f32 {
        let diff = &predictions - &targets;
        let delta = self.delta;
        diff.mapv(|x| {
            let abs_x = x.abs();
            if abs_x <= delta {
                0.5 * x * x
            } else {
                delta * abs_x - 0.5 * delta * delta
            }
        })
        .sum()
            / diff.len().max(1) as f32
    }

    fn gradient_batch(&self, predictions: ArrayView2<f32>, targets: ArrayView2<f32>) -> Array2<f32> {
        let n = predictions.len().max(1) as f32;
        let delta = self.delta;
        (&predictions - &targets).mapv(|x| x.clamp(-delta, delta) / n)
    }
}

/// Loss used for the value network's regression onto TD targets
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum CriticLoss {
    #[default]
    Mse,
    Huber { delta: f32 },
}

impl CriticLoss {
    pub fn loss(&self) -> Result<Box<dyn Loss>> {
        Ok(match *self {
            CriticLoss::Mse => Box::new(MSE),
            CriticLoss::Huber { delta } => Box::new(HuberLoss::new(delta)?),
        })
    }
}
