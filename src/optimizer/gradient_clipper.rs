use serde::{Deserialize, Serialize};

use crate::layers::LayerGradients;

/// Gradient clipping methods
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum GradientClipper {
    /// No clipping
    #[default]
    None,

    /// Clip every gradient component into `[min, max]`
    ByValue { min: f32, max: f32 },

    /// Rescale the whole gradient set when its global L2 norm exceeds `max_norm`
    ByGlobalNorm { max_norm: f32 },
}

impl GradientClipper {
    /// Global L2 norm of a gradient set
    pub fn global_norm(gradients: &[LayerGradients]) -> f32 {
        gradients.iter().map(LayerGradients::squared_norm).sum::<f32>().sqrt()
    }

    pub fn clip(&self, gradients: &mut [LayerGradients]) {
        match *self {
            GradientClipper::None => {}
            GradientClipper::ByValue { min, max } => {
                for grads in gradients.iter_mut() {
                    grads.weights.mapv_inplace(|g| g.clamp(min, max));
                    grads.biases.mapv_inplace(|g| g.clamp(min, max));
                }
            }
            GradientClipper::ByGlobalNorm { max_norm } => {
                let norm = Self::global_norm(gradients);
                if norm > max_norm && norm > 0.0 {
                    let scale = max_norm / norm;
                    for grads in gradients.iter_mut() {
                        grads.scale(scale);
                    }
                }
            }
        }
    }
}
