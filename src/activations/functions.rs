use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// An enumeration of the possible activation functions that can be used in a network layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Relu,
    Linear,
    Tanh,
    Sigmoid,
    LeakyRelu { alpha: f32 },
}

impl Activation {
    #[inline]
    fn eval(&self, v: f32) -> f32 {
        match self {
            Activation::Relu => v.max(0.0),
            Activation::Linear => v,
            Activation::Tanh => v.tanh(),
            Activation::Sigmoid => 1.0 / (1.0 + (-v).exp()),
            Activation::LeakyRelu { alpha } => {
                if v > 0.0 {
                    v
                } else {
                    alpha * v
                }
            }
        }
    }

    #[inline]
    fn slope(&self, v: f32) -> f32 {
        match self {
            Activation::Relu => {
                if v > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Linear => 1.0,
            Activation::Tanh => {
                let t = v.tanh();
                1.0 - t * t
            }
            Activation::Sigmoid => {
                let s = 1.0 / (1.0 + (-v).exp());
                s * (1.0 - s)
            }
            Activation::LeakyRelu { alpha } => {
                if v > 0.0 {
                    1.0
                } else {
                    *alpha
                }
            }
        }
    }

    /// Apply the activation function to an input array in-place.
    pub fn apply(&self, input: &mut Array1<f32>) {
        input.mapv_inplace(|v| self.eval(v));
    }

    /// Apply the activation function to a batch of input arrays in-place.
    pub fn apply_batch(&self, inputs: &mut Array2<f32>) {
        if !matches!(self, Activation::Linear) {
            inputs.mapv_inplace(|v| self.eval(v));
        }
    }

    /// Derivative with respect to the pre-activation values of a batch.
    pub fn derivative_batch(&self, pre_activations: ArrayView2<f32>) -> Array2<f32> {
        pre_activations.mapv(|v| self.slope(v))
    }

    /// Inclusive output range, if the activation saturates.
    pub fn output_bounds(&self) -> Option<(f32, f32)> {
        match self {
            Activation::Tanh => Some((-1.0, 1.0)),
            Activation::Sigmoid => Some((0.0, 1.0)),
            _ => None,
        }
    }
}
