use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::initialization::WeightInit;
use crate::activations::Activation;

/// A fully connected (dense) layer: `activation(inputs · weights + biases)`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

/// Values saved by a forward pass that the matching backward pass needs
#[derive(Clone, Debug)]
pub struct LayerCache {
    inputs: Array2<f32>,
    pre_activations: Array2<f32>,
}

/// Gradients of a loss with respect to one layer's parameters
#[derive(Clone, Debug, PartialEq)]
pub struct LayerGradients {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
}

impl LayerGradients {
    pub fn squared_norm(&self) -> f32 {
        self.weights.iter().chain(self.biases.iter()).map(|g| g * g).sum()
    }

    pub fn scale(&mut self, factor: f32) {
        self.weights.mapv_inplace(|g| g * factor);
        self.biases.mapv_inplace(|g| g * factor);
    }
}

impl DenseLayer {
    pub fn new<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        activation: Activation,
        init: WeightInit,
        rng: &mut R,
    ) -> Self {
        DenseLayer {
            weights: init.initialize_weights((input_size, output_size), rng),
            biases: init.initialize_biases(input_size, output_size, rng),
            activation,
        }
    }

    pub fn with_weights(mut self, weights: Array2<f32>) -> Self {
        assert_eq!(weights.dim(), self.weights.dim());
        self.weights = weights;
        self
    }

    pub fn with_biases(mut self, biases: Array1<f32>) -> Self {
        assert_eq!(biases.dim(), self.biases.dim());
        self.biases = biases;
        self
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    fn affine(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0))
    }

    /// Forward pass for a batch of row vectors. Pure: no state is stored.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut outputs = self.affine(inputs);
        self.activation.apply_batch(&mut outputs);
        outputs
    }

    /// Forward pass that also returns what `backward` needs.
    pub fn forward_cached(&self, inputs: ArrayView2<f32>) -> (Array2<f32>, LayerCache) {
        let pre_activations = self.affine(inputs);
        let mut outputs = pre_activations.clone();
        self.activation.apply_batch(&mut outputs);
        let cache = LayerCache {
            inputs: inputs.to_owned(),
            pre_activations,
        };
        (outputs, cache)
    }

    /// Backpropagate `output_grad` (dL/d outputs) through this layer.
    ///
    /// Returns the parameter gradients and dL/d inputs.
    pub fn backward(&self, cache: &LayerCache, output_grad: ArrayView2<f32>) -> (LayerGradients, Array2<f32>) {
        let delta = &output_grad * &self.activation.derivative_batch(cache.pre_activations.view());
        let gradients = LayerGradients {
            weights: cache.inputs.t().dot(&delta),
            biases: delta.sum_axis(Axis(0)),
        };
        let input_grad = delta.dot(&self.weights.t());
        (gradients, input_grad)
    }
}
