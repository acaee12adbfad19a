use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::{MarlError, Result};
use crate::layers::{DenseLayer, LayerCache, LayerGradients, WeightInit};

/// Per-layer values recorded by [`NeuralNetwork::forward_cached`].
#[derive(Clone, Debug)]
pub struct ForwardCache {
    layers: Vec<LayerCache>,
}

/// A feed-forward network of dense layers.
///
/// The network only owns its parameters; optimizer state lives with whoever trains it,
/// so a forward pass is a pure function of the input and the current weights.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
}

impl NeuralNetwork {
    /// Create a network with the given layer sizes and one activation per layer.
    pub fn new<R: Rng + ?Sized>(
        layer_sizes: &[usize],
        activations: &[Activation],
        init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(MarlError::invalid_parameter(
                "layer_sizes",
                "network needs at least an input and an output size",
            ));
        }
        if layer_sizes.len() - 1 != activations.len() {
            return Err(MarlError::dimension_mismatch(
                format!("{} activations", layer_sizes.len() - 1),
                format!("{} activations", activations.len()),
            ));
        }
        if layer_sizes.iter().any(|&s| s == 0) {
            return Err(MarlError::invalid_parameter("layer_sizes", "layer sizes must be non-zero"));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new(window[0], window[1], activation, init, rng))
            .collect();

        Ok(NeuralNetwork { layers })
    }

    /// Policy shape: `state -> action`, Tanh head bounding each component to [-1, 1].
    pub fn policy<R: Rng + ?Sized>(
        state_dim: usize,
        action_dim: usize,
        hidden: &[usize],
        hidden_activation: Activation,
        init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        let sizes = stack_sizes(state_dim, hidden, action_dim);
        let activations = head_activations(hidden.len(), hidden_activation, Activation::Tanh);
        Self::new(&sizes, &activations, init, rng)
    }

    /// Value shape: `concat(state, action) -> scalar`, linear head.
    pub fn value<R: Rng + ?Sized>(
        state_dim: usize,
        action_dim: usize,
        hidden: &[usize],
        hidden_activation: Activation,
        init: WeightInit,
        rng: &mut R,
    ) -> Result<Self> {
        let sizes = stack_sizes(state_dim + action_dim, hidden, 1);
        let activations = head_activations(hidden.len(), hidden_activation, Activation::Linear);
        Self::new(&sizes, &activations, init, rng)
    }

    pub fn input_size(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_size)
    }

    pub fn output_size(&self) -> usize {
        self.layers.last().map_or(0, DenseLayer::output_size)
    }

    /// Output range of the head layer, if its activation saturates.
    pub fn output_bounds(&self) -> Option<(f32, f32)> {
        self.layers.last().and_then(|l| l.activation.output_bounds())
    }

    pub fn parameter_count(&self) -> usize {
        self.layers.iter().map(|l| l.weights.len() + l.biases.len()).sum()
    }

    /// Forward pass for a single input vector.
    pub fn forward(&self, input: ArrayView1<f32>) -> Array1<f32> {
        let output = self.forward_batch(input.insert_axis(Axis(0)));
        output.index_axis_move(Axis(0), 0)
    }

    /// Forward pass for a batch of row vectors.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            current = layer.forward_batch(current.view());
        }
        current
    }

    /// Forward pass that records every layer's inputs and pre-activations.
    pub fn forward_cached(&self, inputs: ArrayView2<f32>) -> (Array2<f32>, ForwardCache) {
        let mut caches = Vec::with_capacity(self.layers.len());
        let mut current = inputs.to_owned();
        for layer in &self.layers {
            let (output, cache) = layer.forward_cached(current.view());
            caches.push(cache);
            current = output;
        }
        (current, ForwardCache { layers: caches })
    }

    /// Backpropagate dL/d outputs through the whole network.
    ///
    /// Returns parameter gradients in layer order and dL/d inputs. Parameters are not touched,
    /// so this also serves to push a gradient through a frozen network.
    pub fn backward(&self, cache: &ForwardCache, output_grad: ArrayView2<f32>) -> (Vec<LayerGradients>, Array2<f32>) {
        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current = output_grad.to_owned();
        for (layer, layer_cache) in self.layers.iter().zip(cache.layers.iter()).rev() {
            let (grads, input_grad) = layer.backward(layer_cache, current.view());
            gradients.push(grads);
            current = input_grad;
        }
        gradients.reverse();
        (gradients, current)
    }

    /// True when both networks have identical layer shapes.
    pub fn same_architecture(&self, other: &NeuralNetwork) -> bool {
        self.layers.len() == other.layers.len()
            && self
                .layers
                .iter()
                .zip(other.layers.iter())
                .all(|(a, b)| a.weights.dim() == b.weights.dim() && a.biases.dim() == b.biases.dim())
    }

    fn check_architecture(&self, other: &NeuralNetwork) -> Result<()> {
        if self.same_architecture(other) {
            Ok(())
        } else {
            Err(MarlError::dimension_mismatch(
                format!("{} parameters", self.parameter_count()),
                format!("{} parameters", other.parameter_count()),
            ))
        }
    }

    /// Overwrite every parameter with `source`'s.
    pub fn copy_from(&mut self, source: &NeuralNetwork) -> Result<()> {
        self.check_architecture(source)?;
        for (target, layer) in self.layers.iter_mut().zip(source.layers.iter()) {
            target.weights.assign(&layer.weights);
            target.biases.assign(&layer.biases);
        }
        Ok(())
    }

    /// Polyak averaging: `self <- tau * source + (1 - tau) * self`, elementwise.
    pub fn soft_update_from(&mut self, source: &NeuralNetwork, tau: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&tau) {
            return Err(MarlError::invalid_parameter("tau", "must lie in [0, 1]"));
        }
        self.check_architecture(source)?;
        let keep = 1.0 - tau;
        for (target, layer) in self.layers.iter_mut().zip(source.layers.iter()) {
            Zip::from(&mut target.weights)
                .and(&layer.weights)
                .for_each(|t, &s| *t = tau * s + keep * *t);
            Zip::from(&mut target.biases)
                .and(&layer.biases)
                .for_each(|t, &s| *t = tau * s + keep * *t);
        }
        Ok(())
    }

    pub fn is_finite(&self) -> bool {
        self.layers
            .iter()
            .all(|l| l.weights.iter().chain(l.biases.iter()).all(|v| v.is_finite()))
    }
}

fn stack_sizes(input: usize, hidden: &[usize], output: usize) -> Vec<usize> {
    let mut sizes = Vec::with_capacity(hidden.len() + 2);
    sizes.push(input);
    sizes.extend_from_slice(hidden);
    sizes.push(output);
    sizes
}

fn head_activations(hidden_layers: usize, hidden: Activation, head: Activation) -> Vec<Activation> {
    vec![hidden; hidden_layers]
        .into_iter()
        .chain(std::iter::once(head))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_policy_output_bounded() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut policy = NeuralNetwork::policy(3, 2, &[16, 16], Activation::Relu, WeightInit::FanInUniform, &mut rng).unwrap();
        // Saturate the head
        policy.layers[2].biases.fill(50.0);
        let out = policy.forward(array![10.0, -10.0, 3.0].view());
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|a| (-1.0..=1.0).contains(a)));
    }

    #[test]
    fn test_value_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let value = NeuralNetwork::value(4, 2, &[8], Activation::Relu, WeightInit::FanInUniform, &mut rng).unwrap();
        assert_eq!(value.input_size(), 6);
        assert_eq!(value.output_size(), 1);
        let out = value.forward_batch(Array2::zeros((5, 6)).view());
        assert_eq!(out.dim(), (5, 1));
    }

    #[test]
    fn test_forward_is_pure() {
        let mut rng = StdRng::seed_from_u64(2);
        let net = NeuralNetwork::policy(3, 1, &[4], Activation::Relu, WeightInit::FanInUniform, &mut rng).unwrap();
        let x = array![0.1, 0.2, 0.3];
        assert_eq!(net.forward(x.view()), net.forward(x.view()));
    }

    #[test]
    fn test_rejects_bad_layout() {
        let mut rng = StdRng::seed_from_u64(2);
        assert!(NeuralNetwork::new(&[3], &[], WeightInit::Zeros, &mut rng).is_err());
        assert!(NeuralNetwork::new(&[3, 2], &[], WeightInit::Zeros, &mut rng).is_err());
        assert!(NeuralNetwork::new(&[3, 0, 2], &[Activation::Relu, Activation::Linear], WeightInit::Zeros, &mut rng).is_err());
    }

    #[test]
    fn test_backward_matches_finite_difference() {
        let mut rng = StdRng::seed_from_u64(7);
        let net = NeuralNetwork::new(
            &[3, 5, 1],
            &[Activation::Tanh, Activation::Linear],
            WeightInit::XavierUniform,
            &mut rng,
        )
        .unwrap();
        let x = array![[0.3, -0.2, 0.7]];
        let (_, cache) = net.forward_cached(x.view());
        let (grads, input_grad) = net.backward(&cache, array![[1.0]].view());

        let eps = 1e-3;
        let mut perturbed = net.clone();
        perturbed.layers[0].weights[[1, 2]] += eps;
        let up = perturbed.forward_batch(x.view())[[0, 0]];
        perturbed.layers[0].weights[[1, 2]] -= 2.0 * eps;
        let down = perturbed.forward_batch(x.view())[[0, 0]];
        let numeric = (up - down) / (2.0 * eps);
        assert!((numeric - grads[0].weights[[1, 2]]).abs() < 1e-2);

        let mut x_up = x.clone();
        x_up[[0, 0]] += eps;
        let mut x_down = x.clone();
        x_down[[0, 0]] -= eps;
        let numeric_in = (net.forward_batch(x_up.view())[[0, 0]] - net.forward_batch(x_down.view())[[0, 0]]) / (2.0 * eps);
        assert!((numeric_in - input_grad[[0, 0]]).abs() < 1e-2);
    }

    #[test]
    fn test_soft_update_extremes() {
        let mut rng = StdRng::seed_from_u64(4);
        let live = NeuralNetwork::value(2, 1, &[4], Activation::Relu, WeightInit::FanInUniform, &mut rng).unwrap();
        let original = NeuralNetwork::value(2, 1, &[4], Activation::Relu, WeightInit::FanInUniform, &mut rng).unwrap();

        let mut target = original.clone();
        target.soft_update_from(&live, 0.0).unwrap();
        assert_eq!(target, original);

        target.soft_update_from(&live, 1.0).unwrap();
        assert_eq!(target, live);
    }

    #[test]
    fn test_copy_from() {
        let mut rng = StdRng::seed_from_u64(6);
        let source = NeuralNetwork::policy(3, 2, &[8], Activation::Tanh, WeightInit::XavierUniform, &mut rng).unwrap();
        let mut dest = NeuralNetwork::policy(3, 2, &[8], Activation::Tanh, WeightInit::XavierUniform, &mut rng).unwrap();
        assert_ne!(dest, source);
        dest.copy_from(&source).unwrap();
        assert_eq!(dest, source);

        let mut wider = NeuralNetwork::policy(3, 2, &[9], Activation::Tanh, WeightInit::XavierUniform, &mut rng).unwrap();
        assert!(matches!(wider.copy_from(&source), Err(MarlError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_configurable_hidden_layers() {
        let mut rng = StdRng::seed_from_u64(6);
        let net = NeuralNetwork::value(
            2,
            1,
            &[4, 4],
            Activation::LeakyRelu { alpha: 0.1 },
            WeightInit::Uniform { min: -0.2, max: 0.2 },
            &mut rng,
        )
        .unwrap();
        assert_eq!(net.layers[0].activation, Activation::LeakyRelu { alpha: 0.1 });
        assert_eq!(net.layers[1].activation, Activation::LeakyRelu { alpha: 0.1 });
        assert_eq!(net.layers[2].activation, Activation::Linear);
        assert!(net.layers[0].weights.iter().all(|w| w.abs() <= 0.2));
        assert_eq!(net.output_bounds(), None);

        let policy = NeuralNetwork::policy(2, 1, &[4], Activation::Sigmoid, WeightInit::HeUniform, &mut rng).unwrap();
        assert_eq!(policy.layers[0].activation, Activation::Sigmoid);
        assert_eq!(policy.output_bounds(), Some((-1.0, 1.0)));
    }

    #[test]
    fn test_soft_update_rejects_mismatch() {
        let mut rng = StdRng::seed_from_u64(4);
        let live = NeuralNetwork::value(2, 1, &[4], Activation::Relu, WeightInit::FanInUniform, &mut rng).unwrap();
        let mut other = NeuralNetwork::value(2, 1, &[8], Activation::Relu, WeightInit::FanInUniform, &mut rng).unwrap();
        assert!(matches!(
            other.soft_update_from(&live, 0.5),
            Err(MarlError::DimensionMismatch { .. })
        ));
        let same = other.clone();
        assert!(matches!(
            other.soft_update_from(&same, 1.5),
            Err(MarlError::InvalidParameter { .. })
        ));
    }
}
