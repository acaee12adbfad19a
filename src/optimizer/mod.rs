pub mod gradient_clipper;

use ndarray::{Array1, Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::layers::{DenseLayer, LayerGradients};

pub use gradient_clipper::GradientClipper;

/// A first-order update rule over a network's layers.
pub trait Optimizer {
    /// Apply one descent step. `gradients[i]` belongs to `layers[i]`.
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients], learning_rate: f32);
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum OptimizerWrapper {
    SGD(SGD),
    Adam(Adam),
}

impl Optimizer for OptimizerWrapper {
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients], learning_rate: f32) {
        match self {
            OptimizerWrapper::SGD(optimizer) => optimizer.step(layers, gradients, learning_rate),
            OptimizerWrapper::Adam(optimizer) => optimizer.step(layers, gradients, learning_rate),
        }
    }
}

/// Optimizer selection as it appears in configuration files
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum OptimizerKind {
    Sgd,
    Adam { beta1: f32, beta2: f32, epsilon: f32 },
}

impl Default for OptimizerKind {
    fn default() -> Self {
        OptimizerKind::Adam {
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

impl OptimizerKind {
    pub fn build(&self) -> OptimizerWrapper {
        match *self {
            OptimizerKind::Sgd => OptimizerWrapper::SGD(SGD::new()),
            OptimizerKind::Adam { beta1, beta2, epsilon } => OptimizerWrapper::Adam(Adam::new(beta1, beta2, epsilon)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SGD;

impl SGD {
    pub fn new() -> SGD {
        SGD
    }
}

impl Optimizer for SGD {
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients], learning_rate: f32) {
        for (layer, grads) in layers.iter_mut().zip(gradients) {
            layer.weights.zip_mut_with(&grads.weights, |w, &g| *w -= learning_rate * g);
            layer.biases.zip_mut_with(&grads.biases, |b, &g| *b -= learning_rate * g);
        }
    }
}

/// Adam with one set of moment buffers per layer.
///
/// Buffers are allocated on the first step, so one instance must only ever train one network.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Adam {
    pub beta1: f32,
    pub beta2: f32,
    pub epsilon: f32,
    m_weights: Vec<Array2<f32>>,
    v_weights: Vec<Array2<f32>>,
    m_biases: Vec<Array1<f32>>,
    v_biases: Vec<Array1<f32>>,
    pub t: i32,
}

impl Adam {
    pub fn new(beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Adam {
            beta1,
            beta2,
            epsilon,
            m_weights: Vec::new(),
            v_weights: Vec::new(),
            m_biases: Vec::new(),
            v_biases: Vec::new(),
            t: 0,
        }
    }

    fn ensure_state(&mut self, layers: &[DenseLayer]) {
        let matches = self.m_weights.len() == layers.len()
            && self
                .m_weights
                .iter()
                .zip(layers)
                .all(|(m, l)| m.dim() == l.weights.dim());
        if matches {
            return;
        }
        self.m_weights = layers.iter().map(|l| Array2::zeros(l.weights.dim())).collect();
        self.v_weights = layers.iter().map(|l| Array2::zeros(l.weights.dim())).collect();
        self.m_biases = layers.iter().map(|l| Array1::zeros(l.biases.dim())).collect();
        self.v_biases = layers.iter().map(|l| Array1::zeros(l.biases.dim())).collect();
        self.t = 0;
    }
}

impl Default for Adam {
    fn default() -> Self {
        Self::new(0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn step(&mut self, layers: &mut [DenseLayer], gradients: &[LayerGradients], learning_rate: f32) {
        self.ensure_state(layers);
        self.t += 1;

        let (beta1, beta2, epsilon) = (self.beta1, self.beta2, self.epsilon);
        let correction1 = 1.0 - beta1.powi(self.t);
        let correction2 = 1.0 - beta2.powi(self.t);

        for (i, (layer, grads)) in layers.iter_mut().zip(gradients).enumerate() {
            Zip::from(&mut layer.weights)
                .and(&mut self.m_weights[i])
                .and(&mut self.v_weights[i])
                .and(&grads.weights)
                .for_each(|w, m, v, &g| {
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    *w -= learning_rate * (*m / correction1) / ((*v / correction2).sqrt() + epsilon);
                });
            Zip::from(&mut layer.biases)
                .and(&mut self.m_biases[i])
                .and(&mut self.v_biases[i])
                .and(&grads.biases)
                .for_each(|b, m, v, &g| {
                    *m = beta1 * *m + (1.0 - beta1) * g;
                    *v = beta2 * *v + (1.0 - beta2) * g * g;
                    *b -= learning_rate * (*m / correction1) / ((*v / correction2).sqrt() + epsilon);
                });
        }
    }
}
