use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum WeightInit {
    /// Uniform in ±1/sqrt(fan_in), weights and biases alike
    #[default]
    FanInUniform,

    /// Xavier/Glorot uniform initialization
    XavierUniform,

    /// He/Kaiming uniform initialization (for ReLU)
    HeUniform,

    /// Uniform distribution with custom range
    Uniform { min: f32, max: f32 },

    /// All zeros
    Zeros,
}

fn uniform_matrix<R: Rng + ?Sized>(shape: (usize, usize), min: f32, max: f32, rng: &mut R) -> Array2<f32> {
    if min < max {
        Array2::random_using(shape, Uniform::new(min, max), rng)
    } else {
        Array2::from_elem(shape, min)
    }
}

fn uniform_vector<R: Rng + ?Sized>(size: usize, min: f32, max: f32, rng: &mut R) -> Array1<f32> {
    if min < max {
        Array1::random_using(size, Uniform::new(min, max), rng)
    } else {
        Array1::from_elem(size, min)
    }
}

impl WeightInit {
    /// Initialize an `(fan_in, fan_out)` weight matrix
    pub fn initialize_weights<R: Rng + ?Sized>(&self, shape: (usize, usize), rng: &mut R) -> Array2<f32> {
        let (fan_in, fan_out) = shape;

        match *self {
            WeightInit::FanInUniform => {
                let limit = 1.0 / (fan_in.max(1) as f32).sqrt();
                uniform_matrix(shape, -limit, limit, rng)
            }
            WeightInit::XavierUniform => {
                let limit = (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
                uniform_matrix(shape, -limit, limit, rng)
            }
            WeightInit::HeUniform => {
                let limit = (6.0 / fan_in.max(1) as f32).sqrt();
                uniform_matrix(shape, -limit, limit, rng)
            }
            WeightInit::Uniform { min, max } => uniform_matrix(shape, min, max, rng),
            WeightInit::Zeros => Array2::zeros(shape),
        }
    }

    /// Initialize the bias vector of a layer with the given fan-in
    pub fn initialize_biases<R: Rng + ?Sized>(&self, fan_in: usize, size: usize, rng: &mut R) -> Array1<f32> {
        match *self {
            WeightInit::FanInUniform => {
                let limit = 1.0 / (fan_in.max(1) as f32).sqrt();
                uniform_vector(size, -limit, limit, rng)
            }
            WeightInit::Uniform { min, max } => uniform_vector(size, min, max, rng),
            WeightInit::XavierUniform | WeightInit::HeUniform | WeightInit::Zeros => Array1::zeros(size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fan_in_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let w = WeightInit::FanInUniform.initialize_weights((16, 8), &mut rng);
        assert_eq!(w.dim(), (16, 8));
        assert!(w.iter().all(|&x| x.abs() <= 0.25));
    }

    #[test]
    fn test_degenerate_uniform_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let w = WeightInit::Uniform { min: 0.5, max: 0.5 }.initialize_weights((2, 2), &mut rng);
        assert!(w.iter().all(|&x| x == 0.5));
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = WeightInit::HeUniform.initialize_weights((4, 4), &mut StdRng::seed_from_u64(9));
        let b = WeightInit::HeUniform.initialize_weights((4, 4), &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
