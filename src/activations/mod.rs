//! # Activation Functions Module
//!
//! Element-wise nonlinearities applied after each dense layer.
//!
//! ## Available Activations
//!
//! - **ReLU**: `max(0, x)` - default for hidden layers of both actor and critic
//! - **Tanh**: Hyperbolic tangent - outputs between -1 and 1, used as the policy head
//! - **Sigmoid**: `1 / (1 + e^(-x))` - outputs between 0 and 1
//! - **LeakyReLU**: ReLU with small negative slope
//! - **Linear**: Identity function - used as the value head
//!
//! ## Usage Example
//!
//! ```rust
//! use qmarl::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![1.0, -0.5, 0.0, 2.0];
//! Activation::Relu.apply(&mut data);
//! assert_eq!(data, array![1.0, 0.0, 0.0, 2.0]);
//! ```

pub mod functions;

pub use functions::Activation;
