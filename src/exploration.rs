//! Gaussian exploration noise for continuous actions.
//!
//! Each action component is perturbed independently by zero-mean Gaussian noise. The agent
//! clips the perturbed action back into the policy's `[-1, 1]` range by default; the
//! free-standing [`explore`] function does not clip.

use ndarray::{Array1, ArrayView1};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::error::{MarlError, Result};

pub const DEFAULT_NOISE_SCALE: f32 = 0.1;

/// `action + N(0, scale²)` per component. `scale == 0` returns the input unchanged.
pub fn explore<R: Rng + ?Sized>(action: ArrayView1<f32>, scale: f32, rng: &mut R) -> Result<Array1<f32>> {
    if !(scale >= 0.0 && scale.is_finite()) {
        return Err(MarlError::invalid_parameter(
            "scale".to_string(),
            format!("must be finite and non-negative, got {scale}"),
        ));
    }
    if scale == 0.0 {
        return Ok(action.to_owned());
    }
    Ok(action.mapv(|a| {
        let z: f32 = rng.sample(StandardNormal);
        a + scale * z
    }))
}

/// Stateless Gaussian perturbation with an optional output clamp and a decaying scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GaussianNoise {
    pub scale: f32,
    pub clip: Option<(f32, f32)>,
}

impl Default for GaussianNoise {
    fn default() -> Self {
        GaussianNoise {
            scale: DEFAULT_NOISE_SCALE,
            clip: Some((-1.0, 1.0)),
        }
    }
}

impl GaussianNoise {
    pub fn new(scale: f32, clip: Option<(f32, f32)>) -> Result<Self> {
        if !(scale >= 0.0 && scale.is_finite()) {
            return Err(MarlError::invalid_parameter(
                "noise_scale".to_string(),
                format!("must be finite and non-negative, got {scale}"),
            ));
        }
        if let Some((low, high)) = clip {
            if !(low <= high) {
                return Err(MarlError::invalid_parameter(
                    "clip".to_string(),
                    format!("low {low} exceeds high {high}"),
                ));
            }
        }
        Ok(GaussianNoise { scale, clip })
    }

    pub fn perturb<R: Rng + ?Sized>(&self, action: ArrayView1<f32>, rng: &mut R) -> Result<Array1<f32>> {
        let mut noisy = explore(action, self.scale, rng)?;
        if let Some((low, high)) = self.clip {
            noisy.mapv_inplace(|a| a.clamp(low, high));
        }
        Ok(noisy)
    }

    /// Multiply the scale by `factor`, never going below `min_scale`.
    pub fn decay(&mut self, factor: f32, min_scale: f32) {
        self.scale = (self.scale * factor).max(min_scale);
    }
}
