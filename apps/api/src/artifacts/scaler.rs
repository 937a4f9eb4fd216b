//! Feature scaling transforms, loaded from the fitted scaler export.

use serde::{Deserialize, Serialize};

use crate::artifacts::ArtifactError;

/// A fitted scaler. Parameters are per feature, in `feature_names` order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "scaler_type")]
pub enum FeatureScaler {
    /// Standard scaling (z-score normalization): (x - mean) / scale
    StandardScaler { mean: Vec<f64>, scale: Vec<f64> },
    /// Min-Max scaling in its fitted form: x * scale + min
    MinMaxScaler { min: Vec<f64>, scale: Vec<f64> },
    /// Robust scaling using median and IQR: (x - center) / scale
    RobustScaler { center: Vec<f64>, scale: Vec<f64> },
    /// No scaling
    Identity,
}

impl FeatureScaler {
    pub fn type_name(&self) -> &'static str {
        match self {
            FeatureScaler::StandardScaler { .. } => "StandardScaler",
            FeatureScaler::MinMaxScaler { .. } => "MinMaxScaler",
            FeatureScaler::RobustScaler { .. } => "RobustScaler",
            FeatureScaler::Identity => "Identity",
        }
    }

    /// Number of features the scaler was fitted on. `None` for `Identity`.
    pub fn n_features(&self) -> Option<usize> {
        match self {
            FeatureScaler::StandardScaler { scale, .. }
            | FeatureScaler::MinMaxScaler { scale, .. }
            | FeatureScaler::RobustScaler { scale, .. } => Some(scale.len()),
            FeatureScaler::Identity => None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ArtifactError> {
        let (center, scale) = match self {
            FeatureScaler::StandardScaler { mean, scale } => (mean, scale),
            FeatureScaler::MinMaxScaler { min, scale } => (min, scale),
            FeatureScaler::RobustScaler { center, scale } => (center, scale),
            FeatureScaler::Identity => return Ok(()),
        };
        if center.len() != scale.len() {
            return Err(ArtifactError::Inconsistent(format!(
                "{} has {} offsets but {} scale factors",
                self.type_name(),
                center.len(),
                scale.len()
            )));
        }
        Ok(())
    }

    /// Scales `row` in place. The caller guarantees the width matches.
    pub fn transform(&self, row: &mut [f64]) {
        match self {
            FeatureScaler::StandardScaler { mean, scale } => {
                for ((x, m), s) in row.iter_mut().zip(mean).zip(scale) {
                    *x = (*x - m) / nonzero(*s);
                }
            }
            FeatureScaler::MinMaxScaler { min, scale } => {
                for ((x, m), s) in row.iter_mut().zip(min).zip(scale) {
                    *x = *x * s + m;
                }
            }
            FeatureScaler::RobustScaler { center, scale } => {
                for ((x, c), s) in row.iter_mut().zip(center).zip(scale) {
                    *x = (*x - c) / nonzero(*s);
                }
            }
            FeatureScaler::Identity => {}
        }
    }
}

fn nonzero(scale: f64) -> f64 {
    if scale == 0.0 {
        1.0
    } else {
        scale
    }
}
