//! Feature scaler adapter: `Normalizer` backed by a fitted scaler export.
//!
//! Two scaler kinds are understood, matching what the training pipeline
//! can export:
//!
//! - `standard`: `(x - mean) / scale`
//! - `min_max`:  `x * scale + min`

use serde::{Deserialize, Serialize};

use crate::ports::{Normalizer, TransformError};

/// Scaler parameters as exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerParams {
    Standard {
        mean: Vec<f64>,
        scale: Vec<f64>,
        #[serde(default = "default_true")]
        with_mean: bool,
        #[serde(default = "default_true")]
        with_std: bool,
    },
    MinMax {
        min: Vec<f64>,
        scale: Vec<f64>,
    },
}

fn default_true() -> bool {
    true
}

/// Serialized scaler artifact (`scaler.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub format_version: u32,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    #[serde(flatten)]
    pub params: ScalerParams,
}

/// A validated, immutable feature scaler.
#[derive(Debug, Clone)]
pub struct FeatureScaler {
    feature_names: Option<Vec<String>>,
    params: ScalerParams,
    n_features: usize,
}

impl FeatureScaler {
    /// Validate an artifact and build the scaler.
    ///
    /// # Errors
    /// Returns a description of the first inconsistency found.
    pub fn from_artifact(artifact: ScalerArtifact) -> Result<Self, String> {
        if artifact.format_version != super::ARTIFACT_FORMAT_VERSION {
            return Err(format!(
                "unsupported scaler format_version {} (expected {})",
                artifact.format_version,
                super::ARTIFACT_FORMAT_VERSION
            ));
        }

        let (first, second, names) = match &artifact.params {
            ScalerParams::Standard { mean, scale, .. } => (mean, scale, ("mean", "scale")),
            ScalerParams::MinMax { min, scale } => (min, scale, ("min", "scale")),
        };

        let n = first.len();
        if n == 0 {
            return Err(format!("scaler '{}' is empty", names.0));
        }
        if second.len() != n {
            return Err(format!(
                "scaler '{}' has {} values but '{}' has {}",
                names.1,
                second.len(),
                names.0,
                n
            ));
        }
        if let Some(pos) = first.iter().chain(second.iter()).position(|v| !v.is_finite()) {
            return Err(format!("scaler parameter {pos} is not finite"));
        }
        if let Some(feature_names) = &artifact.feature_names {
            if feature_names.len() != n {
                return Err(format!(
                    "scaler lists {} feature names for {} features",
                    feature_names.len(),
                    n
                ));
            }
        }

        Ok(Self {
            feature_names: artifact.feature_names,
            params: artifact.params,
            n_features: n,
        })
    }

    /// Short name of the scaler kind, for display.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self.params {
            ScalerParams::Standard { .. } => "standard",
            ScalerParams::MinMax { .. } => "min-max",
        }
    }
}

impl Normalizer for FeatureScaler {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    fn transform(&self, sample: &[f64]) -> Result<Vec<f64>, TransformError> {
        if sample.len() != self.n_features {
            return Err(TransformError::DimensionMismatch {
                expected: self.n_features,
                actual: sample.len(),
            });
        }

        let out: Vec<f64> = match &self.params {
            ScalerParams::Standard {
                mean,
                scale,
                with_mean,
                with_std,
            } => sample
                .iter()
                .zip(mean.iter().zip(scale.iter()))
                .map(|(&x, (&m, &s))| {
                    let centered = if *with_mean { x - m } else { x };
                    // Zero-variance features are left unscaled.
                    if *with_std && s != 0.0 {
                        centered / s
                    } else {
                        centered
                    }
                })
                .collect(),
            ScalerParams::MinMax { min, scale } => sample
                .iter()
                .zip(min.iter().zip(scale.iter()))
                .map(|(&x, (&lo, &s))| x * s + lo)
                .collect(),
        };

        if let Some(index) = out.iter().position(|v| !v.is_finite()) {
            return Err(TransformError::NonFinite { index });
        }

        Ok(out)
    }
}
