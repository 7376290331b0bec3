//! Normalizer port: Trait for the fitted feature scaler.

/// Errors raised while normalizing a sample.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("scaler expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("scaler feature {position} is '{found}', expected '{expected}'")]
    FeatureOrder {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("scaler produced a non-finite value for feature {index}")]
    NonFinite { index: usize },
}

/// A fitted transform mapping a sample to a normalized sample of the same
/// dimensionality.
///
/// Implementations are immutable after construction and shared across
/// requests.
pub trait Normalizer: Send + Sync {
    /// Number of features the transform was fit on.
    fn n_features(&self) -> usize;

    /// Column names recorded at fit time, if any.
    fn feature_names(&self) -> Option<&[String]> {
        None
    }

    /// Normalize one sample.
    ///
    /// # Errors
    /// Returns `TransformError::DimensionMismatch` if `sample` does not have
    /// `n_features()` values.
    fn transform(&self, sample: &[f64]) -> Result<Vec<f64>, TransformError>;
}
