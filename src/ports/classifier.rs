//! Classifier port: Trait for the fitted classification model.

/// Errors raised while classifying a normalized sample.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("classifier expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("non-finite input at feature {index}")]
    NonFiniteInput { index: usize },

    #[error("classifier has no training samples")]
    EmptyModel,

    #[error("classifier returned label {0}, expected 0 or 1")]
    UnexpectedLabel(i64),

    #[error("classifier failed: {0}")]
    Internal(String),
}

/// A fitted model mapping a normalized sample to a discrete class label.
pub trait Classifier: Send + Sync {
    /// Number of features the model was fit on.
    fn n_features(&self) -> usize;

    /// Predict the class of one normalized sample.
    ///
    /// # Errors
    /// Returns `InferenceError` on dimension mismatch or internal failure.
    fn predict(&self, sample: &[f64]) -> Result<i64, InferenceError>;

    /// Predict the class together with the share of support it received.
    ///
    /// The default reports no support figure.
    ///
    /// # Errors
    /// Same as [`Classifier::predict`].
    fn predict_with_support(&self, sample: &[f64]) -> Result<(i64, Option<f64>), InferenceError> {
        self.predict(sample).map(|class| (class, None))
    }
}
