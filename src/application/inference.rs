//! Inference service: the scale → classify → label pipeline.
//!
//! One call handles one sample end to end:
//! 1. Assemble the 30 features into a row in canonical order
//! 2. Normalize the row with the fitted scaler
//! 3. Classify the normalized row
//! 4. Map the class to a diagnosis label
//!
//! Nothing is stored between calls.

use std::sync::Arc;

use crate::domain::{Diagnosis, DiagnosisLabel, TumorFeatures, FEATURE_NAMES};
use crate::ports::{Classifier, InferenceError, Normalizer, TransformError};

/// Failure of a single pipeline run. The form stays usable afterwards.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),
}

/// Service running the diagnostic pipeline over shared, read-only models.
pub struct InferenceService<N, C>
where
    N: Normalizer,
    C: Classifier,
{
    normalizer: Arc<N>,
    classifier: Arc<C>,
}

impl<N, C> Clone for InferenceService<N, C>
where
    N: Normalizer,
    C: Classifier,
{
    fn clone(&self) -> Self {
        Self {
            normalizer: self.normalizer.clone(),
            classifier: self.classifier.clone(),
        }
    }
}

impl<N, C> InferenceService<N, C>
where
    N: Normalizer,
    C: Classifier,
{
    /// Create a new inference service.
    pub fn new(normalizer: Arc<N>, classifier: Arc<C>) -> Self {
        Self {
            normalizer,
            classifier,
        }
    }

    #[must_use]
    pub fn normalizer(&self) -> &N {
        &self.normalizer
    }

    #[must_use]
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Reject a scaler whose recorded column names are not in canonical order.
    fn check_feature_order(&self) -> Result<(), TransformError> {
        let Some(names) = self.normalizer.feature_names() else {
            return Ok(());
        };
        for (position, (found, expected)) in names.iter().zip(FEATURE_NAMES.iter()).enumerate() {
            if !found.eq_ignore_ascii_case(expected) {
                return Err(TransformError::FeatureOrder {
                    position,
                    expected: (*expected).to_string(),
                    found: found.clone(),
                });
            }
        }
        Ok(())
    }

    /// Run the pipeline on one sample.
    ///
    /// # Errors
    /// Returns `PipelineError::Transform` if the scaler rejects the sample
    /// and `PipelineError::Inference` if classification fails or yields a
    /// class other than 0 or 1.
    pub fn diagnose(&self, features: &TumorFeatures) -> Result<Diagnosis, PipelineError> {
        let row = features.to_array();

        tracing::debug!("Step 1: Normalizing sample...");
        self.check_feature_order()?;
        let scaled = self.normalizer.transform(&row)?;

        tracing::debug!("Step 2: Classifying normalized sample...");
        let (class, vote_share) = self.classifier.predict_with_support(&scaled)?;

        let label =
            DiagnosisLabel::from_class(class).ok_or(InferenceError::UnexpectedLabel(class))?;

        tracing::debug!(label = %label, "Diagnosis computed");
        Ok(Diagnosis::new(label, vote_share))
    }
}
