//! Application layer: Use cases.
//!
//! Orchestrates the domain types with the `Normalizer` and `Classifier`
//! ports to turn a feature vector into a diagnosis.

mod inference;

pub use inference::{InferenceService, PipelineError};
