//! # Cytoscan
//!
//! Terminal diagnostic form for breast tissue samples.
//!
//! Thirty cell-nucleus measurements (Wisconsin Diagnostic layout) are
//! normalized with a pre-fit feature scaler and classified with a pre-fit
//! k-nearest-neighbour model. Nothing is trained or persisted here; the two
//! model artifacts are produced elsewhere and loaded read-only at startup.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: feature vector, diagnosis label
//! - `ports`: `Normalizer` and `Classifier` traits
//! - `adapters`: JSON artifact loading, scaler, k-NN, log sanitization
//! - `application`: the inference pipeline
//! - `tui`: terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Diagnosis, DiagnosisLabel, TumorFeatures};

/// Result type for Cytoscan operations
pub type Result<T> = std::result::Result<T, CytoscanError>;

/// Main error type for Cytoscan
///
/// Asset and pipeline failures are not errors at this level: the TUI shows
/// them in place (`AssetError`, `PipelineError`).
#[derive(Debug, thiserror::Error)]
pub enum CytoscanError {
    #[error("Invalid configuration: {0}")]
    Config(String),
}
