//! Adapters layer: Concrete implementations of ports.
//!
//! - `artifacts`: loading and caching the two model exports
//! - `scaler`: `Normalizer` over a fitted standard/min-max scaler
//! - `knn`: `Classifier` over a fitted k-nearest-neighbour model
//! - `manifest`: SHA-256 / Ed25519 integrity checks for artifacts
//! - `sanitize`: measurement redaction for logs

pub mod artifacts;
pub mod knn;
pub mod manifest;
pub mod sanitize;
pub mod scaler;

pub use artifacts::{load_assets, AssetError, AssetLoader, ModelAssets};

/// Artifact `format_version` understood by this build.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;
