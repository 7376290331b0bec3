//! Ports layer: Trait definitions for the two model artifacts.
//!
//! The pipeline only depends on these traits, so any conforming
//! implementation (including test doubles) can stand in for the
//! artifacts loaded from disk.

mod classifier;
mod normalizer;

pub use classifier::{Classifier, InferenceError};
pub use normalizer::{Normalizer, TransformError};
