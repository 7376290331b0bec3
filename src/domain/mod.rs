//! Domain layer: Core types.
//!
//! Pure Rust types with no I/O. The feature layout and the label encoding
//! defined here are contracts shared with the externally trained model.

mod diagnosis;
mod features;

pub use diagnosis::{Diagnosis, DiagnosisLabel};
pub use features::{
    FeatureGroup, FeatureId, Measure, MeasurementSet, TumorFeatures, FEATURE_COUNT,
    FEATURE_LABELS, FEATURE_NAMES, MEASURES_PER_GROUP,
};
