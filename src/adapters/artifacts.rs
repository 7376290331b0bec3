//! Model asset loader.
//!
//! Deserializes the scaler and classifier exports once per process and
//! hands them out as a shared, read-only [`ModelAssets`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;

use super::knn::{KnnArtifact, KnnClassifier};
use super::manifest::IntegrityPolicy;
use super::scaler::{FeatureScaler, ScalerArtifact};
use crate::application::InferenceService;

/// Default scaler artifact, relative to the working directory.
pub const DEFAULT_SCALER_PATH: &str = "scaler.json";

/// Default classifier artifact, relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "knn_model.json";

/// Errors raised while loading model assets.
///
/// Both variants are non-fatal: the application shows them and disables
/// the form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    #[error("artifact not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to load {}: {reason}", path.display())]
    Deserialization { path: PathBuf, reason: String },
}

impl AssetError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::Deserialization { path, .. } => path,
        }
    }

    fn deserialization(path: &Path, reason: impl Into<String>) -> Self {
        Self::Deserialization {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// The loaded scaler and classifier pair.
#[derive(Debug, Clone)]
pub struct ModelAssets {
    pub scaler: Arc<FeatureScaler>,
    pub classifier: Arc<KnnClassifier>,
}

impl ModelAssets {
    /// Build the inference pipeline over these assets.
    #[must_use]
    pub fn inference_service(&self) -> InferenceService<FeatureScaler, KnnClassifier> {
        InferenceService::new(self.scaler.clone(), self.classifier.clone())
    }
}

/// Load both artifacts.
///
/// Existence of both files is checked before either is parsed, so a missing
/// file is always reported as `NotFound`.
///
/// # Errors
/// Returns `AssetError::NotFound` if either path does not exist, and
/// `AssetError::Deserialization` if a file cannot be read, fails its
/// integrity check or does not describe a valid model.
pub fn load_assets(
    scaler_path: &Path,
    model_path: &Path,
    policy: &IntegrityPolicy,
) -> Result<ModelAssets, AssetError> {
    for path in [scaler_path, model_path] {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Model artifact not found");
            return Err(AssetError::NotFound {
                path: path.to_path_buf(),
            });
        }
    }

    let scaler_artifact: ScalerArtifact = read_artifact(scaler_path, policy)?;
    let scaler = FeatureScaler::from_artifact(scaler_artifact)
        .map_err(|reason| AssetError::deserialization(scaler_path, reason))?;

    let knn_artifact: KnnArtifact = read_artifact(model_path, policy)?;
    let classifier = KnnClassifier::from_artifact(knn_artifact)
        .map_err(|reason| AssetError::deserialization(model_path, reason))?;

    tracing::info!(
        scaler = %scaler_path.display(),
        model = %model_path.display(),
        scaler_kind = scaler.kind(),
        n_neighbors = classifier.n_neighbors(),
        n_samples = classifier.n_samples(),
        "Loaded model assets"
    );

    Ok(ModelAssets {
        scaler: Arc::new(scaler),
        classifier: Arc::new(classifier),
    })
}

fn read_artifact<T: DeserializeOwned>(path: &Path, policy: &IntegrityPolicy) -> Result<T, AssetError> {
    policy
        .verify(path)
        .map_err(|reason| AssetError::deserialization(path, reason))?;

    let bytes = fs::read(path).map_err(|e| AssetError::deserialization(path, e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| AssetError::deserialization(path, e.to_string()))
}

/// Process-lifetime cache around [`load_assets`].
///
/// The first call to [`AssetLoader::load`] performs the load; every later
/// call returns the same outcome (including the same `Arc`).
pub struct AssetLoader {
    scaler_path: PathBuf,
    model_path: PathBuf,
    policy: IntegrityPolicy,
    cached: OnceLock<Result<Arc<ModelAssets>, AssetError>>,
}

impl AssetLoader {
    #[must_use]
    pub fn new(scaler_path: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            scaler_path: scaler_path.into(),
            model_path: model_path.into(),
            policy: IntegrityPolicy::unsigned(),
            cached: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: IntegrityPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn scaler_path(&self) -> &Path {
        &self.scaler_path
    }

    #[must_use]
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Load the assets, or return the cached outcome of the first load.
    ///
    /// # Errors
    /// See [`load_assets`].
    pub fn load(&self) -> Result<Arc<ModelAssets>, AssetError> {
        self.cached
            .get_or_init(|| {
                load_assets(&self.scaler_path, &self.model_path, &self.policy).map(Arc::new)
            })
            .clone()
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new(DEFAULT_SCALER_PATH, DEFAULT_MODEL_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCALER_JSON: &str = r#"{
        "format_version": 1, "kind": "standard",
        "mean": [0.0, 0.0], "scale": [1.0, 1.0]
    }"#;

    const MODEL_JSON: &str = r#"{
        "format_version": 1, "kind": "k_neighbors", "n_neighbors": 1,
        "classes": [0, 1], "fit_x": [[0.0, 0.0], [1.0, 1.0]], "fit_y": [0, 1]
    }"#;

    fn write_pair(dir: &Path, scaler: &[u8], model: &[u8]) -> (PathBuf, PathBuf) {
        let s = dir.join("scaler.json");
        let m = dir.join("knn_model.json");
        fs::write(&s, scaler).expect("Should write");
        fs::write(&m, model).expect("Should write");
        (s, m)
    }

    #[test]
    fn test_loads_valid_pair() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (s, m) = write_pair(dir.path(), SCALER_JSON.as_bytes(), MODEL_JSON.as_bytes());
        let assets = load_assets(&s, &m, &IntegrityPolicy::unsigned()).expect("Should load");
        assert_eq!(assets.classifier.n_samples(), 2);
    }

    #[test]
    fn test_missing_files_are_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (s, _) = write_pair(dir.path(), SCALER_JSON.as_bytes(), MODEL_JSON.as_bytes());
        let missing = dir.path().join("absent.json");

        let err = load_assets(&s, &missing, &IntegrityPolicy::unsigned()).expect_err("Missing model");
        assert_eq!(err, AssetError::NotFound { path: missing.clone() });

        let err = load_assets(&missing, &s, &IntegrityPolicy::unsigned()).expect_err("Missing scaler");
        assert!(matches!(err, AssetError::NotFound { .. }));
    }

    #[test]
    fn test_random_bytes_fail_to_deserialize() {
        let dir = tempfile::tempdir().expect("tempdir");
        let garbage: Vec<u8> = (0..256u32).map(|i| (i * 37 % 251) as u8).collect();
        let (s, m) = write_pair(dir.path(), SCALER_JSON.as_bytes(), &garbage);
        let err = load_assets(&s, &m, &IntegrityPolicy::unsigned()).expect_err("Garbage model");
        assert!(matches!(err, AssetError::Deserialization { ref path, .. } if path == &m));
    }

    #[test]
    fn test_wrong_artifact_kind_fails_to_deserialize() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Scaler and model swapped.
        let (s, m) = write_pair(dir.path(), MODEL_JSON.as_bytes(), SCALER_JSON.as_bytes());
        let err = load_assets(&s, &m, &IntegrityPolicy::unsigned()).expect_err("Swapped files");
        assert!(matches!(err, AssetError::Deserialization { .. }));
    }

    #[test]
    fn test_loader_caches_first_outcome() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (s, m) = write_pair(dir.path(), SCALER_JSON.as_bytes(), MODEL_JSON.as_bytes());
        let loader = AssetLoader::new(&s, &m);

        let first = loader.load().expect("Should load");
        fs::remove_file(&m).expect("Should remove");
        let second = loader.load().expect("Cached result");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_loader_caches_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loader = AssetLoader::new(dir.path().join("scaler.json"), dir.path().join("knn_model.json"));
        assert!(loader.load().is_err());

        write_pair(dir.path(), SCALER_JSON.as_bytes(), MODEL_JSON.as_bytes());
        assert!(matches!(loader.load(), Err(AssetError::NotFound { .. })));
    }
}
