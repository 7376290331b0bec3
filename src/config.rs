//! Runtime configuration from environment variables.
//!
//! Every setting is optional; defaults match a working directory holding
//! `scaler.json` and `knn_model.json`.

use std::path::PathBuf;

use crate::adapters::artifacts::{DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
use crate::adapters::manifest::IntegrityPolicy;
use crate::adapters::sanitize::DEFAULT_SANITIZE_MAX_BYTES;
use crate::adapters::AssetLoader;
use crate::CytoscanError;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when stdout is a terminal, stdout otherwise.
    #[default]
    Auto,
    File,
    Stdout,
}

impl std::str::FromStr for LogMode {
    type Err = CytoscanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "file" => Ok(Self::File),
            "stdout" => Ok(Self::Stdout),
            other => Err(CytoscanError::Config(format!(
                "CYTOSCAN_LOG_MODE must be auto, file or stdout (got '{other}')"
            ))),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scaler_path: PathBuf,
    pub model_path: PathBuf,
    /// Base64 Ed25519 public key; when set, artifacts must carry a signed manifest.
    pub artifact_pubkey: Option<String>,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// Bytes of each log line scanned for redaction.
    pub sanitize_max_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scaler_path: PathBuf::from(DEFAULT_SCALER_PATH),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            artifact_pubkey: None,
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("cytoscan.log"),
            sanitize_max_bytes: DEFAULT_SANITIZE_MAX_BYTES,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `CytoscanError::Config` if a variable holds an invalid value.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `CytoscanError::Config` if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            scaler_path: non_empty("CYTOSCAN_SCALER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.scaler_path),
            model_path: non_empty("CYTOSCAN_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            artifact_pubkey: non_empty("CYTOSCAN_ARTIFACT_PUBKEY"),
            log_mode: match non_empty("CYTOSCAN_LOG_MODE") {
                Some(v) => v.parse()?,
                None => defaults.log_mode,
            },
            log_file: non_empty("CYTOSCAN_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
            sanitize_max_bytes: match non_empty("CYTOSCAN_SANITIZE_MAX_BYTES") {
                Some(v) => parse_max_bytes(&v)?,
                None => defaults.sanitize_max_bytes,
            },
        })
    }

    /// Integrity policy implied by `artifact_pubkey`.
    ///
    /// # Errors
    /// Returns `CytoscanError::Config` if the key cannot be parsed.
    pub fn integrity_policy(&self) -> crate::Result<IntegrityPolicy> {
        match &self.artifact_pubkey {
            Some(b64) => IntegrityPolicy::from_public_key_b64(b64)
                .map_err(|e| CytoscanError::Config(format!("CYTOSCAN_ARTIFACT_PUBKEY: {e}"))),
            None => Ok(IntegrityPolicy::unsigned()),
        }
    }

    /// Asset loader for the configured artifact paths.
    ///
    /// # Errors
    /// Returns `CytoscanError::Config` if the integrity key is invalid.
    pub fn asset_loader(&self) -> crate::Result<AssetLoader> {
        Ok(AssetLoader::new(&self.scaler_path, &self.model_path)
            .with_policy(self.integrity_policy()?))
    }
}

fn parse_max_bytes(value: &str) -> crate::Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(CytoscanError::Config(format!(
            "CYTOSCAN_SANITIZE_MAX_BYTES must be a positive integer (got '{value}')"
        ))),
    }
}
