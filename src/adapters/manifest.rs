//! Artifact integrity manifest.
//!
//! A directory holding model artifacts may carry a `manifest.json` that binds
//! each artifact file name to its SHA-256 digest, and a `manifest.sig`
//! holding an Ed25519 signature over the exact manifest bytes.
//!
//! - Without a configured verifying key, the manifest is optional; when
//!   present it is still enforced.
//! - With a verifying key, both files are mandatory and the signature must
//!   verify before any digest is trusted.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// File name of the manifest inside an artifact directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// File name of the detached manifest signature.
pub const SIGNATURE_FILE: &str = "manifest.sig";

/// Supported manifest version.
pub const MANIFEST_VERSION: u32 = 1;

/// Digest list for the artifacts in one directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    #[serde(default)]
    pub created_at: Option<i64>,
    pub files: BTreeMap<String, String>,
}

/// How strictly artifact integrity is checked.
#[derive(Debug, Clone, Default)]
pub struct IntegrityPolicy {
    verifying_key: Option<VerifyingKey>,
}

impl IntegrityPolicy {
    /// Enforce manifests when present, no signature required.
    #[must_use]
    pub fn unsigned() -> Self {
        Self::default()
    }

    /// Require a signed manifest verified with `key`.
    #[must_use]
    pub fn signed(key: VerifyingKey) -> Self {
        Self {
            verifying_key: Some(key),
        }
    }

    /// Parse a base64-encoded 32-byte Ed25519 public key.
    ///
    /// # Errors
    /// Returns error if the key is not valid base64 or not a valid point.
    pub fn from_public_key_b64(b64: &str) -> Result<Self, String> {
        let raw = base64::engine::general_purpose::STANDARD
            .decode(b64.trim())
            .map_err(|e| format!("Invalid public key base64: {e}"))?;
        let bytes: [u8; 32] = raw
            .as_slice()
            .try_into()
            .map_err(|_| format!("Public key must be 32 bytes (got {})", raw.len()))?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| format!("Invalid Ed25519 public key: {e}"))?;
        Ok(Self::signed(key))
    }

    #[must_use]
    pub fn requires_signature(&self) -> bool {
        self.verifying_key.is_some()
    }

    /// Check one artifact file against the manifest in its directory.
    ///
    /// # Errors
    /// Returns a description of the integrity failure.
    pub fn verify(&self, artifact: &Path) -> Result<(), String> {
        let dir = artifact_dir(artifact);
        let manifest_path = dir.join(MANIFEST_FILE);

        if !manifest_path.exists() {
            if self.requires_signature() {
                return Err(format!(
                    "signed manifest required but {} is missing",
                    manifest_path.display()
                ));
            }
            tracing::debug!(artifact = %artifact.display(), "No integrity manifest, skipping digest check");
            return Ok(());
        }

        let manifest_bytes = fs::read(&manifest_path)
            .map_err(|e| format!("Failed to read {}: {e}", manifest_path.display()))?;

        if let Some(key) = &self.verifying_key {
            verify_signature(key, &dir.join(SIGNATURE_FILE), &manifest_bytes)?;
        }

        let manifest: ArtifactManifest = serde_json::from_slice(&manifest_bytes)
            .map_err(|e| format!("Invalid {MANIFEST_FILE} format: {e}"))?;
        if manifest.version != MANIFEST_VERSION {
            return Err(format!("Unsupported manifest version: {}", manifest.version));
        }

        let name = artifact
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| format!("Artifact path {} has no file name", artifact.display()))?;
        let expected = manifest
            .files
            .get(name)
            .ok_or_else(|| format!("{name} is not listed in {MANIFEST_FILE}"))?;

        let actual = sha256_file_hex(artifact)?;
        if !expected.eq_ignore_ascii_case(&actual) {
            return Err(format!("{name} does not match its {MANIFEST_FILE} digest"));
        }

        tracing::info!(artifact = %name, signed = self.requires_signature(), "Artifact integrity verified");
        Ok(())
    }
}

fn verify_signature(key: &VerifyingKey, sig_path: &Path, manifest: &[u8]) -> Result<(), String> {
    let sig_bytes = fs::read(sig_path)
        .map_err(|e| format!("Failed to read signature {}: {e}", sig_path.display()))?;
    let sig_bytes: [u8; 64] = sig_bytes
        .as_slice()
        .try_into()
        .map_err(|_| "Invalid signature length (expected 64 bytes)".to_string())?;
    let signature = Signature::from_bytes(&sig_bytes);
    key.verify(manifest, &signature)
        .map_err(|_| "Invalid manifest signature".to_string())
}

/// Directory that holds an artifact; `.` for bare file names.
#[must_use]
pub fn artifact_dir(artifact: &Path) -> PathBuf {
    match artifact.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Lower-case hex SHA-256 of a byte slice.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes).iter().map(|b| format!("{b:02x}")).collect()
}

/// Lower-case hex SHA-256 of a file.
///
/// # Errors
/// Returns error if the file cannot be read.
pub fn sha256_file_hex(path: &Path) -> Result<String, String> {
    let bytes = fs::read(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    Ok(sha256_hex(&bytes))
}
