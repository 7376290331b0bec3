//! Artifact manifest and signing utility.
//!
//! Writes `manifest.json` (SHA-256 of the scaler and classifier exports)
//! into an artifact directory and, when a signing seed is available,
//! a detached Ed25519 signature `manifest.sig` over the manifest bytes.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin sign_artifacts -- <dir> [--scaler <name>] [--model <name>]
//! ```
//!
//! Signing seed sources, in order:
//! - `CYTOSCAN_SIGNING_KEY_B64_FILE` (path to a base64 seed file)
//! - `CYTOSCAN_SIGNING_KEY_B64` (debug builds only)

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use cytoscan::adapters::artifacts::{DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
use cytoscan::adapters::manifest::{
    sha256_file_hex, ArtifactManifest, MANIFEST_FILE, MANIFEST_VERSION, SIGNATURE_FILE,
};

const KEY_FILE_ENV: &str = "CYTOSCAN_SIGNING_KEY_B64_FILE";
const KEY_ENV: &str = "CYTOSCAN_SIGNING_KEY_B64";

#[derive(Zeroize, ZeroizeOnDrop)]
struct Seed([u8; 32]);

fn non_empty_secret(raw: String) -> Result<Zeroizing<String>, String> {
    let raw = Zeroizing::new(raw);
    let secret = raw.trim_end_matches(['\n', '\r']).to_string();
    if secret.is_empty() {
        return Err("Empty signing key".to_string());
    }
    Ok(Zeroizing::new(secret))
}

/// `Ok(None)` when no seed source is configured.
fn read_signing_seed_b64() -> Result<Option<Zeroizing<String>>, String> {
    if let Ok(path) = env::var(KEY_FILE_ENV) {
        let content = fs::read_to_string(path.trim())
            .map_err(|e| format!("Failed reading signing key file: {e}"))?;
        return non_empty_secret(content).map(Some);
    }

    // Dev-only fallback for convenience.
    if cfg!(debug_assertions) {
        if let Ok(v) = env::var(KEY_ENV) {
            return non_empty_secret(v).map(Some);
        }
    }

    Ok(None)
}

fn read_signing_seed() -> Result<Option<Seed>, String> {
    let Some(v) = read_signing_seed_b64()? else {
        return Ok(None);
    };

    let raw = Zeroizing::new(
        general_purpose::STANDARD
            .decode(v.trim())
            .map_err(|e| format!("Invalid base64 in signing key: {e}"))?,
    );

    if raw.len() != 32 {
        return Err(format!(
            "Signing key seed must be 32 bytes after base64 decode (got {})",
            raw.len()
        ));
    }

    let mut seed = Seed([0u8; 32]);
    seed.0.copy_from_slice(&raw);
    Ok(Some(seed))
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn usage() -> String {
    "Usage: sign_artifacts <dir> [--scaler <name>] [--model <name>]".to_string()
}

struct Args {
    dir: PathBuf,
    scaler: String,
    model: String,
}

fn parse_args() -> Result<Args, String> {
    let mut args = env::args().skip(1);
    let mut dir: Option<PathBuf> = None;
    let mut scaler = DEFAULT_SCALER_PATH.to_string();
    let mut model = DEFAULT_MODEL_PATH.to_string();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scaler" => scaler = args.next().ok_or_else(usage)?,
            "--model" => model = args.next().ok_or_else(usage)?,
            "-h" | "--help" => return Err(usage()),
            _ => {
                if dir.is_none() {
                    dir = Some(PathBuf::from(arg));
                } else {
                    return Err(usage());
                }
            }
        }
    }

    Ok(Args {
        dir: dir.ok_or_else(usage)?,
        scaler,
        model,
    })
}

fn main() -> Result<(), String> {
    let args = parse_args()?;

    let mut files: BTreeMap<String, String> = BTreeMap::new();
    for name in [&args.scaler, &args.model] {
        let path = args.dir.join(name);
        if !path.is_file() {
            return Err(format!("Artifact not found: {}", path.display()));
        }
        files.insert(name.clone(), sha256_file_hex(&path)?);
    }

    let manifest = ArtifactManifest {
        version: MANIFEST_VERSION,
        created_at: Some(unix_now()),
        files,
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| format!("Failed to serialize {MANIFEST_FILE}: {e}"))?;

    let manifest_path = args.dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .map_err(|e| format!("Failed to write {}: {e}", manifest_path.display()))?;
    println!("Wrote manifest: {}", manifest_path.display());

    let Some(seed) = read_signing_seed()? else {
        println!("No signing key configured ({KEY_FILE_ENV}); manifest left unsigned.");
        return Ok(());
    };

    let signing_key = SigningKey::from_bytes(&seed.0);
    drop(seed);

    let sig: Signature = signing_key.sign(&manifest_bytes);
    let sig_path = args.dir.join(SIGNATURE_FILE);
    fs::write(&sig_path, sig.to_bytes())
        .map_err(|e| format!("Failed to write {}: {e}", sig_path.display()))?;

    println!("Wrote signature: {}", sig_path.display());
    println!(
        "CYTOSCAN_ARTIFACT_PUBKEY={}",
        general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes())
    );

    Ok(())
}
