//! Ed25519 keypair generation utility for artifact signing.
//!
//! Generates a signing keypair:
//! - Private seed (32 bytes, base64) written to file with 0600 permissions
//! - Public key optionally written separately
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_keypair -- --out-seed <path> [--out-pub <path>] [--force]
//! ```
//!
//! The printed base64 public key is the value for `CYTOSCAN_ARTIFACT_PUBKEY`.

use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

const USAGE: &str = "Usage: generate_keypair --out-seed <path> [--out-pub <path>] [--force]";

struct Args {
    out_seed: PathBuf,
    out_pub: Option<PathBuf>,
    force: bool,
}

fn parse_args() -> Result<Option<Args>, String> {
    let mut args = std::env::args().skip(1);
    let mut out_seed: Option<PathBuf> = None;
    let mut out_pub: Option<PathBuf> = None;
    let mut force = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out-seed" => {
                let p = args.next().filter(|p| !p.is_empty()).ok_or(USAGE)?;
                out_seed = Some(PathBuf::from(p));
            }
            "--out-pub" => {
                let p = args.next().filter(|p| !p.is_empty()).ok_or(USAGE)?;
                out_pub = Some(PathBuf::from(p));
            }
            "--force" => force = true,
            "-h" | "--help" => {
                println!(
                    "{USAGE}\n\nWrites the base64 Ed25519 seed to <path> with 0600 permissions. Optionally writes the base64 public key to --out-pub. Prints only non-secret material."
                );
                return Ok(None);
            }
            _ => return Err(format!("Unknown arg: {arg}\n{USAGE}")),
        }
    }

    Ok(Some(Args {
        out_seed: out_seed.ok_or(USAGE)?,
        out_pub,
        force,
    }))
}

fn write_file(path: &Path, contents: &[u8], mode: u32) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let mut opts = std::fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        opts.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = opts
        .open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    file.write_all(contents)
        .and_then(|()| file.write_all(b"\n"))
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

fn main() -> Result<(), String> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    for path in std::iter::once(&args.out_seed).chain(args.out_pub.as_ref()) {
        if path.exists() && !args.force {
            return Err(format!(
                "Refusing to overwrite existing file {}. Use --force.",
                path.display()
            ));
        }
    }

    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);

    let signing_key = SigningKey::from_bytes(&seed);
    let pub_b64 = general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes());
    let seed_b64 = Zeroizing::new(general_purpose::STANDARD.encode(seed));
    seed.zeroize();

    write_file(&args.out_seed, seed_b64.as_bytes(), 0o600)?;
    println!("Wrote signing seed (base64) to {}", args.out_seed.display());

    if let Some(pub_path) = &args.out_pub {
        // Public key is non-secret; allow read access.
        write_file(pub_path, pub_b64.as_bytes(), 0o644)?;
        println!("Wrote public key (base64) to {}", pub_path.display());
    }

    // Print only non-secret material.
    println!("CYTOSCAN_ARTIFACT_PUBKEY={pub_b64}");
    Ok(())
}
