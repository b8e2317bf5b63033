use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use ed25519_dalek::SigningKey as Ed25519SigningKey;
use pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use tracing::info;

use crate::error::{PkiToolError, Result};

/// Supported key types for the CA private key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySpec {
    Rsa { bits: usize },
    EcdsaP256,
    EcdsaP384,
    Ed25519,
}

impl Default for KeySpec {
    fn default() -> Self {
        KeySpec::Rsa { bits: 2048 }
    }
}

impl std::fmt::Display for KeySpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySpec::Rsa { bits } => write!(f, "rsa:{bits}"),
            KeySpec::EcdsaP256 => f.write_str("p256"),
            KeySpec::EcdsaP384 => f.write_str("p384"),
            KeySpec::Ed25519 => f.write_str("ed25519"),
        }
    }
}

impl std::str::FromStr for KeySpec {
    type Err = PkiToolError;

    /// Parses `rsa`, `rsa:<bits>`, `p256`, `p384` or `ed25519`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rsa" => Ok(KeySpec::default()),
            "p256" | "ecdsa-p256" => Ok(KeySpec::EcdsaP256),
            "p384" | "ecdsa-p384" => Ok(KeySpec::EcdsaP384),
            "ed25519" => Ok(KeySpec::Ed25519),
            other => {
                let bits = other
                    .strip_prefix("rsa:")
                    .and_then(|bits| bits.parse().ok())
                    .ok_or_else(|| PkiToolError::InvalidInput(format!("unknown key type {s:?}")))?;
                Ok(KeySpec::Rsa { bits })
            }
        }
    }
}

/// Creates private keys on disk.
///
/// A CA picks one engine when it is built and uses it for every key.
pub trait KeyEngine {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Generates a key and writes it to `path` as PKCS#8 PEM, encrypted
    /// with `password` when one is given.
    fn create_private_key(&self, path: &Path, spec: KeySpec, password: Option<&str>) -> Result<()>;
}

/// Generates keys in-process with the RustCrypto crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoEngine;

impl KeyEngine for RustCryptoEngine {
    fn name(&self) -> &'static str {
        "rustcrypto"
    }

    fn create_private_key(&self, path: &Path, spec: KeySpec, password: Option<&str>) -> Result<()> {
        let mut rng = rand_core::OsRng;
        match spec {
            KeySpec::Rsa { bits } => {
                write_key(path, &RsaPrivateKey::new(&mut rng, bits)?, password)?
            }
            KeySpec::EcdsaP256 => write_key(path, &p256::SecretKey::random(&mut rng), password)?,
            KeySpec::EcdsaP384 => write_key(path, &p384::SecretKey::random(&mut rng), password)?,
            KeySpec::Ed25519 => write_key(path, &Ed25519SigningKey::generate(&mut rng), password)?,
        }
        info!(path = %path.display(), %spec, encrypted = password.is_some(), "wrote private key");
        Ok(())
    }
}

/// Returns the key engine to use for a new CA.
pub fn select_engine() -> Box<dyn KeyEngine> {
    Box::new(RustCryptoEngine)
}

fn write_key<K: EncodePrivateKey>(path: &Path, key: &K, password: Option<&str>) -> Result<()> {
    let pem = match password {
        Some(password) => key.to_pkcs8_encrypted_pem(rand_core::OsRng, password, LineEnding::LF)?,
        None => key.to_pkcs8_pem(LineEnding::LF)?,
    };
    write_private_file(path, pem.as_bytes())
}

// New key files are owner-only on Unix.
fn write_private_file(path: &Path, contents: &[u8]) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(|e| PkiToolError::io(path, e))?;
    file.write_all(contents).map_err(|e| PkiToolError::io(path, e))
}
