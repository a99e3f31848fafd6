//! Actor identity keystore
//!
//! Manages the identities directory: creating, saving and unlocking the
//! password-protected secp256k1 keys whose derived actor ids authenticate
//! CLI writes.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use secp256k1::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};

use crate::storage::keys::{
    decrypt_secret_key, derive_actor_id, encrypt_secret_key, generate_identity_key, KeyError,
};
use crate::storage::models::ActorId;

const METADATA_FILE: &str = "identity.json";
const KEY_FILE: &str = "key.json";

/// Identity keystore errors
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Key error: {0}")]
    Key(#[from] KeyError),

    #[error("Identity already exists: {0}")]
    IdentityExists(String),

    #[error("Identity not found: {0}")]
    IdentityNotFound(String),

    #[error("Invalid identity name: {0}")]
    InvalidName(String),
}

/// Unlocked identity (kept in memory while signing requests)
#[derive(Debug, Clone)]
pub struct Identity {
    pub name: String,
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
    pub actor_id: ActorId,
}

/// Identity metadata (non-sensitive)
///
/// Stored unencrypted so the actor id can be shown without a password.
/// Saved to: `<data_dir>/identities/<name>/identity.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityMetadata {
    pub name: String,

    /// Actor id derived from the public key
    pub actor_id: ActorId,

    /// Compressed public key (hex)
    pub public_key: String,

    pub created_at: DateTime<Utc>,
}

/// Encrypted key file contents (`key.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EncryptedIdentityKey {
    /// AES-GCM encrypted secret key (hex: salt || nonce || ciphertext)
    encrypted_secret_key: String,
}

/// Directory holding all identities under `data_dir`
pub fn identities_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("identities")
}

/// Directory for a specific identity
pub fn identity_dir(data_dir: &Path, name: &str) -> PathBuf {
    identities_dir(data_dir).join(name)
}

/// Create and persist a new identity
///
/// Generates a fresh keypair, encrypts the secret key with `password` and
/// writes `identity.json` + `key.json`.
///
/// # Errors
///
/// Returns error if:
/// - The name is empty, starts with '.' or contains a path separator
/// - An identity with this name already exists
/// - Files cannot be written
///
/// # Example
///
/// ```ignore
/// let identity = create_identity(&data_dir, "alice", "password")?;
/// println!("Actor: {}", identity.actor_id);
/// ```
pub fn create_identity(
    data_dir: &Path,
    name: &str,
    password: &str,
) -> Result<Identity, IdentityError> {
    validate_name(name)?;

    let path = identity_dir(data_dir, name);
    if path.exists() {
        return Err(IdentityError::IdentityExists(name.to_string()));
    }

    let (secret_key, public_key) = generate_identity_key();
    let actor_id = derive_actor_id(&public_key);

    let metadata = IdentityMetadata {
        name: name.to_string(),
        actor_id: actor_id.clone(),
        public_key: hex::encode(public_key.serialize()),
        created_at: Utc::now(),
    };
    let encrypted = EncryptedIdentityKey {
        encrypted_secret_key: encrypt_secret_key(&secret_key, password)?,
    };

    // Identity only appears under its real name once both files are written
    let staging = staging_dir(data_dir, name);
    fs::create_dir_all(&staging)?;

    let written = write_identity_files(&staging, &metadata, &encrypted)
        .and_then(|()| fs::rename(&staging, &path).map_err(IdentityError::from));
    if let Err(e) = written {
        if let Err(cleanup) = fs::remove_dir_all(&staging) {
            log::warn!(
                "Failed to remove partial identity at {}: {}",
                staging.display(),
                cleanup
            );
        }
        return Err(e);
    }

    log::info!("Created identity '{}' (actor {})", name, actor_id);

    Ok(Identity {
        name: name.to_string(),
        secret_key,
        public_key,
        actor_id,
    })
}

/// Scratch directory an identity is assembled in before being renamed
fn staging_dir(data_dir: &Path, name: &str) -> PathBuf {
    identities_dir(data_dir).join(format!(".{}.tmp", name))
}

fn write_identity_files(
    dir: &Path,
    metadata: &IdentityMetadata,
    encrypted: &EncryptedIdentityKey,
) -> Result<(), IdentityError> {
    fs::write(dir.join(KEY_FILE), serde_json::to_string_pretty(encrypted)?)?;
    fs::write(
        dir.join(METADATA_FILE),
        serde_json::to_string_pretty(metadata)?,
    )?;
    Ok(())
}

/// Unlock an identity with its password
///
/// The decrypted key must match the stored public key, so a tampered
/// `identity.json` can't impersonate another actor.
pub fn load_identity(
    data_dir: &Path,
    name: &str,
    password: &str,
) -> Result<Identity, IdentityError> {
    let metadata = load_identity_metadata(data_dir, name)?;

    let key_json = fs::read_to_string(identity_dir(data_dir, name).join(KEY_FILE))?;
    let encrypted: EncryptedIdentityKey = serde_json::from_str(&key_json)?;
    let secret_key = decrypt_secret_key(&encrypted.encrypted_secret_key, password)?;

    let secp = secp256k1::Secp256k1::new();
    let public_key = PublicKey::from_secret_key(&secp, &secret_key);
    let actor_id = derive_actor_id(&public_key);

    if actor_id != metadata.actor_id {
        return Err(KeyError::Secp256k1(format!(
            "Key for identity '{}' does not match its recorded actor id",
            name
        ))
        .into());
    }

    Ok(Identity {
        name: metadata.name,
        secret_key,
        public_key,
        actor_id,
    })
}

/// Load identity metadata without decrypting the key
pub fn load_identity_metadata(
    data_dir: &Path,
    name: &str,
) -> Result<IdentityMetadata, IdentityError> {
    validate_name(name)?;

    let path = identity_dir(data_dir, name);
    if !path.exists() {
        return Err(IdentityError::IdentityNotFound(name.to_string()));
    }

    let json = fs::read_to_string(path.join(METADATA_FILE))?;
    Ok(serde_json::from_str(&json)?)
}

/// List all identities (newest first)
pub fn list_identities(data_dir: &Path) -> Result<Vec<IdentityMetadata>, IdentityError> {
    let dir = identities_dir(data_dir);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut identities = Vec::new();

    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(true, |n| n.starts_with('.'));
        if hidden || !path.is_dir() {
            continue;
        }

        let metadata_path = path.join(METADATA_FILE);
        if !metadata_path.exists() {
            continue;
        }

        match fs::read_to_string(&metadata_path)
            .map_err(IdentityError::from)
            .and_then(|json| serde_json::from_str::<IdentityMetadata>(&json).map_err(Into::into))
        {
            Ok(metadata) => identities.push(metadata),
            Err(e) => log::warn!("Skipping identity at {}: {}", path.display(), e),
        }
    }

    identities.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(identities)
}

/// Check if an identity exists
pub fn identity_exists(data_dir: &Path, name: &str) -> bool {
    validate_name(name).is_ok() && identity_dir(data_dir, name).join(METADATA_FILE).exists()
}

fn validate_name(name: &str) -> Result<(), IdentityError> {
    // Leading dots are reserved for staging directories
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(|c: char| c == '/' || c == '\\');
    if invalid {
        return Err(IdentityError::InvalidName(name.to_string()));
    }
    Ok(())
}
