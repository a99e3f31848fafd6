//! Key derivation and encryption utilities
//!
//! Maps (namespace, actor, property type, property id) to a fixed-width
//! storage key, derives actor ids from identity public keys, and provides
//! AES-GCM encryption for the identity keystore.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use blake2::{digest::consts::U32, Blake2b};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

use crate::storage::models::{ActorId, ClaimKey, Namespace};

type Blake2b256 = Blake2b<U32>;

/// PBKDF2-HMAC-SHA256 rounds for password-derived keys
const PBKDF2_ITERATIONS: u32 = 600_000;

/// Key derivation and encryption errors
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("Secp256k1 error: {0}")]
    Secp256k1(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),
}

/// Domain separation tag prefixed to every key preimage
const CLAIM_KEY_DOMAIN: &[u8] = b"claim-registrar/claim-key/v1";

/// Derive the storage key for a claim or registration
///
/// SHA-256 over:
/// - the domain tag
/// - the namespace discriminator byte
/// - actor, property type and property id, each as a big-endian `u64`
///   length followed by its UTF-8 bytes
///
/// The actor is mixed in for both namespaces, so two actors never share a
/// slot even when claiming an identical property. Length prefixes keep
/// `("ab", "c")` and `("a", "bc")` apart.
///
/// # Arguments
///
/// * `actor` - Calling actor identity
/// * `property_type` - Non-empty property type (validated by the caller)
/// * `property_id` - Non-empty property id (validated by the caller)
/// * `namespace` - Claims or Registrations
///
/// # Example
///
/// ```ignore
/// let key = derive_claim_key(&actor, "Domain", "example.com", Namespace::Claims);
/// println!("Claim key: {}", key);
/// ```
pub fn derive_claim_key(
    actor: &ActorId,
    property_type: &str,
    property_id: &str,
    namespace: Namespace,
) -> ClaimKey {
    let mut hasher = Sha256::new();
    hasher.update(CLAIM_KEY_DOMAIN);
    hasher.update([namespace.discriminator()]);
    update_field(&mut hasher, actor.as_str().as_bytes());
    update_field(&mut hasher, property_type.as_bytes());
    update_field(&mut hasher, property_id.as_bytes());

    ClaimKey::from_bytes(hasher.finalize().into())
}

fn update_field(hasher: &mut Sha256, field: &[u8]) {
    hasher.update((field.len() as u64).to_be_bytes());
    hasher.update(field);
}

/// Derive the actor id for an identity public key
///
/// Hex-encoded BLAKE2b-256 of the compressed (33-byte) public key.
pub fn derive_actor_id(public_key: &PublicKey) -> ActorId {
    let mut hasher = Blake2b256::new();
    hasher.update(public_key.serialize());
    ActorId::new(hex::encode(hasher.finalize()))
}

/// Generate a fresh secp256k1 identity keypair
///
/// # Example
///
/// ```ignore
/// let (secret_key, public_key) = generate_identity_key();
/// let actor = derive_actor_id(&public_key);
/// ```
pub fn generate_identity_key() -> (SecretKey, PublicKey) {
    let secp = Secp256k1::new();
    secp.generate_keypair(&mut secp256k1::rand::thread_rng())
}

/// Encrypt data using AES-256-GCM with password-derived key
///
/// - PBKDF2-HMAC-SHA256 with 600,000 iterations
/// - Random 128-bit salt
/// - Random 96-bit nonce for each encryption
/// - Returns: salt (16 bytes) || nonce (12 bytes) || ciphertext || tag (16 bytes)
///
/// # Returns
///
/// Encrypted data as hex string
pub fn encrypt_data(data: &[u8], password: &str) -> Result<String, KeyError> {
    let mut salt = [0u8; 16];
    OsRng.fill_bytes(&mut salt);

    let cipher = cipher_for(password, &salt);

    let mut nonce_bytes = [0u8; 12];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, data)
        .map_err(|e| KeyError::Encryption(e.to_string()))?;

    let mut result = salt.to_vec();
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);

    Ok(hex::encode(result))
}

/// Decrypt data encrypted with encrypt_data()
///
/// Fails with [`KeyError::Decryption`] on a wrong password or corrupted input.
pub fn decrypt_data(encrypted_hex: &str, password: &str) -> Result<Vec<u8>, KeyError> {
    let encrypted_bytes =
        hex::decode(encrypted_hex).map_err(|e| KeyError::Decryption(e.to_string()))?;

    // salt (16) + nonce (12) + tag (16)
    if encrypted_bytes.len() < 44 {
        return Err(KeyError::Decryption(
            "Data too short (minimum 44 bytes required)".to_string(),
        ));
    }

    let (salt, rest) = encrypted_bytes.split_at(16);
    let (nonce_bytes, ciphertext) = rest.split_at(12);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = cipher_for(password, salt);

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|e| KeyError::Decryption(format!("Decryption failed (wrong password?): {}", e)))
}

/// Encrypt secp256k1 secret key for the keystore
pub fn encrypt_secret_key(secret_key: &SecretKey, password: &str) -> Result<String, KeyError> {
    encrypt_data(&secret_key.secret_bytes(), password)
}

/// Decrypt secp256k1 secret key
pub fn decrypt_secret_key(encrypted_hex: &str, password: &str) -> Result<SecretKey, KeyError> {
    let decrypted_bytes = decrypt_data(encrypted_hex, password)?;

    SecretKey::from_slice(&decrypted_bytes)
        .map_err(|e| KeyError::Secp256k1(format!("Invalid secret key: {}", e)))
}

fn cipher_for(password: &str, salt: &[u8]) -> Aes256Gcm {
    let mut key_bytes = [0u8; 32];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key_bytes);
    let key = aes_gcm::Key::<Aes256Gcm>::from_slice(&key_bytes);
    Aes256Gcm::new(key)
}
