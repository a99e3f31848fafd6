//! Storage data models
//!
//! Defines the claim registry's record shapes, storage keys and namespaces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of a derived claim key in bytes (SHA-256 output)
pub const CLAIM_KEY_LEN: usize = 32;

/// Opaque identity of the actor on whose behalf a call is made
///
/// All claims, registrations and the external reference slot are scoped
/// by this value. CLI identities use the hex BLAKE2b-256 digest of their
/// public key (see [`crate::storage::identity`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Wrap an already authenticated caller identity
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ActorId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Logical partition of the key space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Mutable claims (`claim` / `listClaimKeys`)
    Claims,
    /// Permanent registrations (`register` / `listClaims`)
    Registrations,
}

impl Namespace {
    /// Discriminator byte mixed into key derivation
    ///
    /// Keeps the two stores from ever aliasing each other.
    pub fn discriminator(&self) -> u8 {
        match self {
            Namespace::Claims => 0x01,
            Namespace::Registrations => 0x02,
        }
    }

    /// Convert to database string representation
    pub(crate) fn to_db_string(self) -> &'static str {
        match self {
            Namespace::Claims => "claims",
            Namespace::Registrations => "registrations",
        }
    }
}

/// Deterministic storage slot for a claim or registration
///
/// Derived by [`crate::storage::keys::derive_claim_key`]; encodes the
/// namespace, actor and property, so lookups need nothing else.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClaimKey([u8; CLAIM_KEY_LEN]);

impl ClaimKey {
    pub fn from_bytes(bytes: [u8; CLAIM_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Lowercase hex encoding (64 chars, no prefix)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ClaimKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimKey({})", self.to_hex())
    }
}

/// Error parsing a hex claim key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClaimKeyParseError {
    #[error("Invalid hex: {0}")]
    Hex(String),

    #[error("Invalid claim key length: expected 32 bytes, got {0}")]
    Length(usize),
}

impl FromStr for ClaimKey {
    type Err = ClaimKeyParseError;

    /// Accepts 64 hex chars with an optional `0x` prefix
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed).map_err(|e| ClaimKeyParseError::Hex(e.to_string()))?;
        let len = bytes.len();
        let array: [u8; CLAIM_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| ClaimKeyParseError::Length(len))?;
        Ok(Self(array))
    }
}

impl Serialize for ClaimKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ClaimKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A typed ownership assertion over an external-world property
///
/// `property_type` and `property_id` are non-empty for every stored record;
/// `evidence` and `method` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Kind of property (e.g. "Domain")
    pub property_type: String,

    /// Property identifier (e.g. "example.com")
    pub property_id: String,

    /// Supporting evidence (stored as-is, never verified)
    pub evidence: String,

    /// Verification method name (e.g. "TXT")
    pub method: String,
}

impl ClaimRecord {
    pub fn new(
        property_type: impl Into<String>,
        property_id: impl Into<String>,
        evidence: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            property_type: property_type.into(),
            property_id: property_id.into(),
            evidence: evidence.into(),
            method: method.into(),
        }
    }
}

/// Pointer into an external storage system, one per actor
///
/// Both fields empty is the "no reference" state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalReference {
    /// Storage provider name (e.g. "arweave")
    pub storage_name: String,

    /// Lookup key within that provider
    pub key: String,
}

impl ExternalReference {
    pub fn new(storage_name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            storage_name: storage_name.into(),
            key: key.into(),
        }
    }

    /// True for the cleared / never-set state
    pub fn is_empty(&self) -> bool {
        self.storage_name.is_empty() && self.key.is_empty()
    }
}
