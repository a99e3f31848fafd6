//! Claim registrar - boundary operations
//!
//! Coordinates config and storage, exposing `claim`, `register`,
//! `claimWithExternal` and the read operations with the caller identity
//! passed explicitly on every write.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, GlobalConfig};
use crate::storage::claim_storage::{ClaimStorage, StorageError};
use crate::storage::models::{ActorId, ClaimKey, ClaimRecord, ExternalReference, Namespace};

/// Errors that can occur in the registrar
#[derive(Debug, thiserror::Error)]
pub enum RegistrarError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Storage(#[from] StorageError),
}

impl RegistrarError {
    /// `CLM001` / `CLM002` for rejected claim input
    pub fn code(&self) -> Option<&'static str> {
        match self {
            RegistrarError::Storage(e) => e.code(),
            RegistrarError::Config(_) => None,
        }
    }
}

/// Result of `listClaimKeys`: claim keys plus the current external reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimKeyListing {
    /// Mutable-namespace keys in first-insertion order
    pub keys: Vec<ClaimKey>,

    /// Current external reference (empty pair if none)
    pub external: ExternalReference,
}

/// Main registrar
pub struct ClaimRegistrar {
    storage: ClaimStorage,
}

impl ClaimRegistrar {
    /// Open the registrar's database as configured
    ///
    /// Creates the data directory if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let config = load_config(None, ConfigOverrides::new())?;
    /// let mut registrar = ClaimRegistrar::open(&config)?;
    /// ```
    pub fn open(config: &GlobalConfig) -> Result<Self, RegistrarError> {
        let data_dir = config.resolve_data_dir()?;
        let storage = ClaimStorage::with_file_name(&data_dir, &config.database_file)?;
        Ok(Self { storage })
    }

    /// Wrap an already opened storage
    pub fn with_storage(storage: ClaimStorage) -> Self {
        Self { storage }
    }

    /// Registrar over a non-durable in-memory database
    pub fn in_memory() -> Result<Self, RegistrarError> {
        Ok(Self::with_storage(ClaimStorage::open_in_memory()?))
    }

    /// Create or update a claim in the caller's mutable namespace
    ///
    /// # Returns
    ///
    /// The claim key (stable across updates of the same property)
    pub fn claim(
        &mut self,
        caller: &ActorId,
        property_type: &str,
        property_id: &str,
        evidence: &str,
        method: &str,
    ) -> Result<ClaimKey, RegistrarError> {
        let record = ClaimRecord::new(property_type, property_id, evidence, method);
        Ok(self.storage.upsert_claim(caller, &record, Namespace::Claims)?)
    }

    /// Create or update a permanent registration for the caller
    pub fn register(
        &mut self,
        caller: &ActorId,
        property_type: &str,
        property_id: &str,
        evidence: &str,
        method: &str,
    ) -> Result<ClaimKey, RegistrarError> {
        let record = ClaimRecord::new(property_type, property_id, evidence, method);
        Ok(self
            .storage
            .upsert_claim(caller, &record, Namespace::Registrations)?)
    }

    /// Set (or clear, with two empty strings) the caller's external reference
    pub fn claim_with_external(
        &mut self,
        caller: &ActorId,
        storage_name: &str,
        key: &str,
    ) -> Result<(), RegistrarError> {
        Ok(self.storage.set_external_reference(caller, storage_name, key)?)
    }

    /// Claim keys of `actor` plus its current external reference
    pub fn list_claim_keys(&self, actor: &ActorId) -> Result<ClaimKeyListing, RegistrarError> {
        Ok(ClaimKeyListing {
            keys: self.storage.list_keys(actor, Namespace::Claims)?,
            external: self.storage.get_external_reference(actor)?,
        })
    }

    /// Registration keys of `actor` in first-insertion order
    pub fn list_claims(&self, actor: &ActorId) -> Result<Vec<ClaimKey>, RegistrarError> {
        Ok(self.storage.list_keys(actor, Namespace::Registrations)?)
    }

    /// Record stored at `key`, in either namespace
    pub fn all_claims(&self, key: &ClaimKey) -> Result<ClaimRecord, RegistrarError> {
        Ok(self.storage.get_claim(key)?)
    }
}
