//! Hybrid storage for claims, registrations and external references
//!
//! Combines SQLite (durable persistence) with an in-memory cache of each
//! actor's ordered claim index (fast enumeration).

use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rusqlite::{params, Connection, OptionalExtension};

use crate::storage::keys::derive_claim_key;
use crate::storage::models::{ActorId, ClaimKey, ClaimRecord, ExternalReference, Namespace};

/// Default database file name inside the data directory
pub const DEFAULT_DB_FILE: &str = "claims.db";

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("CLM001: property type must not be empty")]
    InvalidPropertyType,

    #[error("CLM002: property id must not be empty")]
    InvalidPropertyId,

    #[error("Claim not found: {0}")]
    NotFound(ClaimKey),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl StorageError {
    /// Machine-readable rejection code for malformed claim input
    pub fn code(&self) -> Option<&'static str> {
        match self {
            StorageError::InvalidPropertyType => Some("CLM001"),
            StorageError::InvalidPropertyId => Some("CLM002"),
            _ => None,
        }
    }
}

/// Validate claim input before any state is touched
///
/// Property type is checked first, so a request with both fields empty
/// reports `CLM001`.
pub fn validate_claim(property_type: &str, property_id: &str) -> Result<(), StorageError> {
    if property_type.is_empty() {
        return Err(StorageError::InvalidPropertyType);
    }
    if property_id.is_empty() {
        return Err(StorageError::InvalidPropertyId);
    }
    Ok(())
}

type IndexCache = HashMap<(ActorId, Namespace), Vec<ClaimKey>>;

/// Hybrid storage with SQLite persistence + in-memory index cache
pub struct ClaimStorage {
    /// SQLite connection for durable persistence
    conn: Connection,

    /// In-memory cache: (actor, namespace) → keys in first-insertion order
    /// Read-mostly workload, RwLock allows concurrent reads
    index_cache: RwLock<IndexCache>,
}

impl ClaimStorage {
    /// Open (or create) `<data_dir>/claims.db`
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Directory holding the database (created if missing)
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Result<Self, StorageError> {
        Self::with_file_name(data_dir, DEFAULT_DB_FILE)
    }

    /// Open (or create) a database with a custom file name in `data_dir`
    pub fn with_file_name<P: AsRef<Path>>(
        data_dir: P,
        file_name: &str,
    ) -> Result<Self, StorageError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join(file_name);

        log::info!("Opening claims database: {}", db_path.display());

        Self::from_connection(Connection::open(&db_path)?)
    }

    /// Non-durable storage, for tests and dry runs
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        Self::init_schema(&conn)?;

        // Populated lazily on first enumeration per (actor, namespace)
        let index_cache = RwLock::new(HashMap::new());

        Ok(Self { conn, index_cache })
    }

    /// Initialize database schema
    fn init_schema(conn: &Connection) -> Result<(), StorageError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS claims (
                claim_key TEXT PRIMARY KEY,
                namespace TEXT NOT NULL CHECK(namespace IN ('claims', 'registrations')),
                actor TEXT NOT NULL,
                property_type TEXT NOT NULL CHECK(length(property_type) > 0),
                property_id TEXT NOT NULL CHECK(length(property_id) > 0),
                evidence TEXT NOT NULL,
                method TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_claims_actor ON claims(actor, namespace)",
            [],
        )?;

        // Ordered per-actor index; position is dense from 0 in insertion order
        conn.execute(
            "CREATE TABLE IF NOT EXISTS actor_claim_index (
                actor TEXT NOT NULL,
                namespace TEXT NOT NULL,
                position INTEGER NOT NULL,
                claim_key TEXT NOT NULL UNIQUE REFERENCES claims(claim_key),
                PRIMARY KEY (actor, namespace, position)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS external_references (
                actor TEXT PRIMARY KEY,
                storage_name TEXT NOT NULL,
                lookup_key TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;

        log::debug!("✓ Database schema initialized");

        Ok(())
    }

    /// Insert or update a claim with write-through to both DB and cache
    ///
    /// A new key is appended to the actor's index for `namespace`; an
    /// existing key only has its evidence and method overwritten, leaving
    /// the index untouched.
    ///
    /// # Arguments
    ///
    /// * `actor` - Calling actor (owner of the scope being written)
    /// * `record` - Property type/id plus evidence and method
    /// * `namespace` - Claims or Registrations
    ///
    /// # Returns
    ///
    /// The derived claim key
    ///
    /// # Errors
    ///
    /// `InvalidPropertyType` / `InvalidPropertyId` before any mutation.
    pub fn upsert_claim(
        &mut self,
        actor: &ActorId,
        record: &ClaimRecord,
        namespace: Namespace,
    ) -> Result<ClaimKey, StorageError> {
        validate_claim(&record.property_type, &record.property_id)?;

        let key = derive_claim_key(
            actor,
            &record.property_type,
            &record.property_id,
            namespace,
        );
        let key_hex = key.to_hex();
        let now = chrono::Utc::now().timestamp();

        // Record write and index append commit together
        let tx = self.conn.transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM claims WHERE claim_key = ?1)",
            params![key_hex],
            |row| row.get(0),
        )?;

        if exists {
            tx.execute(
                "UPDATE claims SET evidence = ?1, method = ?2, updated_at = ?3 WHERE claim_key = ?4",
                params![record.evidence, record.method, now, key_hex],
            )?;
        } else {
            tx.execute(
                "INSERT INTO claims (claim_key, namespace, actor, property_type, property_id,
                 evidence, method, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    key_hex,
                    namespace.to_db_string(),
                    actor.as_str(),
                    record.property_type,
                    record.property_id,
                    record.evidence,
                    record.method,
                    now,
                ],
            )?;

            let position: i64 = tx.query_row(
                "SELECT COALESCE(MAX(position) + 1, 0) FROM actor_claim_index
                 WHERE actor = ?1 AND namespace = ?2",
                params![actor.as_str(), namespace.to_db_string()],
                |row| row.get(0),
            )?;

            tx.execute(
                "INSERT INTO actor_claim_index (actor, namespace, position, claim_key)
                 VALUES (?1, ?2, ?3, ?4)",
                params![actor.as_str(), namespace.to_db_string(), position, key_hex],
            )?;
        }

        tx.commit()?;

        if exists {
            log::debug!("✓ Updated {} entry {} in DB", namespace.to_db_string(), key);
        } else {
            log::debug!(
                "✓ Inserted {} entry {} for actor {}",
                namespace.to_db_string(),
                key,
                actor
            );

            // Only extend an index that is already cached; an absent entry
            // is rebuilt in full from SQLite on the next enumeration
            let mut cache = self.write_cache();
            if let Some(keys) = cache.get_mut(&(actor.clone(), namespace)) {
                keys.push(key);
                log::debug!("✓ Appended {} to cached index for actor {}", key, actor);
            }
        }

        Ok(key)
    }

    /// Look up the record stored at `key`
    ///
    /// Namespace-agnostic: the key already encodes namespace, actor and
    /// property.
    pub fn get_claim(&self, key: &ClaimKey) -> Result<ClaimRecord, StorageError> {
        self.conn
            .query_row(
                "SELECT property_type, property_id, evidence, method FROM claims WHERE claim_key = ?1",
                params![key.to_hex()],
                |row| {
                    Ok(ClaimRecord {
                        property_type: row.get(0)?,
                        property_id: row.get(1)?,
                        evidence: row.get(2)?,
                        method: row.get(3)?,
                    })
                },
            )
            .optional()?
            .ok_or(StorageError::NotFound(*key))
    }

    /// Enumerate an actor's keys in first-insertion order (cache-first)
    ///
    /// Returns an empty list if the actor never wrote to `namespace`.
    /// The cached index is only served while its length matches the stored
    /// row count, so writes through other handles or processes are picked up.
    pub fn list_keys(
        &self,
        actor: &ActorId,
        namespace: Namespace,
    ) -> Result<Vec<ClaimKey>, StorageError> {
        let cache_key = (actor.clone(), namespace);
        let stored = self.count_index(actor, namespace)?;

        // Fast path: the index is append-only and every cached key is
        // committed, so equal length means equal contents
        if let Some(keys) = self.read_cache().get(&cache_key) {
            if keys.len() == stored {
                return Ok(keys.clone());
            }
            log::debug!(
                "Cached {} index for actor {} is stale ({} cached, {} stored)",
                namespace.to_db_string(),
                actor,
                keys.len(),
                stored
            );
        }

        let keys = self.query_index(actor, namespace)?;

        self.write_cache().insert(cache_key, keys.clone());
        log::debug!(
            "✓ Cached {} index for actor {} ({} keys)",
            namespace.to_db_string(),
            actor,
            keys.len()
        );

        Ok(keys)
    }

    /// Overwrite the actor's external reference slot
    ///
    /// Unconditional; writing two empty strings clears the reference.
    pub fn set_external_reference(
        &mut self,
        actor: &ActorId,
        storage_name: &str,
        key: &str,
    ) -> Result<(), StorageError> {
        let now = chrono::Utc::now().timestamp();

        self.conn.execute(
            "INSERT INTO external_references (actor, storage_name, lookup_key, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(actor) DO UPDATE SET
                storage_name = excluded.storage_name,
                lookup_key = excluded.lookup_key,
                updated_at = excluded.updated_at",
            params![actor.as_str(), storage_name, key, now],
        )?;

        log::debug!("✓ Stored external reference for actor {}", actor);

        Ok(())
    }

    /// Current external reference (empty pair if never set)
    pub fn get_external_reference(
        &self,
        actor: &ActorId,
    ) -> Result<ExternalReference, StorageError> {
        let reference = self
            .conn
            .query_row(
                "SELECT storage_name, lookup_key FROM external_references WHERE actor = ?1",
                params![actor.as_str()],
                |row| {
                    Ok(ExternalReference {
                        storage_name: row.get(0)?,
                        key: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(reference.unwrap_or_default())
    }

    /// Invalidate cache (next enumeration rebuilds from DB)
    pub fn invalidate_cache(&self) {
        self.write_cache().clear();
        log::debug!("✓ Cache invalidated (will rebuild on next query)");
    }

    /// Internal: number of index rows stored for an actor and namespace
    fn count_index(&self, actor: &ActorId, namespace: Namespace) -> Result<usize, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM actor_claim_index WHERE actor = ?1 AND namespace = ?2",
            params![actor.as_str(), namespace.to_db_string()],
            |row| row.get(0),
        )?;

        usize::try_from(count)
            .map_err(|_| StorageError::InvalidData(format!("Negative index count {}", count)))
    }

    /// Internal: read an index from the database
    fn query_index(
        &self,
        actor: &ActorId,
        namespace: Namespace,
    ) -> Result<Vec<ClaimKey>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT claim_key FROM actor_claim_index
             WHERE actor = ?1 AND namespace = ?2
             ORDER BY position ASC",
        )?;

        let rows = stmt.query_map(params![actor.as_str(), namespace.to_db_string()], |row| {
            row.get::<_, String>(0)
        })?;

        let mut keys = Vec::new();
        for row in rows {
            let hex = row?;
            let key = hex
                .parse::<ClaimKey>()
                .map_err(|e| StorageError::InvalidData(format!("Claim key '{}': {}", hex, e)))?;
            keys.push(key);
        }

        Ok(keys)
    }

    // A panic while holding the lock can't leave a half-written Vec behind
    // (push/insert/clear are the only mutations), so poisoning is ignored.
    fn read_cache(&self) -> RwLockReadGuard<'_, IndexCache> {
        self.index_cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, IndexCache> {
        self.index_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
