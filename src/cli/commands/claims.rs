//! Claim command implementations
//!
//! Writes unlock the selected identity and act as its actor; reads take
//! any actor id and need no password.

use std::path::{Path, PathBuf};

use crate::cli::args::ClaimArgs;
use crate::config::{load_config, ConfigError, ConfigOverrides, GlobalConfig};
use crate::registrar::{ClaimRegistrar, RegistrarError};
use crate::storage::identity::{load_identity, load_identity_metadata, IdentityError};
use crate::storage::models::{ActorId, ClaimKey, ClaimKeyParseError, ClaimRecord};

#[derive(Debug, thiserror::Error)]
pub enum ClaimCommandError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("{0}")]
    Registrar(#[from] RegistrarError),

    #[error("Invalid claim key: {0}")]
    InvalidClaimKey(#[from] ClaimKeyParseError),

    #[error("No identity selected (use --identity <name> or set default_identity)")]
    NoIdentitySelected,
}

/// Loaded config plus the directory it resolves to
struct Context {
    config: GlobalConfig,
    data_dir: PathBuf,
}

impl Context {
    fn load(
        config_path: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> Result<Self, ClaimCommandError> {
        let config = load_config(config_path, overrides)?;
        let data_dir = config.resolve_data_dir()?;
        Ok(Self { config, data_dir })
    }

    fn identity_name(&self) -> Result<&str, ClaimCommandError> {
        self.config
            .default_identity
            .as_deref()
            .ok_or(ClaimCommandError::NoIdentitySelected)
    }

    /// Unlock the selected identity and return its actor
    fn caller(&self, password: &str) -> Result<ActorId, ClaimCommandError> {
        let identity = load_identity(&self.data_dir, self.identity_name()?, password)?;
        log::debug!("Acting as {} ({})", identity.name, identity.actor_id);
        Ok(identity.actor_id)
    }

    /// Explicit actor, or the selected identity's actor (no password needed)
    fn actor(&self, actor: Option<String>) -> Result<ActorId, ClaimCommandError> {
        match actor {
            Some(actor) => Ok(ActorId::new(actor)),
            None => Ok(load_identity_metadata(&self.data_dir, self.identity_name()?)?.actor_id),
        }
    }

    fn registrar(&self) -> Result<ClaimRegistrar, ClaimCommandError> {
        Ok(ClaimRegistrar::open(&self.config)?)
    }
}

/// Create or update a claim as the selected identity
pub fn claim(
    args: ClaimArgs,
    password: String,
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<(), ClaimCommandError> {
    let ctx = Context::load(config_path, overrides)?;
    let caller = ctx.caller(&password)?;
    let mut registrar = ctx.registrar()?;

    let key = registrar.claim(
        &caller,
        &args.property_type,
        &args.property_id,
        &args.evidence,
        &args.method,
    )?;

    println!("✓ Claim recorded");
    println!("  Actor:     {}", caller);
    println!("  Claim Key: {}", key);

    Ok(())
}

/// Create or update a permanent registration as the selected identity
pub fn register(
    args: ClaimArgs,
    password: String,
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<(), ClaimCommandError> {
    let ctx = Context::load(config_path, overrides)?;
    let caller = ctx.caller(&password)?;
    let mut registrar = ctx.registrar()?;

    let key = registrar.register(
        &caller,
        &args.property_type,
        &args.property_id,
        &args.evidence,
        &args.method,
    )?;

    println!("✓ Registration recorded");
    println!("  Actor:     {}", caller);
    println!("  Claim Key: {}", key);

    Ok(())
}

/// Set or clear the selected identity's external reference
pub fn claim_with_external(
    storage_name: String,
    key: String,
    password: String,
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<(), ClaimCommandError> {
    let ctx = Context::load(config_path, overrides)?;
    let caller = ctx.caller(&password)?;
    let mut registrar = ctx.registrar()?;

    registrar.claim_with_external(&caller, &storage_name, &key)?;

    if storage_name.is_empty() && key.is_empty() {
        println!("✓ External reference cleared");
    } else {
        println!("✓ External reference set");
        println!("  Storage: {}", storage_name);
        println!("  Key:     {}", key);
    }

    Ok(())
}

/// List an actor's claim keys and external reference
pub fn list_claim_keys(
    actor: Option<String>,
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<(), ClaimCommandError> {
    let ctx = Context::load(config_path, overrides)?;
    let actor = ctx.actor(actor)?;
    let registrar = ctx.registrar()?;

    let listing = registrar.list_claim_keys(&actor)?;

    print_keys("Claim keys", &listing.keys);
    println!();
    println!("External reference:");
    if listing.external.is_empty() {
        println!("  (none)");
    } else {
        println!("  Storage: {}", listing.external.storage_name);
        println!("  Key:     {}", listing.external.key);
    }

    Ok(())
}

/// List an actor's registration keys
pub fn list_claims(
    actor: Option<String>,
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<(), ClaimCommandError> {
    let ctx = Context::load(config_path, overrides)?;
    let actor = ctx.actor(actor)?;
    let registrar = ctx.registrar()?;

    let keys = registrar.list_claims(&actor)?;
    print_keys("Registration keys", &keys);

    Ok(())
}

/// Show the record stored under a claim key
pub fn all_claims(
    claim_key: String,
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<(), ClaimCommandError> {
    let key: ClaimKey = claim_key.parse()?;

    let ctx = Context::load(config_path, overrides)?;
    let registrar = ctx.registrar()?;

    let ClaimRecord {
        property_type,
        property_id,
        evidence,
        method,
    } = registrar.all_claims(&key)?;

    println!("Claim {}:", key);
    println!("  Property Type: {}", property_type);
    println!("  Property ID:   {}", property_id);
    println!("  Evidence:      {}", evidence);
    println!("  Method:        {}", method);

    Ok(())
}

fn print_keys(label: &str, keys: &[ClaimKey]) {
    println!("{} ({}):", label, keys.len());
    for (i, key) in keys.iter().enumerate() {
        println!("  [{}] {}", i, key);
    }
}
