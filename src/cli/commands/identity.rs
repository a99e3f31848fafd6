//! Identity command implementations

use std::path::Path;

use crate::config::{load_config, ConfigError, ConfigOverrides};
use crate::storage::identity::{
    create_identity, list_identities, load_identity_metadata, IdentityError,
};

#[derive(Debug, thiserror::Error)]
pub enum IdentityCommandError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("No identity selected (use --identity <name> or set default_identity)")]
    NoIdentitySelected,
}

/// Create a new identity with a generated key
pub fn create(
    name: String,
    password: String,
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<(), IdentityCommandError> {
    let config = load_config(config_path, overrides)?;
    let data_dir = config.resolve_data_dir()?;

    let identity = create_identity(&data_dir, &name, &password)?;

    println!("✓ Identity '{}' created successfully", identity.name);
    println!();
    println!("  Actor ID:   {}", identity.actor_id);
    println!(
        "  Public Key: {}",
        hex::encode(identity.public_key.serialize())
    );
    println!();
    println!("  Keep your password safe: it is required for every claim.");

    Ok(())
}

/// Show an identity's public details (no password required)
pub fn show(
    name: Option<String>,
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<(), IdentityCommandError> {
    let config = load_config(config_path, overrides)?;
    let data_dir = config.resolve_data_dir()?;

    let name = name
        .or(config.default_identity)
        .ok_or(IdentityCommandError::NoIdentitySelected)?;
    let metadata = load_identity_metadata(&data_dir, &name)?;

    println!("Identity '{}':", metadata.name);
    println!("  Actor ID:   {}", metadata.actor_id);
    println!("  Public Key: {}", metadata.public_key);
    println!(
        "  Created:    {}",
        metadata.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    Ok(())
}

/// List all identities
pub fn list(
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<(), IdentityCommandError> {
    let config = load_config(config_path, overrides)?;
    let data_dir = config.resolve_data_dir()?;

    let identities = list_identities(&data_dir)?;

    if identities.is_empty() {
        println!("No identities found.");
        println!();
        println!("Create a new identity with:");
        println!("  claim-registrar identity create <name> --password <password>");
        return Ok(());
    }

    println!("Identities ({}):", identities.len());
    println!();

    for identity in identities {
        println!("  {}", identity.name);
        println!("    Actor:   {}", identity.actor_id);
        println!(
            "    Created: {}",
            identity.created_at.format("%Y-%m-%d %H:%M:%S")
        );
        println!();
    }

    Ok(())
}
