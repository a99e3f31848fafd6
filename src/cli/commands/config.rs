//! Config command implementations

use std::path::Path;

use crate::config::{default_config_path, save_config, ConfigError, GlobalConfig};

/// Initialize configuration file with defaults
pub fn init(config_path: Option<&Path>) -> Result<(), ConfigError> {
    let config = GlobalConfig::default();

    save_config(&config, config_path)?;

    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    println!("✓ Configuration initialized");
    println!("  Config file: {}", path.display());
    println!("  Data dir:    {}", config.resolve_data_dir()?.display());

    Ok(())
}
