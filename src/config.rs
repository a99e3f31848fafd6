//! Configuration types for the claim registrar
//!
//! Manages global configuration: where the claims database and identity
//! keystore live, and which identity acts by default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::claim_storage::DEFAULT_DB_FILE;

/// Global registrar configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Optional custom data directory (database + identities)
    pub data_dir: Option<String>,

    /// Database file name inside the data directory
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Identity used when `--identity` is not given
    pub default_identity: Option<String>,
}

fn default_database_file() -> String {
    DEFAULT_DB_FILE.to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            database_file: default_database_file(),
            default_identity: None,
        }
    }
}

impl GlobalConfig {
    /// Resolve the data directory (custom or `~/.claim-registrar/data/`)
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => Ok(default_config_dir()?.join("data")),
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Config directory not found")]
    DirectoryNotFound,
}

/// Configuration overrides from CLI arguments or environment variables
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub data_dir: Option<String>,
    pub database_file: Option<String>,
    pub identity: Option<String>,
}

impl ConfigOverrides {
    /// Create empty overrides
    pub fn new() -> Self {
        Self::default()
    }

    /// Create overrides from environment variables
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("CLAIM_REGISTRAR_DATA_DIR").ok(),
            database_file: std::env::var("CLAIM_REGISTRAR_DB_FILE").ok(),
            identity: std::env::var("CLAIM_REGISTRAR_IDENTITY").ok(),
        }
    }

    /// Merge with another set of overrides (other takes precedence)
    pub fn merge(mut self, other: Self) -> Self {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.database_file.is_some() {
            self.database_file = other.database_file;
        }
        if other.identity.is_some() {
            self.identity = other.identity;
        }
        self
    }
}

/// Get the default configuration directory path
///
/// Returns: `~/.claim-registrar/`
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".claim-registrar"))
        .ok_or(ConfigError::DirectoryNotFound)
}

/// Get the default configuration file path
///
/// Returns: `~/.claim-registrar/config.json`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_config_dir()?.join("config.json"))
}

/// Load configuration from file with overrides
///
/// # Priority (highest to lowest):
/// 1. CLI overrides (passed as argument)
/// 2. Environment variables
/// 3. Config file
/// 4. Defaults
///
/// # Example
///
/// ```ignore
/// use claim_registrar::config::{load_config, ConfigOverrides};
///
/// let mut cli_overrides = ConfigOverrides::new();
/// cli_overrides.data_dir = Some("/tmp/registrar".to_string());
///
/// let config = load_config(None, cli_overrides)?;
/// ```
pub fn load_config(
    config_path: Option<&Path>,
    cli_overrides: ConfigOverrides,
) -> Result<GlobalConfig, ConfigError> {
    let overrides = ConfigOverrides::from_env().merge(cli_overrides);
    load_config_with(config_path, overrides)
}

/// Load configuration applying exactly the given overrides (no env lookup)
pub fn load_config_with(
    config_path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<GlobalConfig, ConfigError> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    let mut config = if path.exists() {
        let contents = std::fs::read_to_string(&path)?;
        serde_json::from_str(&contents)?
    } else {
        GlobalConfig::default()
    };

    apply_overrides(&mut config, overrides);

    if config.database_file.is_empty() {
        return Err(ConfigError::Invalid(
            "database_file must not be empty".to_string(),
        ));
    }

    Ok(config)
}

/// Save configuration to file
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &GlobalConfig, config_path: Option<&Path>) -> Result<(), ConfigError> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;

    Ok(())
}

/// Apply configuration overrides (internal helper)
fn apply_overrides(config: &mut GlobalConfig, overrides: ConfigOverrides) {
    if let Some(data_dir) = overrides.data_dir {
        config.data_dir = Some(data_dir);
    }
    if let Some(database_file) = overrides.database_file {
        config.database_file = database_file;
    }
    if let Some(identity) = overrides.identity {
        config.default_identity = Some(identity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");

        let config = load_config_with(Some(&path), ConfigOverrides::new()).unwrap();
        assert_eq!(config, GlobalConfig::default());
        assert_eq!(config.database_file, "claims.db");
    }

    #[test]
    fn overrides_take_precedence_over_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");

        let file_config = GlobalConfig {
            data_dir: Some("/from/file".to_string()),
            database_file: "file.db".to_string(),
            default_identity: Some("alice".to_string()),
        };
        save_config(&file_config, Some(&path)).unwrap();

        let overrides = ConfigOverrides {
            data_dir: Some("/from/cli".to_string()),
            identity: None,
            database_file: None,
        };
        let config = load_config_with(Some(&path), overrides).unwrap();

        assert_eq!(config.data_dir.as_deref(), Some("/from/cli"));
        assert_eq!(config.database_file, "file.db");
        assert_eq!(config.default_identity.as_deref(), Some("alice"));
    }

    #[test]
    fn merge_prefers_other() {
        let base = ConfigOverrides {
            data_dir: Some("env".to_string()),
            database_file: Some("env.db".to_string()),
            identity: None,
        };
        let cli = ConfigOverrides {
            data_dir: Some("cli".to_string()),
            database_file: None,
            identity: Some("bob".to_string()),
        };

        let merged = base.merge(cli);
        assert_eq!(merged.data_dir.as_deref(), Some("cli"));
        assert_eq!(merged.database_file.as_deref(), Some("env.db"));
        assert_eq!(merged.identity.as_deref(), Some("bob"));
    }

    #[test]
    fn empty_database_file_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        let overrides = ConfigOverrides {
            database_file: Some(String::new()),
            ..Default::default()
        };

        assert!(matches!(
            load_config_with(Some(&path), overrides),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn file_without_database_file_uses_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"data_dir": null, "default_identity": null}"#).unwrap();

        let config = load_config_with(Some(&path), ConfigOverrides::new()).unwrap();
        assert_eq!(config.database_file, DEFAULT_DB_FILE);
    }
}
