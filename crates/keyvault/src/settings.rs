//! Settings loading
//!
//! Settings are read once, in layers (later wins):
//! 1. Built-in defaults
//! 2. Config file: $KEYVAULT_CONFIG or ~/.config/keyvault/config.toml
//! 3. Environment variables
//!
//! Everything downstream receives a `Settings` value and never touches the
//! process environment itself.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_USE_REMOTE: &str = "USE_AZURE";
pub const ENV_VAULT_NAME: &str = "KEYVAULT_NAME";
pub const ENV_USERNAME: &str = "TEST_USERNAME";
pub const ENV_PASSWORD: &str = "TEST_PASSWORD";
pub const ENV_USERNAME_SECRET_NAME: &str = "USERNAME_SECRET_NAME";
pub const ENV_PASSWORD_SECRET_NAME: &str = "PASSWORD_SECRET_NAME";
pub const ENV_ACCESS_TOKEN: &str = "AZURE_ACCESS_TOKEN";
pub const ENV_CONFIG_PATH: &str = "KEYVAULT_CONFIG";

pub const DEFAULT_USERNAME_SECRET_NAME: &str = "rosina-username-dev";
pub const DEFAULT_PASSWORD_SECRET_NAME: &str = "rosina-password-dev";

/// Effective settings for one process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Use the remote vault instead of the local map
    pub use_remote: bool,
    /// Vault identifier, required when `use_remote` is set
    pub vault_name: Option<String>,
    /// Local override for the username secret
    pub username: Option<String>,
    /// Local override for the password secret
    pub password: Option<String>,
    /// Lookup key for the username in either store
    pub username_secret_name: String,
    /// Lookup key for the password in either store
    pub password_secret_name: String,
    /// Pre-acquired bearer token for the vault
    pub access_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_remote: false,
            vault_name: None,
            username: None,
            password: None,
            username_secret_name: DEFAULT_USERNAME_SECRET_NAME.to_string(),
            password_secret_name: DEFAULT_PASSWORD_SECRET_NAME.to_string(),
            access_token: None,
        }
    }
}

/// Optional on-disk settings, all keys optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub use_remote: Option<bool>,
    pub vault_name: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub username_secret_name: Option<String>,
    pub password_secret_name: Option<String>,
}

impl FileSettings {
    /// Load from a file; a missing file yields empty settings
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let parsed: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {:?}", path))?;

        debug!(path = ?path, "loaded settings file");
        Ok(parsed)
    }
}

impl Settings {
    /// Load settings from the config file and the process environment
    pub fn load() -> Result<Self> {
        let lookup = |key: &str| std::env::var(key).ok();
        let path = config_path(&lookup);
        let file = FileSettings::load_from(&path)?;
        Ok(Self::from_lookup(file, lookup))
    }

    /// Build settings from file values overlaid with an arbitrary key lookup
    pub fn from_lookup<F>(file: FileSettings, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_remote = match lookup(ENV_USE_REMOTE) {
            Some(raw) => parse_flag(&raw),
            None => file.use_remote.unwrap_or(false),
        };

        Self {
            use_remote,
            vault_name: lookup(ENV_VAULT_NAME).or(file.vault_name),
            username: lookup(ENV_USERNAME).or(file.username),
            password: lookup(ENV_PASSWORD).or(file.password),
            username_secret_name: secret_name(
                lookup(ENV_USERNAME_SECRET_NAME).or(file.username_secret_name),
                DEFAULT_USERNAME_SECRET_NAME,
            ),
            password_secret_name: secret_name(
                lookup(ENV_PASSWORD_SECRET_NAME).or(file.password_secret_name),
                DEFAULT_PASSWORD_SECRET_NAME,
            ),
            access_token: lookup(ENV_ACCESS_TOKEN).filter(|t| !t.is_empty()),
        }
    }
}

/// Parse a bool-like setting: "1", "true", "yes" (any case) are true
pub fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

fn secret_name(configured: Option<String>, default: &str) -> String {
    configured
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Location of the settings file
pub fn config_path<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(ENV_CONFIG_PATH).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keyvault")
        .join("config.toml")
}
