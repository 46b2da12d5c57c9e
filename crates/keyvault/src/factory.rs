//! Store selection
//!
//! The only place that decides which backend answers lookups.

use crate::credential::DefaultCredential;
use crate::error::SecretError;
use crate::local::LocalSecretStore;
use crate::remote::RemoteSecretStore;
use crate::settings::{Settings, ENV_USE_REMOTE, ENV_VAULT_NAME};
use crate::store::SecretStore;
use std::collections::HashMap;
use tracing::{debug, info};

/// Load settings from the environment and build the selected store.
///
/// The settings are returned alongside the store so the caller knows which
/// secret names to ask for.
pub fn make_store_from_env() -> Result<(Box<dyn SecretStore>, Settings), SecretError> {
    let settings = Settings::load().map_err(|e| SecretError::Configuration(format!("{:#}", e)))?;
    let store = make_store(&settings)?;
    Ok((store, settings))
}

/// Build the store selected by `settings`
pub fn make_store(settings: &Settings) -> Result<Box<dyn SecretStore>, SecretError> {
    let store = select(settings)?;
    info!(
        store = store.kind().as_str(),
        scope = %store.scope(),
        "secret store selected"
    );
    Ok(store)
}

fn select(settings: &Settings) -> Result<Box<dyn SecretStore>, SecretError> {
    if settings.use_remote {
        let vault_name = settings
            .vault_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                SecretError::Configuration(format!(
                    "{} is enabled but {} is not set",
                    ENV_USE_REMOTE, ENV_VAULT_NAME
                ))
            })?;

        debug!(vault = vault_name, "vault identifier configured");
        let credential = DefaultCredential::new(settings.access_token.clone());
        let store = RemoteSecretStore::new(vault_name, Box::new(credential))?;
        return Ok(Box::new(store));
    }

    let mut secrets = HashMap::new();
    if let Some(username) = &settings.username {
        secrets.insert(settings.username_secret_name.clone(), username.clone());
    }
    if let Some(password) = &settings.password {
        secrets.insert(settings.password_secret_name.clone(), password.clone());
    }

    debug!(entries = secrets.len(), "seeding local overrides");
    Ok(Box::new(LocalSecretStore::new(secrets)))
}
