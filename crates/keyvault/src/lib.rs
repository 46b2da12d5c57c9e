//! keyvault - Credential secrets from a local map or Azure Key Vault
//!
//! "Ask for a secret by name. Don't care where it lives."
//!
//! Two secrets (a username and a password) are looked up through a single
//! `SecretStore` capability. Which backing store answers is decided once,
//! at startup, by configuration:
//! - local: a fixed map seeded from override values (development/testing)
//! - remote: live lookups against `https://{vault}.vault.azure.net`
//!
//! Stores are read-only. Nothing is written, rotated, listed or cached.

pub mod credential;
pub mod error;
pub mod factory;
pub mod local;
pub mod mask;
pub mod remote;
pub mod settings;
pub mod store;

pub use credential::{DefaultCredential, StaticCredential, TokenCredential};
pub use error::{FailureCategory, SecretError};
pub use factory::{make_store, make_store_from_env};
pub use local::LocalSecretStore;
pub use mask::mask;
pub use remote::RemoteSecretStore;
pub use settings::Settings;
pub use store::{SecretStore, StoreKind};
