//! The secret store capability

use crate::error::SecretError;

/// Which backend answers lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Local,
    Remote,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// A read-only source of secrets by name.
///
/// Stores are immutable once constructed, so lookups are idempotent and may
/// be retried freely by the caller.
pub trait SecretStore: Send + Sync {
    /// Fetch the current value of `name`.
    ///
    /// Fails with [`SecretError::NotFound`] when the name is absent and with
    /// [`SecretError::Unavailable`] when the store could not answer.
    fn get_secret(&self, name: &str) -> Result<String, SecretError>;

    /// The backend behind this store
    fn kind(&self) -> StoreKind;

    /// Where lookups are answered: "local store" or the vault endpoint
    fn scope(&self) -> String;
}
