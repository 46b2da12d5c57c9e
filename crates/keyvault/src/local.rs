//! Local secret store for development and testing

use crate::error::SecretError;
use crate::store::{SecretStore, StoreKind};
use std::collections::HashMap;

const LOCAL_SCOPE: &str = "local store";

/// A fixed name -> value map, populated at construction
#[derive(Debug, Clone, Default)]
pub struct LocalSecretStore {
    secrets: HashMap<String, String>,
}

impl LocalSecretStore {
    /// Create a store owning the given secrets
    pub fn new(secrets: HashMap<String, String>) -> Self {
        Self { secrets }
    }
}

impl FromIterator<(String, String)> for LocalSecretStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl SecretStore for LocalSecretStore {
    fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| SecretError::not_found(name, self.scope()))
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Local
    }

    fn scope(&self) -> String {
        LOCAL_SCOPE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(entries: &[(&str, &str)]) -> LocalSecretStore {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_get_existing() {
        let s = store(&[("username", "alice"), ("password", "pw")]);
        assert_eq!(s.get_secret("username").unwrap(), "alice");
        assert_eq!(s.get_secret("password").unwrap(), "pw");
        assert_eq!(s.kind(), StoreKind::Local);
    }

    #[test]
    fn test_get_missing() {
        let s = LocalSecretStore::default();
        let err = s.get_secret("username").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "secret 'username' not found in local store");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let s = store(&[("Username", "alice")]);
        assert!(s.get_secret("username").unwrap_err().is_not_found());
        assert!(s.get_secret("USERNAME").unwrap_err().is_not_found());
        assert_eq!(s.get_secret("Username").unwrap(), "alice");
    }

    #[test]
    fn test_empty_value_is_a_value() {
        let s = store(&[("password", "")]);
        assert_eq!(s.get_secret("password").unwrap(), "");
    }

    #[test]
    fn test_owns_its_map() {
        let mut source = HashMap::new();
        source.insert("k".to_string(), "v1".to_string());
        let s = LocalSecretStore::new(source.clone());

        source.insert("k".to_string(), "v2".to_string());
        source.insert("other".to_string(), "x".to_string());

        assert_eq!(s.get_secret("k").unwrap(), "v1");
        assert!(s.get_secret("other").unwrap_err().is_not_found());
    }

    #[test]
    fn test_repeated_lookups_agree() {
        let s = store(&[("a", "1")]);
        for _ in 0..3 {
            assert_eq!(s.get_secret("a").unwrap(), "1");
            assert!(s.get_secret("b").unwrap_err().is_not_found());
        }
    }
}
