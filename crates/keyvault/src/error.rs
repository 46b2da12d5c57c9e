//! Error taxonomy shared by every secret store
//!
//! Backend-specific failures (HTTP status codes, transport errors, CLI
//! exits) are classified into these four kinds at the store boundary. The
//! original message is kept as text so the caller can print it.

use std::fmt;
use thiserror::Error;

/// Why a store could not complete a request, for anything other than absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// Credential missing, expired or rejected by the vault
    Authentication,
    /// Connection, DNS or timeout failure
    Network,
    /// Unexpected status, malformed response or malformed endpoint
    Protocol,
}

impl FailureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Network => "network",
            Self::Protocol => "protocol",
        }
    }
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secret store errors
#[derive(Error, Debug)]
pub enum SecretError {
    /// The name does not exist in this store's scope
    #[error("secret '{name}' not found in {scope}")]
    NotFound { name: String, scope: String },

    /// The store could not answer for reasons other than absence
    #[error("{category} failure: {message}")]
    Unavailable {
        category: FailureCategory,
        message: String,
    },

    /// Invalid or missing settings
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A required client could not be constructed
    #[error("dependency error: {0}")]
    Dependency(String),
}

impl SecretError {
    pub fn not_found(name: impl Into<String>, scope: impl Into<String>) -> Self {
        Self::NotFound {
            name: name.into(),
            scope: scope.into(),
        }
    }

    pub fn unavailable(category: FailureCategory, message: impl Into<String>) -> Self {
        Self::Unavailable {
            category,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True when the failure looks like a credential problem
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Unavailable {
                category: FailureCategory::Authentication,
                ..
            }
        )
    }
}
