//! Ambient identity for the remote vault
//!
//! Credentials hand out bearer tokens on demand. Nothing is fetched at
//! construction; sources are tried when a lookup needs a token.

use crate::error::{FailureCategory, SecretError};
use std::process::Command;
use tracing::debug;

/// Token audience for Azure Key Vault
pub const VAULT_RESOURCE: &str = "https://vault.azure.net";

/// Something that can produce a bearer token for the vault
pub trait TokenCredential: Send + Sync {
    fn token(&self) -> Result<String, SecretError>;
}

/// A fixed token
#[derive(Debug, Clone)]
pub struct StaticCredential {
    token: String,
}

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenCredential for StaticCredential {
    fn token(&self) -> Result<String, SecretError> {
        Ok(self.token.clone())
    }
}

/// Ambient credential chain: a pre-acquired token, then the Azure CLI
#[derive(Debug, Clone, Default)]
pub struct DefaultCredential {
    access_token: Option<String>,
}

impl DefaultCredential {
    /// `access_token` is the value of AZURE_ACCESS_TOKEN, if set
    pub fn new(access_token: Option<String>) -> Self {
        Self { access_token }
    }

    fn token_from_cli(&self) -> Result<String, String> {
        let output = Command::new("az")
            .args([
                "account",
                "get-access-token",
                "--resource",
                VAULT_RESOURCE,
                "--query",
                "accessToken",
                "--output",
                "tsv",
            ])
            .output()
            .map_err(|e| format!("failed to run 'az' ({}); is the Azure CLI installed?", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("az: {}", stderr.trim()));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err("az returned an empty access token".to_string());
        }
        Ok(token)
    }
}

impl TokenCredential for DefaultCredential {
    fn token(&self) -> Result<String, SecretError> {
        if let Some(token) = &self.access_token {
            debug!(source = "environment", "using ambient access token");
            return Ok(token.clone());
        }

        match self.token_from_cli() {
            Ok(token) => {
                debug!(source = "azure-cli", "acquired access token");
                Ok(token)
            }
            Err(cli_err) => Err(SecretError::unavailable(
                FailureCategory::Authentication,
                format!(
                    "no credential available (AZURE_ACCESS_TOKEN not set; {})",
                    cli_err
                ),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_token() {
        let cred = StaticCredential::new("abc");
        assert_eq!(cred.token().unwrap(), "abc");
    }

    #[test]
    fn test_environment_token_wins() {
        let cred = DefaultCredential::new(Some("from-env".to_string()));
        assert_eq!(cred.token().unwrap(), "from-env");
    }
}
