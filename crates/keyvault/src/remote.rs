//! Remote secret store backed by Azure Key Vault
//!
//! Every lookup is a live `GET {endpoint}/secrets/{name}` request. Nothing
//! is cached. HTTP and transport failures are classified into
//! [`SecretError`] here and never leak past this module.

use crate::credential::TokenCredential;
use crate::error::{FailureCategory, SecretError};
use crate::store::{SecretStore, StoreKind};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info};

/// Domain suffix for vault endpoints
pub const VAULT_DOMAIN: &str = "vault.azure.net";

/// REST API version sent with every request
pub const API_VERSION: &str = "7.4";

/// Longest secret name the vault accepts
pub const MAX_SECRET_NAME_LEN: usize = 127;

/// Build the endpoint for a vault identifier
pub fn vault_endpoint(vault_name: &str) -> String {
    format!("https://{}.{}", vault_name, VAULT_DOMAIN)
}

/// Vault secret names are 1-127 ASCII letters, digits and dashes
pub fn is_valid_secret_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_SECRET_NAME_LEN
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// Successful secret bundle (only the fields we use)
#[derive(Debug, Deserialize)]
struct SecretBundle {
    value: Option<String>,
}

/// Error envelope returned by the vault
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Secret store that queries a vault endpoint
pub struct RemoteSecretStore {
    http: Client,
    endpoint: String,
    credential: Box<dyn TokenCredential>,
}

impl std::fmt::Debug for RemoteSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSecretStore")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl RemoteSecretStore {
    /// Create a store for `https://{vault_name}.vault.azure.net`
    pub fn new(
        vault_name: &str,
        credential: Box<dyn TokenCredential>,
    ) -> Result<Self, SecretError> {
        if vault_name.is_empty() {
            return Err(SecretError::Configuration(
                "vault identifier cannot be empty".to_string(),
            ));
        }
        Self::with_endpoint(vault_endpoint(vault_name), credential)
    }

    /// Create a store for an explicit endpoint
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        credential: Box<dyn TokenCredential>,
    ) -> Result<Self, SecretError> {
        let http = Client::builder()
            .user_agent(concat!("keyvault/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                SecretError::Dependency(format!("failed to build HTTP client: {}", e))
            })?;

        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        info!(endpoint = %endpoint, "remote secret store ready");

        Ok(Self {
            http,
            endpoint,
            credential,
        })
    }

    /// URL for a named secret, with the name as an encoded path segment
    fn secret_url(&self, name: &str) -> Result<Url, SecretError> {
        let mut url = Url::parse(&self.endpoint).map_err(|e| {
            SecretError::unavailable(
                FailureCategory::Protocol,
                format!("malformed vault endpoint '{}': {}", self.endpoint, e),
            )
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                SecretError::unavailable(
                    FailureCategory::Protocol,
                    format!("vault endpoint '{}' cannot carry a path", self.endpoint),
                )
            })?
            .pop_if_empty()
            .push("secrets")
            .push(name);
        url.query_pairs_mut().append_pair("api-version", API_VERSION);

        Ok(url)
    }
}

impl SecretStore for RemoteSecretStore {
    fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        // The vault cannot hold such a name, and some (".", "..") would
        // address a different resource once placed in the URL path
        if !is_valid_secret_name(name) {
            debug!(secret = name, "name outside the vault grammar");
            return Err(SecretError::not_found(name, &self.endpoint));
        }

        let url = self.secret_url(name)?;
        let token = self.credential.token()?;

        debug!(secret = name, endpoint = %self.endpoint, "requesting secret");

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .map_err(|e| transport_error(&self.endpoint, e))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| transport_error(&self.endpoint, e))?;

        debug!(secret = name, status = status.as_u16(), "vault responded");

        classify_response(status, &body, name, &self.endpoint)
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Remote
    }

    fn scope(&self) -> String {
        self.endpoint.clone()
    }
}

fn transport_error(endpoint: &str, err: reqwest::Error) -> SecretError {
    let category = if err.is_builder() {
        FailureCategory::Protocol
    } else {
        FailureCategory::Network
    };
    SecretError::unavailable(
        category,
        format!("request to {} failed: {}", endpoint, err),
    )
}

/// Map a vault response onto a value or the error taxonomy
pub fn classify_response(
    status: StatusCode,
    body: &str,
    name: &str,
    endpoint: &str,
) -> Result<String, SecretError> {
    if status.is_success() {
        let bundle: SecretBundle = serde_json::from_str(body).map_err(|e| {
            SecretError::unavailable(
                FailureCategory::Protocol,
                format!("unreadable response for '{}': {}", name, e),
            )
        })?;
        return bundle.value.ok_or_else(|| {
            SecretError::unavailable(
                FailureCategory::Protocol,
                format!("response for '{}' carries no value", name),
            )
        });
    }

    let detail = error_detail(body).unwrap_or_else(|| status.to_string());

    match status {
        StatusCode::NOT_FOUND => Err(SecretError::not_found(name, endpoint)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SecretError::unavailable(
            FailureCategory::Authentication,
            format!("{} ({})", detail, status.as_u16()),
        )),
        _ => Err(SecretError::unavailable(
            FailureCategory::Protocol,
            format!("{} ({})", detail, status.as_u16()),
        )),
    }
}

fn error_detail(body: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(body).ok()?;
    match (envelope.error.code, envelope.error.message) {
        (Some(code), Some(message)) => Some(format!("{}: {}", code, message)),
        (None, Some(message)) => Some(message),
        (Some(code), None) => Some(code),
        (None, None) => None,
    }
}
