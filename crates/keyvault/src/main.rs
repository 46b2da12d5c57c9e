//! keyvault - Print the configured username and password secrets
//!
//! Exit codes:
//! - 0: both secrets printed
//! - 1: configuration or dependency failure
//! - 2: username lookup failed
//! - 3: password lookup failed

use anyhow::Result;
use clap::Parser;
use keyvault::settings::{
    ENV_ACCESS_TOKEN, ENV_CONFIG_PATH, ENV_PASSWORD, ENV_PASSWORD_SECRET_NAME, ENV_USERNAME,
    ENV_USERNAME_SECRET_NAME, ENV_USE_REMOTE, ENV_VAULT_NAME,
};
use keyvault::{make_store_from_env, mask, SecretError, SecretStore, Settings, StoreKind};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_OK: u8 = 0;
const EXIT_SETUP: u8 = 1;
const EXIT_USERNAME: u8 = 2;
const EXIT_PASSWORD: u8 = 3;

#[derive(Parser)]
#[command(name = "keyvault")]
#[command(about = "Fetch the configured username and password secrets and print them masked")]
#[command(version)]
#[command(after_help = r#"CONFIGURATION (environment, or ~/.config/keyvault/config.toml):
    USE_AZURE              1/true/yes to read from Azure Key Vault
    KEYVAULT_NAME          Vault name, endpoint is https://<name>.vault.azure.net
    TEST_USERNAME          Local override for the username secret
    TEST_PASSWORD          Local override for the password secret
    USERNAME_SECRET_NAME   Username secret name (default: rosina-username-dev)
    PASSWORD_SECRET_NAME   Password secret name (default: rosina-password-dev)
    AZURE_ACCESS_TOKEN     Bearer token; falls back to the Azure CLI
    KEYVAULT_CONFIG        Alternate config file path

Set RUST_LOG=debug for diagnostics on stderr."#)]
struct Cli {
    /// Print secrets unmasked (only for testing)
    #[arg(long)]
    show: bool,
}

/// Which of the two lookups is being performed
#[derive(Debug, Clone, Copy)]
enum Role {
    Username,
    Password,
}

impl Role {
    fn label(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
        }
    }

    fn override_var(&self) -> &'static str {
        match self {
            Self::Username => ENV_USERNAME,
            Self::Password => ENV_PASSWORD,
        }
    }

    fn name_var(&self) -> &'static str {
        match self {
            Self::Username => ENV_USERNAME_SECRET_NAME,
            Self::Password => ENV_PASSWORD_SECRET_NAME,
        }
    }

    fn exit_code(&self) -> u8 {
        match self {
            Self::Username => EXIT_USERNAME,
            Self::Password => EXIT_PASSWORD,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let stdout = io::stdout();
    let stderr = io::stderr();
    match run(&cli, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_SETUP)
        }
    }
}

fn run(cli: &Cli, out: &mut impl Write, err: &mut impl Write) -> Result<u8> {
    let (store, settings) = match make_store_from_env() {
        Ok(selected) => selected,
        Err(e) => {
            writeln!(err, "error: {}", e)?;
            writeln!(err, "hint: {}", setup_hint(&e))?;
            return Ok(EXIT_SETUP);
        }
    };

    report(store.as_ref(), &settings, cli.show, out, err)
}

/// Look up both secrets and print them. Returns the exit code.
fn report(
    store: &dyn SecretStore,
    settings: &Settings,
    show: bool,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<u8> {
    let lookups = [
        (Role::Username, settings.username_secret_name.as_str()),
        (Role::Password, settings.password_secret_name.as_str()),
    ];

    let mut values = Vec::with_capacity(lookups.len());
    for (role, name) in lookups {
        match store.get_secret(name) {
            Ok(value) => values.push((role, value)),
            Err(e) => {
                writeln!(err, "error: failed to read {} secret '{}': {}", role.label(), name, e)?;
                writeln!(err, "hint: {}", lookup_hint(&e, role, name, store.kind(), settings))?;
                return Ok(role.exit_code());
            }
        }
    }

    for (role, value) in values {
        let shown = if show { value } else { mask(&value) };
        writeln!(out, "{}: {}", role.label(), shown)?;
    }

    Ok(EXIT_OK)
}

fn setup_hint(e: &SecretError) -> String {
    match e {
        SecretError::Dependency(_) => {
            "the HTTP client could not start; check the TLS setup of this host".to_string()
        }
        _ => format!(
            "set {} to the vault name or unset {} to use local overrides; \
             a broken settings file can be fixed, removed, or bypassed with {}",
            ENV_VAULT_NAME, ENV_USE_REMOTE, ENV_CONFIG_PATH
        ),
    }
}

fn lookup_hint(
    e: &SecretError,
    role: Role,
    name: &str,
    kind: StoreKind,
    settings: &Settings,
) -> String {
    match (e, kind) {
        (SecretError::NotFound { .. }, StoreKind::Local) => format!(
            "set {} to provide a local value, or point {} at an existing secret",
            role.override_var(),
            role.name_var()
        ),
        (SecretError::NotFound { .. }, StoreKind::Remote) => format!(
            "create secret '{}' in vault '{}', or set {} to another name",
            name,
            settings.vault_name.as_deref().unwrap_or("?"),
            role.name_var()
        ),
        (e, _) if e.is_auth_failure() => format!(
            "re-authenticate with 'az login', or set {} to a valid token",
            ENV_ACCESS_TOKEN
        ),
        _ => "check network connectivity to the vault endpoint and retry".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyvault::{FailureCategory, LocalSecretStore};

    fn local(entries: &[(&str, &str)]) -> LocalSecretStore {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn run_report(store: &dyn SecretStore, show: bool) -> (u8, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = report(store, &Settings::default(), show, &mut out, &mut err).unwrap();
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    struct DownStore;

    impl SecretStore for DownStore {
        fn get_secret(&self, _name: &str) -> Result<String, SecretError> {
            Err(SecretError::unavailable(
                FailureCategory::Authentication,
                "token expired",
            ))
        }

        fn kind(&self) -> StoreKind {
            StoreKind::Remote
        }

        fn scope(&self) -> String {
            "https://down.vault.azure.net".to_string()
        }
    }

    #[test]
    fn test_cli_parse() {
        let cli = Cli::try_parse_from(["keyvault"]).unwrap();
        assert!(!cli.show);

        let cli = Cli::try_parse_from(["keyvault", "--show"]).unwrap();
        assert!(cli.show);

        assert!(Cli::try_parse_from(["keyvault", "get"]).is_err());
    }

    #[test]
    fn test_report_masked() {
        let store = local(&[
            ("rosina-username-dev", "alice"),
            ("rosina-password-dev", "secret12"),
        ]);
        let (code, out, err) = run_report(&store, false);
        assert_eq!(code, EXIT_OK);
        assert_eq!(out, "username: al*ce\npassword: se****12\n");
        assert!(err.is_empty());
    }

    #[test]
    fn test_report_shown() {
        let store = local(&[
            ("rosina-username-dev", "alice"),
            ("rosina-password-dev", "pw"),
        ]);
        let (code, out, _) = run_report(&store, true);
        assert_eq!(code, EXIT_OK);
        assert_eq!(out, "username: alice\npassword: pw\n");
    }

    #[test]
    fn test_username_missing() {
        let (code, out, err) = run_report(&local(&[]), false);
        assert_eq!(code, EXIT_USERNAME);
        assert!(out.is_empty());
        assert!(err.contains("failed to read username secret 'rosina-username-dev'"));
        assert!(err.contains("hint: set TEST_USERNAME"));
    }

    #[test]
    fn test_password_missing() {
        let store = local(&[("rosina-username-dev", "alice")]);
        let (code, out, err) = run_report(&store, false);
        assert_eq!(code, EXIT_PASSWORD);
        assert!(out.is_empty());
        assert!(err.contains("password secret 'rosina-password-dev'"));
        assert!(err.contains("TEST_PASSWORD"));
    }

    #[test]
    fn test_auth_failure_hint() {
        let (code, out, err) = run_report(&DownStore, false);
        assert_eq!(code, EXIT_USERNAME);
        assert!(out.is_empty());
        assert!(err.contains("token expired"));
        assert!(err.contains("az login"));
    }

    #[test]
    fn test_remote_not_found_hint() {
        let settings = Settings {
            vault_name: Some("kv1".to_string()),
            ..Default::default()
        };
        let e = SecretError::not_found("rosina-username-dev", "https://kv1.vault.azure.net");
        let hint = lookup_hint(
            &e,
            Role::Username,
            "rosina-username-dev",
            StoreKind::Remote,
            &settings,
        );
        assert!(hint.contains("create secret 'rosina-username-dev' in vault 'kv1'"));
    }

    #[test]
    fn test_setup_hint() {
        let hint = setup_hint(&SecretError::Configuration("missing".into()));
        assert!(hint.contains("KEYVAULT_NAME"));
    }
}
