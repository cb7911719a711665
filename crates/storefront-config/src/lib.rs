//! Shared configuration for the storefront admin console.
//!
//! TOML config file, credential resolution (env + keyring + plaintext),
//! translation to `storefront_core::CatalogConfig`, and the file-backed
//! session token cache.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_core::{CatalogConfig, Credentials, TlsVerification};

pub mod token_cache;

pub use token_cache::FileTokenStore;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured (set username/password in the config file, the keyring, or STOREFRONT_USERNAME/STOREFRONT_PASSWORD)")]
    NoCredentials,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Catalog service root (e.g. "https://catalog.example.com").
    #[serde(default = "default_url")]
    pub url: String,

    /// Merchant path segment under `/api/{merchant}/admin/...`.
    #[serde(default = "default_merchant")]
    pub merchant: String,

    /// Operator account email.
    pub username: Option<String>,

    /// Password (plaintext — prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS certificate verification.
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Periodic product refresh interval in seconds; 0 disables it.
    #[serde(default)]
    pub refresh_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: default_url(),
            merchant: default_merchant(),
            username: None,
            password: None,
            password_env: None,
            ca_cert: None,
            insecure: false,
            timeout: default_timeout(),
            refresh_interval_secs: 0,
        }
    }
}

fn default_url() -> String {
    "http://localhost:3000".into()
}
fn default_merchant() -> String {
    "storefront".into()
}
fn default_timeout() -> u64 {
    30
}

// ── Paths ───────────────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dir("config.toml")
}

/// Where the cached session token lives.
pub fn token_cache_path() -> PathBuf {
    project_dir("session.toml")
}

fn project_dir(file: &str) -> PathBuf {
    ProjectDirs::from("com", "storefront", "storefront").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push(file);
            p
        },
        |dirs| dirs.config_dir().join(file),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("storefront");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("STOREFRONT_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve operator credentials from the chain:
/// env var → keyring → plaintext config.
pub fn resolve_credentials(config: &Config) -> Result<Credentials, ConfigError> {
    let username = config
        .username
        .clone()
        .or_else(|| std::env::var("STOREFRONT_USERNAME").ok())
        .ok_or(ConfigError::NoCredentials)?;

    // 1. Named env var from the config, then the well-known one.
    if let Some(ref env_name) = config.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return Ok(Credentials {
                username,
                password: SecretString::from(pw),
            });
        }
    }
    if let Ok(pw) = std::env::var("STOREFRONT_PASSWORD") {
        return Ok(Credentials {
            username,
            password: SecretString::from(pw),
        });
    }

    // 2. System keyring.
    if let Ok(entry) = keyring::Entry::new("storefront", &username) {
        if let Ok(pw) = entry.get_password() {
            return Ok(Credentials {
                username,
                password: SecretString::from(pw),
            });
        }
    }

    // 3. Plaintext in config.
    if let Some(ref pw) = config.password {
        return Ok(Credentials {
            username,
            password: SecretString::from(pw.clone()),
        });
    }

    Err(ConfigError::NoCredentials)
}

/// Store a password in the system keyring for the given account.
pub fn store_password(username: &str, password: &str) -> Result<(), ConfigError> {
    let entry =
        keyring::Entry::new("storefront", username).map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })?;
    entry
        .set_password(password)
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `CatalogConfig` from the loaded configuration.
pub fn to_catalog_config(config: &Config) -> Result<CatalogConfig, ConfigError> {
    let url: url::Url = config.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", config.url),
    })?;

    let tls = if config.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = config.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::System
    };

    Ok(CatalogConfig {
        url,
        merchant: config.merchant.clone(),
        tls,
        timeout: Duration::from_secs(config.timeout),
        refresh_interval_secs: config.refresh_interval_secs,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_translate_cleanly() {
        let cfg = Config::default();
        let catalog = to_catalog_config(&cfg).unwrap();
        assert_eq!(catalog.url.as_str(), "http://localhost:3000/");
        assert_eq!(catalog.merchant, "storefront");
        assert_eq!(catalog.timeout, Duration::from_secs(30));
        assert_eq!(catalog.refresh_interval_secs, 0);
        assert!(matches!(catalog.tls, TlsVerification::System));
    }

    #[test]
    fn insecure_flag_wins_over_custom_ca() {
        let cfg = Config {
            insecure: true,
            ca_cert: Some(PathBuf::from("/tmp/ca.pem")),
            ..Config::default()
        };
        let catalog = to_catalog_config(&cfg).unwrap();
        assert!(matches!(catalog.tls, TlsVerification::DangerAcceptInvalid));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let cfg = Config {
            url: "not a url".into(),
            ..Config::default()
        };
        let err = to_catalog_config(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn plaintext_password_resolves_when_nothing_else_set() {
        let cfg = Config {
            username: Some("admin@example.com".into()),
            password: Some("hunter2".into()),
            ..Config::default()
        };
        let creds = resolve_credentials(&cfg).unwrap();
        assert_eq!(creds.username, "admin@example.com");
        assert_eq!(creds.password.expose_secret(), "hunter2");
    }

    #[test]
    fn missing_username_fails_credential_resolution() {
        let cfg = Config {
            password: Some("hunter2".into()),
            ..Config::default()
        };
        assert!(matches!(
            resolve_credentials(&cfg),
            Err(ConfigError::NoCredentials)
        ));
    }
}
