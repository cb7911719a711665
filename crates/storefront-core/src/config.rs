// ── Catalog connection configuration ──

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use storefront_api::{TlsMode, TransportConfig};

/// TLS verification behavior for the catalog connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Verify against the system certificate store.
    #[default]
    System,
    /// Verify against a custom CA certificate (PEM file).
    CustomCa(PathBuf),
    /// Skip verification entirely (self-hosted staging backends).
    DangerAcceptInvalid,
}

/// Operator credentials for sign-in.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Everything needed to talk to one catalog backend.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Service root, e.g. `https://catalog.example.com`.
    pub url: Url,
    /// Merchant path segment under `/api/{merchant}/admin/...`.
    pub merchant: String,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Periodic product refresh interval in seconds; 0 disables it.
    pub refresh_interval_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            // Infallible: the literal is a valid URL.
            url: Url::parse("http://localhost:3000").expect("default URL"),
            merchant: "storefront".into(),
            tls: TlsVerification::System,
            timeout: Duration::from_secs(30),
            refresh_interval_secs: 0,
        }
    }
}

impl CatalogConfig {
    /// Build the transport configuration for the API client.
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::System => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}
