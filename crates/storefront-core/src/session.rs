// ── Session store ──
//
// Token lifecycle: created on sign-in, restored from the persisted cache
// on startup, destroyed on logout or auth failure. The token itself lives
// on the API client (attached per request); this module decides when it
// is set, persisted, and cleared.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use storefront_api::CatalogClient;

use crate::config::Credentials;
use crate::error::CoreError;

/// A token plus its server-issued expiry, as written to durable storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl PersistedToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Durable storage for the session token.
///
/// The file-backed implementation lives in `storefront-config`;
/// [`MemoryTokenStore`] serves tests and ephemeral sessions.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<PersistedToken>, CoreError>;
    fn save(&self, token: &PersistedToken) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

/// Observable authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated,
}

/// Holds the operator session and drives the token through its lifecycle.
pub struct SessionStore {
    client: Arc<CatalogClient>,
    tokens: Box<dyn TokenStore>,
    state: watch::Sender<AuthState>,
}

impl SessionStore {
    pub fn new(client: Arc<CatalogClient>, tokens: Box<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(AuthState::Unauthenticated);
        Self {
            client,
            tokens,
            state,
        }
    }

    /// Subscribe to authentication state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        *self.state.borrow() == AuthState::Authenticated
    }

    /// Try to resume a previous session from the persisted token.
    ///
    /// Returns `true` only if a stored, unexpired token exists and the
    /// remote check-auth endpoint accepts it. Every failure path leaves
    /// the session unauthenticated rather than surfacing a fatal error;
    /// a token the server rejected is also removed from storage.
    pub async fn restore(&self) -> bool {
        let stored = match self.tokens.load() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("no persisted token");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "token cache unreadable");
                return false;
            }
        };

        if stored.is_expired() {
            debug!("persisted token expired at {}", stored.expires_at);
            let _ = self.tokens.clear();
            return false;
        }

        self.client.set_token(stored.token.clone());

        match self.client.check_auth().await {
            Ok(true) => {
                debug!("session restored");
                self.state.send_replace(AuthState::Authenticated);
                true
            }
            Ok(false) => {
                debug!("persisted token rejected");
                self.client.clear_token();
                let _ = self.tokens.clear();
                false
            }
            Err(e) => {
                // Network trouble: keep the stored token for the next
                // attempt but treat this session as unauthenticated.
                warn!(error = %e, "auth check failed");
                self.client.clear_token();
                false
            }
        }
    }

    /// Sign in with operator credentials.
    ///
    /// On success the token is attached to the client and persisted with
    /// its server-issued expiry. On failure nothing is stored and the
    /// error carries the server's message.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), CoreError> {
        let session = self
            .client
            .sign_in(&credentials.username, &credentials.password)
            .await?;

        self.client.set_token(session.token.clone());

        let persisted = PersistedToken {
            expires_at: session.expires_at(),
            token: session.token,
        };
        if let Err(e) = self.tokens.save(&persisted) {
            // The live session still works; only resumption is affected.
            warn!(error = %e, "failed to persist session token");
        }

        // send_replace: the state must update even before anyone
        // subscribes, and a plain send fails with no receivers.
        self.state.send_replace(AuthState::Authenticated);
        debug!("signed in, token expires at {}", persisted.expires_at);
        Ok(())
    }

    /// End the session locally: clear the persisted token and the
    /// in-memory state. No server call is involved.
    pub fn logout(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to clear token cache");
        }
        self.client.clear_token();
        self.state.send_replace(AuthState::Unauthenticated);
        debug!("signed out");
    }
}

/// In-memory `TokenStore` for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<PersistedToken>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<PersistedToken>, CoreError> {
        Ok(self.slot.lock().expect("token slot poisoned").clone())
    }

    fn save(&self, token: &PersistedToken) -> Result<(), CoreError> {
        *self.slot.lock().expect("token slot poisoned") = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        *self.slot.lock().expect("token slot poisoned") = None;
        Ok(())
    }
}
