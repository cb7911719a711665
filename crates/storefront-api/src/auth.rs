// Authentication endpoints
//
// Token-based sign-in: `POST /admin/signin` issues an opaque token plus a
// unix-millisecond expiry; `POST /api/user/check` validates a previously
// issued token. Both sit outside the merchant-scoped admin prefix.

use chrono::{DateTime, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::CatalogClient;
use crate::error::Error;
use crate::wire::ErrorBody;

/// Token issued by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionToken {
    pub token: String,
    /// Expiry as unix milliseconds, as issued by the server.
    pub expired: i64,
}

impl SessionToken {
    /// The expiry as a UTC timestamp. Out-of-range values clamp to the
    /// unix epoch, which reads as "already expired".
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.expired)
            .single()
            .unwrap_or_default()
    }

    /// Whether the token expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at() <= Utc::now()
    }
}

#[derive(Deserialize)]
struct CheckResponse {
    #[serde(default)]
    success: bool,
}

impl CatalogClient {
    /// Sign in with operator credentials.
    ///
    /// `POST /admin/signin` with `{username, password}`. Returns the issued
    /// token and its expiry; the caller decides whether to attach it via
    /// [`CatalogClient::set_token`] and whether to persist it. Nothing is
    /// stored on failure.
    pub async fn sign_in(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SessionToken, Error> {
        let url = self.root_url("admin/signin")?;
        debug!("signing in at {}", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|e| e.message_text())
                .unwrap_or_else(|| format!("sign-in failed (HTTP {status})"));
            return Err(Error::Authentication { message });
        }

        let token: SessionToken = Self::parse_response(resp).await?;
        debug!("sign-in successful, token expires at {}", token.expires_at());
        Ok(token)
    }

    /// Validate the currently attached token.
    ///
    /// `POST /api/user/check` with the token in the `Authorization` header.
    /// Returns `Ok(false)` when the server rejects the token; transport
    /// failures propagate as errors.
    pub async fn check_auth(&self) -> Result<bool, Error> {
        let url = self.root_url("api/user/check")?;
        debug!("checking auth at {}", url);

        let builder = self.apply_token(self.http().post(url));
        let resp = builder.send().await.map_err(Error::Transport)?;

        match Self::parse_response::<CheckResponse>(resp).await {
            Ok(check) => Ok(check.success),
            Err(e) if e.is_auth_expired() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
