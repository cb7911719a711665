// Catalog admin API HTTP client
//
// Wraps `reqwest::Client` with merchant-scoped URL construction, token
// attachment, and error-body extraction. Endpoint groups (auth, products)
// are implemented as inherent methods in separate files to keep this
// module focused on transport mechanics.

use std::sync::RwLock;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::wire::ErrorBody;

/// Raw HTTP client for the catalog admin API.
///
/// Authenticated endpoints live under `/api/{merchant}/admin/...`; the
/// sign-in and check-auth endpoints sit outside that prefix. The session
/// token is held on the client and attached to every request once set --
/// there is no ambient global header state.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
    merchant: String,
    /// Raw session token, sent as the `Authorization` header verbatim
    /// (the backend expects no `Bearer` prefix).
    token: RwLock<Option<String>>,
}

impl CatalogClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the service root (e.g. `https://catalog.example.com`),
    /// `merchant` the path segment identifying the catalog to administer.
    pub fn new(base_url: Url, merchant: String, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            merchant,
            token: RwLock::new(None),
        })
    }

    /// Create a client with a pre-built `reqwest::Client` (used in tests).
    pub fn with_client(http: reqwest::Client, base_url: Url, merchant: String) -> Self {
        Self {
            http,
            base_url,
            merchant,
            token: RwLock::new(None),
        }
    }

    /// The merchant path segment this client administers.
    pub fn merchant(&self) -> &str {
        &self.merchant
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── Token management ─────────────────────────────────────────────

    /// Store the session token; attached to every subsequent request.
    pub fn set_token(&self, token: String) {
        debug!("storing session token");
        *self.token.write().expect("token lock poisoned") = Some(token);
    }

    /// Drop the stored token (logout).
    pub fn clear_token(&self) {
        debug!("clearing session token");
        *self.token.write().expect("token lock poisoned") = None;
    }

    /// Whether a token is currently attached.
    pub fn has_token(&self) -> bool {
        self.token.read().expect("token lock poisoned").is_some()
    }

    /// Apply the stored token to a request builder.
    pub(crate) fn apply_token(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.token.read().expect("token lock poisoned");
        match guard.as_deref() {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, token),
            None => builder,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a URL for a path relative to the service root
    /// (e.g. `admin/signin`, `api/user/check`).
    pub(crate) fn root_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{path}")).map_err(Error::InvalidUrl)
    }

    /// Build a merchant-scoped admin URL: `{base}/api/{merchant}/admin/{path}`
    pub(crate) fn admin_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/api/{}/admin/{path}", self.merchant)).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and parse the JSON response.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let builder = self.apply_token(self.http.get(url));
        let resp = builder.send().await.map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    /// Send a POST request with JSON body and parse the JSON response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let builder = self.apply_token(self.http.post(url).json(body));
        let resp = builder.send().await.map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    /// Send a PUT request with JSON body and parse the JSON response.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("PUT {}", url);

        let builder = self.apply_token(self.http.put(url).json(body));
        let resp = builder.send().await.map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    /// Send a DELETE request and parse the JSON response.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("DELETE {}", url);

        let builder = self.apply_token(self.http.delete(url));
        let resp = builder.send().await.map_err(Error::Transport)?;

        Self::parse_response(resp).await
    }

    /// Turn an HTTP response into `T` or an `Error`.
    ///
    /// 401 means the token expired or was rejected. Any other non-success
    /// status becomes `Error::Api` carrying the `message` from the standard
    /// `{"success": false, "message": ...}` error body when one is present.
    pub(crate) async fn parse_response<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|e| e.message_text())
                .unwrap_or_else(|| format!("HTTP {status}"));
            trace!(%status, "request failed: {message}");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        serde_json::from_str(&body).map_err(|e| {
            let preview = truncate_on_char_boundary(&body, 200);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

/// First `max_bytes` of `s`, backed off to a char boundary so multibyte
/// error messages never split mid-character.
fn truncate_on_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::truncate_on_char_boundary;

    #[test]
    fn short_bodies_pass_through_untouched() {
        assert_eq!(truncate_on_char_boundary("ok", 200), "ok");
    }

    #[test]
    fn preview_backs_off_to_a_char_boundary() {
        // 3-byte chars; 200 is not a multiple of 3, so a naive byte
        // slice would land mid-character.
        let body = "帳號或密碼錯誤".repeat(40);
        let preview = truncate_on_char_boundary(&body, 200);

        assert_eq!(preview.len(), 198);
        assert!(body.starts_with(preview));
        assert!(preview.chars().all(|c| "帳號或密碼錯誤".contains(c)));
    }
}
