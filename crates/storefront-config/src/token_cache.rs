//! File-backed session token cache.
//!
//! One small TOML file next to the config holding the token and its
//! server-issued expiry. A missing or unreadable file is the same as
//! no cached session.

use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use storefront_core::{CoreError, PersistedToken, TokenStore};

#[derive(Debug, Serialize, Deserialize)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// `TokenStore` backed by a TOML file.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Cache at the canonical platform location.
    pub fn at_default_location() -> Self {
        Self::new(crate::token_cache_path())
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<PersistedToken>, CoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CoreError::Config {
                    message: format!("cannot read token cache: {e}"),
                });
            }
        };

        // A corrupt cache is treated as no session rather than a hard error.
        match toml::from_str::<CachedToken>(&raw) {
            Ok(cached) => Ok(Some(PersistedToken {
                token: cached.token,
                expires_at: cached.expires_at,
            })),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable token cache");
                Ok(None)
            }
        }
    }

    fn save(&self, token: &PersistedToken) -> Result<(), CoreError> {
        let cached = CachedToken {
            token: token.token.clone(),
            expires_at: token.expires_at,
        };
        let toml_str = toml::to_string_pretty(&cached).map_err(|e| CoreError::Config {
            message: format!("cannot serialize token cache: {e}"),
        })?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::Config {
                message: format!("cannot create token cache directory: {e}"),
            })?;
        }
        std::fs::write(&self.path, toml_str).map_err(|e| CoreError::Config {
            message: format!("cannot write token cache: {e}"),
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = std::fs::set_permissions(&self.path, perms) {
                warn!(path = %self.path.display(), error = %e, "cannot restrict token cache permissions");
            }
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Config {
                message: format!("cannot remove token cache: {e}"),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_token() -> PersistedToken {
        PersistedToken {
            token: "tok-abc123".into(),
            expires_at: Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.toml"));

        store.save(&sample_token()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, sample_token());
    }

    #[test]
    fn missing_file_is_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("absent.toml"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_no_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        std::fs::write(&path, "not toml at all {{{").unwrap();

        let store = FileTokenStore::new(path);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested/deeper/session.toml"));
        store.save(&sample_token()).unwrap();
        assert!(store.load().unwrap().is_some());
    }

    #[test]
    fn clear_removes_the_cache_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.toml"));

        store.save(&sample_token()).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());

        // Second clear is a no-op.
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn cache_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.toml"));
        store.save(&sample_token()).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
