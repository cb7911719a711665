//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use storefront_core::{AuthState, PendingConfirm, Product};

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Everything that can happen in the console.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Loop plumbing ────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),
    ToggleHelp,

    // ── Notifications ────────────────────────────────────────────────
    Notify(Notification),

    // ── Data updates (from the bridge) ───────────────────────────────
    ProductsUpdated(Arc<Vec<Arc<Product>>>),
    AuthChanged(AuthState),

    // ── Session lifecycle ────────────────────────────────────────────
    LoginSubmit { username: String, password: String },
    LoginResult(Result<(), String>),
    Logout,

    // ── Catalog operations ───────────────────────────────────────────
    RequestRefresh,
    SubmitModal(PendingConfirm),
    ModalFinished {
        generation: u64,
        result: Result<(), String>,
    },
}
