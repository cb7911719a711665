//! Reactive data layer between `storefront-api` and the terminal UI.
//!
//! This crate owns the business logic for the storefront console:
//!
//! - **[`Catalog`]** — Central facade. Builds the API client from
//!   configuration, owns the product store and session, routes mutations
//!   through an `mpsc` command channel, and spawns the background refresh
//!   task.
//!
//! - **[`ProductStore`]** — Reactive storage for the canonical product
//!   list. The remote catalog is the sole authority: refreshes replace the
//!   whole list atomically, mutations never patch it locally.
//!
//! - **[`SessionStore`]** — Token lifecycle: restore from the persisted
//!   cache, sign in, sign out. Persistence goes through the [`TokenStore`]
//!   trait so the storage backend stays pluggable.
//!
//! - **[`ModalForm`]** — The editing buffer behind create/edit/delete.
//!   One draft, one mode tag, one confirm action, and the bounded
//!   image-URL list with its auto-grow/auto-shrink rule.
//!
//! - **[`Command`]** — Typed mutation requests routed through the command
//!   channel to the catalog's processor task. Reads bypass the channel via
//!   store snapshots.

pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod model;
pub mod modal;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::Catalog;
pub use command::{Command, CommandResult};
pub use config::{CatalogConfig, Credentials, TlsVerification};
pub use error::CoreError;
pub use modal::{
    DraftField, ModalForm, ModalMode, ModalSurface, NullSurface, PendingConfirm, ProductDraft,
};
pub use model::{MAX_SECONDARY_IMAGES, Product};
pub use session::{AuthState, MemoryTokenStore, PersistedToken, SessionStore, TokenStore};
pub use store::ProductStore;
pub use stream::ProductStream;
