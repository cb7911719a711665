//! Data bridge — connects [`Catalog`] streams to TUI actions.
//!
//! Runs as a background task: subscribes to the product stream and the
//! session state watch, forwarding every change as an [`Action`] through
//! the TUI's action channel.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use storefront_core::Catalog;

use crate::action::Action;

/// Spawn the bridge between [`Catalog`] reactive state and the TUI.
///
/// Starts the catalog's background tasks, attempts to restore a cached
/// session, then loops forwarding product snapshots and auth transitions
/// as actions. Shuts down cleanly on cancellation.
pub async fn spawn_data_bridge(
    catalog: Catalog,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    catalog.start().await;

    let mut products = catalog.products();
    let mut auth = catalog.auth_state();

    // A cached token skips the login form entirely.
    if catalog.session().restore().await {
        let _ = action_tx.send(Action::AuthChanged(*auth.borrow_and_update()));
        if let Err(e) = catalog.fetch_all().await {
            warn!(error = %e, "initial product fetch failed");
            let _ = action_tx.send(Action::Notify(crate::action::Notification::error(
                format!("{e}"),
            )));
        }
    }

    // Initial snapshot so the table has data immediately.
    let initial = products.current().clone();
    if !initial.is_empty() {
        let _ = action_tx.send(Action::ProductsUpdated(initial));
    }

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(snapshot) = products.changed() => {
                let _ = action_tx.send(Action::ProductsUpdated(snapshot));
            }

            Ok(()) = auth.changed() => {
                let state = *auth.borrow_and_update();
                let _ = action_tx.send(Action::AuthChanged(state));
            }
        }
    }

    catalog.shutdown().await;
    debug!("data bridge shut down");
}
