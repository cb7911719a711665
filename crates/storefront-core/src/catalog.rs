// ── Catalog facade ──
//
// The entry point consumers hold. Owns the API client, the product
// store, and the session; routes every mutation through a command
// channel so writes stay serialized, and spawns the optional periodic
// refresh task.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use storefront_api::CatalogClient;

use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::CatalogConfig;
use crate::error::CoreError;
use crate::session::{AuthState, SessionStore, TokenStore};
use crate::store::ProductStore;
use crate::stream::ProductStream;

const COMMAND_CHANNEL_SIZE: usize = 16;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<CatalogInner>`. Create with [`new`](Self::new),
/// call [`start`](Self::start) once to spawn background tasks, and
/// [`shutdown`](Self::shutdown) to tear them down.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    config: CatalogConfig,
    client: Arc<CatalogClient>,
    store: ProductStore,
    session: SessionStore,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Catalog {
    /// Build the client and wire up the stores. Does not touch the
    /// network -- call [`SessionStore::restore`] or
    /// [`SessionStore::login`] through [`session`](Self::session) first.
    pub fn new(config: CatalogConfig, tokens: Box<dyn TokenStore>) -> Result<Self, CoreError> {
        let client = Arc::new(CatalogClient::new(
            config.url.clone(),
            config.merchant.clone(),
            &config.transport(),
        )?);
        let session = SessionStore::new(Arc::clone(&client), tokens);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Ok(Self {
            inner: Arc::new(CatalogInner {
                config,
                client,
                store: ProductStore::new(),
                session,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.inner.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn store(&self) -> &ProductStore {
        &self.inner.store
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the command processor and, when configured, the periodic
    /// refresh task. Idempotent: a second call finds the receiver gone
    /// and spawns nothing.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let catalog = self.clone();
            handles.push(tokio::spawn(command_processor_task(catalog, rx)));
        }

        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs > 0 {
            let catalog = self.clone();
            let cancel = self.inner.cancel.child_token();
            handles.push(tokio::spawn(refresh_task(catalog, interval_secs, cancel)));
        }
    }

    /// Cancel background tasks and wait for them to finish. The session
    /// and its persisted token are left alone.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            handle.abort();
            let _ = handle.await;
        }
        debug!("catalog shut down");
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Fetch the full product list and replace the store's snapshot.
    ///
    /// On failure the previous snapshot stays untouched (stale but
    /// consistent) and the error propagates.
    pub async fn fetch_all(&self) -> Result<(), CoreError> {
        let products = self.inner.client.list_products().await?;
        debug!(count = products.len(), "product refresh complete");
        self.inner.store.replace_all(products);
        Ok(())
    }

    /// Subscribe to product list changes.
    pub fn products(&self) -> ProductStream {
        self.inner.store.subscribe()
    }

    /// Subscribe to authentication state changes.
    pub fn auth_state(&self) -> tokio::sync::watch::Receiver<AuthState> {
        self.inner.session.subscribe()
    }

    // ── Command execution ────────────────────────────────────────────

    /// Execute a command through the command channel and await the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if !self.inner.session.is_authenticated() {
            return Err(CoreError::SessionExpired);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::Internal("command channel closed".into()))?;

        rx.await
            .map_err(|_| CoreError::Internal("command dropped".into()))?
    }

    async fn run_command(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        match cmd {
            Command::CreateProduct(product) => {
                self.inner.client.create_product(&product).await?;
            }
            Command::UpdateProduct { id, product } => {
                self.inner.client.update_product(&id, &product).await?;
            }
            Command::DeleteProduct { id } => {
                self.inner.client.delete_product(&id).await?;
            }
            Command::RefreshProducts => {
                self.fetch_all().await?;
            }
        }
        Ok(CommandResult::Ok)
    }
}

// ── Background tasks ─────────────────────────────────────────────────

async fn command_processor_task(catalog: Catalog, mut rx: mpsc::Receiver<CommandEnvelope>) {
    debug!("command processor started");
    while let Some(envelope) = rx.recv().await {
        let result = catalog.run_command(envelope.command).await;
        if let Err(ref e) = result {
            warn!(error = %e, "command failed");
        }
        // Receiver gone means the caller stopped waiting; nothing to do.
        let _ = envelope.response_tx.send(result);
    }
    debug!("command processor stopped");
}

async fn refresh_task(catalog: Catalog, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    debug!(interval_secs, "periodic refresh started");

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if !catalog.session().is_authenticated() {
                    continue;
                }
                if let Err(e) = catalog.fetch_all().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
    debug!("periodic refresh stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::modal::{ModalForm, ModalMode, NullSurface};
    use crate::session::MemoryTokenStore;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup() -> (MockServer, Catalog) {
        let server = MockServer::start().await;
        let config = CatalogConfig {
            url: Url::parse(&server.uri()).unwrap(),
            merchant: "demo-shop".into(),
            ..CatalogConfig::default()
        };
        let catalog = Catalog::new(config, Box::new(MemoryTokenStore::default())).unwrap();
        catalog.start().await;
        (server, catalog)
    }

    async fn sign_in(server: &MockServer, catalog: &Catalog) {
        Mock::given(method("POST"))
            .and(path("/admin/signin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "token": "tok-1",
                "expired": 4_102_444_800_000_i64,
            })))
            .mount(server)
            .await;
        catalog
            .session()
            .login(&crate::config::Credentials {
                username: "admin@example.com".into(),
                password: "pw".to_string().into(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn fetch_failure_leaves_previous_snapshot() {
        let (server, catalog) = setup().await;

        let ok = ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "products": [{"id": "a", "title": "Alpha"}],
        }));
        let guard = Mock::given(method("GET"))
            .and(path("/api/demo-shop/admin/products"))
            .respond_with(ok)
            .expect(1)
            .mount_as_scoped(&server)
            .await;

        catalog.fetch_all().await.unwrap();
        assert_eq!(catalog.store().len(), 1);
        drop(guard);

        Mock::given(method("GET"))
            .and(path("/api/demo-shop/admin/products"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(catalog.fetch_all().await.is_err());
        // Stale but consistent.
        assert_eq!(catalog.store().len(), 1);
        assert_eq!(catalog.store().snapshot()[0].title, "Alpha");
    }

    #[tokio::test]
    async fn create_flow_lands_in_the_store_after_refetch() {
        let (server, catalog) = setup().await;
        sign_in(&server, &catalog).await;

        Mock::given(method("POST"))
            .and(path("/api/demo-shop/admin/product"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/demo-shop/admin/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "products": [{"id": "-Nnew", "title": "Widget"}],
            })))
            .mount(&server)
            .await;

        // Drive the whole confirm cycle through the modal controller.
        let mut form = ModalForm::new(Box::new(NullSurface));
        form.open(None, ModalMode::Create);
        form.set_field(crate::modal::DraftField::Title, "Widget".into());
        form.change_image(0, "https://cdn.example/a.png".into());

        let pending = form.confirm().unwrap();
        catalog.execute(pending.command).await.unwrap();
        assert!(form.finish_confirm(pending.generation));

        catalog.fetch_all().await.unwrap();
        let snap = catalog.store().snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].title, "Widget");
    }

    #[tokio::test]
    async fn delete_flow_calls_the_endpoint_exactly_once() {
        let (server, catalog) = setup().await;
        sign_in(&server, &catalog).await;

        Mock::given(method("DELETE"))
            .and(path("/api/demo-shop/admin/product/-Nprod001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let product = crate::model::Product {
            id: Some("-Nprod001".into()),
            title: "Doomed".into(),
            ..crate::model::Product::default()
        };

        let mut form = ModalForm::new(Box::new(NullSurface));
        form.open(Some(&product), ModalMode::Delete);
        let pending = form.confirm().unwrap();

        catalog.execute(pending.command).await.unwrap();
        assert!(form.finish_confirm(pending.generation));
        assert!(!form.is_open());
    }

    #[tokio::test]
    async fn failed_confirm_keeps_the_modal_open() {
        let (server, catalog) = setup().await;
        sign_in(&server, &catalog).await;

        Mock::given(method("POST"))
            .and(path("/api/demo-shop/admin/product"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "message": "title is required",
            })))
            .mount(&server)
            .await;

        let mut form = ModalForm::new(Box::new(NullSurface));
        form.open(None, ModalMode::Create);
        let pending = form.confirm().unwrap();

        let err = catalog.execute(pending.command).await.unwrap_err();
        assert!(err.to_string().contains("title is required"));

        // On failure the buffer stays as the operator left it.
        assert!(form.is_open());
    }

    #[tokio::test]
    async fn execute_requires_an_authenticated_session() {
        let (_server, catalog) = setup().await;

        let err = catalog
            .execute(Command::DeleteProduct { id: "x".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::SessionExpired));
    }
}
