// ── Product store ──
//
// Authoritative in-memory copy of the remote product list. The remote
// service owns the data: every refresh replaces the whole list atomically,
// and mutations never patch the list locally (server-assigned fields such
// as generated ids would drift). Order is preserved as received.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::Product;
use crate::stream::ProductStream;

type Snapshot = Arc<Vec<Arc<Product>>>;

/// Reactive storage for the canonical product list.
///
/// `watch` carries the ordered snapshot to subscribers; a `DashMap`
/// index provides O(1) lookup by server id.
pub struct ProductStore {
    /// Full ordered snapshot, replaced wholesale on refresh.
    snapshot: watch::Sender<Snapshot>,

    /// Secondary index: server id -> product.
    by_id: DashMap<String, Arc<Product>>,

    /// Version counter, bumped on every replace.
    version: watch::Sender<u64>,
}

impl Default for ProductStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        let (version, _) = watch::channel(0u64);
        Self {
            snapshot,
            by_id: DashMap::new(),
            version,
        }
    }

    /// Replace the entire list with a fresh server response.
    ///
    /// Atomic from the subscriber's point of view: one `watch` send, one
    /// rebuilt index. Callers only invoke this with a successful fetch --
    /// on failure the previous list stays untouched.
    pub fn replace_all(&self, products: Vec<Product>) {
        let entries: Vec<Arc<Product>> = products.into_iter().map(Arc::new).collect();

        self.by_id.clear();
        for product in &entries {
            if let Some(id) = product.id.as_deref() {
                self.by_id.insert(id.to_owned(), Arc::clone(product));
            }
        }

        self.snapshot.send_modify(|snap| *snap = Arc::new(entries));
        self.version.send_modify(|v| *v += 1);
    }

    /// Look up a product by its server id.
    pub fn get(&self, id: &str) -> Option<Arc<Product>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> ProductStream {
        ProductStream::new(self.snapshot.subscribe())
    }

    /// Current version counter value.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }
}
