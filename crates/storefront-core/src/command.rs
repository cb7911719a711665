// ── Command API ──
//
// All write operations flow through a unified `Command` enum, serialized
// by the catalog's command processor task. Reads bypass the channel via
// store snapshots.

use crate::error::CoreError;
use crate::model::Product;

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All possible write operations against the catalog service.
#[derive(Debug, Clone)]
pub enum Command {
    /// Create a product. The payload is pre-normalized and carries no id.
    CreateProduct(Product),
    /// Replace an existing product.
    UpdateProduct { id: String, product: Product },
    /// Delete a product by server id.
    DeleteProduct { id: String },
    /// Re-fetch the whole product list into the store.
    RefreshProducts,
}

/// Result of a command execution.
#[derive(Debug)]
pub enum CommandResult {
    Ok,
}
