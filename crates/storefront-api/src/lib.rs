// storefront-api: Async Rust client for the storefront catalog admin API

pub mod auth;
pub mod client;
pub mod error;
pub mod products;
pub mod transport;
pub mod wire;

pub use auth::SessionToken;
pub use client::CatalogClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use wire::Product;
