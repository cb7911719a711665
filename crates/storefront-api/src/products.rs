// Product CRUD endpoints
//
// All merchant-scoped: `/api/{merchant}/admin/products` for the list,
// `/api/{merchant}/admin/product[/{id}]` for mutations. Mutation bodies
// wrap the record in a `{"data": ...}` envelope.

use serde_json::json;
use tracing::debug;

use crate::client::CatalogClient;
use crate::error::Error;
use crate::wire::{MutationAck, Product, ProductsEnvelope};

impl CatalogClient {
    /// List every product in the catalog.
    ///
    /// `GET /api/{merchant}/admin/products`
    pub async fn list_products(&self) -> Result<Vec<Product>, Error> {
        let url = self.admin_url("products")?;
        debug!("listing products");
        let envelope: ProductsEnvelope = self.get(url).await?;
        Ok(envelope.products)
    }

    /// Create a product. The caller pre-normalizes the record (prices
    /// coerced, empty image slots stripped, no id).
    ///
    /// `POST /api/{merchant}/admin/product` with `{"data": product}`
    pub async fn create_product(&self, product: &Product) -> Result<(), Error> {
        let url = self.admin_url("product")?;
        debug!(title = %product.title, "creating product");
        let ack: MutationAck = self.post(url, &json!({ "data": product })).await?;
        Self::ensure_ack(&ack)
    }

    /// Update an existing product in place.
    ///
    /// `PUT /api/{merchant}/admin/product/{id}` with `{"data": product}`
    pub async fn update_product(&self, id: &str, product: &Product) -> Result<(), Error> {
        let url = self.admin_url(&format!("product/{id}"))?;
        debug!(id, "updating product");
        let ack: MutationAck = self.put(url, &json!({ "data": product })).await?;
        Self::ensure_ack(&ack)
    }

    /// Delete a product.
    ///
    /// `DELETE /api/{merchant}/admin/product/{id}`
    pub async fn delete_product(&self, id: &str) -> Result<(), Error> {
        let url = self.admin_url(&format!("product/{id}"))?;
        debug!(id, "deleting product");
        let ack: MutationAck = self.delete(url).await?;
        Self::ensure_ack(&ack)
    }

    /// Some backends report validation failures as HTTP 200 with
    /// `success: false`; surface those as API errors too.
    fn ensure_ack(ack: &MutationAck) -> Result<(), Error> {
        if ack.success {
            Ok(())
        } else {
            let message = ack.message_text();
            Err(Error::Api {
                status: 200,
                message: if message.is_empty() {
                    "operation rejected".into()
                } else {
                    message
                },
            })
        }
    }
}
