//! Trait seam between the resolver and the catalog transport.
//!
//! Production code uses [`MusicBrainzClient`](super::MusicBrainzClient);
//! tests substitute [`mocks::MockCatalog`] with canned responses.

use async_trait::async_trait;
use serde_json::Value;

use super::domain::CatalogError;

/// Raw catalog access: one GET, decoded JSON or "no data".
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn get_data(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Option<Value>, CatalogError>;
}

#[async_trait]
impl CatalogApi for super::client::MusicBrainzClient {
    async fn get_data(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Option<Value>, CatalogError> {
        self.get_data(endpoint, params).await
    }
}
