//! Client for the external product catalog.
//!
//! Response decoding is split into plain functions over (status, body) so the
//! mapping from upstream responses to [`CatalogError`] is testable without a
//! live server.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use favoritos_core::ProductId;

/// Max length of an upstream body echoed into an error message.
const ERROR_SNIPPET_LEN: usize = 160;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("product {0} not found in catalog")]
    NotFound(ProductId),

    /// The catalog answered with an error status.
    #[error("catalog returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The catalog could not be reached at all.
    #[error("catalog is unreachable: {0}")]
    Unavailable(String),

    /// The catalog answered 200 with a body we cannot use.
    #[error("catalog returned an invalid response: {0}")]
    Invalid(String),
}

/// A product as the catalog describes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub title: String,
    pub image: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Port for catalog lookups, so services can be tested against a stub.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get_product(&self, id: ProductId) -> Result<CatalogProduct, CatalogError>;

    async fn list_products(&self) -> Result<Vec<CatalogProduct>, CatalogError>;
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    async fn fetch(&self, path: &str) -> Result<(u16, String), CatalogError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| CatalogError::Unavailable(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| CatalogError::Unavailable(err.to_string()))?;
        Ok((status, body))
    }
}

#[async_trait]
impl ProductCatalog for CatalogClient {
    async fn get_product(&self, id: ProductId) -> Result<CatalogProduct, CatalogError> {
        let (status, body) = self.fetch(&format!("/products/{id}")).await?;
        decode_product(status, &body, id)
    }

    async fn list_products(&self) -> Result<Vec<CatalogProduct>, CatalogError> {
        let (status, body) = self.fetch("/products").await?;
        decode_product_list(status, &body)
    }
}

/// Decodes a single-product response.
///
/// The reference catalog answers 200 with an empty or `null` body for unknown
/// ids, so those count as not-found alongside a plain 404.
fn decode_product(status: u16, body: &str, id: ProductId) -> Result<CatalogProduct, CatalogError> {
    if status == 404 {
        return Err(CatalogError::NotFound(id));
    }
    if !(200..300).contains(&status) {
        return Err(upstream_error(status, body));
    }
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(CatalogError::NotFound(id));
    }
    serde_json::from_str(trimmed).map_err(|err| invalid_body(&err, trimmed))
}

fn decode_product_list(status: u16, body: &str) -> Result<Vec<CatalogProduct>, CatalogError> {
    if !(200..300).contains(&status) {
        return Err(upstream_error(status, body));
    }
    let trimmed = body.trim();
    serde_json::from_str(trimmed).map_err(|err| invalid_body(&err, trimmed))
}

/// A 2xx body we cannot parse; the error keeps a truncated copy of the raw
/// body so the log shows what the catalog actually sent.
fn invalid_body(err: &serde_json::Error, body: &str) -> CatalogError {
    CatalogError::Invalid(format!("{err}; body: {}", snippet(body)))
}

/// Builds an [`CatalogError::Upstream`] from an error response, preferring a
/// JSON `message` field and falling back to a truncated raw body.
fn upstream_error(status: u16, body: &str) -> CatalogError {
    #[derive(Deserialize)]
    struct UpstreamMessage {
        message: String,
    }

    let message = serde_json::from_str::<UpstreamMessage>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| snippet(body));
    CatalogError::Upstream { status, message }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= ERROR_SNIPPET_LEN {
        return trimmed.to_owned();
    }
    let mut end = ERROR_SNIPPET_LEN;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &trimmed[..end])
}
