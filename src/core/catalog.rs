//! Product catalog client - single-shot lookups against the remote makeup API.
//!
//! The catalog is queried with either a `brand` or a `product_type` filter. No
//! retries or caching happen here; callers decide when to ask again.

use crate::{
    config::settings::CatalogConfig,
    errors::{CatalogError, Result},
    models::Product,
};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// A source of product listings.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetches products whose brand (or, with `by_category`, product type) matches `term`.
    async fn fetch(&self, term: &str, by_category: bool) -> std::result::Result<Vec<Product>, CatalogError>;
}

/// HTTP implementation of [`ProductCatalog`].
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// Creates a client for the configured endpoint.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Builds the request target for a lookup.
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidQuery`] if the base URL does not parse or the
    /// term is empty or contains control characters.
    pub fn query_url(&self, term: &str, by_category: bool) -> std::result::Result<Url, CatalogError> {
        if term.is_empty() || term.chars().any(char::is_control) {
            return Err(CatalogError::InvalidQuery {
                message: format!("unusable search term {term:?}"),
            });
        }

        let filter = if by_category { "product_type" } else { "brand" };
        Url::parse_with_params(&self.base_url, &[(filter, term)]).map_err(|e| {
            CatalogError::InvalidQuery {
                message: format!("bad catalog URL {}: {e}", self.base_url),
            }
        })
    }
}

#[async_trait]
impl ProductCatalog for HttpCatalogClient {
    async fn fetch(&self, term: &str, by_category: bool) -> std::result::Result<Vec<Product>, CatalogError> {
        let url = self.query_url(term, by_category)?;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::RequestFailed {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::RequestFailed {
                message: format!("catalog answered {status}"),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::RequestFailed {
                message: e.to_string(),
            })?;

        serde_json::from_slice::<Vec<Product>>(&body).map_err(|e| {
            tracing::warn!("Catalog decoding error: {}", e);
            CatalogError::DecodeError {
                message: e.to_string(),
            }
        })
    }
}
