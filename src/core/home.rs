//! Home feed - the featured brand shown before the user searches for anything.

use crate::{core::catalog::ProductCatalog, models::Product};
use std::sync::Arc;

/// Result of loading the home feed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeState {
    /// Featured products in catalog order
    pub products: Vec<Product>,
    /// User-facing error when the load failed
    pub error_message: Option<String>,
}

/// Loads the featured brand from an injected catalog.
#[derive(Clone)]
pub struct HomeFeed {
    catalog: Arc<dyn ProductCatalog>,
    featured_brand: String,
}

impl HomeFeed {
    /// Creates a feed for `featured_brand`.
    #[must_use]
    pub fn new(catalog: Arc<dyn ProductCatalog>, featured_brand: impl Into<String>) -> Self {
        Self {
            catalog,
            featured_brand: featured_brand.into(),
        }
    }

    /// Fetches the featured products. An empty list is a valid, empty feed.
    pub async fn load(&self) -> HomeState {
        match self.catalog.fetch(&self.featured_brand, false).await {
            Ok(products) => {
                tracing::info!(
                    "Loaded {} featured {} products",
                    products.len(),
                    self.featured_brand
                );
                HomeState {
                    products,
                    error_message: None,
                }
            }
            Err(e) => {
                tracing::warn!("Home feed failed: {}", e);
                HomeState {
                    products: Vec::new(),
                    error_message: Some(format!("Failed to load products: {e}")),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CatalogError;
    use crate::test_utils::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_load_featured_brand() {
        let catalog = Arc::new(FakeCatalog::new());
        let feed = HomeFeed::new(Arc::clone(&catalog) as Arc<dyn ProductCatalog>, "maybelline");

        let state = feed.load().await;
        assert_eq!(state.products.len(), 1);
        assert!(state.error_message.is_none());
        assert_eq!(catalog.calls(), vec![("maybelline".to_string(), false)]);
    }

    #[tokio::test]
    async fn test_empty_feed_is_not_an_error() {
        let catalog = Arc::new(FakeCatalog::new());
        catalog.respond("maybelline", Duration::ZERO, Ok(Vec::new()));
        let feed = HomeFeed::new(catalog, "maybelline");

        assert_eq!(feed.load().await, HomeState::default());
    }

    #[tokio::test]
    async fn test_failure_message_includes_reason() {
        let catalog = Arc::new(FakeCatalog::new());
        catalog.respond(
            "maybelline",
            Duration::ZERO,
            Err(CatalogError::RequestFailed {
                message: "catalog answered 503".to_string(),
            }),
        );
        let feed = HomeFeed::new(catalog, "maybelline");

        let state = feed.load().await;
        let message = state.error_message.unwrap_or_default();
        assert!(message.starts_with("Failed to load products:"));
        assert!(message.contains("503"));
    }
}
