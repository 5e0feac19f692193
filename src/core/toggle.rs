//! Favorite toggling - flips a product's favorite state for the current user.
//!
//! The returned flag is the state the UI should show immediately. The store write is
//! awaited before returning, so the next membership check for the same key already
//! sees it. Concurrent toggles of one key are not coordinated; different keys never
//! interfere because each touches only its own rows.

use crate::{
    core::favorites::{FavoriteSnapshot, FavoritesStore},
    entities::FavoriteProductModel,
    models::{Product, UserIdentity},
};

/// Orchestrates optimistic favorite flips against a [`FavoritesStore`].
#[derive(Debug)]
pub struct FavoriteToggleCoordinator {
    store: FavoritesStore,
}

impl FavoriteToggleCoordinator {
    /// Creates a coordinator over an injected store.
    #[must_use]
    pub const fn new(store: FavoritesStore) -> Self {
        Self { store }
    }

    /// Flips the product's membership and returns the new favorited state.
    ///
    /// The returned state is optimistic: a failed write is logged and the flip is still
    /// reported, so the next membership check may disagree with it.
    pub async fn toggle(&self, product: &Product, user: &UserIdentity) -> bool {
        if self.store.contains(product.id, user).await {
            if self.store.remove(product.id, user).await {
                tracing::debug!("Unfavorited product {} for {}", product.id, user);
            } else {
                tracing::debug!("Unfavorite of product {} for {} was not persisted", product.id, user);
            }
            false
        } else {
            if self.store.add(FavoriteSnapshot::from(product), user).await {
                tracing::debug!("Favorited product {} for {}", product.id, user);
            } else {
                tracing::debug!("Favorite of product {} for {} was not persisted", product.id, user);
            }
            true
        }
    }

    /// Current membership, used when a detail view opens.
    pub async fn is_favorite(&self, product: &Product, user: &UserIdentity) -> bool {
        self.store.contains(product.id, user).await
    }

    /// The user's favorites sorted by name.
    pub async fn list(&self, user: &UserIdentity) -> Vec<FavoriteProductModel> {
        self.store.list(user).await
    }
}
