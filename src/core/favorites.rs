//! Favorites business logic - per-user favorited product snapshots.
//!
//! The free functions are the fallible database operations. [`FavoritesStore`] wraps
//! them for UI-facing callers: failures are logged and degrade to `false` or an
//! empty list instead of propagating.

use crate::{
    entities::{FavoriteProduct, favorite_product},
    errors::Result,
    models::{Product, UserIdentity},
};
use sea_orm::{Condition, PaginatorTrait, QueryOrder, Set, prelude::*};

/// Fields of a product captured when it is favorited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteSnapshot {
    /// Catalog product id
    pub id: i64,
    /// Product name
    pub name: String,
    /// Brand, if known
    pub brand: Option<String>,
    /// Catalog price string
    pub price: Option<String>,
    /// Image link
    pub image_link: Option<String>,
}

impl From<&Product> for FavoriteSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            brand: product.brand.clone(),
            price: product.price.clone(),
            image_link: product.image_link.clone(),
        }
    }
}

fn owned_by(user: &UserIdentity) -> Condition {
    let (user_id, is_guest) = user.partition();
    Condition::all()
        .add(favorite_product::Column::UserId.eq(user_id))
        .add(favorite_product::Column::IsGuest.eq(is_guest))
}

/// Checks whether `product_id` is in the user's favorites.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn is_favorite(db: &DatabaseConnection, product_id: i64, user: &UserIdentity) -> Result<bool> {
    let count = FavoriteProduct::find()
        .filter(favorite_product::Column::Id.eq(product_id))
        .filter(owned_by(user))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Stores a snapshot in the user's favorites. Adding an existing favorite is a no-op.
///
/// # Errors
/// Returns an error if:
/// - The membership check fails
/// - The insert fails
pub async fn add_favorite(
    db: &DatabaseConnection,
    snapshot: FavoriteSnapshot,
    user: &UserIdentity,
) -> Result<()> {
    if is_favorite(db, snapshot.id, user).await? {
        return Ok(());
    }

    let (user_id, is_guest) = user.partition();
    let favorite = favorite_product::ActiveModel {
        id: Set(snapshot.id),
        user_id: Set(user_id.to_string()),
        is_guest: Set(is_guest),
        name: Set(snapshot.name),
        brand: Set(snapshot.brand),
        price: Set(snapshot.price),
        image_link: Set(snapshot.image_link),
        created_at: Set(chrono::Utc::now().naive_utc()),
    };
    FavoriteProduct::insert(favorite)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Removes `product_id` from the user's favorites, returning how many rows went away.
///
/// # Errors
/// Returns an error if the delete fails.
pub async fn remove_favorite(db: &DatabaseConnection, product_id: i64, user: &UserIdentity) -> Result<u64> {
    let result = FavoriteProduct::delete_many()
        .filter(favorite_product::Column::Id.eq(product_id))
        .filter(owned_by(user))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Lists the user's favorites ordered by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_favorites(
    db: &DatabaseConnection,
    user: &UserIdentity,
) -> Result<Vec<favorite_product::Model>> {
    FavoriteProduct::find()
        .filter(owned_by(user))
        .order_by_asc(favorite_product::Column::Name)
        .order_by_asc(favorite_product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Favorites table access that never fails outward.
#[derive(Debug)]
pub struct FavoritesStore {
    db: DatabaseConnection,
}

impl FavoritesStore {
    /// Wraps an open database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Membership check; a failed read counts as "not favorited".
    pub async fn contains(&self, product_id: i64, user: &UserIdentity) -> bool {
        is_favorite(&self.db, product_id, user)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Error checking favorite {} for {}: {}", product_id, user, e);
                false
            })
    }

    /// Adds a snapshot; returns whether the write succeeded.
    pub async fn add(&self, snapshot: FavoriteSnapshot, user: &UserIdentity) -> bool {
        let product_id = snapshot.id;
        match add_favorite(&self.db, snapshot, user).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Error saving favorite {} for {}: {}", product_id, user, e);
                false
            }
        }
    }

    /// Removes a favorite; returns whether the write succeeded.
    pub async fn remove(&self, product_id: i64, user: &UserIdentity) -> bool {
        match remove_favorite(&self.db, product_id, user).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Error deleting favorite {} for {}: {}", product_id, user, e);
                false
            }
        }
    }

    /// The user's favorites sorted by name; empty on failure.
    pub async fn list(&self, user: &UserIdentity) -> Vec<favorite_product::Model> {
        list_favorites(&self.db, user).await.unwrap_or_else(|e| {
            tracing::error!("Error listing favorites for {}: {}", user, e);
            Vec::new()
        })
    }
}
