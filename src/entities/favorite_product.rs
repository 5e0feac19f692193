//! Favorite product entity - A per-user snapshot of a product the user favorited.
//!
//! The row copies the product fields shown in the favorites list at the moment the
//! product was favorited and is never refreshed from the catalog afterwards.
//! Rows are partitioned by owner: `(user_id, is_guest)` identifies the bucket, so the
//! anonymous bucket stays apart from an authenticated account even if that account's
//! id happens to be the literal `"guest"`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Favorite product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "favorite_products")]
pub struct Model {
    /// Catalog product id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// Owner id; `"guest"` for the anonymous bucket
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    /// True when the row belongs to the anonymous bucket
    #[sea_orm(primary_key, auto_increment = false)]
    pub is_guest: bool,
    /// Product name at favorite time
    pub name: String,
    /// Brand at favorite time
    pub brand: Option<String>,
    /// Catalog price string at favorite time
    pub price: Option<String>,
    /// Image link at favorite time
    pub image_link: Option<String>,
    /// When the product was favorited
    pub created_at: DateTime,
}

/// Favorites have no relations to other tables
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
