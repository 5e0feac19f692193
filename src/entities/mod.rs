//! Entity module - Contains the SeaORM entity definitions for the local database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod favorite_product;

pub use favorite_product::{Entity as FavoriteProduct, Model as FavoriteProductModel};
