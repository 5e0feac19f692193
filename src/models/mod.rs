//! Domain types shared by the catalog, favorites and review components.

/// Session identity and storage partitioning
pub mod identity;
/// Catalog products and their display helpers
pub mod product;
/// Realtime product reviews
pub mod review;

pub use identity::{GUEST_USER_ID, UserIdentity};
pub use product::Product;
pub use review::{Review, ReviewRecordError};
