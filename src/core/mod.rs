//! Core business logic - framework-agnostic catalog, favorites, review and search
//! components. Presentation layers drive these and render the state they produce.

/// Remote product catalog client
pub mod catalog;
/// Per-user favorites persistence
pub mod favorites;
/// Featured products feed
pub mod home;
/// Realtime database transport
pub mod realtime;
/// Live product review feeds
pub mod reviews;
/// Debounced search coordinator
pub mod search;
/// Current sign-in state
pub mod session;
/// Optimistic favorite toggling
pub mod toggle;

pub use catalog::{HttpCatalogClient, ProductCatalog};
pub use favorites::{FavoriteSnapshot, FavoritesStore};
pub use home::{HomeFeed, HomeState};
pub use realtime::{MemoryRealtimeStore, RealtimeStore, RestRealtimeStore};
pub use reviews::{ReviewSync, Subscription};
pub use search::{SearchCoordinator, SearchPhase, SearchState};
pub use session::Session;
pub use toggle::FavoriteToggleCoordinator;
