use dotenvy::dotenv;
use glowup_core::{
    config::{self, database, settings::ReviewsConfig},
    core::{
        FavoriteToggleCoordinator, FavoritesStore, HomeFeed, HttpCatalogClient,
        MemoryRealtimeStore, ProductCatalog, RealtimeStore, RestRealtimeStore, ReviewSync,
        SearchCoordinator, SearchPhase, Session,
    },
    errors::{Error, Result},
    models::{Product, UserIdentity},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: glowup <search BRAND | category TYPE | home | favorites [UID] | toggle PRODUCT_ID BRAND [UID] | reviews PRODUCT_ID | review PRODUCT_ID TEXT [UID] [EMAIL]>";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Open the favorites database
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))?;

    let catalog: Arc<dyn ProductCatalog> = Arc::new(HttpCatalogClient::new(&app_config.catalog)?);
    let pricing = &app_config.pricing;
    let print_products = |products: &[Product]| {
        for product in products {
            info!(
                "#{} {} {} - {}",
                product.id,
                product.brand.as_deref().unwrap_or("BRAND"),
                product.name,
                product.price_in_currency(pricing.exchange_rate, &pricing.currency_symbol)
            );
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let arg = |i: usize| args.get(i).cloned();
    let identity_at = |i: usize| UserIdentity::from_uid(args.get(i).cloned());

    match args.first().map(String::as_str) {
        Some(command @ ("search" | "category")) => {
            let term = arg(1).ok_or_else(usage_error)?;
            let coordinator = SearchCoordinator::spawn(Arc::clone(&catalog), app_config.search.debounce());
            if command == "search" {
                coordinator.on_text_changed(term);
            } else {
                coordinator.on_category_selected(term);
            }

            let mut state = coordinator.subscribe();
            let settled = state
                .wait_for(|s| matches!(s.phase, SearchPhase::Success | SearchPhase::Error))
                .await
                .map_err(|e| Error::Config {
                    message: format!("search coordinator stopped: {e}"),
                })?
                .clone();
            match settled.error_message {
                Some(message) => info!("{}", message),
                None => print_products(&settled.results),
            }
        }
        Some("home") => {
            let state = HomeFeed::new(Arc::clone(&catalog), app_config.home.featured_brand.clone())
                .load()
                .await;
            if let Some(message) = state.error_message {
                info!("{}", message);
            }
            print_products(&state.products);
        }
        Some("favorites") => {
            let favorites = FavoriteToggleCoordinator::new(FavoritesStore::new(db));
            for favorite in favorites.list(&identity_at(1)).await {
                info!(
                    "#{} {} {}",
                    favorite.id,
                    favorite.brand.as_deref().unwrap_or("BRAND"),
                    favorite.name
                );
            }
        }
        Some("toggle") => {
            let product_id: i64 = arg(1)
                .and_then(|id| id.parse().ok())
                .ok_or_else(usage_error)?;
            let brand = arg(2).ok_or_else(usage_error)?;
            let products = catalog.fetch(&brand, false).await?;
            let product = products
                .iter()
                .find(|p| p.id == product_id)
                .ok_or_else(|| Error::Config {
                    message: format!("product {product_id} not found for brand {brand}"),
                })?;

            let favorites = FavoriteToggleCoordinator::new(FavoritesStore::new(db));
            let now_favorite = favorites.toggle(product, &identity_at(3)).await;
            info!("{} is now {}", product.name, if now_favorite { "a favorite" } else { "not a favorite" });
        }
        Some("reviews") => {
            let product_id: i64 = arg(1)
                .and_then(|id| id.parse().ok())
                .ok_or_else(usage_error)?;
            let reviews = ReviewSync::new(review_store(&app_config.reviews)?);
            let subscription = reviews.subscribe(product_id, |reviews| {
                info!("{} reviews", reviews.len());
                for review in reviews {
                    info!("[{}] {}: {}", review.timestamp, review.user_name, review.text);
                }
            });
            tokio::time::sleep(app_config.reviews.poll_interval() + Duration::from_millis(500)).await;
            subscription.cancel_and_wait().await;
        }
        Some("review") => {
            let product_id: i64 = arg(1)
                .and_then(|id| id.parse().ok())
                .ok_or_else(usage_error)?;
            let text = arg(2).ok_or_else(usage_error)?;
            let session = Session::new();
            if let Some(uid) = arg(3) {
                session.sign_in(uid, arg(4), "");
            }

            let reviews = ReviewSync::new(review_store(&app_config.reviews)?);
            let key = reviews
                .submit_confirmed(product_id, &session.author_name(), &text)
                .await?;
            info!("Review stored as {}", key);
        }
        _ => return Err(usage_error()),
    }

    Ok(())
}

fn review_store(config: &ReviewsConfig) -> Result<Arc<dyn RealtimeStore>> {
    Ok(match &config.realtime_url {
        Some(url) => Arc::new(RestRealtimeStore::new(url.clone(), config.poll_interval())?),
        None => {
            info!("No realtime database configured, keeping reviews in memory");
            Arc::new(MemoryRealtimeStore::new())
        }
    })
}

fn usage_error() -> Error {
    Error::Usage {
        message: USAGE.to_string(),
    }
}
