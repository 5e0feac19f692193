//! Review synchronisation - live, newest-first review feeds per product.
//!
//! Reviews for a product live under `reviews/<productId>`. A subscription re-reads the
//! whole collection on every change, drops records that are not well-formed reviews,
//! sorts newest first and hands the list to its callback until cancelled.

use crate::{
    core::realtime::{RealtimeStore, Snapshot},
    errors::{Error, Result},
    models::Review,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Store path of a product's review collection.
#[must_use]
pub fn reviews_path(product_id: i64) -> String {
    format!("reviews/{product_id}")
}

/// Turns a raw collection into the ordered review feed.
///
/// Malformed children are skipped. Equal timestamps keep no particular order.
#[must_use]
pub fn materialize(snapshot: &Snapshot) -> Vec<Review> {
    let mut reviews: Vec<Review> = snapshot
        .iter()
        .filter_map(|(key, record)| match Review::from_record(key.as_str(), record) {
            Ok(review) => Some(review),
            Err(e) => {
                tracing::debug!("Skipping review record {}: {}", key, e);
                None
            }
        })
        .collect();
    reviews.sort_unstable_by(|a, b| b.timestamp.total_cmp(&a.timestamp));
    reviews
}

fn now_epoch_seconds() -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let millis = chrono::Utc::now().timestamp_millis() as f64;
    millis / 1000.0
}

/// Live handle on a review feed. Dropping it cancels the feed.
#[derive(Debug)]
pub struct Subscription {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Stops further deliveries. Already delivered lists are unaffected.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the feed has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels and waits for the delivery task to finish.
    pub async fn cancel_and_wait(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Review feed task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Review reads and writes over an injected [`RealtimeStore`].
#[derive(Clone)]
pub struct ReviewSync {
    store: Arc<dyn RealtimeStore>,
}

impl ReviewSync {
    /// Creates a review synchroniser over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// Appends a review stamped with the current time and waits for the store's key.
    ///
    /// # Errors
    /// Returns [`Error::InvalidReview`] for blank text, or an error if the store rejects
    /// the write.
    pub async fn submit_confirmed(&self, product_id: i64, user_name: &str, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::InvalidReview {
                reason: "Review text is empty".to_string(),
            });
        }

        let review = Review {
            id: String::new(),
            product_id,
            user_name: user_name.to_string(),
            text: text.to_string(),
            timestamp: now_epoch_seconds(),
        };
        let key = self
            .store
            .push(&reviews_path(product_id), review.to_record())
            .await?;
        tracing::info!("Review {} added to product {}", key, product_id);
        Ok(key)
    }

    /// Fire-and-forget append. Failures are logged, never returned.
    pub fn submit(&self, product_id: i64, user_name: &str, text: &str) {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring blank review for product {}", product_id);
            return;
        }

        let sync = self.clone();
        let user_name = user_name.to_string();
        let text = text.to_string();
        tokio::spawn(async move {
            if let Err(e) = sync.submit_confirmed(product_id, &user_name, &text).await {
                tracing::warn!("Failed to submit review for product {}: {}", product_id, e);
            }
        });
    }

    /// Delivers the product's current reviews, then again after every change, until the
    /// returned [`Subscription`] is cancelled or dropped.
    pub fn subscribe<F>(&self, product_id: i64, mut on_update: F) -> Subscription
    where
        F: FnMut(Vec<Review>) + Send + 'static,
    {
        let mut feed = self.store.watch(&reviews_path(product_id));
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let task = tokio::spawn(async move {
            let initial = materialize(&feed.borrow_and_update());
            if cancelled.is_cancelled() {
                return;
            }
            on_update(initial);

            loop {
                tokio::select! {
                    biased;
                    () = cancelled.cancelled() => break,
                    changed = feed.changed() => {
                        if changed.is_err() {
                            tracing::debug!("Review feed for product {} closed", product_id);
                            break;
                        }
                        let reviews = materialize(&feed.borrow_and_update());
                        if cancelled.is_cancelled() {
                            break;
                        }
                        on_update(reviews);
                    }
                }
            }
        });

        Subscription {
            token,
            task: Some(task),
        }
    }
}
