//! Realtime database transport used by review synchronisation.
//!
//! A store exposes append-with-generated-key writes and continuous watches of a
//! collection path. Every watcher of a path sees the full collection after each change.

use crate::errors::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Children of a collection keyed by their store-generated id.
pub type Snapshot = BTreeMap<String, Value>;

/// A multi-writer realtime collection store.
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Appends `value` under `path` with a generated child key and returns the key.
    async fn push(&self, path: &str, value: Value) -> Result<String>;

    /// Watches the collection at `path`. The receiver holds the current contents and is
    /// marked changed every time the collection changes.
    fn watch(&self, path: &str) -> watch::Receiver<Snapshot>;
}

/// In-process store shared by every handle cloned from it.
#[derive(Debug, Clone, Default)]
pub struct MemoryRealtimeStore {
    collections: Arc<Mutex<HashMap<String, watch::Sender<Snapshot>>>>,
}

impl MemoryRealtimeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sender(&self, path: &str) -> Result<watch::Sender<Snapshot>> {
        let mut collections = self.collections.lock().map_err(|_| Error::Realtime {
            message: "memory store lock poisoned".to_string(),
        })?;
        Ok(collections
            .entry(path.to_string())
            .or_insert_with(|| watch::channel(Snapshot::new()).0)
            .clone())
    }

    /// Writes a child under an explicit key, replacing what was there.
    ///
    /// Used to seed data and to simulate records written by other clients.
    pub fn set(&self, path: &str, key: &str, value: Value) -> Result<()> {
        self.sender(path)?.send_modify(|children| {
            children.insert(key.to_string(), value);
        });
        Ok(())
    }

    /// Deletes a child, notifying watchers if it existed.
    pub fn remove(&self, path: &str, key: &str) -> Result<()> {
        self.sender(path)?
            .send_if_modified(|children| children.remove(key).is_some());
        Ok(())
    }
}

#[async_trait]
impl RealtimeStore for MemoryRealtimeStore {
    async fn push(&self, path: &str, value: Value) -> Result<String> {
        let key = uuid::Uuid::new_v4().simple().to_string();
        self.set(path, &key, value)?;
        Ok(key)
    }

    fn watch(&self, path: &str) -> watch::Receiver<Snapshot> {
        match self.sender(path) {
            Ok(sender) => sender.subscribe(),
            Err(e) => {
                tracing::error!("Cannot watch {}: {}", path, e);
                watch::channel(Snapshot::new()).1
            }
        }
    }
}

/// Store speaking the realtime database REST dialect.
///
/// Writes `POST <base>/<path>.json`; watches re-read `GET <base>/<path>.json` on a
/// fixed interval and publish only when the collection changed.
#[derive(Debug, Clone)]
pub struct RestRealtimeStore {
    client: Client,
    base_url: String,
    poll_interval: Duration,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

impl RestRealtimeStore {
    /// Creates a store rooted at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, poll_interval: Duration) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            poll_interval,
        })
    }

    fn collection_url(&self, path: &str) -> String {
        format!(
            "{}/{}.json",
            self.base_url.trim_end_matches('/'),
            path.trim_matches('/')
        )
    }

    async fn read(client: &Client, url: &str) -> Result<Snapshot> {
        let response = client.get(url).send().await?.error_for_status()?;
        // An empty collection reads back as `null`
        let body: Option<Snapshot> = response.json().await?;
        Ok(body.unwrap_or_default())
    }
}

#[async_trait]
impl RealtimeStore for RestRealtimeStore {
    async fn push(&self, path: &str, value: Value) -> Result<String> {
        let response = self
            .client
            .post(self.collection_url(path))
            .json(&value)
            .send()
            .await?
            .error_for_status()?;
        let created: PushResponse = response.json().await?;
        Ok(created.name)
    }

    fn watch(&self, path: &str) -> watch::Receiver<Snapshot> {
        let (tx, rx) = watch::channel(Snapshot::new());
        let client = self.client.clone();
        let url = self.collection_url(path);
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            loop {
                tokio::select! {
                    biased;
                    () = tx.closed() => {
                        tracing::debug!("Stopped polling {}", url);
                        break;
                    }
                    _ = ticker.tick() => {
                        match Self::read(&client, &url).await {
                            Ok(snapshot) => {
                                tx.send_if_modified(|current| {
                                    if *current == snapshot {
                                        false
                                    } else {
                                        *current = snapshot;
                                        true
                                    }
                                });
                            }
                            Err(e) => tracing::warn!("Polling {} failed: {}", url, e),
                        }
                    }
                }
            }
        });

        rx
    }
}
