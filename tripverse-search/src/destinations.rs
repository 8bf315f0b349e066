use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tripverse_core::{DataStore, Query, StoreError};
use tripverse_shared::models::rows::{self, DestinationRow};

pub const FEATURED_COUNT: usize = 4;
pub const FEED_FAILED: &str = "Failed to load destinations";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedState {
    pub destinations: Vec<DestinationRow>,
    pub featured_destinations: Vec<DestinationRow>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            destinations: Vec::new(),
            featured_destinations: Vec::new(),
            is_loading: true,
            error: None,
        }
    }
}

/// Landing-page destination list, best rated first.
pub struct DestinationFeed {
    store: Arc<dyn DataStore>,
    state: watch::Sender<FeedState>,
}

impl DestinationFeed {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self { store, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    pub async fn load(&self) -> FeedState {
        self.state.send_modify(|s| s.is_loading = true);

        match self.fetch().await {
            Ok(destinations) => {
                tracing::info!("Loaded {} destinations", destinations.len());
                self.state.send_modify(|s| {
                    s.featured_destinations =
                        destinations.iter().take(FEATURED_COUNT).cloned().collect();
                    s.destinations = destinations;
                    s.error = None;
                    s.is_loading = false;
                });
            }
            Err(e) => {
                tracing::error!("Error fetching destinations: {}", e);
                self.state.send_modify(|s| {
                    s.destinations.clear();
                    s.featured_destinations.clear();
                    s.error = Some(FEED_FAILED.to_string());
                    s.is_loading = false;
                });
            }
        }

        self.state.borrow().clone()
    }

    async fn fetch(&self) -> Result<Vec<DestinationRow>, StoreError> {
        let query = Query::new().order("rating", false);
        self.store
            .select(rows::DESTINATIONS, &query)
            .await?
            .into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| StoreError::Decode {
                    table: rows::DESTINATIONS.to_string(),
                    message: e.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tripverse_catalog::MemoryStore;

    #[tokio::test]
    async fn test_feed_orders_by_rating_and_features_top_four() {
        let store = MemoryStore::seeded();
        store.seed(
            rows::DESTINATIONS,
            vec![json!({
                "id": "dest-5",
                "name": "Reykjavik",
                "location": "Iceland",
                "image_url": "https://img/dest-5",
                "rating": 4.1
            })],
        );
        let feed = DestinationFeed::new(Arc::new(store));
        assert!(feed.subscribe().borrow().is_loading);

        let state = feed.load().await;
        assert!(!state.is_loading);
        assert_eq!(state.destinations.len(), 5);
        assert_eq!(state.featured_destinations.len(), FEATURED_COUNT);
        assert!(state.destinations[0].rating >= state.destinations[1].rating);
        assert_eq!(state.destinations.last().unwrap().name, "Reykjavik");
        assert!(state.featured_destinations.iter().all(|d| d.name != "Reykjavik"));
    }

    #[tokio::test]
    async fn test_feed_failure() {
        let store = MemoryStore::seeded();
        store.set_fail_reads(true);
        let feed = DestinationFeed::new(Arc::new(store));
        let state = feed.load().await;
        assert_eq!(state.error.as_deref(), Some(FEED_FAILED));
        assert!(state.destinations.is_empty());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_failed_reload_drops_previous_lists() {
        let store = Arc::new(MemoryStore::seeded());
        let feed = DestinationFeed::new(store.clone());
        let loaded = feed.load().await;
        assert!(!loaded.destinations.is_empty());
        assert!(!loaded.featured_destinations.is_empty());

        store.set_fail_reads(true);
        let state = feed.load().await;
        assert_eq!(state.error.as_deref(), Some(FEED_FAILED));
        assert!(state.destinations.is_empty());
        assert!(state.featured_destinations.is_empty());
        assert_eq!(*feed.subscribe().borrow(), state);
    }
}
