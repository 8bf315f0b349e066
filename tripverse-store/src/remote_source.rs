use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;
use tripverse_core::{DataStore, Query, RecordSource, SourceError, StoreError};
use tripverse_shared::models::rows::{self, DestinationRow, FlightRow, HotelRow, PackageRow};
use tripverse_shared::{SearchResult, SearchType};

/// Candidate pools read from the backend tables and mapped to results.
///
/// There is no guides table, so the guides pool is always empty.
pub struct RemoteSource {
    store: Arc<dyn DataStore>,
}

impl RemoteSource {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    async fn load<R>(&self, table: &str) -> Result<Vec<SearchResult>, SourceError>
    where
        R: DeserializeOwned + Into<SearchResult>,
    {
        let raw = self.store.select(table, &Query::new()).await?;
        let results = raw
            .into_iter()
            .map(|row| {
                serde_json::from_value::<R>(row)
                    .map(Into::into)
                    .map_err(|e| StoreError::Decode {
                        table: table.to_string(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!("Loaded {} rows from {}", results.len(), table);
        Ok(results)
    }
}

#[async_trait]
impl RecordSource for RemoteSource {
    async fn fetch_pool(&self, search_type: SearchType) -> Result<Vec<SearchResult>, SourceError> {
        match search_type {
            SearchType::Hotels => self.load::<HotelRow>(rows::HOTELS).await,
            SearchType::Flights => self.load::<FlightRow>(rows::FLIGHTS).await,
            SearchType::Packages => self.load::<PackageRow>(rows::PACKAGES).await,
            SearchType::Destinations => self.load::<DestinationRow>(rows::DESTINATIONS).await,
            SearchType::Guides => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tripverse_catalog::MemoryStore;
    use tripverse_shared::ResultKind;

    fn store_with_hotels() -> MemoryStore {
        let store = MemoryStore::seeded();
        store.seed(
            rows::HOTELS,
            vec![json!({
                "id": "h-1",
                "name": "Harbour View",
                "location": "Sydney, Australia",
                "image_url": "https://img/h-1",
                "description": "On the water",
                "price_per_night": 310.0,
                "rating": 4.6,
                "amenities": ["Pool", "Gym"]
            })],
        );
        store
    }

    #[tokio::test]
    async fn test_hotel_rows_become_results() {
        let source = RemoteSource::new(Arc::new(store_with_hotels()));
        let hotels = source.fetch_pool(SearchType::Hotels).await.unwrap();
        assert_eq!(hotels.len(), 1);
        assert_eq!(hotels[0].kind, ResultKind::Hotel);
        assert_eq!(hotels[0].price, Some(310.0));
        assert_eq!(hotels[0].amenities, vec!["Pool", "Gym"]);
    }

    #[tokio::test]
    async fn test_union_keeps_pool_order() {
        let source = RemoteSource::new(Arc::new(store_with_hotels()));
        let all = source.fetch_candidates(None).await.unwrap();
        // One hotel, then the four seeded destinations; no flights, packages or guides.
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].kind, ResultKind::Hotel);
        assert!(all[1..].iter().all(|r| r.kind == ResultKind::Destination));
        assert!(source.fetch_pool(SearchType::Guides).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_row_fails_the_pool() {
        let store = MemoryStore::new();
        store.seed(rows::FLIGHTS, vec![json!({"id": "f-1"})]);
        let source = RemoteSource::new(Arc::new(store));
        let err = source.fetch_pool(SearchType::Flights).await.unwrap_err();
        assert!(matches!(err, SourceError::Store(StoreError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = store_with_hotels();
        store.set_fail_reads(true);
        let source = RemoteSource::new(Arc::new(store));
        assert!(source.fetch_candidates(Some(SearchType::Hotels)).await.is_err());
    }
}
