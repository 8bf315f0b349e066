use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tripverse_core::{RecordSource, SourceError};
use tripverse_shared::{SearchResult, SearchType};

use crate::fixtures;

/// Record source over fixed in-memory pools.
pub struct InMemorySource {
    pools: HashMap<SearchType, Vec<SearchResult>>,
    latency: Duration,
    unavailable: AtomicBool,
}

impl InMemorySource {
    /// Demo pools from [`fixtures`].
    pub fn new() -> Self {
        let pools = SearchType::ALL
            .into_iter()
            .map(|search_type| (search_type, fixtures::pool(search_type)))
            .collect();
        Self::with_pools(pools)
    }

    pub fn with_pools(pools: HashMap<SearchType, Vec<SearchResult>>) -> Self {
        Self {
            pools,
            latency: Duration::ZERO,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Group arbitrary results into pools by their kind, keeping their order.
    pub fn from_results(results: Vec<SearchResult>) -> Self {
        let mut pools: HashMap<SearchType, Vec<SearchResult>> = HashMap::new();
        for result in results {
            let search_type = SearchType::ALL
                .into_iter()
                .find(|t| t.result_kind() == result.kind)
                .unwrap_or(SearchType::Destinations);
            pools.entry(search_type).or_default().push(result);
        }
        Self::with_pools(pools)
    }

    /// Delay every fetch, as a slow network would.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl Default for InMemorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordSource for InMemorySource {
    async fn fetch_pool(&self, search_type: SearchType) -> Result<Vec<SearchResult>, SourceError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable(format!(
                "{} pool could not be loaded",
                search_type
            )));
        }
        let pool = self.pools.get(&search_type).cloned().unwrap_or_default();
        tracing::debug!("Serving {} {} from memory", pool.len(), search_type);
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripverse_shared::ResultKind;

    #[tokio::test]
    async fn test_demo_union_has_every_fixture() {
        let source = InMemorySource::new();
        let all = source.fetch_candidates(None).await.unwrap();
        assert_eq!(all.len(), 3 + 2 + 2 + 4 + 2);
        assert_eq!(all[0].id, "hotel-1");
        assert_eq!(all.last().unwrap().id, "guide-2");
    }

    #[tokio::test]
    async fn test_from_results_groups_by_kind() {
        let source = InMemorySource::from_results(vec![
            SearchResult::new("h-1", ResultKind::Hotel, "A"),
            SearchResult::new("g-1", ResultKind::Guide, "B"),
            SearchResult::new("h-2", ResultKind::Hotel, "C"),
        ]);
        let hotels = source.fetch_pool(SearchType::Hotels).await.unwrap();
        assert_eq!(hotels.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), vec!["h-1", "h-2"]);
        assert!(source.fetch_pool(SearchType::Flights).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_source_errors() {
        let source = InMemorySource::new();
        source.set_unavailable(true);
        assert!(source.fetch_candidates(None).await.is_err());
    }
}
