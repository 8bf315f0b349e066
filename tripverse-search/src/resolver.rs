use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tripverse_core::{RecordSource, SourceError};
use tripverse_shared::{SearchRequest, SearchResult};

use crate::filter::apply_filters;

/// Surfaced in place of results when the candidate set cannot be resolved.
pub const SEARCH_FAILED: &str = "An error occurred while searching. Please try again.";

/// What observers of a resolver see.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub results: Vec<SearchResult>,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Last request submitted through [`SearchResolver::search`].
    pub search_options: SearchRequest,
}

impl SearchState {
    /// e.g. "Found 2 hotels matching your criteria".
    pub fn summary(&self) -> String {
        let noun = self
            .search_options
            .search_type
            .map(|t| t.as_str())
            .unwrap_or("items");
        format!("Found {} {} matching your criteria", self.results.len(), noun)
    }
}

struct Shared {
    state: watch::Sender<SearchState>,
    latest: AtomicU64,
}

impl Shared {
    /// Open a new request and return its id. Every earlier request becomes stale.
    fn begin(&self, request: &SearchRequest, record: bool) -> u64 {
        let mut id = 0;
        self.state.send_modify(|state| {
            id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            state.is_loading = true;
            state.error = None;
            if record {
                state.search_options = request.clone();
            }
        });
        id
    }

    fn finish(&self, id: u64, outcome: Result<Vec<SearchResult>, SourceError>) {
        let applied = self.state.send_if_modified(|state| {
            if self.latest.load(Ordering::SeqCst) != id {
                return false;
            }
            match &outcome {
                Ok(results) => {
                    state.results = results.clone();
                    state.error = None;
                }
                Err(_) => {
                    state.results.clear();
                    state.error = Some(SEARCH_FAILED.to_string());
                }
            }
            state.is_loading = false;
            true
        });

        match (applied, outcome) {
            (false, _) => debug!("Discarding stale search #{}", id),
            (true, Ok(results)) => info!("Search #{} resolved {} results", id, results.len()),
            (true, Err(e)) => warn!("Search #{} failed: {}", id, e),
        }
    }
}

/// Resolve and filter the candidate set for one request.
pub async fn resolve(
    source: &dyn RecordSource,
    request: &SearchRequest,
) -> Result<Vec<SearchResult>, SourceError> {
    let candidates = source.fetch_candidates(request.search_type).await?;
    Ok(apply_filters(candidates, request))
}

/// Turns search requests into an observable result list.
///
/// Each request gets an increasing id; only the latest one may write state,
/// so a slow early request never overwrites a later one. Completions that
/// arrive after the resolver is dropped are ignored.
pub struct SearchResolver {
    source: Arc<dyn RecordSource>,
    shared: Arc<Shared>,
}

impl SearchResolver {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            source,
            shared: Arc::new(Shared {
                state,
                latest: AtomicU64::new(0),
            }),
        }
    }

    /// Create a resolver and issue the initial unfiltered search.
    ///
    /// Must be called within a tokio runtime.
    pub fn mount(source: Arc<dyn RecordSource>) -> Self {
        let resolver = Self::new(source);
        resolver.dispatch(SearchRequest::default(), false);
        resolver
    }

    /// Submit a request. The returned handle may be awaited or dropped.
    pub fn search(&self, request: SearchRequest) -> JoinHandle<()> {
        self.dispatch(request, true)
    }

    fn dispatch(&self, request: SearchRequest, record: bool) -> JoinHandle<()> {
        let id = self.shared.begin(&request, record);
        debug!("Search #{} started: {:?}", id, request);

        let source = Arc::clone(&self.source);
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        tokio::spawn(async move {
            let outcome = resolve(source.as_ref(), &request).await;
            match shared.upgrade() {
                Some(shared) => shared.finish(id, outcome),
                None => debug!("Search #{} completed after resolver was dropped", id),
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.shared.state.borrow().clone()
    }

    /// Wait until no request is loading and return that state.
    pub async fn settled(&self) -> SearchState {
        let mut receiver = self.subscribe();
        let settled = match receiver.wait_for(|state| !state.is_loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }
}
