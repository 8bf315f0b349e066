pub mod error;
pub mod state;

use std::sync::Arc;
use tokio::task::JoinHandle;
use tripverse_account::{NewsletterService, SessionController, SessionState};
use tripverse_search::{DestinationFeed, SearchResolver, SearchState};
use tripverse_store::Config;

pub use error::AppError;
pub use state::AppState;

/// A wired-up application: session, search, destination feed and newsletter
/// sharing one set of collaborators.
pub struct App {
    pub state: AppState,
    pub session: Arc<SessionController>,
    pub search: SearchResolver,
    pub destinations: DestinationFeed,
    pub newsletter: NewsletterService,
}

impl App {
    pub async fn bootstrap(config: &Config) -> Result<Self, AppError> {
        let state = AppState::from_config(config)?;
        Ok(Self::start(state, &config.session.storage_key).await)
    }

    /// Restore the session and issue the initial search.
    pub async fn start(state: AppState, storage_key: &str) -> Self {
        let session = SessionController::init_with_key(
            state.identity.clone(),
            state.store.clone(),
            state.storage.clone(),
            storage_key,
        )
        .await;
        let search = SearchResolver::mount(state.source.clone());
        let destinations = DestinationFeed::new(state.store.clone());
        let newsletter = NewsletterService::new(state.store.clone());

        tracing::info!("Application started in {} mode", state.mode.as_str());
        Self {
            state,
            session: Arc::new(session),
            search,
            destinations,
            newsletter,
        }
    }

    /// Log every session and search state change until the app is shut down.
    pub fn log_changes(&self) -> Vec<JoinHandle<()>> {
        let mut session = self.session.subscribe();
        let mut search = self.search.subscribe();

        let session_log = tokio::spawn(async move {
            while session.changed().await.is_ok() {
                let state: SessionState = session.borrow_and_update().clone();
                tracing::info!(
                    "Session: {:?}, user {:?}, loading {}",
                    state.status,
                    state.user.as_ref().map(|u| u.id.as_str()),
                    state.is_loading
                );
            }
        });

        let search_log = tokio::spawn(async move {
            while search.changed().await.is_ok() {
                let state: SearchState = search.borrow_and_update().clone();
                if state.is_loading {
                    continue;
                }
                match &state.error {
                    Some(error) => tracing::warn!("Search: {}", error),
                    None => tracing::info!("Search: {}", state.summary()),
                }
            }
        });

        vec![session_log, search_log]
    }

    pub async fn shutdown(self) {
        self.session.dispose().await;
        tracing::info!("Application stopped");
    }
}
