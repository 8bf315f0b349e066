use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tripverse_shared::{AuthChange, AuthSession, Identity, Masked};
use uuid::Uuid;

use crate::storage::{SessionStorage, StorageError};

/// Storage slot for the provider's session (tokens and identity).
pub const SESSION_STORAGE_KEY: &str = "tripverse-auth-token";

/// Shown when a provider error carries no message of its own.
pub const GENERIC_AUTH_ERROR: &str = "An unexpected error occurred";

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The provider refused the call; holds its message verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error("Identity provider unreachable: {0}")]
    Transport(String),

    #[error("Unexpected identity provider response: {0}")]
    Protocol(String),

    #[error("Session storage failed: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

impl IdentityError {
    /// Text to surface next to the form.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_AUTH_ERROR.to_string()
        } else {
            message
        }
    }
}

/// Receiving end of a provider's session-changed channel.
///
/// Dropping it unsubscribes.
pub struct AuthSubscription {
    receiver: broadcast::Receiver<AuthChange>,
}

impl AuthSubscription {
    pub fn new(receiver: broadcast::Receiver<AuthChange>) -> Self {
        Self { receiver }
    }

    /// Next change, or `None` once the provider is gone.
    pub async fn recv(&mut self) -> Option<AuthChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Auth subscription lagged, skipped {} changes", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current session, if any.
    async fn get_session(&self) -> Result<Option<AuthSession>, IdentityError>;

    fn on_auth_state_change(&self) -> AuthSubscription;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &Masked<String>,
    ) -> Result<AuthSession, IdentityError>;

    /// Create an account; returns the new identity.
    async fn sign_up(&self, email: &str, password: &Masked<String>) -> Result<Identity, IdentityError>;

    async fn sign_out(&self) -> Result<(), IdentityError>;
}

struct MockAccount {
    id: String,
    email: String,
    password: String,
}

/// In-process identity provider with a fixed set of demo accounts.
pub struct MemoryIdentityProvider {
    accounts: Mutex<HashMap<String, MockAccount>>,
    session: Mutex<Option<AuthSession>>,
    storage: Option<Arc<dyn SessionStorage>>,
    changes: broadcast::Sender<AuthChange>,
    unavailable: AtomicBool,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            accounts: Mutex::new(HashMap::new()),
            session: Mutex::new(None),
            storage: None,
            changes,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Seeded with the demo accounts; every password is `password`.
    pub fn with_demo_accounts() -> Self {
        let provider = Self::new();
        provider.add_account("1", "customer@example.com", "password");
        provider.add_account("2", "agent@example.com", "password");
        provider.add_account("3", "staff@example.com", "password");
        provider
    }

    /// Persist the session under [`SESSION_STORAGE_KEY`] so it outlives the process.
    pub fn with_storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn add_account(&self, id: &str, email: &str, password: &str) {
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.insert(
                email.to_lowercase(),
                MockAccount {
                    id: id.to_string(),
                    email: email.to_string(),
                    password: password.to_string(),
                },
            );
        }
    }

    /// Make every call fail as if the network were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Live subscriptions on the session-changed channel.
    pub fn listener_count(&self) -> usize {
        self.changes.receiver_count()
    }

    /// Start a session for an account without going through sign-in, as a restored session would.
    pub fn restore_session(&self, email: &str) -> Option<AuthSession> {
        let session = {
            let accounts = self.accounts.lock().ok()?;
            let account = accounts.get(&email.to_lowercase())?;
            Self::issue_session(account)
        };
        self.set_session(Some(session.clone()));
        Some(session)
    }

    fn issue_session(account: &MockAccount) -> AuthSession {
        AuthSession {
            access_token: Masked(format!("mock-{}", Uuid::new_v4())),
            refresh_token: None,
            expires_at: Some(Utc::now().timestamp() + 3600),
            user: Identity::new(account.id.clone(), Some(account.email.clone())),
        }
    }

    fn check_available(&self) -> Result<(), IdentityError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    fn set_session(&self, session: Option<AuthSession>) {
        if let Ok(mut current) = self.session.lock() {
            *current = session;
        }
    }

    fn cached_session(&self) -> Result<Option<AuthSession>, IdentityError> {
        Ok(self
            .session
            .lock()
            .map_err(|_| IdentityError::Protocol("session lock poisoned".to_string()))?
            .clone())
    }

    /// Session left in storage by an earlier process, if any.
    async fn stored_session(&self) -> Result<Option<AuthSession>, IdentityError> {
        let Some(storage) = &self.storage else {
            return Ok(None);
        };
        let Some(raw) = storage.get(SESSION_STORAGE_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<AuthSession>(&raw) {
            Ok(session) => {
                tracing::debug!("Loaded stored session for {}", session.user.id);
                self.set_session(Some(session.clone()));
                Ok(Some(session))
            }
            Err(e) => {
                let corrupt = StorageError::Corrupt {
                    key: SESSION_STORAGE_KEY.to_string(),
                    message: e.to_string(),
                };
                tracing::warn!("Discarding stored session: {}", corrupt);
                storage.remove(SESSION_STORAGE_KEY).await?;
                Ok(None)
            }
        }
    }

    async fn persist(&self, session: Option<&AuthSession>) {
        self.set_session(session.cloned());
        let Some(storage) = &self.storage else {
            return;
        };
        let result = match session {
            Some(session) => match serde_json::to_string(session) {
                Ok(json) => storage.set(SESSION_STORAGE_KEY, &json).await,
                Err(e) => {
                    tracing::warn!("Failed to encode session: {}", e);
                    return;
                }
            },
            None => storage.remove(SESSION_STORAGE_KEY).await,
        };
        if let Err(e) = result {
            tracing::warn!("Failed to persist session: {}", e);
        }
    }

    fn notify(&self, change: AuthChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn get_session(&self) -> Result<Option<AuthSession>, IdentityError> {
        self.check_available()?;
        let session = match self.cached_session()? {
            Some(session) => Some(session),
            None => self.stored_session().await?,
        };
        Ok(session.filter(|s| !s.is_expired()))
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        AuthSubscription::new(self.changes.subscribe())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &Masked<String>,
    ) -> Result<AuthSession, IdentityError> {
        self.check_available()?;
        let session = {
            let accounts = self
                .accounts
                .lock()
                .map_err(|_| IdentityError::Protocol("account lock poisoned".to_string()))?;
            match accounts.get(&email.to_lowercase()) {
                Some(account) if account.password == *password.expose() => {
                    Self::issue_session(account)
                }
                _ => return Err(IdentityError::Rejected("Invalid login credentials".to_string())),
            }
        };

        tracing::info!("Mock sign-in for {}", session.user.id);
        self.persist(Some(&session)).await;
        self.notify(AuthChange::signed_in(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &Masked<String>) -> Result<Identity, IdentityError> {
        self.check_available()?;
        let session = {
            let mut accounts = self
                .accounts
                .lock()
                .map_err(|_| IdentityError::Protocol("account lock poisoned".to_string()))?;
            let key = email.to_lowercase();
            if accounts.contains_key(&key) {
                return Err(IdentityError::Rejected("User already registered".to_string()));
            }
            let account = MockAccount {
                id: Uuid::new_v4().to_string(),
                email: email.to_string(),
                password: password.expose().clone(),
            };
            let session = Self::issue_session(&account);
            accounts.insert(key, account);
            session
        };

        tracing::info!("Mock sign-up created identity {}", session.user.id);
        let identity = session.user.clone();
        self.persist(Some(&session)).await;
        self.notify(AuthChange::signed_in(session));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.check_available()?;
        self.persist(None).await;
        self.notify(AuthChange::signed_out());
        Ok(())
    }
}
