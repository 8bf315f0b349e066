use chrono::Utc;
use serde::Serialize;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tripverse_core::{
    AuthSubscription, DataStore, IdentityProvider, Query, SessionStorage, StorageError,
};
use tripverse_shared::models::rows::{self, UserProfileRow};
use tripverse_shared::{AuthUser, Identity, Masked, SignupData};

/// Storage slot holding the signed-in user between runs.
pub const DEFAULT_STORAGE_KEY: &str = "tripverse_user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum SessionStatus {
    Restoring,
    Unauthenticated,
    Authenticated,
    AuthenticationFailed(String),
}

/// What observers of a session controller see.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub status: SessionStatus,
    pub user: Option<AuthUser>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            status: SessionStatus::Restoring,
            user: None,
            is_loading: true,
            error: None,
        }
    }
}

struct Inner {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn DataStore>,
    storage: Arc<dyn SessionStorage>,
    storage_key: String,
    state: watch::Sender<SessionState>,
    /// Serializes reconciliations so the last profile fetched is the last one applied.
    sync_lock: tokio::sync::Mutex<()>,
}

impl Inner {
    async fn restore(&self) {
        match self.provider.get_session().await {
            Ok(Some(session)) => {
                info!("Restoring session for {}", session.user.id);
                self.sync_user_data(&session.user).await;
            }
            Ok(None) => {
                debug!("No existing session");
                self.clear_user().await;
            }
            Err(e) => {
                warn!("Session query failed, continuing signed out: {}", e);
                self.clear_user().await;
            }
        }

        self.state.send_modify(|s| {
            if s.status == SessionStatus::Restoring {
                s.status = SessionStatus::Unauthenticated;
            }
            s.is_loading = false;
        });
    }

    async fn sync_user_data(&self, identity: &Identity) {
        let _guard = self.sync_lock.lock().await;
        let query = Query::new().eq("id", identity.id.clone()).limit(1);

        let rows = match self.store.select(rows::USERS, &query).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Profile fetch for {} failed, keeping current user: {}", identity.id, e);
                return;
            }
        };

        let user = match rows.into_iter().next() {
            Some(row) => match serde_json::from_value::<UserProfileRow>(row) {
                Ok(profile) => AuthUser::merge(identity, profile),
                Err(e) => {
                    warn!("Malformed profile for {}, using defaults: {}", identity.id, e);
                    AuthUser::from_identity(identity)
                }
            },
            None => {
                info!("No profile for {}, using customer defaults", identity.id);
                AuthUser::from_identity(identity)
            }
        };

        self.set_user(user).await;
    }

    async fn set_user(&self, user: AuthUser) {
        match serde_json::to_string(&user) {
            Ok(json) => {
                if let Err(e) = self.storage.set(&self.storage_key, &json).await {
                    warn!("Failed to persist user {}: {}", user.id, e);
                }
            }
            Err(e) => warn!("Failed to encode user {}: {}", user.id, e),
        }

        info!("Authenticated as {} ({})", user.id, user.role.as_str());
        self.state.send_modify(|s| {
            s.user = Some(user);
            s.status = SessionStatus::Authenticated;
        });
    }

    async fn clear_user(&self) {
        if let Err(e) = self.storage.remove(&self.storage_key).await {
            warn!("Failed to clear persisted user: {}", e);
        }
        self.state.send_modify(|s| {
            s.user = None;
            s.status = SessionStatus::Unauthenticated;
        });
    }

    fn begin_operation(&self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
    }

    fn fail_operation(&self, message: String) {
        self.state.send_modify(|s| {
            if s.user.is_none() {
                s.status = SessionStatus::AuthenticationFailed(message.clone());
            }
            s.error = Some(message);
        });
    }

    fn end_operation(&self) {
        self.state.send_modify(|s| s.is_loading = false);
    }
}

async fn listen(inner: Weak<Inner>, mut subscription: AuthSubscription) {
    while let Some(change) = subscription.recv().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        debug!("Auth state changed: {:?}", change.event);
        match change.session {
            Some(session) => inner.sync_user_data(&session.user).await,
            None => inner.clear_user().await,
        }
    }
    debug!("Auth subscription ended");
}

/// Owns the signed-in user: restores it at startup, follows the provider's
/// session changes, and runs login, signup and logout.
///
/// Remote failures land in [`SessionState::error`]; no operation returns one.
pub struct SessionController {
    inner: Arc<Inner>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionController {
    pub async fn init(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn DataStore>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        Self::init_with_key(provider, store, storage, DEFAULT_STORAGE_KEY).await
    }

    pub async fn init_with_key(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn DataStore>,
        storage: Arc<dyn SessionStorage>,
        storage_key: &str,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let inner = Arc::new(Inner {
            provider,
            store,
            storage,
            storage_key: storage_key.to_string(),
            state,
            sync_lock: tokio::sync::Mutex::new(()),
        });

        // Subscribe before querying so a change racing the query is not missed.
        let subscription = inner.provider.on_auth_state_change();
        let listener = tokio::spawn(listen(Arc::downgrade(&inner), subscription));

        inner.restore().await;

        Self {
            inner,
            listener: Mutex::new(Some(listener)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.inner.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    /// User left in the storage slot by a previous run.
    pub async fn persisted_user(&self) -> Result<Option<AuthUser>, StorageError> {
        let key = &self.inner.storage_key;
        let Some(raw) = self.inner.storage.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Corrupt {
                key: key.clone(),
                message: e.to_string(),
            })
    }

    /// Merge an identity with its profile row into the current user.
    pub async fn sync_user_data(&self, identity: &Identity) {
        self.inner.sync_user_data(identity).await;
    }

    /// Password sign-in. The session itself arrives through the change subscription.
    pub async fn login(&self, email: &str, password: &Masked<String>) {
        self.inner.begin_operation();

        match self
            .inner
            .provider
            .sign_in_with_password(email, password)
            .await
        {
            Ok(session) => info!("Signed in {}", session.user.id),
            Err(e) => {
                warn!("Login failed for {}: {}", email, e);
                self.inner.fail_operation(e.user_message());
            }
        }

        self.inner.end_operation();
    }

    /// Create an account, then its `users` profile row.
    ///
    /// If the profile insert fails the new identity is signed out again and the
    /// insert error is surfaced; the identity itself stays with the provider.
    pub async fn signup(&self, data: SignupData) {
        self.inner.begin_operation();

        if let Err(message) = self.try_signup(&data).await {
            self.inner.fail_operation(message);
        }

        self.inner.end_operation();
    }

    async fn try_signup(&self, data: &SignupData) -> Result<(), String> {
        let identity = match self.inner.provider.sign_up(&data.email, &data.password).await {
            Ok(identity) => identity,
            Err(e) => {
                warn!("Sign-up failed for {}: {}", data.email, e);
                return Err(e.user_message());
            }
        };

        let now = Utc::now();
        let profile = UserProfileRow {
            id: identity.id.clone(),
            email: data.email.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            role: data.role,
            avatar_url: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        let row = serde_json::to_value(&profile).map_err(|e| e.to_string())?;

        if let Err(e) = self.inner.store.insert(rows::USERS, row).await {
            warn!(
                "Profile insert failed for new identity {}, signing it out: {}",
                identity.id, e
            );
            if let Err(sign_out) = self.inner.provider.sign_out().await {
                warn!("Sign-out after failed profile insert also failed: {}", sign_out);
            }
            return Err(e.to_string());
        }

        info!("Created account {} as {}", identity.id, data.role.as_str());
        self.inner.sync_user_data(&identity).await;
        Ok(())
    }

    /// Best-effort sign-out; failures are logged, not surfaced.
    pub async fn logout(&self) {
        self.inner.state.send_modify(|s| s.is_loading = true);

        match self.inner.provider.sign_out().await {
            Ok(()) => {
                info!("Signed out");
                self.inner.clear_user().await;
            }
            Err(e) => warn!("Logout failed: {}", e),
        }

        self.inner.end_operation();
    }

    /// Release the session-change subscription. Later calls do nothing.
    pub async fn dispose(&self) {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(listener) = listener {
            listener.abort();
            let _ = listener.await;
            info!("Session subscription released");
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        let listener = self
            .listener
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(listener) = listener.take() {
            listener.abort();
        }
    }
}
