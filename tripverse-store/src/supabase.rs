//! Client for the hosted backend: PostgREST tables under `/rest/v1` and the
//! GoTrue auth API under `/auth/v1`.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use tripverse_core::{
    AuthSubscription, DataStore, IdentityError, IdentityProvider, Query, SessionStorage, StoreError,
};
use tripverse_shared::{AuthChange, AuthEvent, AuthSession, Identity, Masked};

pub use tripverse_core::SESSION_STORAGE_KEY;

/// Keys an error body may carry its message under, most specific first.
const ERROR_MESSAGE_KEYS: [&str; 4] = ["error_description", "msg", "message", "error"];

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl From<UserResponse> for Identity {
    fn from(user: UserResponse) -> Self {
        Identity::new(user.id, user.email)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: UserResponse,
}

impl TokenResponse {
    fn into_session(self) -> AuthSession {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| Utc::now().timestamp() + secs));
        AuthSession {
            access_token: Masked(self.access_token),
            refresh_token: self.refresh_token.map(Masked),
            expires_at,
            user: self.user.into(),
        }
    }
}

/// Sign-up answers with a session when confirmation is off, otherwise with the bare user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignupResponse {
    Session(TokenResponse),
    User(UserResponse),
}

/// Pull the most specific message out of an error body, if any.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ERROR_MESSAGE_KEYS
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    for (column, value) in &query.filters {
        let literal = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        params.push((column.clone(), format!("eq.{}", literal)));
    }
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: Masked<String>,
    storage: Arc<dyn SessionStorage>,
    session: RwLock<Option<AuthSession>>,
    changes: broadcast::Sender<AuthChange>,
}

impl SupabaseClient {
    pub fn new(
        base_url: &str,
        anon_key: &str,
        timeout: Duration,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        let (changes, _) = broadcast::channel(16);

        info!("Backend client for {}", base_url);
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: Masked::from(anon_key),
            storage,
            session: RwLock::new(None),
            changes,
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Attach the project key and a bearer token (the session's, or the anon key).
    fn authorize(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let bearer = token.unwrap_or_else(|| self.anon_key.expose().as_str());
        request
            .header("apikey", self.anon_key.expose().as_str())
            .header("Authorization", format!("Bearer {}", bearer))
    }

    async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.expose().clone())
    }

    fn notify(&self, event: AuthEvent, session: Option<AuthSession>) {
        // No subscribers is fine.
        let _ = self.changes.send(AuthChange { event, session });
    }

    async fn store_session(&self, session: &AuthSession) {
        *self.session.write().await = Some(session.clone());
        match serde_json::to_string(session) {
            Ok(json) => {
                if let Err(e) = self.storage.set(SESSION_STORAGE_KEY, &json).await {
                    warn!("Failed to persist backend session: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode backend session: {}", e),
        }
    }

    async fn clear_session(&self) {
        *self.session.write().await = None;
        if let Err(e) = self.storage.remove(SESSION_STORAGE_KEY).await {
            warn!("Failed to clear backend session: {}", e);
        }
    }

    /// Session held in memory, falling back to the storage slot.
    async fn current_session(&self) -> Result<Option<AuthSession>, IdentityError> {
        if let Some(session) = self.session.read().await.clone() {
            return Ok(Some(session));
        }

        let Some(raw) = self.storage.get(SESSION_STORAGE_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<AuthSession>(&raw) {
            Ok(session) => {
                debug!("Loaded stored session for {}", session.user.id);
                *self.session.write().await = Some(session.clone());
                Ok(Some(session))
            }
            Err(e) => {
                warn!("Discarding unreadable stored session: {}", e);
                self.clear_session().await;
                Ok(None)
            }
        }
    }

    async fn auth_post(&self, path: &str, token: Option<&str>, body: &Value) -> Result<Response, IdentityError> {
        let response = self
            .authorize(self.client.post(self.auth_url(path)), token)
            .json(body)
            .send()
            .await
            .map_err(|e| IdentityError::Transport(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = error_message(&text).unwrap_or_default();
        debug!("Auth call {} rejected with {}: {}", path, status, message);
        Err(IdentityError::Rejected(message))
    }

    async fn read_token(response: Response) -> Result<AuthSession, IdentityError> {
        response
            .json::<TokenResponse>()
            .await
            .map(TokenResponse::into_session)
            .map_err(|e| IdentityError::Protocol(e.to_string()))
    }

    async fn refresh(&self, refresh_token: &Masked<String>) -> Result<AuthSession, IdentityError> {
        let response = self
            .auth_post(
                "token?grant_type=refresh_token",
                None,
                &json!({ "refresh_token": refresh_token.expose() }),
            )
            .await?;
        let session = Self::read_token(response).await?;
        info!("Refreshed session for {}", session.user.id);
        self.store_session(&session).await;
        self.notify(AuthEvent::TokenRefreshed, Some(session.clone()));
        Ok(session)
    }

    /// Drop an unusable session and tell subscribers.
    async fn expire(&self) {
        self.clear_session().await;
        self.notify(AuthEvent::SignedOut, None);
    }

    async fn rest_error(response: Response, table: &str) -> StoreError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        let message = error_message(&text).unwrap_or(text);
        if status == 409 {
            return StoreError::Conflict(table.to_string());
        }
        StoreError::Remote { status, message }
    }
}

#[async_trait]
impl DataStore for SupabaseClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let token = self.access_token().await;
        let response = self
            .authorize(self.client.get(self.rest_url(table)), token.as_deref())
            .query(&query_params(query))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rest_error(response, table).await);
        }

        response.json::<Vec<Value>>().await.map_err(|e| StoreError::Decode {
            table: table.to_string(),
            message: e.to_string(),
        })
    }

    async fn insert(&self, table: &str, row: Value) -> Result<(), StoreError> {
        let token = self.access_token().await;
        let response = self
            .authorize(self.client.post(self.rest_url(table)), token.as_deref())
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rest_error(response, table).await);
        }
        debug!("Inserted row into {}", table);
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn get_session(&self) -> Result<Option<AuthSession>, IdentityError> {
        let Some(session) = self.current_session().await? else {
            return Ok(None);
        };
        if !session.is_expired() {
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.clone() else {
            info!("Stored session for {} expired without a refresh token", session.user.id);
            self.expire().await;
            return Ok(None);
        };

        match self.refresh(&refresh_token).await {
            Ok(session) => Ok(Some(session)),
            Err(IdentityError::Rejected(message)) => {
                warn!("Session refresh rejected: {}", message);
                self.expire().await;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn on_auth_state_change(&self) -> AuthSubscription {
        AuthSubscription::new(self.changes.subscribe())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &Masked<String>,
    ) -> Result<AuthSession, IdentityError> {
        let response = self
            .auth_post(
                "token?grant_type=password",
                None,
                &json!({ "email": email, "password": password.expose() }),
            )
            .await?;
        let session = Self::read_token(response).await?;

        info!("Signed in {}", session.user.id);
        self.store_session(&session).await;
        self.notify(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &Masked<String>) -> Result<Identity, IdentityError> {
        let response = self
            .auth_post(
                "signup",
                None,
                &json!({ "email": email, "password": password.expose() }),
            )
            .await?;
        let created = response
            .json::<SignupResponse>()
            .await
            .map_err(|e| IdentityError::Protocol(e.to_string()))?;

        match created {
            SignupResponse::Session(token) => {
                let session = token.into_session();
                info!("Signed up {} with a live session", session.user.id);
                self.store_session(&session).await;
                self.notify(AuthEvent::SignedIn, Some(session.clone()));
                Ok(session.user)
            }
            SignupResponse::User(user) => {
                info!("Signed up {}, awaiting confirmation", user.id);
                Ok(user.into())
            }
        }
    }

    /// Ends the session locally even when the backend cannot be told.
    async fn sign_out(&self) -> Result<(), IdentityError> {
        if let Some(token) = self.access_token().await {
            if let Err(e) = self.auth_post("logout", Some(token.as_str()), &json!({})).await {
                warn!("Backend logout failed, clearing local session anyway: {}", e);
            }
        }
        self.expire().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_precedence() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(error_message(body).as_deref(), Some("Invalid login credentials"));
        assert_eq!(
            error_message(r#"{"msg":"User already registered","code":422}"#).as_deref(),
            Some("User already registered")
        );
        assert_eq!(error_message("<html>bad gateway</html>"), None);
        assert_eq!(error_message(r#"{"code":500}"#), None);
    }

    #[test]
    fn test_query_params() {
        let query = Query::new().eq("id", "1").eq("rank", 3).order("rating", false).limit(4);
        let params = query_params(&query);
        let expected: Vec<(String, String)> = [
            ("select", "*"),
            ("id", "eq.1"),
            ("rank", "eq.3"),
            ("order", "rating.desc"),
            ("limit", "4"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(params, expected);
    }

    #[test]
    fn test_token_response_expiry_from_expires_in() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "user": {"id": "u-1", "email": "a@b.com"}
        }))
        .unwrap();
        let session = token.into_session();
        assert!(!session.is_expired());
        assert_eq!(session.user, Identity::new("u-1", Some("a@b.com".to_string())));
        assert_eq!(session.refresh_token.unwrap().expose(), "r");
    }

    #[test]
    fn test_signup_response_shapes() {
        let bare: SignupResponse =
            serde_json::from_value(json!({"id": "u-2", "email": "n@b.com", "aud": "authenticated"}))
                .unwrap();
        assert!(matches!(bare, SignupResponse::User(ref u) if u.id == "u-2"));

        let live: SignupResponse = serde_json::from_value(json!({
            "access_token": "a",
            "user": {"id": "u-3"}
        }))
        .unwrap();
        assert!(matches!(live, SignupResponse::Session(_)));
    }
}
