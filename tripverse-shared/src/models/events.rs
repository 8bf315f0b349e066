use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::pii::Masked;

/// Raw identity as issued by the identity provider, before profile reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, email: Option<String>) -> Self {
        Self { id: id.into(), email }
    }
}

/// A live session held by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub access_token: Masked<String>,
    #[serde(default)]
    pub refresh_token: Option<Masked<String>>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: Identity,
}

impl AuthSession {
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|at| at <= Utc::now().timestamp())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// Notification sent on the provider's session-changed channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<AuthSession>,
}

impl AuthChange {
    pub fn signed_in(session: AuthSession) -> Self {
        Self {
            event: AuthEvent::SignedIn,
            session: Some(session),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            event: AuthEvent::SignedOut,
            session: None,
        }
    }
}
