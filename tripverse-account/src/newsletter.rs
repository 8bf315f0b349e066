use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use tripverse_core::validation::is_valid_email;
use tripverse_core::{DataStore, Query, StoreError};
use tripverse_shared::models::rows::{self, NewsletterSubscriberRow};

const SUBSCRIBE_FAILED: &str = "We couldn't process your subscription. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
    Invalid,
    Failed(String),
}

impl SubscribeOutcome {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Subscribed => "Subscription successful!",
            Self::AlreadySubscribed => "Already subscribed",
            Self::Invalid => "Invalid email",
            Self::Failed(_) => "Subscription failed",
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Subscribed => "You've been subscribed to our newsletter.",
            Self::AlreadySubscribed => "This email is already subscribed to our newsletter.",
            Self::Invalid => "Please enter a valid email address.",
            Self::Failed(message) => message,
        }
    }
}

pub struct NewsletterService {
    store: Arc<dyn DataStore>,
    submitting: watch::Sender<bool>,
}

impl NewsletterService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        let (submitting, _) = watch::channel(false);
        Self { store, submitting }
    }

    /// Observe whether a subscription call is running.
    pub fn is_submitting(&self) -> watch::Receiver<bool> {
        self.submitting.subscribe()
    }

    pub async fn subscribe(&self, email: &str) -> SubscribeOutcome {
        let email = email.trim();
        if !is_valid_email(email) {
            return SubscribeOutcome::Invalid;
        }

        self.submitting.send_replace(true);
        let outcome = self.try_subscribe(email).await;
        self.submitting.send_replace(false);
        outcome
    }

    async fn try_subscribe(&self, email: &str) -> SubscribeOutcome {
        let existing = Query::new().eq("email", email).limit(1);
        match self.store.select(rows::NEWSLETTER_SUBSCRIBERS, &existing).await {
            Ok(found) if !found.is_empty() => {
                tracing::debug!("{} is already subscribed", email);
                return SubscribeOutcome::AlreadySubscribed;
            }
            Ok(_) => {}
            // The insert below still catches duplicates.
            Err(e) => tracing::warn!("Subscriber lookup failed: {}", e),
        }

        let row = NewsletterSubscriberRow {
            id: None,
            email: email.to_string(),
            subscribed_at: Utc::now(),
        };
        let row = match serde_json::to_value(&row) {
            Ok(row) => row,
            Err(e) => {
                tracing::error!("Failed to encode subscriber row: {}", e);
                return SubscribeOutcome::Failed(SUBSCRIBE_FAILED.to_string());
            }
        };

        match self.store.insert(rows::NEWSLETTER_SUBSCRIBERS, row).await {
            Ok(()) => {
                tracing::info!("New newsletter subscriber");
                SubscribeOutcome::Subscribed
            }
            Err(StoreError::Conflict(_)) => SubscribeOutcome::AlreadySubscribed,
            Err(e) => {
                tracing::error!("Error subscribing to newsletter: {}", e);
                SubscribeOutcome::Failed(SUBSCRIBE_FAILED.to_string())
            }
        }
    }
}
