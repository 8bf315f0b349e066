pub mod newsletter;
pub mod session;

pub use newsletter::{NewsletterService, SubscribeOutcome};
pub use session::{SessionController, SessionState, SessionStatus, DEFAULT_STORAGE_KEY};
