pub mod identity;
pub mod repository;
pub mod storage;
pub mod validation;

pub use identity::{
    AuthSubscription, IdentityError, IdentityProvider, MemoryIdentityProvider, SESSION_STORAGE_KEY,
};
pub use repository::{DataStore, Query, RecordSource, SourceError, StoreError};
pub use storage::{MemorySessionStorage, SessionStorage, StorageError};
pub use validation::Validate;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
