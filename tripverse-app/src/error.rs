use tripverse_core::{StorageError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Backend client setup failed: {0}")]
    Backend(#[from] StoreError),

    #[error("Session storage setup failed: {0}")]
    Storage(#[from] StorageError),
}
