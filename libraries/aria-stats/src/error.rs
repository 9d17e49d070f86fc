//! Stats-specific errors
use thiserror::Error;

/// Result type alias using `StatsError`
pub type Result<T> = std::result::Result<T, StatsError>;

/// Stats error types
#[derive(Error, Debug)]
pub enum StatsError {
    /// Backing store rejected a read or write
    #[error("Store error: {0}")]
    Store(String),

    /// Value could not be encoded for storage
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// I/O error from a file-backed store
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StatsError {
    /// Create a store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

impl From<StatsError> for aria_core::AriaError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::Serialization(e) => aria_core::AriaError::Serialization(e),
            other => aria_core::AriaError::storage(other.to_string()),
        }
    }
}
