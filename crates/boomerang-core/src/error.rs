use thiserror::Error;

/// Result type for core conversions.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid url id: {0}")]
    InvalidId(String),
}

/// Errors raised by a [`Registry`](crate::Registry) backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("expiration must be in the future: {0}")]
    InvalidExpiration(String),
    #[error("registry backend unavailable: {0}")]
    Unavailable(String),
    #[error("registry operation timed out: {0}")]
    Timeout(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

impl RegistryError {
    /// Whether the operation may succeed if attempted again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid expiration: {0}")]
    InvalidExpiration(String),
    #[error("no free url id left in a namespace of {capacity}")]
    Exhausted { capacity: u64 },
    #[error("registry unavailable after {attempts} attempts: {source}")]
    Unavailable {
        attempts: u32,
        #[source]
        source: RegistryError,
    },
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RegistryError> for ShortenerError {
    fn from(value: RegistryError) -> Self {
        match value {
            RegistryError::InvalidExpiration(message) => Self::InvalidExpiration(message),
            source @ (RegistryError::Unavailable(_) | RegistryError::Timeout(_)) => {
                Self::Unavailable {
                    attempts: 1,
                    source,
                }
            }
            other => Self::Storage(other.to_string()),
        }
    }
}
