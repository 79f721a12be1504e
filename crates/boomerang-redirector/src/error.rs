use boomerang_core::{CoreError, RegistryError, UrlId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedirectorError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RedirectorError {
    #[error("url id is malformed: {0}")]
    MalformedId(String),
    #[error("url id not found: {0}")]
    NotFound(UrlId),
    #[error("registry operation failed: {0}")]
    Storage(
        #[from]
        #[source]
        RegistryError,
    ),
}

impl From<CoreError> for RedirectorError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::InvalidId(message) => RedirectorError::MalformedId(message),
        }
    }
}
