use boomerang_core::ShortenerError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PoolError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("all {capacity} url ids are in use")]
    Exhausted { capacity: u64 },
    #[error("invalid pool state: {0}")]
    InvalidState(String),
}

impl From<PoolError> for ShortenerError {
    fn from(value: PoolError) -> Self {
        match value {
            PoolError::Exhausted { capacity } => Self::Exhausted { capacity },
            other => Self::Storage(other.to_string()),
        }
    }
}
