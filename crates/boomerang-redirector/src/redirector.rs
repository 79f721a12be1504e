use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves the id segment of a short URL to its target URL.
    ///
    /// Fails with [`RedirectorError::NotFound`](crate::RedirectorError::NotFound)
    /// if the id does not exist, was deleted or has expired.
    async fn resolve(&self, raw_id: &str) -> Result<String>;
}
