use std::sync::Arc;

use crate::error::RedirectorError;
use crate::redirector::Redirector;
use async_trait::async_trait;
use boomerang_core::{ReadRegistry, UrlId};
use jiff::Timestamp;
use tracing::{debug, trace};

/// Service for handling URL redirects.
///
/// Uses a read-only registry to fetch URL records and handles expiration checks.
#[derive(Debug)]
pub struct RedirectorService<R> {
    registry: Arc<R>,
}

impl<R> Clone for RedirectorService<R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<R: ReadRegistry> RedirectorService<R> {
    /// Creates a new RedirectorService with the given registry.
    pub fn new(registry: R) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    /// Creates a RedirectorService reading from a registry shared with the
    /// shortener.
    pub fn from_shared(registry: Arc<R>) -> Self {
        Self { registry }
    }

    /// Resolves a parsed id to its original URL.
    ///
    /// # Returns
    ///
    /// * `Ok(url)` - The original URL if found and not expired
    /// * `Err(NotFound)` - If the id doesn't exist or has expired
    /// * `Err(Storage)` - If there was an error accessing the registry
    pub async fn resolve_id(&self, id: UrlId) -> crate::Result<String> {
        trace!(id = %id, "resolving url id");

        match self.registry.get(id).await? {
            Some(record) => {
                // The registry already filters expired records; re-check so a
                // backend with a looser clock still never redirects late.
                if record.is_expired_at(Timestamp::now()) {
                    debug!(id = %id, "record has expired");
                    return Err(RedirectorError::NotFound(id));
                }

                debug!(id = %id, url = %record.original_url, "resolved url id");
                Ok(record.original_url)
            }
            None => {
                trace!(id = %id, "url id not found");
                Err(RedirectorError::NotFound(id))
            }
        }
    }
}

#[async_trait]
impl<R: ReadRegistry> Redirector for RedirectorService<R> {
    async fn resolve(&self, raw_id: &str) -> crate::Result<String> {
        let id = UrlId::parse(raw_id)?;
        self.resolve_id(id).await
    }
}
