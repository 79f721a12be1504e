use crate::error::RegistryError;
use crate::id::UrlId;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// A stored URL record in the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The original URL that was shortened.
    pub original_url: String,
    /// When the record was stored.
    pub created_at: Timestamp,
    /// When the record expires.
    pub expire_at: Timestamp,
}

impl UrlRecord {
    /// Creates a record stamped with the current time.
    pub fn new(original_url: impl Into<String>, expire_at: Timestamp) -> Self {
        Self {
            original_url: original_url.into(),
            created_at: Timestamp::now(),
            expire_at,
        }
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now >= self.expire_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Timestamp::now())
    }
}

/// Lifecycle state of an id, as seen by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// A record exists and has not reached its deadline.
    Active,
    /// A record exists past its deadline and waits for reclamation.
    Expired,
    /// No record exists; the id may be handed out again.
    Free,
}

/// A read-only view of a registry.
///
/// This trait provides only the read operations from [`Registry`],
/// allowing services like the redirector to have read-only access.
#[async_trait]
pub trait ReadRegistry: Send + Sync + 'static {
    /// Retrieves the record for a given id.
    ///
    /// Returns `None` if the id is unknown or its record has expired, even
    /// when the record has not been reclaimed yet.
    async fn get(&self, id: UrlId) -> Result<Option<UrlRecord>>;

    /// Reports the lifecycle state of an id.
    async fn state(&self, id: UrlId) -> Result<RecordState>;
}

/// The mutable record store behind the allocator.
///
/// Every operation on a single id is atomic with respect to every other
/// operation on that id. Implementations backed by an external store must
/// keep that guarantee with the store's own locking or transactions.
#[async_trait]
pub trait Registry: ReadRegistry {
    /// Creates or overwrites the record for `id`.
    ///
    /// Fails with [`RegistryError::InvalidExpiration`] unless `expire_at`
    /// lies strictly in the future.
    async fn put(&self, id: UrlId, record: UrlRecord) -> Result<()>;

    /// Removes the record for `id`.
    /// Returns `true` if a record existed and was removed.
    async fn delete(&self, id: UrlId) -> Result<bool>;

    /// Lists ids whose records expired at or before `now`.
    ///
    /// The list is a snapshot; callers must go through [`Registry::expire`]
    /// which re-checks each record.
    async fn expired_ids(&self, now: Timestamp) -> Result<Vec<UrlId>>;

    /// Removes the record for `id` if it is still expired at `now`.
    /// Returns `true` if a record was removed.
    async fn expire(&self, id: UrlId, now: Timestamp) -> Result<bool>;

    /// Number of stored records, expired ones included.
    async fn len(&self) -> Result<usize>;
}
