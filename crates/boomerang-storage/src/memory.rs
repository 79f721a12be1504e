use async_trait::async_trait;
use boomerang_core::registry::{ReadRegistry, RecordState, Registry, Result, UrlRecord};
use boomerang_core::{RegistryError, UrlId};
use dashmap::DashMap;
use jiff::Timestamp;
use tracing::trace;

/// In-memory implementation of the Registry trait using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Every operation on a single id runs under that
/// id's shard lock, which is what serializes a sweep against a concurrent
/// re-creation of the same id.
///
/// Expired records are never dropped on read: the id stays owned by the
/// registry until [`Registry::expire`] or [`Registry::delete`] removes it and
/// the caller hands it back to the pool.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    storage: DashMap<UrlId, UrlRecord>,
}

impl InMemoryRegistry {
    /// Creates a new in-memory registry.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Creates a new in-memory registry with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }
}

#[async_trait]
impl ReadRegistry for InMemoryRegistry {
    async fn get(&self, id: UrlId) -> Result<Option<UrlRecord>> {
        let Some(entry) = self.storage.get(&id) else {
            return Ok(None);
        };

        if entry.is_expired() {
            trace!(id = %id, "record expired, awaiting reclamation");
            return Ok(None);
        }

        Ok(Some(entry.value().clone()))
    }

    async fn state(&self, id: UrlId) -> Result<RecordState> {
        let state = match self.storage.get(&id) {
            None => RecordState::Free,
            Some(entry) if entry.is_expired() => RecordState::Expired,
            Some(_) => RecordState::Active,
        };
        Ok(state)
    }
}

#[async_trait]
impl Registry for InMemoryRegistry {
    async fn put(&self, id: UrlId, record: UrlRecord) -> Result<()> {
        let now = Timestamp::now();
        if record.expire_at <= now {
            return Err(RegistryError::InvalidExpiration(format!(
                "{} is not after {now}",
                record.expire_at
            )));
        }

        self.storage.insert(id, record);
        Ok(())
    }

    async fn delete(&self, id: UrlId) -> Result<bool> {
        Ok(self.storage.remove(&id).is_some())
    }

    async fn expired_ids(&self, now: Timestamp) -> Result<Vec<UrlId>> {
        Ok(self
            .storage
            .iter()
            .filter(|entry| entry.value().is_expired_at(now))
            .map(|entry| *entry.key())
            .collect())
    }

    async fn expire(&self, id: UrlId, now: Timestamp) -> Result<bool> {
        // The predicate runs under the shard lock, so a record replaced by a
        // concurrent put is judged by its new deadline.
        Ok(self
            .storage
            .remove_if(&id, |_, record| record.is_expired_at(now))
            .is_some())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.storage.len())
    }
}
