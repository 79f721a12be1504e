use crate::retry::RetryPolicy;
use async_trait::async_trait;
use boomerang_core::{Registry, ShortenParams, Shortener, ShortenerError, UrlId, UrlRecord};
use boomerang_pool::{IdAllocator, PoolStats};
use jiff::Timestamp;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Outcome of one reclamation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Expired ids found in the snapshot.
    pub scanned: usize,
    /// Ids whose records were removed and handed back to the pool.
    pub reclaimed: usize,
    /// Ids that were no longer expired (or gone) when re-checked.
    pub skipped: usize,
    /// Ids the registry failed to expire; the next pass retries them.
    pub failed: usize,
}

/// Pool counters plus the registry size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceStats {
    pub pool: PoolStats,
    /// Stored records, expired but unreclaimed ones included.
    pub records: usize,
}

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Registry` and an `IdAllocator` to handle:
/// - URL and expiration validation
/// - Id allocation and release
/// - Bounded retry of transient registry failures
///
/// The pool and the registry must agree on which ids are live. An id is
/// released only after the registry confirms it removed a record for that id,
/// and an id taken for a create that then fails is always released again, so
/// a partial failure leaves the id free rather than leaked.
#[derive(Debug)]
pub struct ShortenerService<R, A> {
    registry: Arc<R>,
    pool: Arc<A>,
    retry: RetryPolicy,
}

impl<R: Registry, A: IdAllocator> ShortenerService<R, A> {
    /// Creates a new `ShortenerService` with the default retry policy.
    pub fn new(registry: R, pool: A) -> Self {
        Self::from_shared(Arc::new(registry), Arc::new(pool))
    }

    /// Creates a `ShortenerService` over a registry and pool that other
    /// components (such as the redirector) also hold.
    pub fn from_shared(registry: Arc<R>, pool: Arc<A>) -> Self {
        Self {
            registry,
            pool,
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns a reference to the registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Returns a reference to the id pool.
    pub fn pool(&self) -> &A {
        &self.pool
    }

    /// Validates that the URL has a valid format (has a scheme and host).
    ///
    /// The URL ends up in a `Location` header, so control characters are
    /// rejected here rather than failing every later redirect.
    fn validate_url(url: &str) -> Result<(), ShortenerError> {
        if url.is_empty() {
            return Err(ShortenerError::InvalidUrl(
                "URL cannot be empty".to_string(),
            ));
        }

        if url.chars().any(char::is_control) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must not contain control characters: {:?}",
                url
            )));
        }

        let Some((scheme, rest)) = url.split_once("://") else {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a valid scheme and host: {}",
                url
            )));
        };

        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if scheme.is_empty() || host.is_empty() {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a valid scheme and host: {}",
                url
            )));
        }

        let scheme = scheme.to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https: {}",
                scheme
            )));
        }

        Ok(())
    }

    /// Hands an id taken for a failed create back to the pool.
    ///
    /// A transient failure may have left a record behind, so the record is
    /// removed first. The id is released even when that removal fails: a
    /// leftover record is overwritten by the next create under the same id.
    async fn abandon(&self, id: UrlId, cause: &ShortenerError) {
        if matches!(cause, ShortenerError::Unavailable { .. }) {
            if let Err(err) = self.retry.run("delete", || self.registry.delete(id)).await {
                error!(id = %id, error = %err, "failed to clean up after failed create");
            }
        }
        self.pool.release(id);
        debug!(id = %id, "released id after failed create");
    }

    /// Removes every record expired at `now` and returns its id to the pool.
    ///
    /// Each id from the snapshot is re-checked by [`Registry::expire`], so a
    /// record recreated under the same id after the snapshot is left alone.
    pub async fn reclaim_expired(&self, now: Timestamp) -> Result<SweepReport, ShortenerError> {
        let ids = self
            .retry
            .run("expired_ids", || self.registry.expired_ids(now))
            .await?;

        let mut report = SweepReport {
            scanned: ids.len(),
            ..SweepReport::default()
        };

        for id in ids {
            match self
                .retry
                .run("expire", || self.registry.expire(id, now))
                .await
            {
                Ok(true) => {
                    self.pool.release(id);
                    report.reclaimed += 1;
                    trace!(id = %id, "reclaimed expired id");
                }
                Ok(false) => report.skipped += 1,
                Err(err) => {
                    report.failed += 1;
                    warn!(id = %id, error = %err, "failed to reclaim expired id");
                }
            }
        }

        Ok(report)
    }

    /// Pool counters plus the registry size.
    pub async fn stats(&self) -> Result<ServiceStats, ShortenerError> {
        let records = self.retry.run("len", || self.registry.len()).await?;
        Ok(ServiceStats {
            pool: self.pool.stats(),
            records,
        })
    }
}

#[async_trait]
impl<R: Registry, A: IdAllocator> Shortener for ShortenerService<R, A> {
    async fn shorten(&self, params: ShortenParams) -> Result<UrlId, ShortenerError> {
        Self::validate_url(&params.original_url)?;

        // Reject bad deadlines before an id is taken.
        let now = Timestamp::now();
        let expire_at = params.expiration.deadline(now)?;

        let id = self.pool.allocate()?;

        let record = UrlRecord {
            original_url: params.original_url,
            created_at: now,
            expire_at,
        };

        match self
            .retry
            .run("put", || self.registry.put(id, record.clone()))
            .await
        {
            Ok(()) => {
                info!(id = %id, expire_at = %expire_at, "shortened url");
                Ok(id)
            }
            Err(err) => {
                warn!(id = %id, error = %err, "failed to store record");
                self.abandon(id, &err).await;
                Err(err)
            }
        }
    }

    async fn resolve(&self, id: UrlId) -> Result<Option<UrlRecord>, ShortenerError> {
        self.retry.run("get", || self.registry.get(id)).await
    }

    async fn delete(&self, id: UrlId) -> Result<bool, ShortenerError> {
        let removed = self
            .retry
            .run("delete", || self.registry.delete(id))
            .await?;

        if removed {
            self.pool.release(id);
            info!(id = %id, "deleted url");
        } else {
            debug!(id = %id, "delete of absent id");
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boomerang_core::registry::{ReadRegistry, RecordState, Result as RegistryResult};
    use boomerang_core::{ExpirationPolicy, RegistryError};
    use boomerang_pool::IdPool;
    use boomerang_storage::InMemoryRegistry;
    use jiff::SignedDuration;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn test_service() -> ShortenerService<InMemoryRegistry, IdPool> {
        ShortenerService::new(InMemoryRegistry::new(), IdPool::default())
    }

    fn params(url: &str) -> ShortenParams {
        ShortenParams::new(
            url,
            ExpirationPolicy::AfterDuration(SignedDuration::from_hours(1)),
        )
    }

    fn id(value: u64) -> UrlId {
        UrlId::new(value)
    }

    /// Registry whose writes fail with a transient error a set number of times.
    #[derive(Default)]
    struct FlakyRegistry {
        inner: InMemoryRegistry,
        put_failures: AtomicU32,
        puts: AtomicU32,
    }

    impl FlakyRegistry {
        fn failing_puts(n: u32) -> Self {
            Self {
                put_failures: AtomicU32::new(n),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ReadRegistry for FlakyRegistry {
        async fn get(&self, id: UrlId) -> RegistryResult<Option<UrlRecord>> {
            self.inner.get(id).await
        }

        async fn state(&self, id: UrlId) -> RegistryResult<RecordState> {
            self.inner.state(id).await
        }
    }

    #[async_trait]
    impl Registry for FlakyRegistry {
        async fn put(&self, id: UrlId, record: UrlRecord) -> RegistryResult<()> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            let remaining = self.put_failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.put_failures.store(remaining - 1, Ordering::SeqCst);
                return Err(RegistryError::Unavailable("connection reset".into()));
            }
            self.inner.put(id, record).await
        }

        async fn delete(&self, id: UrlId) -> RegistryResult<bool> {
            self.inner.delete(id).await
        }

        async fn expired_ids(&self, now: Timestamp) -> RegistryResult<Vec<UrlId>> {
            self.inner.expired_ids(now).await
        }

        async fn expire(&self, id: UrlId, now: Timestamp) -> RegistryResult<bool> {
            self.inner.expire(id, now).await
        }

        async fn len(&self) -> RegistryResult<usize> {
            self.inner.len().await
        }
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::builder()
            .max_attempts(max_attempts)
            .backoff(Duration::from_millis(1))
            .build()
    }

    #[tokio::test]
    async fn shorten_allocates_sequential_ids() {
        let service = test_service();

        let first = service.shorten(params("https://example.com")).await.unwrap();
        let second = service.shorten(params("https://example.com")).await.unwrap();

        assert_eq!(first, id(1));
        assert_eq!(second, id(2));
    }

    #[tokio::test]
    async fn shorten_with_invalid_url_fails() {
        let service = test_service();

        for url in ["", "not-a-valid-url", "ftp://example.com", "https://", "://x"] {
            let err = service.shorten(params(url)).await.unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidUrl(_)), "{url}");
        }
        assert_eq!(service.pool().in_use(), 0);
    }

    #[tokio::test]
    async fn shorten_rejects_control_characters() {
        let service = test_service();

        for url in [
            "https://example.com/a\u{7f}b",
            "https://example.com/a\nb",
            "https://example.com/\r\nSet-Cookie: x=1",
            "https://exa\tmple.com",
            "https://example.com/\u{85}",
        ] {
            let err = service.shorten(params(url)).await.unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidUrl(_)), "{url:?}");
        }
        assert_eq!(service.pool().in_use(), 0);

        // Non-ASCII text is still fine.
        assert!(service.shorten(params("https://example.com/café")).await.is_ok());
    }

    #[tokio::test]
    async fn shorten_with_past_deadline_takes_no_id() {
        let service = test_service();
        let past = Timestamp::now() - SignedDuration::from_secs(5);

        let err = service
            .shorten(ShortenParams::new(
                "https://example.com",
                ExpirationPolicy::AtTimestamp(past),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::InvalidExpiration(_)));
        assert_eq!(service.pool().in_use(), 0);
        assert_eq!(service.shorten(params("https://a.com")).await.unwrap(), id(1));
    }

    #[tokio::test]
    async fn resolve_existing_url() {
        let service = test_service();

        let code = service.shorten(params("https://example.com")).await.unwrap();

        let record = service.resolve(code).await.unwrap();
        assert_eq!(record.unwrap().original_url, "https://example.com");
    }

    #[tokio::test]
    async fn resolve_nonexistent_url() {
        let service = test_service();

        assert!(service.resolve(id(0)).await.unwrap().is_none());
        assert!(service.resolve(id(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_then_shorten_reuses_the_id() {
        let service = test_service();

        let code = service.shorten(params("https://example.com")).await.unwrap();
        assert!(service.delete(code).await.unwrap());
        assert!(service.resolve(code).await.unwrap().is_none());

        let reused = service.shorten(params("https://www.google.com")).await.unwrap();
        assert_eq!(reused, code);

        let record = service.resolve(reused).await.unwrap().unwrap();
        assert_eq!(record.original_url, "https://www.google.com");
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let service = test_service();

        let code = service.shorten(params("https://example.com")).await.unwrap();
        assert!(service.delete(code).await.unwrap());
        assert!(!service.delete(code).await.unwrap());
        assert_eq!(service.pool().free_len(), 1);
    }

    #[tokio::test]
    async fn stale_delete_does_not_free_a_live_id() {
        let service = test_service();

        let code = service.shorten(params("https://a.com")).await.unwrap();
        assert!(service.delete(code).await.unwrap());
        let reused = service.shorten(params("https://b.com")).await.unwrap();
        assert_eq!(reused, code);

        // A deleted-and-recreated id is deleted again by a second caller.
        assert!(service.delete(code).await.unwrap());
        // And a third, stale delete must not free it twice.
        assert!(!service.delete(code).await.unwrap());
        assert_eq!(service.pool().free_len(), 1);
    }

    #[tokio::test]
    async fn exhausted_pool_fails_until_an_id_is_freed() {
        let service = ShortenerService::new(InMemoryRegistry::new(), IdPool::with_capacity(2));

        let a = service.shorten(params("https://a.com")).await.unwrap();
        service.shorten(params("https://b.com")).await.unwrap();

        let err = service.shorten(params("https://c.com")).await.unwrap_err();
        assert_eq!(err, ShortenerError::Exhausted { capacity: 2 });

        service.delete(a).await.unwrap();
        assert_eq!(service.shorten(params("https://c.com")).await.unwrap(), a);
    }

    #[tokio::test]
    async fn transient_put_failures_are_retried() {
        let service = ShortenerService::new(FlakyRegistry::failing_puts(2), IdPool::default())
            .with_retry_policy(fast_retry(3));

        let code = service.shorten(params("https://example.com")).await.unwrap();

        assert_eq!(code, id(1));
        assert_eq!(service.registry().puts.load(Ordering::SeqCst), 3);
        assert!(service.resolve(code).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn exhausted_retries_release_the_id() {
        let service = ShortenerService::new(FlakyRegistry::failing_puts(5), IdPool::default())
            .with_retry_policy(fast_retry(2));

        let err = service.shorten(params("https://example.com")).await.unwrap_err();
        assert!(matches!(err, ShortenerError::Unavailable { attempts: 2, .. }));
        assert_eq!(service.pool().in_use(), 0);
        assert_eq!(
            service.registry().state(id(1)).await.unwrap(),
            RecordState::Free
        );

        // Three failures left: the second create also fails, the third succeeds
        // on its second attempt and gets the same id back.
        service
            .shorten(params("https://example.com"))
            .await
            .unwrap_err();
        assert_eq!(
            service.shorten(params("https://example.com")).await.unwrap(),
            id(1)
        );
    }

    #[tokio::test]
    async fn reclaim_expired_frees_only_expired_ids() {
        let service = test_service();

        let short = service
            .shorten(ShortenParams::new(
                "https://short.com",
                ExpirationPolicy::AfterDuration(SignedDuration::from_millis(30)),
            ))
            .await
            .unwrap();
        let long = service.shorten(params("https://long.com")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;

        let report = service.reclaim_expired(Timestamp::now()).await.unwrap();
        assert_eq!(
            report,
            SweepReport {
                scanned: 1,
                reclaimed: 1,
                skipped: 0,
                failed: 0,
            }
        );

        assert!(service.resolve(long).await.unwrap().is_some());
        assert_eq!(service.shorten(params("https://new.com")).await.unwrap(), short);
    }

    #[tokio::test]
    async fn reclaim_with_nothing_expired_is_a_no_op() {
        let service = test_service();
        service.shorten(params("https://example.com")).await.unwrap();

        let report = service.reclaim_expired(Timestamp::now()).await.unwrap();
        assert_eq!(report, SweepReport::default());
        assert_eq!(service.pool().in_use(), 1);
    }

    #[tokio::test]
    async fn stats_reflect_pool_and_registry() {
        let service = test_service();
        let a = service.shorten(params("https://a.com")).await.unwrap();
        service.shorten(params("https://b.com")).await.unwrap();
        service.delete(a).await.unwrap();

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.records, 1);
        assert_eq!(stats.pool.in_use, 1);
        assert_eq!(stats.pool.free, 1);
    }
}
