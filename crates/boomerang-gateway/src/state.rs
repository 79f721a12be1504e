use std::sync::Arc;

use async_trait::async_trait;
use boomerang_core::{Registry, Shortener, ShortenerError};
use boomerang_pool::{IdAllocator, IdPool, PoolConfig};
use boomerang_redirector::{Redirector, RedirectorService};
use boomerang_shortener::{RetryPolicy, ServiceStats, ShortenerService};
use boomerang_storage::InMemoryRegistry;
use typed_builder::TypedBuilder;

/// The shortener the gateway binary runs with.
pub type InMemoryShortener = ShortenerService<InMemoryRegistry, IdPool>;

/// Source of the counters reported by `/health`.
#[async_trait]
pub trait StatsProvider: Send + Sync + 'static {
    async fn stats(&self) -> Result<ServiceStats, ShortenerError>;
}

#[async_trait]
impl<R: Registry, A: IdAllocator> StatsProvider for ShortenerService<R, A> {
    async fn stats(&self) -> Result<ServiceStats, ShortenerError> {
        ShortenerService::stats(self).await
    }
}

/// Knobs for wiring an in-memory gateway.
#[derive(Debug, Clone, TypedBuilder)]
pub struct GatewaySettings {
    #[builder(setter(into))]
    pub base_url: String,
    #[builder(default)]
    pub pool: PoolConfig,
    #[builder(default)]
    pub retry: RetryPolicy,
}

#[derive(Clone)]
pub struct AppState {
    shortener: Arc<dyn Shortener>,
    redirector: Arc<dyn Redirector>,
    stats: Arc<dyn StatsProvider>,
    base_url: String,
}

impl AppState {
    pub fn new(
        shortener: Arc<dyn Shortener>,
        redirector: Arc<dyn Redirector>,
        stats: Arc<dyn StatsProvider>,
        public_base_url: impl Into<String>,
    ) -> Self {
        let base_url: String = public_base_url.into();
        Self {
            shortener,
            redirector,
            stats,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Wires a shortener and a redirector over one shared in-memory registry.
    ///
    /// The shortener is returned as well so the caller can hand it to a
    /// [`Reaper`](boomerang_shortener::Reaper).
    pub fn in_memory(settings: GatewaySettings) -> (Self, Arc<InMemoryShortener>) {
        let registry = Arc::new(InMemoryRegistry::new());
        let pool = Arc::new(IdPool::new(settings.pool));

        let shortener = Arc::new(
            ShortenerService::from_shared(Arc::clone(&registry), pool)
                .with_retry_policy(settings.retry),
        );
        let redirector = Arc::new(RedirectorService::from_shared(registry));

        let state = Self::new(
            shortener.clone(),
            redirector,
            shortener.clone(),
            settings.base_url,
        );
        (state, shortener)
    }

    pub fn shortener(&self) -> &dyn Shortener {
        self.shortener.as_ref()
    }

    pub fn redirector(&self) -> &dyn Redirector {
        self.redirector.as_ref()
    }

    pub fn stats(&self) -> &dyn StatsProvider {
        self.stats.as_ref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
