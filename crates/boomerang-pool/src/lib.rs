//! Identifier pool for the Boomerang URL shortener.
//!
//! The pool hands out [`UrlId`]s from a bounded namespace and takes them back
//! once their records are gone, so the set of live ids stays compact no
//! matter how many URLs have been created over time.

pub mod error;
pub mod pool;

pub use error::{PoolError, Result};
pub use pool::{IdPool, PoolConfig, PoolStats};

use boomerang_core::UrlId;

/// Trait for handing out and taking back url ids.
///
/// Implementations are pure bookkeeping and don't interact with storage;
/// the caller decides when an id is safe to release.
pub trait IdAllocator: Send + Sync + 'static {
    /// Takes an id that no other caller currently holds.
    fn allocate(&self) -> Result<UrlId>;

    /// Returns an id to the pool. Releasing a free or unknown id is a no-op.
    fn release(&self, id: UrlId);

    /// Snapshot of the pool counters.
    fn stats(&self) -> PoolStats;
}
