use crate::error::{PoolError, Result};
use crate::IdAllocator;
use boomerang_core::UrlId;
use parking_lot::Mutex;
use std::collections::HashSet;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

/// Default namespace size: every id fits in ten decimal digits.
pub const DEFAULT_CAPACITY: u64 = u32::MAX as u64;

/// Configures an [`IdPool`] instance.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct PoolConfig {
    /// Largest id the pool may mint. Ids live in `1..=capacity`.
    #[builder(default = DEFAULT_CAPACITY)]
    pub capacity: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Counters describing the pool at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub capacity: u64,
    /// Ids minted so far (the high-water mark).
    pub minted: u64,
    /// Ids released and waiting for reuse.
    pub free: u64,
    /// Ids currently held by callers.
    pub in_use: u64,
}

#[derive(Debug)]
struct PoolState {
    /// Largest id minted so far; the next one is `minted + 1`.
    minted: u64,
    /// Released ids, most recently released on top.
    free: Vec<UrlId>,
    /// Mirror of `free` for O(1) idempotent release.
    free_set: HashSet<UrlId>,
}

/// Identifier pool with a LIFO free list.
///
/// Released ids are handed out again before new ones are minted, the most
/// recently released first. New ids are minted sequentially from 1 up to the
/// configured capacity, after which allocation fails with
/// [`PoolError::Exhausted`] instead of waiting.
///
/// All bookkeeping sits behind one short-held mutex, so concurrent callers
/// can never observe the same id.
#[derive(Debug)]
pub struct IdPool {
    capacity: u64,
    state: Mutex<PoolState>,
}

impl IdPool {
    /// Creates an empty pool.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            capacity: config.capacity,
            state: Mutex::new(PoolState {
                minted: 0,
                free: Vec::new(),
                free_set: HashSet::new(),
            }),
        }
    }

    /// Creates an empty pool over `1..=capacity`.
    pub fn with_capacity(capacity: u64) -> Self {
        Self::new(PoolConfig::builder().capacity(capacity).build())
    }

    /// Rebuilds a pool from a known high-water mark and free list.
    ///
    /// `minted` is the largest id handed out so far. `free` lists released
    /// ids, oldest first; the last entry is reused first. Duplicates are
    /// dropped.
    pub fn resume(
        config: PoolConfig,
        minted: u64,
        free: impl IntoIterator<Item = UrlId>,
    ) -> Result<Self> {
        if minted > config.capacity {
            return Err(PoolError::InvalidState(format!(
                "high-water mark {minted} exceeds capacity {}",
                config.capacity
            )));
        }

        let mut stack = Vec::new();
        let mut free_set = HashSet::new();
        for id in free {
            if id.get() == 0 || id.get() > minted {
                return Err(PoolError::InvalidState(format!(
                    "free id {id} was never minted (high-water mark {minted})"
                )));
            }
            if free_set.insert(id) {
                stack.push(id);
            }
        }

        debug!(minted, free = stack.len(), "resuming id pool");

        Ok(Self {
            capacity: config.capacity,
            state: Mutex::new(PoolState {
                minted,
                free: stack,
                free_set,
            }),
        })
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of ids currently held by callers.
    pub fn in_use(&self) -> u64 {
        self.stats().in_use
    }

    /// Number of released ids waiting for reuse.
    pub fn free_len(&self) -> u64 {
        self.stats().free
    }
}

impl Default for IdPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl IdAllocator for IdPool {
    fn allocate(&self) -> Result<UrlId> {
        let mut state = self.state.lock();

        if let Some(id) = state.free.pop() {
            state.free_set.remove(&id);
            trace!(id = %id, "reusing released id");
            return Ok(id);
        }

        if state.minted >= self.capacity {
            warn!(capacity = self.capacity, "id pool exhausted");
            return Err(PoolError::Exhausted {
                capacity: self.capacity,
            });
        }

        state.minted += 1;
        let id = UrlId::new(state.minted);
        trace!(id = %id, "minted new id");
        Ok(id)
    }

    fn release(&self, id: UrlId) {
        let mut state = self.state.lock();

        if id.get() == 0 || id.get() > state.minted {
            debug!(id = %id, "ignoring release of an id that was never minted");
            return;
        }

        if state.free_set.insert(id) {
            state.free.push(id);
            trace!(id = %id, "released id");
        }
    }

    fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        let free = state.free.len() as u64;
        PoolStats {
            capacity: self.capacity,
            minted: state.minted,
            free,
            in_use: state.minted - free,
        }
    }
}
