//! URL shortener service implementation.
//!
//! This crate composes an [`IdAllocator`](boomerang_pool::IdAllocator) and a
//! [`Registry`](boomerang_core::Registry) into the create / resolve / delete
//! lifecycle, and runs the background [`Reaper`] that hands expired ids back
//! to the pool. Core types are re-exported from `boomerang_core`.

pub mod reaper;
pub mod retry;
pub mod service;

pub use boomerang_core::{ExpirationPolicy, ShortenParams, Shortener, ShortenerError};
pub use reaper::{Reaper, ReaperConfig, ReaperHandle};
pub use retry::RetryPolicy;
pub use service::{ServiceStats, ShortenerService, SweepReport};
