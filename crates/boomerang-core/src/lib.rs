//! Core types and traits for the Boomerang URL shortener.
//!
//! This crate provides the identifier type, the record model and the
//! registry/shortener contracts shared by the pool, storage, shortener,
//! redirector and gateway crates.

pub mod error;
pub mod id;
pub mod registry;
pub mod shortener;

pub use error::{CoreError, RegistryError, ShortenerError};
pub use id::UrlId;
pub use registry::{ReadRegistry, RecordState, Registry, UrlRecord};
pub use shortener::{ExpirationPolicy, ShortenParams, Shortener};
