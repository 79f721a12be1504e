//! Redirector service library.
//!
//! This crate provides a [`RedirectorService`] that resolves the id segment of
//! a short URL to the target URL, treating unknown, deleted and expired ids
//! alike as not found.
//!
//! # Example
//!
//! ```rust
//! use boomerang_redirector::{Redirector, RedirectorError, RedirectorService};
//! use boomerang_storage::InMemoryRegistry;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RedirectorService::new(InMemoryRegistry::new());
//!
//! match service.resolve("42").await {
//!     Ok(url) => println!("Redirect to: {}", url),
//!     Err(RedirectorError::NotFound(id)) => println!("{} is not a live id", id),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod redirector;
pub mod service;

pub use error::{RedirectorError, Result};
pub use redirector::Redirector;
pub use service::RedirectorService;
