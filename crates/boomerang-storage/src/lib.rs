//! Registry backends for the Boomerang URL shortener.

pub mod memory;

pub use boomerang_core::registry::{ReadRegistry, Registry, Result};
pub use boomerang_core::RegistryError;
pub use memory::InMemoryRegistry;
