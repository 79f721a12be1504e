//! HTTP gateway for the Boomerang URL shortener.
//!
//! Maps the create / redirect / delete verbs onto the shortener and
//! redirector services and encodes their outcomes as HTTP responses.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use error::AppError;
pub use state::{AppState, GatewaySettings, InMemoryShortener, StatsProvider};
