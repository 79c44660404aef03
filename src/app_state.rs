//! Application state for the Actix-web server
//!
//! The `AppState` struct is wrapped in `web::Data` and shared across all
//! HTTP request handlers. Everything in it is immutable after startup:
//! the fetch gateway with its constant header set, and the configuration.

use crate::config::Config;
use crate::http_client::FetchClient;

/// Shared application state for Actix-web handlers
pub struct AppState {
    /// Fetch gateway through which all upstream I/O passes
    pub fetch: FetchClient,
    /// Application configuration
    pub config: Config,
}
