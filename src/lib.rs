// Library interface for aniflux
// This allows tests and external crates to use the extraction components

pub mod app_state;
pub mod config;
pub mod error;
pub mod helpers;
pub mod http_client;
pub mod models;
pub mod sources;
