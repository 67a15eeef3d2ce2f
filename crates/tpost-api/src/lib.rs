//! Axum HTTP API server for TubePost.
//!
//! The externally-facing boundary: authenticates callers, validates
//! generation requests, enforces quotas, runs the pipeline and
//! persists results.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod quota;
pub mod routes;
pub mod security;
pub mod state;

pub use config::ApiConfig;
pub use routes::create_router;
pub use state::AppState;
