//! Idea-fusion suggestion gateway.
//!
//! Sits between whiteboard clients and upstream language-model providers:
//! deduplicates requests through a bounded TTL cache, retries transient
//! upstream failures, normalizes the two providers' reply shapes and recovers
//! structured suggestions from noisy model output.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod local;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod prompt;
pub mod provider;
pub mod rate_limit;
pub mod retry;
pub mod routes;
pub mod score;
pub mod service;
pub mod state;

pub use error::{FusionError, UpstreamError};
pub use models::{FusionContext, FusionRequest, FusionResponse, Suggestion};
pub use routes::create_router;
pub use service::FusionService;
pub use state::AppState;
