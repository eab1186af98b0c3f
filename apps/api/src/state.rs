use std::sync::Arc;

use crate::config::Config;
use crate::embedding::Embedder;
use crate::llm_client::LlmClient;
use crate::rate_limit::RateLimiter;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Sentence embedder, loaded once at startup and shared read-only across
    /// requests. Inference does not mutate model state, so no locking.
    pub embedder: Arc<dyn Embedder>,
    /// Token-bucket limiter guarding every call to the completion service.
    pub limiter: Arc<RateLimiter>,
    pub config: Config,
}
