mod config;
mod document;
mod embedding;
mod errors;
mod extract;
mod llm_client;
mod ranking;
mod rate_limit;
mod routes;
mod scoring;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::embedding::{Embedder, MiniLmEmbedder};
use crate::llm_client::LlmClient;
use crate::rate_limit::RateLimiter;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV ranker API v{}", env!("CARGO_PKG_VERSION"));

    // Load the embedding model once per process; it is shared read-only
    // across all requests for its whole lifetime.
    let embedder: Arc<dyn Embedder> = Arc::new(MiniLmEmbedder::load()?);
    info!(
        "Embedding model loaded: {} ({} dims)",
        embedder.model_name(),
        embedder.dimension()
    );

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Token-bucket limiter shared by both pipelines
    let limiter = Arc::new(RateLimiter::per_minute(config.llm_requests_per_minute));
    info!(
        "LLM rate limiter: {} requests/minute",
        config.llm_requests_per_minute
    );

    // Build app state
    let state = AppState {
        llm,
        embedder,
        limiter,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
