pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ranking::handlers::handle_rank;
use crate::scoring::handlers::handle_score;
use crate::state::AppState;

/// Uploads are full PDF documents; the axum default (2 MB) is too tight for
/// a realistic candidate pool in one request.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Ranking: one JD, many CVs
        .route("/jd-cvs", post(handle_rank))
        // Scoring: one CV, many JDs
        .route("/score-jds", post(handle_score))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
