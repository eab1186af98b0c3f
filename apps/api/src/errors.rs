use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Per-document pipeline failure. Both pipelines use these kinds to report
/// item-level failures without aborting the batch; the rerank step uses them
/// as a hard failure for the whole ranking request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("LLM provider error: {0}")]
    Provider(#[source] LlmError),

    #[error("LLM response violated the expected schema: {0}")]
    Schema(#[source] LlmError),

    #[error("validation failed: {0}")]
    Validation(String),
}

impl PipelineError {
    /// Short machine-readable kind, carried in per-item failure reports.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Extraction(_) => "extraction",
            PipelineError::Embedding(_) => "embedding",
            PipelineError::Provider(_) => "llm_provider",
            PipelineError::Schema(_) => "llm_schema",
            PipelineError::Validation(_) => "validation",
        }
    }
}

impl From<LlmError> for PipelineError {
    /// Splits client errors into the two kinds the spec distinguishes:
    /// transport/API/rate-limit problems vs malformed JSON.
    fn from(e: LlmError) -> Self {
        if e.is_provider_failure() {
            PipelineError::Provider(e)
        } else {
            PipelineError::Schema(e)
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Extraction(msg) => AppError::UnprocessableEntity(msg),
            PipelineError::Validation(msg) => AppError::UnprocessableEntity(msg),
            PipelineError::Embedding(msg) => AppError::Internal(anyhow::anyhow!(msg)),
            PipelineError::Provider(e) | PipelineError::Schema(e) => AppError::Llm(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
