//! Axum route handler for the JD-scoring endpoint.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::document::Document;
use crate::errors::AppError;
use crate::scoring::{score_job_descriptions, JdScoreResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub message: String,
    pub results: Vec<JdScoreResult>,
}

/// POST /score-jds
///
/// Multipart upload: one `cv` file part and repeated `jds` file parts.
/// Returns one rubric score per JD, sorted descending; failed JDs carry
/// `score: 0` and an `error` message.
pub async fn handle_score(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScoreResponse>, AppError> {
    let mut cv: Option<Document> = None;
    let mut jds: Vec<Document> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart payload: {e}")))?
    {
        let part = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or("upload.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read '{file_name}': {e}")))?;

        match part.as_str() {
            "cv" => cv = Some(Document::new(file_name, bytes)),
            "jds" => jds.push(Document::new(file_name, bytes)),
            _ => {} // ignore unknown parts
        }
    }

    let cv = cv.ok_or_else(|| AppError::Validation("missing 'cv' file part".to_string()))?;
    if jds.is_empty() {
        return Err(AppError::Validation(
            "at least one 'jds' file part is required".to_string(),
        ));
    }

    let results = score_job_descriptions(&state.llm, &state.limiter, cv, jds).await?;

    Ok(Json(ScoreResponse {
        message: "Scoring complete".to_string(),
        results,
    }))
}
