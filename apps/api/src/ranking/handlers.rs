//! Axum route handler for the ranking endpoint.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::document::Document;
use crate::errors::AppError;
use crate::ranking::reranker::FinalRankedEntry;
use crate::ranking::{rank_candidates, CandidateFailure, RankOutcome};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub message: String,
    pub result: Vec<FinalRankedEntry>,
    pub failures: Vec<CandidateFailure>,
}

impl From<RankOutcome> for RankResponse {
    fn from(outcome: RankOutcome) -> Self {
        match outcome {
            RankOutcome::Ranked { ranked, failures } => RankResponse {
                message: "Processing complete".to_string(),
                result: ranked,
                failures,
            },
            RankOutcome::NoMatches { failures } => RankResponse {
                message: "No matching CVs found".to_string(),
                result: vec![],
                failures,
            },
        }
    }
}

/// POST /jd-cvs
///
/// Multipart upload: one `jd` file part and repeated `cvs` file parts.
/// Returns the LLM-ordered top candidates with their similarity-derived
/// match scores, plus per-candidate failures.
pub async fn handle_rank(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RankResponse>, AppError> {
    let mut jd: Option<Document> = None;
    let mut cvs: Vec<Document> = Vec::new();

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
            "jd" => jd = Some(Document::new(file_name, bytes)),
            "cvs" => cvs.push(Document::new(file_name, bytes)),
            _ => {} // ignore unknown parts
        }
    }

    let jd = jd.ok_or_else(|| AppError::Validation("missing 'jd' file part".to_string()))?;

    let outcome = rank_candidates(
        &state.llm,
        state.embedder.as_ref(),
        &state.limiter,
        jd,
        cvs,
    )
    .await?;

    Ok(Json(RankResponse::from(outcome)))
}
