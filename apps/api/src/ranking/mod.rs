//! Ranking pipeline: CVs against one job description.
//!
//! Flow: per-CV PDF text → LLM structured profile → embedding of the
//! serialized profile JSON; JD PDF text → embedding of the raw text; cosine
//! ranking; LLM rerank of the top 5; merge back onto the original
//! similarity percentages.
//!
//! Note the deliberate asymmetry: the JD is embedded from raw extracted
//! text while each CV is embedded from its profile JSON. The two sides go
//! through different textual surfaces of the same model. Do not unify
//! without product guidance.
//!
//! Failure model: each candidate reaches its own terminal state. A CV that
//! fails extraction, profile parsing, or embedding is reported in
//! `failures` and excluded from ranking; it never aborts the batch. Only an
//! unreadable/empty JD (nothing to rank against) or a failed rerank step
//! fails the whole request.

pub mod handlers;
pub mod profile;
pub mod prompts;
pub mod reranker;
pub mod similarity;

use serde::Serialize;
use tracing::{info, warn};

use crate::document::Document;
use crate::embedding::Embedder;
use crate::errors::{AppError, PipelineError};
use crate::extract::extract_pdf_text;
use crate::llm_client::CompletionBackend;
use crate::ranking::profile::{extract_profile, total_experience, StructuredProfile};
use crate::ranking::reranker::{merge_ranking, rerank_top, FinalRankedEntry};
use crate::ranking::similarity::rank_by_similarity;
use crate::rate_limit::RateLimiter;

/// Number of similarity survivors handed to the LLM rerank.
pub const RERANK_TOP_K: usize = 5;

/// A candidate that reached a terminal failure state, reported to the
/// caller alongside the ranked survivors.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateFailure {
    pub name: String,
    pub stage: &'static str,
    pub error: String,
}

/// Result of the ranking pipeline.
#[derive(Debug)]
pub enum RankOutcome {
    Ranked {
        ranked: Vec<FinalRankedEntry>,
        failures: Vec<CandidateFailure>,
    },
    /// Candidate pool was empty or no candidate survived processing.
    NoMatches { failures: Vec<CandidateFailure> },
}

struct ProcessedCandidate {
    name: String,
    profile: StructuredProfile,
    embedding: Vec<f32>,
}

/// Runs the full ranking pipeline for one JD and a pool of CVs.
pub async fn rank_candidates(
    llm: &dyn CompletionBackend,
    embedder: &dyn Embedder,
    limiter: &RateLimiter,
    jd: Document,
    cvs: Vec<Document>,
) -> Result<RankOutcome, AppError> {
    if cvs.is_empty() {
        return Ok(RankOutcome::NoMatches { failures: vec![] });
    }

    let jd_text = extract_pdf_text(&jd.name, &jd.bytes)?;
    if jd_text.is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "job description '{}' contains no extractable text",
            jd.name
        )));
    }

    rank_against(llm, embedder, limiter, &jd_text, &cvs).await
}

/// Ranks a candidate pool against already-extracted JD text.
async fn rank_against(
    llm: &dyn CompletionBackend,
    embedder: &dyn Embedder,
    limiter: &RateLimiter,
    jd_text: &str,
    cvs: &[Document],
) -> Result<RankOutcome, AppError> {
    let mut candidates: Vec<ProcessedCandidate> = Vec::new();
    let mut failures: Vec<CandidateFailure> = Vec::new();

    for cv in cvs {
        match process_candidate(llm, embedder, limiter, cv).await {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => {
                warn!("candidate '{}' failed: {e}", cv.name);
                failures.push(CandidateFailure {
                    name: cv.name.clone(),
                    stage: e.kind(),
                    error: e.to_string(),
                });
            }
        }
    }

    if candidates.is_empty() {
        info!("no candidates survived processing ({} failures)", failures.len());
        return Ok(RankOutcome::NoMatches { failures });
    }

    let jd_embedding = embedder
        .embed(jd_text)
        .map_err(|e| AppError::Internal(e.context("failed to embed job description")))?;

    let candidate_embeddings: Vec<(String, Vec<f32>)> = candidates
        .iter()
        .map(|c| (c.name.clone(), c.embedding.clone()))
        .collect();
    let ranked_scores = rank_by_similarity(&jd_embedding, &candidate_embeddings);

    if ranked_scores.is_empty() {
        return Ok(RankOutcome::NoMatches { failures });
    }

    let survivors = &ranked_scores[..ranked_scores.len().min(RERANK_TOP_K)];
    let survivor_profiles: Vec<_> = survivors
        .iter()
        .filter_map(|score| {
            candidates
                .iter()
                .find(|c| c.name == score.name)
                .map(|c| (score, &c.profile))
        })
        .collect();

    let llm_order = rerank_top(llm, limiter, jd_text, &survivor_profiles).await?;
    let ranked = merge_ranking(&llm_order, survivors);

    info!(
        "ranking complete: {} ranked, {} failed, pool of {}",
        ranked.len(),
        failures.len(),
        cvs.len()
    );

    Ok(RankOutcome::Ranked { ranked, failures })
}

/// Takes one CV to its terminal state: extracted text, structured profile,
/// and an embedding of the serialized profile JSON.
async fn process_candidate(
    llm: &dyn CompletionBackend,
    embedder: &dyn Embedder,
    limiter: &RateLimiter,
    cv: &Document,
) -> Result<ProcessedCandidate, PipelineError> {
    let text = extract_pdf_text(&cv.name, &cv.bytes)?;
    if text.is_empty() {
        return Err(PipelineError::Extraction(format!(
            "'{}' contains no extractable text",
            cv.name
        )));
    }

    let (profile, _usage) = extract_profile(llm, limiter, &text).await?;
    if total_experience(&profile).is_none() {
        warn!("profile for '{}' has no numeric total_experience", cv.name);
    }

    let profile_json = serde_json::to_string(&profile)
        .map_err(|e| PipelineError::Validation(format!("profile not serializable: {e}")))?;

    let embedding = embedder
        .embed(&profile_json)
        .map_err(|e| PipelineError::Embedding(format!("'{}': {e}", cv.name)))?;

    Ok(ProcessedCandidate {
        name: cv.name.clone(),
        profile,
        embedding,
    })
}
