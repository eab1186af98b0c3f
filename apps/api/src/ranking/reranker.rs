//! LLM Reranker and Score Merger — precision pass over the top similarity
//! survivors, then a pure merge back onto the original similarity scores.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::errors::PipelineError;
use crate::llm_client::{json_from_response, CallOptions, CompletionBackend};
use crate::ranking::profile::StructuredProfile;
use crate::ranking::prompts::rerank_prompt;
use crate::ranking::similarity::SimilarityScore;
use crate::rate_limit::RateLimiter;

/// One entry of the LLM's ranking. `ranking` arrives as a string-encoded
/// 1-based position; the array order is authoritative, the field is carried
/// but not trusted for ordering.
#[derive(Debug, Clone, Deserialize)]
pub struct RerankEntry {
    pub filename: String,
    #[allow(dead_code)]
    pub ranking: String,
}

/// The reranker's full JSON contract.
#[derive(Debug, Deserialize)]
pub struct RerankResponse {
    pub ranked_cvs: Vec<RerankEntry>,
}

/// Final answer shape for one candidate. `id` is the 1-based position in the
/// LLM's order; `match_score` is the ORIGINAL similarity percentage, not an
/// LLM-derived number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalRankedEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "matchScore")]
    pub match_score: f64,
}

/// Asks the LLM to reorder the top survivors against the JD text, given each
/// survivor's full structured profile.
///
/// A response that is not valid JSON (or misses the contract) is a hard
/// failure for the whole rerank step — never silently fall back to
/// similarity order.
pub async fn rerank_top(
    llm: &dyn CompletionBackend,
    limiter: &RateLimiter,
    jd_text: &str,
    survivors: &[(&SimilarityScore, &StructuredProfile)],
) -> Result<RerankResponse, PipelineError> {
    let cv_data: Vec<serde_json::Value> = survivors
        .iter()
        .map(|(score, profile)| {
            json!({
                "filename": score.name,
                "json_data": profile,
            })
        })
        .collect();
    let cv_data_json =
        serde_json::to_string_pretty(&cv_data).map_err(|e| PipelineError::Validation(e.to_string()))?;

    let prompt = rerank_prompt(jd_text, &cv_data_json);

    limiter.acquire().await;
    let response = llm
        .complete(&prompt, CallOptions::default())
        .await
        .map_err(PipelineError::from)?;
    json_from_response::<RerankResponse>(&response).map_err(PipelineError::from)
}

/// Merges the LLM's ordering with the original similarity percentages.
///
/// Names the LLM invented (outside the survivor subset) are filtered out;
/// survivors the LLM omitted are simply absent. `id` is therefore the
/// 1-based position within the retained order.
pub fn merge_ranking(response: &RerankResponse, survivors: &[SimilarityScore]) -> Vec<FinalRankedEntry> {
    response
        .ranked_cvs
        .iter()
        .filter_map(|entry| {
            let score = survivors.iter().find(|s| s.name == entry.filename);
            if score.is_none() {
                warn!(
                    "reranker returned unknown candidate '{}', dropping it",
                    entry.filename
                );
            }
            score
        })
        .enumerate()
        .map(|(i, score)| FinalRankedEntry {
            id: (i + 1).to_string(),
            name: score.name.clone(),
            match_score: score.as_percentage(),
        })
        .collect()
}
