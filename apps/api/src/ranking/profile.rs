//! Structured Profile Extractor — turns raw CV text into a flat JSON summary
//! via the LLM, including the normalized `total_experience` figure.

use serde_json::Value;
use tracing::debug;

use crate::errors::PipelineError;
use crate::llm_client::{json_from_response, CallOptions, CompletionBackend, Usage};
use crate::ranking::prompts::profile_prompt;
use crate::rate_limit::RateLimiter;

/// Open mapping of string keys to JSON values. The prompt asks for one flat
/// object with a numeric `total_experience` field; beyond valid JSON, the
/// shape is not enforced here.
pub type StructuredProfile = serde_json::Map<String, Value>;

/// Calls the LLM to extract a structured profile from CV text.
/// Default sampling parameters apply (no temperature override); token usage
/// is returned for observability.
pub async fn extract_profile(
    llm: &dyn CompletionBackend,
    limiter: &RateLimiter,
    cv_text: &str,
) -> Result<(StructuredProfile, Usage), PipelineError> {
    let prompt = profile_prompt(cv_text);

    limiter.acquire().await;
    let response = llm
        .complete(&prompt, CallOptions::default())
        .await
        .map_err(PipelineError::from)?;

    let profile: StructuredProfile =
        json_from_response(&response).map_err(PipelineError::from)?;

    debug!(
        prompt_tokens = response.usage.prompt_tokens,
        completion_tokens = response.usage.completion_tokens,
        "structured profile extracted"
    );

    Ok((profile, response.usage))
}

/// Reads the `total_experience` field as years, if present and numeric.
/// The model is asked for int-or-float years; string-encoded numbers are
/// tolerated the same way the rubric scorer tolerates them.
pub fn total_experience(profile: &StructuredProfile) -> Option<f64> {
    match profile.get("total_experience")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
