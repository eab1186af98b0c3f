//! Rubric-scoring pipeline: one CV against many job descriptions.
//!
//! Each JD is processed strictly sequentially through the shared rate
//! limiter and reaches its own terminal state: SCORED, or FAILED with a
//! per-item error (`{score: 0, error}`) that never aborts or delays its
//! siblings. Results come back sorted descending by score, stable on ties.

pub mod handlers;
pub mod prompts;

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::document::Document;
use crate::errors::{AppError, PipelineError};
use crate::extract::{extract_pdf_text, normalize_whitespace};
use crate::llm_client::{json_from_response, CallOptions, CompletionBackend};
use crate::rate_limit::RateLimiter;
use crate::scoring::prompts::rubric_prompt;

/// Rubric calls pin a low temperature for repeatability and cap completion
/// tokens: the answer is a single tiny JSON object and must never be
/// ambiguously truncated.
const RUBRIC_TEMPERATURE: f32 = 0.1;
const RUBRIC_MAX_TOKENS: u32 = 100;

/// Score of one JD against the CV. `error` is present only for failed
/// documents, which always carry `score: 0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JdScoreResult {
    pub jd_file: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One JD after text extraction. A failed or empty extraction is already a
/// terminal state; it is carried here so the scoring loop reports it in
/// the JD's own result entry.
struct PreparedJd {
    name: String,
    text: Result<String, PipelineError>,
}

/// Scores every JD against the CV, sequentially, and returns the results
/// sorted descending by score (ties keep processing order).
///
/// An unreadable or empty CV fails the whole operation — there is nothing
/// to score against. Per-JD failures are isolated into their result entry.
pub async fn score_job_descriptions(
    llm: &dyn CompletionBackend,
    limiter: &RateLimiter,
    cv: Document,
    jds: Vec<Document>,
) -> Result<Vec<JdScoreResult>, AppError> {
    let cv_text = normalize_whitespace(&extract_pdf_text(&cv.name, &cv.bytes)?);
    if cv_text.is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "CV '{}' contains no extractable text",
            cv.name
        )));
    }

    let prepared = jds.iter().map(prepare_jd).collect();
    Ok(score_prepared(llm, limiter, &cv_text, prepared).await)
}

/// Extracts and normalizes one JD's text; empty text is terminal.
fn prepare_jd(jd: &Document) -> PreparedJd {
    let text = extract_pdf_text(&jd.name, &jd.bytes)
        .map(|t| normalize_whitespace(&t))
        .and_then(|t| {
            if t.is_empty() {
                Err(PipelineError::Extraction(format!(
                    "'{}' contains no extractable text",
                    jd.name
                )))
            } else {
                Ok(t)
            }
        });
    PreparedJd {
        name: jd.name.clone(),
        text,
    }
}

/// The per-JD isolation loop: every input yields exactly one result, failed
/// JDs carry `score: 0` and an error message, and the batch never aborts.
async fn score_prepared(
    llm: &dyn CompletionBackend,
    limiter: &RateLimiter,
    cv_text: &str,
    jds: Vec<PreparedJd>,
) -> Vec<JdScoreResult> {
    let mut results: Vec<JdScoreResult> = Vec::with_capacity(jds.len());
    for jd in jds {
        let result = match score_one_jd(llm, limiter, cv_text, jd.text).await {
            Ok(score) => JdScoreResult {
                jd_file: jd.name,
                score,
                error: None,
            },
            Err(e) => JdScoreResult {
                jd_file: jd.name,
                score: 0.0,
                error: Some(e.to_string()),
            },
        };
        info!(
            "processed {} -> {:.2}%{}",
            result.jd_file,
            result.score,
            result
                .error
                .as_deref()
                .map(|e| format!(" (error: {e})"))
                .unwrap_or_default()
        );
        results.push(result);
    }

    sort_by_score_descending(&mut results);
    results
}

/// One JD's path to a terminal state: rubric prompt, LLM call, score parse,
/// clamp. An extraction failure carried in from preparation surfaces here.
async fn score_one_jd(
    llm: &dyn CompletionBackend,
    limiter: &RateLimiter,
    cv_text: &str,
    jd_text: Result<String, PipelineError>,
) -> Result<f64, PipelineError> {
    let jd_text = jd_text?;
    let prompt = rubric_prompt(cv_text, &jd_text);

    limiter.acquire().await;
    let response = llm
        .complete(
            &prompt,
            CallOptions {
                temperature: Some(RUBRIC_TEMPERATURE),
                max_tokens: Some(RUBRIC_MAX_TOKENS),
            },
        )
        .await?;
    let body: Value = json_from_response(&response)?;

    Ok(clamp_score(parse_match_score(&body)?))
}

/// Reads `Match_score` from the rubric response. Numbers are taken as-is;
/// numeric strings (with an optional trailing `%`) are tolerated. Anything
/// else is a validation failure for that JD.
fn parse_match_score(response: &Value) -> Result<f64, PipelineError> {
    let score = response
        .get("Match_score")
        .ok_or_else(|| PipelineError::Validation("response missing 'Match_score'".to_string()))?;

    match score {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| PipelineError::Validation("'Match_score' is not a finite number".to_string())),
        Value::String(s) => s
            .trim()
            .trim_end_matches('%')
            .parse::<f64>()
            .map_err(|_| PipelineError::Validation(format!("'Match_score' is not numeric: {s:?}"))),
        other => Err(PipelineError::Validation(format!(
            "'Match_score' has unexpected type: {other}"
        ))),
    }
}

/// Coerces the parsed score into [0, 100], even when the model's arithmetic
/// disagrees with its own rubric.
fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// Stable descending sort, so equal scores keep their processing order.
fn sort_by_score_descending(results: &mut [JdScoreResult]) {
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    use crate::llm_client::{Choice, LlmError, LlmResponse, ResponseMessage, Usage};

    /// Replays a fixed queue of completion results; panics on extra calls.
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<LlmResponse, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
            }
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(
            &self,
            _prompt: &str,
            _options: CallOptions,
        ) -> Result<LlmResponse, LlmError> {
            self.replies
                .lock()
                .await
                .pop_front()
                .expect("no scripted reply left for this call")
        }
    }

    fn reply(body: &str) -> Result<LlmResponse, LlmError> {
        Ok(LlmResponse {
            choices: vec![Choice {
                message: ResponseMessage {
                    content: Some(body.to_string()),
                },
            }],
            usage: Usage::default(),
        })
    }

    fn ok_jd(name: &str, text: &str) -> PreparedJd {
        PreparedJd {
            name: name.to_string(),
            text: Ok(text.to_string()),
        }
    }

    fn bad_jd(name: &str) -> PreparedJd {
        PreparedJd {
            name: name.to_string(),
            text: Err(PipelineError::Extraction(format!(
                "'{name}' contains no extractable text"
            ))),
        }
    }

    #[tokio::test]
    async fn test_one_unreadable_jd_yields_exactly_one_error_entry() {
        let backend = ScriptedBackend::new(vec![
            reply(r#"{"Match_score": 42.0}"#),
            reply(r#"{"Match_score": 88.5}"#),
        ]);
        let limiter = RateLimiter::per_minute(6000);

        let results = score_prepared(
            &backend,
            &limiter,
            "ML engineer, 5 years",
            vec![
                ok_jd("jd-ml-1.pdf", "Junior ML role"),
                bad_jd("jd-broken.pdf"),
                ok_jd("jd-ml-2.pdf", "Senior ML role"),
            ],
        )
        .await;

        assert_eq!(results.len(), 3);

        let errored: Vec<&JdScoreResult> = results.iter().filter(|r| r.error.is_some()).collect();
        assert_eq!(errored.len(), 1);
        assert_eq!(errored[0].jd_file, "jd-broken.pdf");
        assert_eq!(errored[0].score, 0.0);

        // The siblings are unaffected and come back sorted descending.
        assert_eq!(results[0].jd_file, "jd-ml-2.pdf");
        assert_eq!(results[0].score, 88.5);
        assert_eq!(results[1].jd_file, "jd-ml-1.pdf");
        assert_eq!(results[1].score, 42.0);
    }

    #[tokio::test]
    async fn test_llm_failure_is_isolated_to_its_jd() {
        let backend = ScriptedBackend::new(vec![
            Err(LlmError::Api {
                status: 500,
                message: "upstream exploded".to_string(),
            }),
            reply(r#"{"Match_score": 70.0}"#),
        ]);
        let limiter = RateLimiter::per_minute(6000);

        let results = score_prepared(
            &backend,
            &limiter,
            "ML engineer, 5 years",
            vec![ok_jd("jd-a.pdf", "Role A"), ok_jd("jd-b.pdf", "Role B")],
        )
        .await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].jd_file, "jd-b.pdf");
        assert_eq!(results[0].score, 70.0);
        assert!(results[0].error.is_none());
        assert_eq!(results[1].jd_file, "jd-a.pdf");
        assert_eq!(results[1].score, 0.0);
        assert!(results[1].error.as_deref().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_clamped_in_the_loop() {
        let backend = ScriptedBackend::new(vec![reply(r#"{"Match_score": 150.0}"#)]);
        let limiter = RateLimiter::per_minute(6000);

        let results =
            score_prepared(&backend, &limiter, "cv text", vec![ok_jd("jd.pdf", "role")]).await;
        assert_eq!(results[0].score, 100.0);
        assert!(results[0].error.is_none());
    }

    #[test]
    fn test_prepare_jd_marks_unreadable_bytes_as_extraction_failure() {
        let jd = Document::new("corrupt.pdf", &b"not a pdf at all"[..]);
        let prepared = prepare_jd(&jd);
        assert_eq!(prepared.name, "corrupt.pdf");
        assert_eq!(prepared.text.unwrap_err().kind(), "extraction");
    }

    #[test]
    fn test_parse_numeric_score() {
        assert_eq!(parse_match_score(&json!({"Match_score": 87.56})).unwrap(), 87.56);
    }

    #[test]
    fn test_parse_string_score_with_percent_sign() {
        assert_eq!(
            parse_match_score(&json!({"Match_score": "72.5%"})).unwrap(),
            72.5
        );
    }

    #[test]
    fn test_parse_missing_score_is_validation_failure() {
        let err = parse_match_score(&json!({"overall": 50})).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_parse_non_numeric_score_is_validation_failure() {
        let err = parse_match_score(&json!({"Match_score": [1, 2]})).unwrap_err();
        assert_eq!(err.kind(), "validation");
        let err = parse_match_score(&json!({"Match_score": "high"})).unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_clamp_adversarial_scores() {
        assert_eq!(clamp_score(150.0), 100.0);
        assert_eq!(clamp_score(-5.0), 0.0);
        assert_eq!(clamp_score(87.56), 87.56);
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let mut results = vec![
            JdScoreResult {
                jd_file: "low.pdf".to_string(),
                score: 10.0,
                error: None,
            },
            JdScoreResult {
                jd_file: "tie-first.pdf".to_string(),
                score: 80.0,
                error: None,
            },
            JdScoreResult {
                jd_file: "tie-second.pdf".to_string(),
                score: 80.0,
                error: None,
            },
            JdScoreResult {
                jd_file: "failed.pdf".to_string(),
                score: 0.0,
                error: Some("empty JD".to_string()),
            },
        ];
        sort_by_score_descending(&mut results);
        let order: Vec<&str> = results.iter().map(|r| r.jd_file.as_str()).collect();
        assert_eq!(
            order,
            vec!["tie-first.pdf", "tie-second.pdf", "low.pdf", "failed.pdf"]
        );
    }

    #[test]
    fn test_failed_result_serializes_error_field() {
        let result = JdScoreResult {
            jd_file: "bad.pdf".to_string(),
            score: 0.0,
            error: Some("empty JD".to_string()),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"], "empty JD");

        let ok = JdScoreResult {
            jd_file: "good.pdf".to_string(),
            score: 55.5,
            error: None,
        };
        let json = serde_json::to_value(&ok).unwrap();
        assert!(json.get("error").is_none());
    }
}
