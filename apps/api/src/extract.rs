//! Text Extractor — converts uploaded PDF bytes into plain text.
//!
//! Failure policy: a page with no extractable text contributes nothing; an
//! unreadable document is an `Extraction` error. An `Ok` result may still be
//! an empty string — callers decide whether empty text is terminal for them.

use crate::errors::PipelineError;

/// Extracts text from an in-memory PDF, trimmed of surrounding whitespace.
pub fn extract_pdf_text(name: &str, bytes: &[u8]) -> Result<String, PipelineError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| PipelineError::Extraction(format!("failed to read '{name}': {e}")))?;
    Ok(text.trim().to_string())
}

/// Collapses all whitespace runs (spaces, newlines, tabs) to single spaces.
/// The rubric-scoring pipeline normalizes both sides of the prompt this way
/// so identical documents always produce identical prompts.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_runs() {
        let input = "Senior  ML\n\nEngineer\t4+ years";
        assert_eq!(normalize_whitespace(input), "Senior ML Engineer 4+ years");
    }

    #[test]
    fn test_normalize_trims_ends() {
        assert_eq!(normalize_whitespace("  hello world \n"), "hello world");
    }

    #[test]
    fn test_normalize_empty_input() {
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace("   \n\t "), "");
    }

    #[test]
    fn test_garbage_bytes_are_an_extraction_error() {
        let err = extract_pdf_text("bad.pdf", b"not a pdf at all").unwrap_err();
        assert_eq!(err.kind(), "extraction");
        assert!(err.to_string().contains("bad.pdf"));
    }
}
