//! Defensive decoding of model output.
//!
//! Provider responses are untrusted input: even with a response schema
//! attached, models wrap JSON in markdown fences or surround it with
//! prose. Decoding is a fixed two-step policy applied to every stage:
//! extract the most plausible JSON candidate, then validate it strictly
//! against the expected type. Extraction is forgiving; validation never
//! is — text that yields no valid candidate is an error, not a value.

use crate::error::{PipelineError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extract the body of the first fenced code block, if any.
///
/// Recognizes ```` ```json ````, ```` ```JSON ```` and bare ```` ``` ````
/// fences.
pub fn strip_code_fence(text: &str) -> Option<String> {
    for marker in ["```json", "```JSON", "```"] {
        if let Some(open) = text.find(marker) {
            let body_start = open + marker.len();
            if let Some(close) = text[body_start..].find("```") {
                return Some(text[body_start..body_start + close].trim().to_string());
            }
        }
    }
    None
}

/// Locate a JSON object or array embedded in surrounding prose.
///
/// Scans from the first `{` or `[` and shrinks from the matching
/// closer until the slice parses, so trailing commentary after the
/// payload does not defeat extraction.
pub fn find_json_span(text: &str) -> Option<String> {
    let start = text.find(|c| c == '{' || c == '[')?;
    let candidate = &text[start..];

    if serde_json::from_str::<Value>(candidate).is_ok() {
        return Some(candidate.to_string());
    }

    let close = if candidate.starts_with('{') { '}' } else { ']' };
    let end = candidate.rfind(close)?;
    let shrunk = &candidate[..=end];
    if serde_json::from_str::<Value>(shrunk).is_ok() {
        return Some(shrunk.to_string());
    }

    None
}

/// Extract the best JSON candidate from raw model text.
///
/// Tries, in order: the text as-is, the first fenced block, an embedded
/// object/array. Returns the candidate string without validating its
/// shape.
fn best_candidate(text: &str) -> Option<String> {
    let trimmed = text.trim();

    if serde_json::from_str::<Value>(trimmed).is_ok() {
        return Some(trimmed.to_string());
    }

    if let Some(fenced) = strip_code_fence(trimmed) {
        if serde_json::from_str::<Value>(&fenced).is_ok() {
            return Some(fenced);
        }
        // A fence whose body is still wrapped in prose.
        if let Some(span) = find_json_span(&fenced) {
            return Some(span);
        }
    }

    find_json_span(trimmed)
}

fn truncated(text: &str) -> &str {
    &text[..text.len().min(200)]
}

/// Decode raw model text into an untyped JSON value.
///
/// Fails when no candidate in the text parses as JSON.
pub fn decode_value(text: &str) -> Result<Value> {
    let candidate = best_candidate(text).ok_or_else(|| {
        PipelineError::Other(format!(
            "no JSON found in model output. Raw text (truncated): {}",
            truncated(text.trim())
        ))
    })?;
    serde_json::from_str(&candidate).map_err(PipelineError::Json)
}

/// Decode raw model text into a typed `T`.
///
/// The candidate must both parse as JSON and match the shape of `T`;
/// either failure is surfaced with a truncated excerpt of the raw text.
pub fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    let value = decode_value(text)?;
    serde_json::from_value(value).map_err(|e| {
        PipelineError::Other(format!(
            "model output did not match the expected shape: {e}. Raw text (truncated): {}",
            truncated(text.trim())
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Review {
        overall_score: f64,
    }

    #[test]
    fn test_decode_direct_json() {
        let review: Review = decode_json(r#"{"overall_score": 72.5}"#).unwrap();
        assert_eq!(review, Review { overall_score: 72.5 });
    }

    #[test]
    fn test_decode_fenced_json() {
        let text = "Here you go:\n```json\n{\"overall_score\": 90}\n```\nLet me know!";
        let review: Review = decode_json(text).unwrap();
        assert_eq!(review.overall_score, 90.0);
    }

    #[test]
    fn test_decode_bare_fence() {
        let text = "```\n{\"overall_score\": 55}\n```";
        let review: Review = decode_json(text).unwrap();
        assert_eq!(review.overall_score, 55.0);
    }

    #[test]
    fn test_decode_embedded_in_prose() {
        let text = "Sure! {\"overall_score\": 64} — hope that helps.";
        let review: Review = decode_json(text).unwrap();
        assert_eq!(review.overall_score, 64.0);
    }

    #[test]
    fn test_decode_embedded_array() {
        let text = "The prompts are: [\"a lighthouse\", \"a forest\"] as requested.";
        let prompts: Vec<String> = decode_json(text).unwrap();
        assert_eq!(prompts, vec!["a lighthouse", "a forest"]);
    }

    #[test]
    fn test_decode_rejects_plain_prose() {
        let result = decode_value("I could not produce any JSON for that request.");
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_rejects_shape_mismatch() {
        // Valid JSON, wrong shape for Review.
        let result = decode_json::<Review>(r#"{"score": "high"}"#);
        let message = result.unwrap_err().to_string();
        assert!(message.contains("expected shape"));
    }

    #[test]
    fn test_error_truncates_long_raw_text() {
        let long = "x".repeat(5000);
        let err = decode_value(&long).unwrap_err().to_string();
        assert!(err.len() < 400);
    }

    #[test]
    fn test_strip_code_fence_none_without_fence() {
        assert_eq!(strip_code_fence("no fence here"), None);
    }

    #[test]
    fn test_find_json_span_shrinks_trailing_prose() {
        let span = find_json_span("prefix {\"a\": 1} suffix").unwrap();
        assert_eq!(span, "{\"a\": 1}");
    }
}
