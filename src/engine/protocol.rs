//! Wire protocol for talking to the scoring engine
//!
//! The engine speaks a line-oriented protocol over its stdin/stdout:
//! - Request: one line per query batch. Queries are joined by a single TAB
//!   so a multi-query batch stays on one line without losing the boundary
//!   between queries. The line is terminated by `\n`.
//! - Response: one line containing a JSON object that maps candidate
//!   identifiers to numeric similarity scores.
//! - Termination: the literal payload `quit`, written without a trailing
//!   newline. It is the only request the engine does not answer.

use std::collections::HashMap;
use std::fmt;

/// Similarity scores keyed by candidate identifier, one entry per
/// candidate the engine was started with.
pub type ScoreMap = HashMap<String, f64>;

/// Separator between queries in a batch request.
pub const QUERY_SEPARATOR: char = '\t';

/// Termination payload. The engine exits without replying.
pub const QUIT_PAYLOAD: &[u8] = b"quit";

/// Maximum payload bytes echoed back in a protocol error.
const EXCERPT_LEN: usize = 256;

/// A response payload that could not be decoded into a score map.
///
/// Carries a truncated copy of the offending payload: a malformed response
/// will not improve on retry, so the payload itself is the diagnostic.
#[derive(Debug)]
pub struct ProtocolError {
    /// Why the payload was rejected
    pub reason: String,
    /// Truncated copy of the payload
    pub excerpt: String,
}

impl ProtocolError {
    fn new(reason: impl Into<String>, payload: &str) -> Self {
        Self {
            reason: reason.into(),
            excerpt: excerpt(payload),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (payload: {:?})", self.reason, self.excerpt)
    }
}

impl std::error::Error for ProtocolError {}

/// Encode a query batch as a single request line.
pub fn encode_queries(queries: &[String]) -> String {
    let mut line = String::new();
    for (i, query) in queries.iter().enumerate() {
        if i > 0 {
            line.push(QUERY_SEPARATOR);
        }
        line.push_str(query);
    }
    line.push('\n');
    line
}

/// Decode a response line into a score map.
///
/// The payload must be a JSON object whose values are all numeric. Anything
/// else (invalid JSON, a non-object document, a non-numeric score) is a
/// protocol error.
pub fn decode_scores(payload: &str) -> Result<ScoreMap, ProtocolError> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| ProtocolError::new(format!("invalid JSON: {e}"), payload))?;

    let object = value
        .as_object()
        .ok_or_else(|| ProtocolError::new("expected a JSON object of name to score", payload))?;

    let mut scores = ScoreMap::with_capacity(object.len());
    for (name, score) in object {
        let score = score.as_f64().ok_or_else(|| {
            ProtocolError::new(format!("non-numeric score for {name:?}"), payload)
        })?;
        scores.insert(name.clone(), score);
    }

    Ok(scores)
}

/// Truncate a payload for inclusion in an error message.
fn excerpt(payload: &str) -> String {
    let trimmed = payload.trim_end();
    match trimmed.char_indices().nth(EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_single_query() {
        assert_eq!(encode_queries(&["red car".to_string()]), "red car\n");
    }

    #[test]
    fn test_encode_batch_preserves_boundaries() {
        let queries = vec!["cat".to_string(), "dog".to_string()];
        assert_eq!(encode_queries(&queries), "cat\tdog\n");
    }

    #[test]
    fn test_encode_empty_batch() {
        assert_eq!(encode_queries(&[]), "\n");
    }

    #[test]
    fn test_decode_valid_scores() {
        let scores = decode_scores(r#"{"cat.jpeg": 0.9, "dog.jpeg": 0.95}"#).unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores["cat.jpeg"], 0.9);
        assert_eq!(scores["dog.jpeg"], 0.95);
    }

    #[test]
    fn test_decode_empty_object() {
        let scores = decode_scores("{}").unwrap();
        assert!(scores.is_empty());
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        let err = decode_scores("not json at all").unwrap_err();
        assert!(err.reason.contains("invalid JSON"));
        assert_eq!(err.excerpt, "not json at all");
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let err = decode_scores("[0.9, 0.95]").unwrap_err();
        assert!(err.reason.contains("expected a JSON object"));
    }

    #[test]
    fn test_decode_rejects_non_numeric_score() {
        let err = decode_scores(r#"{"cat.jpeg": "high"}"#).unwrap_err();
        assert!(err.reason.contains("cat.jpeg"));
    }

    #[test]
    fn test_excerpt_truncates_long_payloads() {
        let payload = "x".repeat(1000);
        let err = decode_scores(&payload).unwrap_err();
        assert!(err.excerpt.len() < payload.len());
        assert!(err.excerpt.ends_with("..."));
    }

    #[test]
    fn test_quit_payload_has_no_newline() {
        assert_eq!(QUIT_PAYLOAD, b"quit");
    }
}
