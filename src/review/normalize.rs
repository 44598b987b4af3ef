//! Upstream response normalization
//!
//! Reviewer models wrap their JSON in prose or markdown fences more often
//! than not. This module recovers the JSON object between the first `{` and
//! the last `}`, parses it, and maps it onto a `ReviewDraft` with permissive
//! defaults. Anything unusable becomes a `NormalizationFailure` - never a
//! panic, and never an error the pipeline has to handle beyond taking the
//! fallback path. The source code itself is never inspected here.

use super::{Issue, ReviewDraft};
use serde_json::Value;
use std::fmt;

/// Score substituted when the upstream response omits one
const DEFAULT_SCORE: f64 = 75.0;

/// Summary substituted when the upstream response omits one
const DEFAULT_SUMMARY: &str = "Code review completed";

/// Upstream text was present but no usable JSON object could be recovered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationFailure {
    pub reason: &'static str,
}

impl fmt::Display for NormalizationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "normalization failed: {}", self.reason)
    }
}

impl std::error::Error for NormalizationFailure {}

fn malformed() -> NormalizationFailure {
    NormalizationFailure {
        reason: "malformed payload",
    }
}

/// Strip markdown code fences from a response
fn strip_markdown_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let clean = if trimmed.starts_with("```json") {
        trimmed.strip_prefix("```json").unwrap_or(trimmed)
    } else if trimmed.starts_with("```") {
        trimmed.strip_prefix("```").unwrap_or(trimmed)
    } else {
        trimmed
    };
    let clean = if clean.ends_with("```") {
        clean.strip_suffix("```").unwrap_or(clean)
    } else {
        clean
    };
    clean.trim()
}

/// Extract a JSON fragment between the first `open` and the last `close`
fn extract_json_fragment(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if start <= end {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Map a raw upstream response into a `ReviewDraft`.
///
/// Permissive by design: missing fields get fixed defaults, issue entries
/// that do not fit the `Issue` shape are dropped individually rather than
/// failing the whole result, and an upstream complexity is carried as an
/// override only when it is a valid integer in 1..=10.
pub fn normalize(raw: &str) -> Result<ReviewDraft, NormalizationFailure> {
    let clean = strip_markdown_fences(raw);
    let json_str = extract_json_fragment(clean, '{', '}').ok_or_else(malformed)?;
    let value: Value = serde_json::from_str(json_str).map_err(|_| malformed())?;
    let obj = value.as_object().ok_or_else(malformed)?;

    let score = obj
        .get("score")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_SCORE)
        .clamp(0.0, 100.0);

    let issues: Vec<Issue> = obj
        .get("issues")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value::<Issue>(entry.clone()).ok())
                .filter(|issue| issue.line >= 1)
                .collect()
        })
        .unwrap_or_default();

    let suggestions: Vec<String> = obj
        .get("suggestions")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let summary = obj
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_SUMMARY)
        .to_string();

    let complexity_override = obj
        .get("metrics")
        .and_then(|metrics| metrics.get("complexity"))
        .and_then(Value::as_u64)
        .filter(|c| (1..=10).contains(c))
        .map(|c| c as u32);

    Ok(ReviewDraft {
        score,
        issues,
        suggestions,
        summary,
        complexity_override,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::Severity;

    #[test]
    fn test_not_json_at_all() {
        let err = normalize("not json at all").unwrap_err();
        assert_eq!(err.reason, "malformed payload");
    }

    #[test]
    fn test_unbalanced_braces() {
        assert!(normalize("} oops {").is_err());
        assert!(normalize("{ truncated").is_err());
    }

    #[test]
    fn test_well_formed_payload() {
        let draft =
            normalize(r#"{"score": 90, "issues": [], "suggestions": ["x"], "summary": "ok"}"#)
                .unwrap();
        assert_eq!(draft.score, 90.0);
        assert!(draft.issues.is_empty());
        assert_eq!(draft.suggestions, vec!["x".to_string()]);
        assert_eq!(draft.summary, "ok");
        assert!(draft.complexity_override.is_none());
    }

    #[test]
    fn test_json_surrounded_by_prose() {
        let raw = "Here is my review:\n{\"score\": 80}\nHope that helps!";
        let draft = normalize(raw).unwrap();
        assert_eq!(draft.score, 80.0);
    }

    #[test]
    fn test_markdown_fenced_payload() {
        let raw = "```json\n{\"score\": 65, \"summary\": \"needs work\"}\n```";
        let draft = normalize(raw).unwrap();
        assert_eq!(draft.score, 65.0);
        assert_eq!(draft.summary, "needs work");
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let draft = normalize("{}").unwrap();
        assert_eq!(draft.score, 75.0);
        assert!(draft.issues.is_empty());
        assert!(draft.suggestions.is_empty());
        assert_eq!(draft.summary, "Code review completed");
    }

    #[test]
    fn test_non_array_issues_become_empty() {
        let draft = normalize(r#"{"issues": "none", "suggestions": 3}"#).unwrap();
        assert!(draft.issues.is_empty());
        assert!(draft.suggestions.is_empty());
    }

    #[test]
    fn test_bad_issue_entries_dropped_individually() {
        let raw = r#"{"issues": [
            {"severity": "warning", "line": 3, "message": "m", "category": "c"},
            {"line": 4, "message": "no severity", "category": "c"},
            {"severity": "info", "line": 0, "message": "bad line", "category": "c"},
            "not an object"
        ]}"#;
        let draft = normalize(raw).unwrap();
        assert_eq!(draft.issues.len(), 1);
        assert_eq!(draft.issues[0].severity, Severity::Warning);
        assert_eq!(draft.issues[0].line, 3);
    }

    #[test]
    fn test_complexity_override_requires_valid_range() {
        let valid = normalize(r#"{"metrics": {"complexity": 8}}"#).unwrap();
        assert_eq!(valid.complexity_override, Some(8));

        let zero = normalize(r#"{"metrics": {"complexity": 0}}"#).unwrap();
        assert!(zero.complexity_override.is_none());

        let too_big = normalize(r#"{"metrics": {"complexity": 11}}"#).unwrap();
        assert!(too_big.complexity_override.is_none());

        let not_a_number = normalize(r#"{"metrics": {"complexity": "high"}}"#).unwrap();
        assert!(not_a_number.complexity_override.is_none());
    }

    #[test]
    fn test_score_clamped_to_range() {
        assert_eq!(normalize(r#"{"score": 150}"#).unwrap().score, 100.0);
        assert_eq!(normalize(r#"{"score": -5}"#).unwrap().score, 0.0);
    }
}
