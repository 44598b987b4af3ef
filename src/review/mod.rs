//! Code review engine
//!
//! Three pure stages: prompt building, upstream response normalization, and
//! heuristic analysis. `analyze()` merges them into one `AnalysisResult` and
//! never fails - a missing or malformed upstream response degrades to the
//! deterministic static path instead of surfacing an error.

pub mod client;
pub mod heuristics;
pub mod models;
pub mod normalize;
pub mod prompt;

use serde::{Deserialize, Serialize};

/// Severity of a review finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
            Severity::Info => "INFO",
        }
    }
}

/// A single review finding tied to a line of the submitted code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    /// 1-based line number
    pub line: usize,
    pub message: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
}

/// Objective size/complexity metrics computed from the raw source text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub lines: usize,
    pub functions: usize,
    pub classes: usize,
    /// 0-10 scale, clamped
    pub complexity: u32,
    pub duplicates: usize,
    /// Never computed here; present only when a caller supplies it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_coverage: Option<f64>,
}

/// Final review report - the engine's sole output type.
///
/// Immutable once produced; callers may embed it in a persisted record but
/// the engine never touches a result after returning it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: f64,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<String>,
    pub summary: String,
    pub metrics: Metrics,
}

/// Review content before objective metrics are merged in.
///
/// Produced either by the response normalizer (upstream path) or by the
/// static fallback. `complexity_override` is set only when an upstream
/// response supplied a valid complexity of its own; the fallback never
/// overrides the computed value.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDraft {
    pub score: f64,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<String>,
    pub summary: String,
    pub complexity_override: Option<u32>,
}

/// Run the full analysis pipeline over a code submission.
///
/// Objective metrics are always computed from the code itself. The narrative
/// part (score, issues, suggestions, summary) comes from the upstream
/// response when one exists and normalizes cleanly, otherwise from the
/// deterministic fallback.
pub fn analyze(code: &str, language: &str, upstream: Option<&str>) -> AnalysisResult {
    let draft = match upstream {
        Some(raw) => normalize::normalize(raw)
            .unwrap_or_else(|_| heuristics::fallback_report(code, language)),
        None => heuristics::fallback_report(code, language),
    };
    merge(draft, heuristics::compute_metrics(code, language))
}

/// Combine a draft with computed metrics into the final report.
///
/// An upstream complexity override (validated in the normalizer) wins over
/// the heuristic value; everything else in `Metrics` is always heuristic.
pub fn merge(draft: ReviewDraft, mut metrics: Metrics) -> AnalysisResult {
    if let Some(complexity) = draft.complexity_override {
        metrics.complexity = complexity;
    }
    AnalysisResult {
        score: draft.score,
        issues: draft.issues,
        suggestions: draft.suggestions,
        summary: draft.summary,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_with_override(complexity: Option<u32>) -> ReviewDraft {
        ReviewDraft {
            score: 80.0,
            issues: Vec::new(),
            suggestions: Vec::new(),
            summary: "ok".to_string(),
            complexity_override: complexity,
        }
    }

    #[test]
    fn test_merge_upstream_complexity_wins() {
        let metrics = Metrics {
            complexity: 3,
            ..Metrics::default()
        };
        let result = merge(draft_with_override(Some(8)), metrics);
        assert_eq!(result.metrics.complexity, 8);
    }

    #[test]
    fn test_merge_without_override_keeps_heuristic_complexity() {
        let metrics = Metrics {
            complexity: 3,
            ..Metrics::default()
        };
        let result = merge(draft_with_override(None), metrics);
        assert_eq!(result.metrics.complexity, 3);
    }

    #[test]
    fn test_analyze_without_upstream_uses_fallback() {
        let result = analyze("fn main() {}", "rust", None);
        assert_eq!(result.score, 70.0);
        assert_eq!(result.summary, "Static fallback review completed.");
        assert_eq!(result.suggestions.len(), 4);
    }

    #[test]
    fn test_analyze_with_malformed_upstream_uses_fallback() {
        let result = analyze("x = 1", "python", Some("sorry, I can't do that"));
        assert_eq!(result.score, 70.0);
        assert_eq!(result.summary, "Static fallback review completed.");
    }

    #[test]
    fn test_analyze_with_valid_upstream() {
        let raw = r#"{"score": 90, "issues": [], "suggestions": ["x"], "summary": "ok",
                      "metrics": {"complexity": 8, "maintainability": 6}}"#;
        let result = analyze("if a { }\n", "rust", Some(raw));
        assert_eq!(result.score, 90.0);
        assert_eq!(result.summary, "ok");
        assert_eq!(result.suggestions, vec!["x".to_string()]);
        // Upstream complexity overrides the heuristic value
        assert_eq!(result.metrics.complexity, 8);
        // Everything else in metrics is heuristic
        assert_eq!(result.metrics.lines, 2);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
        let parsed: Severity = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, Severity::Error);
    }

    #[test]
    fn test_result_serialization_field_names() {
        let result = analyze("", "python", None);
        let json = serde_json::to_value(&result).unwrap();
        for key in ["score", "issues", "suggestions", "summary", "metrics"] {
            assert!(json.get(key).is_some(), "missing field {}", key);
        }
        let metrics = json.get("metrics").unwrap();
        for key in ["lines", "functions", "classes", "complexity", "duplicates"] {
            assert!(metrics.get(key).is_some(), "missing metrics field {}", key);
        }
        // Absent coverage is omitted, not null
        assert!(metrics.get("test_coverage").is_none());
    }
}
