//! Static fallback review and objective code metrics
//!
//! Deliberately cheap, text-level heuristics: substring and keyword counts
//! over the raw source, not a parser. Occurrences inside string literals or
//! comments count the same as code - a known limitation accepted in exchange
//! for working identically across languages.

use super::{Issue, Metrics, ReviewDraft, Severity};
use std::collections::HashSet;

/// Score reported by the fallback path
const FALLBACK_SCORE: f64 = 70.0;

const FALLBACK_SUMMARY: &str = "Static fallback review completed.";

const FALLBACK_SUGGESTIONS: &[&str] = &[
    "Add error handling",
    "Remove debug prints",
    "Follow naming conventions",
    "Write unit tests for main functions",
];

/// Per-language substring markers counted as function definitions.
///
/// Languages outside this table yield zero functions regardless of content.
const FUNCTION_MARKERS: &[(&str, &[&str])] = &[
    ("python", &["def "]),
    ("javascript", &["function ", "=>"]),
    ("java", &["public ", "void "]),
    ("cpp", &["int ", "void ", "class "]),
];

/// Keywords and operators that each count toward the raw complexity score
const COMPLEXITY_KEYWORDS: &[&str] = &["if", "for", "while", "case", "catch", "&&", "||"];

/// Raw complexity counts are divided by this before clamping
const COMPLEXITY_DIVISOR: usize = 3;

/// Upper bound of the reported complexity scale
const MAX_COMPLEXITY: u32 = 10;

fn function_markers(language: &str) -> &'static [&'static str] {
    FUNCTION_MARKERS
        .iter()
        .find(|(lang, _)| *lang == language)
        .map(|(_, markers)| *markers)
        .unwrap_or(&[])
}

/// Count non-overlapping occurrences of `needle` in `haystack`
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

/// Deterministic pattern-based review used when no upstream response exists.
///
/// Scans line by line (1-based) for TODO markers and, for Python only, debug
/// prints. Other languages' print idioms are intentionally not matched.
pub fn fallback_report(code: &str, language: &str) -> ReviewDraft {
    let mut issues = Vec::new();

    for (idx, line) in code.split('\n').enumerate() {
        let line_number = idx + 1;
        if line.contains("TODO") {
            issues.push(Issue {
                severity: Severity::Info,
                line: line_number,
                message: "Pending TODO found".to_string(),
                category: "Comments".to_string(),
                code_snippet: None,
            });
        }
        if language == "python" && line.contains("print(") {
            issues.push(Issue {
                severity: Severity::Warning,
                line: line_number,
                message: "Debug print found".to_string(),
                category: "Code Quality".to_string(),
                code_snippet: None,
            });
        }
    }

    ReviewDraft {
        score: FALLBACK_SCORE,
        issues,
        suggestions: FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
        summary: FALLBACK_SUMMARY.to_string(),
        complexity_override: None,
    }
}

/// Compute objective metrics from the raw source text.
///
/// Deterministic and language-agnostic apart from the function-marker table.
pub fn compute_metrics(code: &str, language: &str) -> Metrics {
    let lines: Vec<&str> = code.split('\n').collect();

    let functions = function_markers(language)
        .iter()
        .map(|marker| count_occurrences(code, marker))
        .sum();

    let classes = count_occurrences(code, "class ");

    let raw_complexity: usize = COMPLEXITY_KEYWORDS
        .iter()
        .map(|keyword| count_occurrences(code, keyword))
        .sum();
    let complexity = ((raw_complexity / COMPLEXITY_DIVISOR) as u32).min(MAX_COMPLEXITY);

    let distinct: HashSet<&str> = lines.iter().copied().collect();
    let duplicates = lines.len() - distinct.len();

    Metrics {
        lines: lines.len(),
        functions,
        classes,
        complexity,
        duplicates,
        test_coverage: None,
    }
}
