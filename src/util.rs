//! Small shared helpers

/// Truncate a string for display (Unicode-safe)
pub fn truncate_str(s: &str, max_chars: usize) -> &str {
    if s.chars().count() <= max_chars {
        s
    } else {
        let byte_idx = s
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        &s[..byte_idx]
    }
}

/// Map a file extension to a language tag understood by the engine.
///
/// Unrecognized extensions degrade to "unknown", which still gets line and
/// duplicate metrics, just no function counts.
pub fn language_from_extension(ext: &str) -> &'static str {
    match ext {
        "js" | "jsx" => "javascript",
        "ts" | "tsx" => "typescript",
        "py" => "python",
        "java" => "java",
        "cpp" | "cc" => "cpp",
        "go" => "go",
        "rs" => "rust",
        _ => "unknown",
    }
}
