//! Prompt construction for the upstream reviewer

/// System prompt for the upstream reviewer model
pub const REVIEW_SYSTEM: &str =
    "You are an expert code reviewer who provides structured JSON feedback.";

/// Build the user prompt for a review request.
///
/// Pure string formatting. The code and language are embedded as-is; empty
/// code produces a degenerate but well-formed prompt.
pub fn build_prompt(code: &str, language: &str) -> String {
    format!(
        r#"Review this {language} code for:
1. Code quality and readability
2. Modularity and structure
3. Potential bugs and security issues
4. Best practices adherence
5. Performance considerations

Provide your analysis strictly in this JSON format:
{{
  "score": <0-100>,
  "issues": [
    {{"severity": "error|warning|info", "line": <int>, "message": "<text>", "category": "<category_name>"}}
  ],
  "suggestions": ["<tip1>", "<tip2>", ...],
  "summary": "<brief_summary>",
  "metrics": {{"complexity": <1-10>, "maintainability": <1-10>}}
}}

Code:
```{language}
{code}
```"#
    )
}
