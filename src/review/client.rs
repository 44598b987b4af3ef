//! Upstream reviewer client (OpenRouter chat completions)
//!
//! The only I/O in the review pipeline. Every failure mode here surfaces as
//! an ordinary error; the caller treats any error as absence of an upstream
//! response and takes the static fallback path.

use super::models::{Model, Usage};
use super::prompt::{build_prompt, REVIEW_SYSTEM};
use crate::config::Credential;
use crate::util::truncate_str;
use serde::{Deserialize, Serialize};

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Rate limit retry configuration
const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_SECS: u64 = 2;
const BACKOFF_MULTIPLIER: u64 = 2;

/// Raw upstream response plus usage stats
#[derive(Debug)]
pub struct UpstreamResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    stream: bool,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: String,
}

fn review_request(code: &str, language: &str) -> ChatRequest {
    ChatRequest {
        model: Model::Reviewer.id().to_string(),
        messages: vec![
            Message {
                role: "system".to_string(),
                content: REVIEW_SYSTEM.to_string(),
            },
            Message {
                role: "user".to_string(),
                content: build_prompt(code, language),
            },
        ],
        max_tokens: Model::Reviewer.max_tokens(),
        stream: false,
        response_format: ResponseFormat {
            format_type: "json_object".to_string(),
        },
    }
}

/// Request a review of `code` from the upstream model.
///
/// Retries rate limits with exponential backoff; all other failures return
/// immediately.
pub async fn request_review(
    code: &str,
    language: &str,
    credential: &Credential,
) -> anyhow::Result<UpstreamResponse> {
    let api_key = match credential {
        Credential::Configured(key) => key,
        Credential::Unconfigured => {
            anyhow::bail!("No API key configured. Run 'critic setup' to get started.")
        }
    };

    let request = review_request(code, language);
    let client = reqwest::Client::new();

    let mut retry_count = 0;
    loop {
        let response = client
            .post(OPENROUTER_URL)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
                anyhow::anyhow!("Failed to parse OpenRouter response: {}\n{}", e, text)
            })?;

            let content = parsed
                .choices
                .first()
                .map(|c| c.message.content.clone())
                .unwrap_or_default();

            return Ok(UpstreamResponse {
                content,
                usage: parsed.usage,
            });
        }

        if status.as_u16() == 429 && retry_count < MAX_RETRIES {
            retry_count += 1;
            let backoff = INITIAL_BACKOFF_SECS * BACKOFF_MULTIPLIER.pow(retry_count - 1);
            eprintln!(
                "  OpenRouter rate limited. Retrying in {}s (attempt {}/{})",
                backoff, retry_count, MAX_RETRIES
            );
            tokio::time::sleep(tokio::time::Duration::from_secs(backoff)).await;
            continue;
        }

        let error_msg = match status.as_u16() {
            401 => "Invalid API key. Run 'critic setup' to update it.".to_string(),
            429 => format!(
                "Rate limited by OpenRouter after {} retries. Try again in a few minutes.",
                retry_count
            ),
            500..=599 => format!(
                "OpenRouter server error ({}). The service may be temporarily unavailable.",
                status
            ),
            _ => format!("API error {}: {}", status, truncate_str(&text, 200)),
        };
        return Err(anyhow::anyhow!("{}", error_msg));
    }
}
