//! Generation client — the single point of entry for all LLM calls.
//!
//! ARCHITECTURAL RULE: no other module may call the OpenAI API directly.
//! All generation traffic goes through `GenerationClient`, carried in
//! `AppState` as a trait object so tests can substitute a stub backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// The model used for roadmap generation.
/// Intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gpt-4o-mini";
const MAX_TOKENS: u32 = 4096;
/// Bound on the single outbound generation call. Expiry is reported as an
/// unavailable backend, never retried here.
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("backend returned no completion text")]
    EmptyContent,
}

/// A text-generation backend: one prompt in, raw untrusted text out.
///
/// The response is never treated as structured data here — parsing and
/// validation belong to `roadmap::parser`.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// OpenAI-backed generation client used in production.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    /// Makes a single call to the chat completions API and returns the raw
    /// completion text. Quota and server errors surface as `Api` errors; the
    /// caller maps all variants to `GenerationUnavailable`.
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, GenerationError> {
        let request_body = ChatRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to extract the API's own error message
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "Generation call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        extract_text(chat_response)
    }
}

/// Pulls the completion text out of the first choice. A missing choice,
/// null content, or whitespace-only content all count as an empty reply.
fn extract_text(response: ChatResponse) -> Result<String, GenerationError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(GenerationError::EmptyContent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_from(json: &str) -> ChatResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_text_from_first_choice() {
        let response = response_from(
            r#"{
                "choices": [{"message": {"content": "[{\"id\": \"1\"}]"}}],
                "usage": {"prompt_tokens": 120, "completion_tokens": 40}
            }"#,
        );
        assert_eq!(extract_text(response).unwrap(), "[{\"id\": \"1\"}]");
    }

    #[test]
    fn test_extract_text_without_usage_block() {
        let response = response_from(r#"{"choices": [{"message": {"content": "hello"}}]}"#);
        assert_eq!(extract_text(response).unwrap(), "hello");
    }

    #[test]
    fn test_no_choices_is_empty_content() {
        let response = response_from(r#"{"choices": []}"#);
        assert!(matches!(
            extract_text(response),
            Err(GenerationError::EmptyContent)
        ));
    }

    #[test]
    fn test_null_content_is_empty_content() {
        let response = response_from(r#"{"choices": [{"message": {"content": null}}]}"#);
        assert!(matches!(
            extract_text(response),
            Err(GenerationError::EmptyContent)
        ));
    }

    #[test]
    fn test_whitespace_only_content_is_empty_content() {
        let response = response_from(r#"{"choices": [{"message": {"content": "  \n  "}}]}"#);
        assert!(matches!(
            extract_text(response),
            Err(GenerationError::EmptyContent)
        ));
    }
}
