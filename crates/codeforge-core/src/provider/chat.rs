//! OpenAI-style chat completions wire format.
//!
//! Shared by the OpenAI and Mistral providers, which both expose a
//! `/chat/completions` endpoint with the same request/response shape.
//! Direct HTTP via `reqwest`, no vendor SDK.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;

/// System prompt shared by the chat-completions backends.
pub(crate) const SYSTEM_PROMPT: &str = "You are a helpful coding assistant. \
Generate clean, well-documented code based on the user's requirements.";

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: String) -> Self {
        Self {
            role: "user",
            content,
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Extract a human-readable message from an error response body, falling
/// back to the raw body when it is not the usual `{"error":{"message"}}`.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

/// Perform one chat completion call and return the assistant's text.
///
/// No retry: a non-success status or a payload without `choices[0].message
/// .content` is an error for the caller to surface.
pub(crate) async fn complete(
    client: &Client,
    provider: &'static str,
    url: &str,
    api_key: &str,
    model: &str,
    messages: &[ChatMessage],
    max_tokens: u32,
    temperature: f32,
) -> Result<String, ProviderError> {
    let request_body = CompletionRequest {
        model,
        messages,
        max_tokens,
        temperature,
    };

    debug!(provider, model, url, "Sending chat completion request");

    let response = client
        .post(url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .json(&request_body)
        .send()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;

    if !status.is_success() {
        return Err(ProviderError::Api {
            provider,
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    let completion: CompletionResponse =
        serde_json::from_str(&body).map_err(|_| ProviderError::Malformed { provider })?;

    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(ProviderError::Malformed { provider })?;

    debug!(provider, model, chars = content.len(), "Received completion");
    Ok(content.trim().to_string())
}
