//! Mistral provider.
//!
//! Mistral's API speaks the same chat-completions wire format as OpenAI,
//! so only the base URL, catalog, and instruction suffix differ.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::chat::{self, ChatMessage, SYSTEM_PROMPT};
use super::{build_instruction, AiProvider, GenerationRequest, ModelInfo, MAX_TOKENS, TEMPERATURE};
use crate::config::ProviderEntry;
use crate::error::{ConfigError, ProviderError};

const PROVIDER: &str = "mistral";
const ENV_VAR: &str = "MISTRAL_API_KEY";
const DEFAULT_API_BASE: &str = "https://api.mistral.ai/v1";

pub struct MistralProvider {
    client: Client,
    api_key: String,
    api_base: String,
}

impl MistralProvider {
    /// Construct from the `mistral` config section.
    pub fn from_entry(entry: Option<&ProviderEntry>, client: Client) -> Result<Self, ConfigError> {
        let entry = entry
            .filter(|e| !e.api_key.is_empty())
            .ok_or(ConfigError::MissingCredential {
                provider: PROVIDER,
                env_var: ENV_VAR,
            })?;

        Ok(Self {
            client,
            api_key: entry.api_key.clone(),
            api_base: entry
                .api_base
                .as_deref()
                .unwrap_or(DEFAULT_API_BASE)
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

#[async_trait]
impl AiProvider for MistralProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo::new("mistral-tiny", "Mistral Tiny", PROVIDER),
            ModelInfo::new("mistral-small", "Mistral Small", PROVIDER),
            ModelInfo::new("mistral-medium", "Mistral Medium", PROVIDER),
        ]
    }

    async fn generate_code(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        debug!(model = %request.model_id, "Generating code with Mistral");

        let instruction = build_instruction(request, true);
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(instruction),
        ];

        chat::complete(
            &self.client,
            PROVIDER,
            &format!("{}/chat/completions", self.api_base),
            &self.api_key,
            &request.model_id,
            &messages,
            MAX_TOKENS,
            TEMPERATURE,
        )
        .await
    }
}
