//! OpenAI provider (`/chat/completions`).

use async_trait::async_trait;
use reqwest::Client;

use super::chat::{self, ChatMessage, SYSTEM_PROMPT};
use super::{build_instruction, AiProvider, GenerationRequest, ModelInfo, MAX_TOKENS, TEMPERATURE};
use crate::config::ProviderEntry;
use crate::error::{ConfigError, ProviderError};

const PROVIDER: &str = "openai";
const ENV_VAR: &str = "OPENAI_API_KEY";
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    api_base: String,
}

impl OpenAiProvider {
    /// Construct from the `openai` config section.
    ///
    /// Fails with a configuration error when no credential is available, so
    /// a misconfigured provider can never reach `generate_code`.
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
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo::new("gpt-3.5-turbo", "GPT-3.5 Turbo", PROVIDER)]
    }

    async fn generate_code(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        // OpenAI is the one backend that gets no "code only" suffix.
        let instruction = build_instruction(request, false);
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

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str) -> ProviderEntry {
        ProviderEntry {
            api_key: key.into(),
            api_base: None,
        }
    }

    #[test]
    fn test_missing_credential_fails_construction() {
        assert!(OpenAiProvider::from_entry(None, Client::new()).is_err());
        assert!(OpenAiProvider::from_entry(Some(&entry("")), Client::new()).is_err());
    }

    #[test]
    fn test_catalog() {
        let p = OpenAiProvider::from_entry(Some(&entry("sk-test")), Client::new()).unwrap();
        let models = p.available_models();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].id, "gpt-3.5-turbo");
        assert_eq!(models[0].provider, p.name());
    }

    #[test]
    fn test_custom_api_base() {
        let e = ProviderEntry {
            api_key: "sk-test".into(),
            api_base: Some("http://localhost:8080/v1/".into()),
        };
        let p = OpenAiProvider::from_entry(Some(&e), Client::new()).unwrap();
        assert_eq!(p.api_base, "http://localhost:8080/v1");
    }
}
