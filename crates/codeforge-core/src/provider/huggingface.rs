//! HuggingFace Inference API provider.
//!
//! Unlike the chat backends, the Inference API takes a raw text prompt per
//! model endpoint and answers with `[{"generated_text": ...}]`. Instruction
//! models from the CodeLlama family need the `[INST]` wrapping; base models
//! take the instruction as-is. Responses that open with a fenced code block
//! are unwrapped before being returned.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{build_instruction, AiProvider, GenerationRequest, ModelInfo, MAX_TOKENS, TEMPERATURE};
use crate::config::ProviderEntry;
use crate::error::{ConfigError, ProviderError};

const PROVIDER: &str = "huggingface";
const ENV_VAR: &str = "HUGGINGFACE_API_KEY";
const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co/models";

const TOP_P: f32 = 0.95;

pub struct HuggingFaceProvider {
    client: Client,
    api_key: String,
    api_base: String,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct InferenceOutput {
    #[serde(default)]
    generated_text: String,
}

impl HuggingFaceProvider {
    /// Construct from the `huggingface` config section.
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

    /// Wrap the instruction for CodeLlama-family models, which are trained
    /// on the `[INST]` chat template. Other models take the plain prompt.
    fn format_prompt(model_id: &str, instruction: &str) -> String {
        if model_id.to_lowercase().contains("codellama") {
            format!("<s>[INST] {} [/INST]", instruction)
        } else {
            instruction.to_string()
        }
    }

    /// Strip a wrapping fenced code block, if present.
    ///
    /// Only fires when the text starts with ``` and spans more than two
    /// lines; a bare marker or a degenerate two-line fence is left alone.
    fn strip_code_fence(text: &str) -> String {
        if !text.starts_with("```") {
            return text.to_string();
        }
        let lines: Vec<&str> = text.split('\n').collect();
        if lines.len() > 2 {
            lines[1..lines.len() - 1].join("\n")
        } else {
            text.to_string()
        }
    }
}

#[async_trait]
impl AiProvider for HuggingFaceProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo::new("bigcode/starcoder", "StarCoder", PROVIDER),
            ModelInfo::new(
                "codellama/CodeLlama-34b-Instruct-hf",
                "Code Llama 34B",
                PROVIDER,
            ),
            ModelInfo::new("bigcode/starcoderplus", "StarCoder Plus", PROVIDER),
        ]
    }

    async fn generate_code(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let instruction = build_instruction(request, true);
        let prompt = Self::format_prompt(&request.model_id, &instruction);
        let url = format!("{}/{}", self.api_base, request.model_id);

        debug!(model = %request.model_id, url = %url, "Sending inference request");

        let payload = InferenceRequest {
            inputs: &prompt,
            parameters: InferenceParameters {
                max_new_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
                top_p: TOP_P,
                return_full_text: false,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: PROVIDER,
                source,
            })?;

        if !status.is_success() {
            return Err(ProviderError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                message: body,
            });
        }

        let outputs: Vec<InferenceOutput> =
            serde_json::from_str(&body).map_err(|_| ProviderError::Malformed {
                provider: PROVIDER,
            })?;

        let generated = outputs
            .into_iter()
            .next()
            .ok_or(ProviderError::Malformed {
                provider: PROVIDER,
            })?
            .generated_text;

        Ok(Self::strip_code_fence(generated.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codellama_inst_wrapping() {
        let wrapped =
            HuggingFaceProvider::format_prompt("codellama/CodeLlama-34b-Instruct-hf", "do x");
        assert_eq!(wrapped, "<s>[INST] do x [/INST]");

        // Case-insensitive substring match.
        let wrapped = HuggingFaceProvider::format_prompt("CODELLAMA-7b", "do x");
        assert!(wrapped.starts_with("<s>[INST]"));

        let plain = HuggingFaceProvider::format_prompt("bigcode/starcoder", "do x");
        assert_eq!(plain, "do x");
    }

    #[test]
    fn test_strip_code_fence() {
        let fenced = "```python\nprint('hi')\n```";
        assert_eq!(HuggingFaceProvider::strip_code_fence(fenced), "print('hi')");

        let multi = "```\nline1\nline2\n```";
        assert_eq!(
            HuggingFaceProvider::strip_code_fence(multi),
            "line1\nline2"
        );
    }

    #[test]
    fn test_strip_code_fence_leaves_short_or_plain_text() {
        assert_eq!(
            HuggingFaceProvider::strip_code_fence("print('hi')"),
            "print('hi')"
        );
        // Two lines or fewer: not a well-formed fence, keep as-is.
        assert_eq!(HuggingFaceProvider::strip_code_fence("```\n```"), "```\n```");
    }

    #[test]
    fn test_catalog() {
        let entry = ProviderEntry {
            api_key: "hf_test".into(),
            api_base: None,
        };
        let p = HuggingFaceProvider::from_entry(Some(&entry), Client::new()).unwrap();
        let models = p.available_models();
        assert_eq!(models.len(), 3);
        assert!(models.iter().all(|m| m.provider == PROVIDER));
    }

    #[test]
    fn test_inference_output_parse() {
        let body = r#"[{"generated_text": "def add(a, b):\n    return a + b"}]"#;
        let outputs: Vec<InferenceOutput> = serde_json::from_str(body).unwrap();
        assert!(outputs[0].generated_text.starts_with("def add"));
    }
}
