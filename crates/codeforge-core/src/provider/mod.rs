//! AI provider trait and the shared request/catalog types.
//!
//! Each backend (OpenAI, Mistral, HuggingFace) implements [`AiProvider`]:
//! a fixed, hard-coded model catalog plus a single-shot `generate_code`
//! network call. Providers are stateless beyond an API key and a cloned
//! `reqwest::Client`, so one instance safely serves concurrent requests.

pub mod chat;
pub mod huggingface;
pub mod mistral;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// One selectable model in a provider's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Global routing key. Unique within a provider; across providers the
    /// router resolves collisions first-match-wins in registry order.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owning provider family ("openai", "mistral", "huggingface").
    pub provider: String,
}

impl ModelInfo {
    pub fn new(id: &str, name: &str, provider: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            provider: provider.into(),
        }
    }
}

/// A normalized, provider-agnostic code generation request.
///
/// Constructed fresh per call and never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(default)]
    pub language: Option<String>,
    pub model_id: String,
}

/// Sampling temperature used by every provider. Not caller-configurable.
pub const TEMPERATURE: f32 = 0.7;

/// Generated-token cap used by every provider. Not caller-configurable.
pub const MAX_TOKENS: u32 = 2000;

/// Suffix appended by providers that need to be told not to add prose.
pub(crate) const CODE_ONLY_SUFFIX: &str =
    "\nProvide ONLY the code without any explanations or markdown formatting.";

/// Trait for AI code generation backends.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Provider family identifier (matches `ModelInfo::provider`).
    fn name(&self) -> &'static str;

    /// The fixed set of models this backend exposes.
    ///
    /// Pure and infallible — no network call is made.
    fn available_models(&self) -> Vec<ModelInfo>;

    /// Generate source text for the request with a single backend call.
    ///
    /// The returned text is trimmed of leading/trailing whitespace. Failures
    /// are always surfaced as [`ProviderError`] — never retried and never
    /// replaced with an empty result.
    async fn generate_code(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}

/// Build the natural-language instruction sent to a backend.
///
/// Shape: `Generate code{ in <language>} for the following requirement:\n<prompt>`,
/// optionally followed by [`CODE_ONLY_SUFFIX`] for backends that tend to wrap
/// their answer in prose or markdown.
pub(crate) fn build_instruction(request: &GenerationRequest, code_only: bool) -> String {
    let language_part = match request.language.as_deref() {
        Some(lang) if !lang.is_empty() => format!(" in {}", lang),
        _ => String::new(),
    };

    let mut instruction = format!(
        "Generate code{} for the following requirement:\n{}",
        language_part, request.prompt
    );
    if code_only {
        instruction.push_str(CODE_ONLY_SUFFIX);
    }
    instruction
}
