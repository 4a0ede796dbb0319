//! Provider registry and model routing.
//!
//! Built once at startup from the configuration and read-only thereafter, so
//! concurrent request tasks share it through an `Arc` with no locking. A
//! provider whose construction fails (missing credential) is logged and
//! skipped; an empty registry is valid and simply serves an empty catalog.

use std::sync::Arc;

use reqwest::Client;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::GatewayError;
use crate::provider::huggingface::HuggingFaceProvider;
use crate::provider::mistral::MistralProvider;
use crate::provider::openai::OpenAiProvider;
use crate::provider::{AiProvider, GenerationRequest, ModelInfo};

pub struct ProviderRegistry {
    /// Registration order is the routing order: on duplicate model ids the
    /// first provider to declare the id wins.
    providers: Vec<Arc<dyn AiProvider>>,
}

impl ProviderRegistry {
    /// Build the registry by attempting each known provider family
    /// independently. Never fails — construction errors disable the family.
    pub fn from_config(config: &Config, client: Client) -> Self {
        let mut registry = Self {
            providers: Vec::new(),
        };

        match OpenAiProvider::from_entry(config.providers.openai.as_ref(), client.clone()) {
            Ok(p) => registry.register(Arc::new(p)),
            Err(e) => error!("Failed to initialize OpenAI provider: {}", e),
        }
        match MistralProvider::from_entry(config.providers.mistral.as_ref(), client.clone()) {
            Ok(p) => registry.register(Arc::new(p)),
            Err(e) => error!("Failed to initialize Mistral provider: {}", e),
        }
        match HuggingFaceProvider::from_entry(config.providers.huggingface.as_ref(), client) {
            Ok(p) => registry.register(Arc::new(p)),
            Err(e) => error!("Failed to initialize HuggingFace provider: {}", e),
        }

        if registry.is_empty() {
            warn!("No AI providers were initialized; the model catalog will be empty");
        }
        registry
    }

    /// Build a registry from explicit providers, in routing order.
    pub fn new(providers: Vec<Arc<dyn AiProvider>>) -> Self {
        let mut registry = Self {
            providers: Vec::new(),
        };
        for p in providers {
            registry.register(p);
        }
        registry
    }

    fn register(&mut self, provider: Arc<dyn AiProvider>) {
        info!(provider = provider.name(), "Provider initialized");
        self.providers.push(provider);
    }

    /// Aggregate catalog across all registered providers, in registry order.
    pub fn all_models(&self) -> Vec<ModelInfo> {
        let mut models = Vec::new();
        for provider in &self.providers {
            let provider_models = provider.available_models();
            info!(
                provider = provider.name(),
                count = provider_models.len(),
                "Retrieved provider models"
            );
            models.extend(provider_models);
        }
        models
    }

    /// Find the provider owning a model id — first match in registry order.
    pub fn find_provider(&self, model_id: &str) -> Option<&Arc<dyn AiProvider>> {
        self.providers
            .iter()
            .find(|p| p.available_models().iter().any(|m| m.id == model_id))
    }

    /// Route a generation request to the provider that owns its model id.
    ///
    /// An unknown model id fails before any network call is made. There is
    /// no fallback to another provider on backend failure.
    pub async fn route(&self, request: &GenerationRequest) -> Result<String, GatewayError> {
        if request.prompt.is_empty() {
            return Err(GatewayError::InvalidRequest("prompt must not be empty".into()));
        }

        let provider = self
            .find_provider(&request.model_id)
            .ok_or_else(|| GatewayError::UnsupportedModel(request.model_id.clone()))?;

        info!(
            provider = provider.name(),
            model = %request.model_id,
            "Dispatching code generation request"
        );
        let code = provider.generate_code(request).await?;
        info!(model = %request.model_id, chars = code.len(), "Code generated");
        Ok(code)
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic in-memory provider; counts generate_code calls so
    /// routing tests can assert that no dispatch happened.
    struct StubProvider {
        name: &'static str,
        model_ids: Vec<&'static str>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubProvider {
        fn new(name: &'static str, model_ids: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                name,
                model_ids,
                calls: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn failing(name: &'static str, model_ids: Vec<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                name,
                model_ids,
                calls: AtomicUsize::new(0),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl AiProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn available_models(&self) -> Vec<ModelInfo> {
            self.model_ids
                .iter()
                .map(|id| ModelInfo::new(id, id, self.name))
                .collect()
        }

        async fn generate_code(
            &self,
            request: &GenerationRequest,
        ) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::Api {
                    provider: self.name,
                    status: 503,
                    message: "backend unavailable".into(),
                });
            }
            Ok(format!("// {} via {}", request.prompt, self.name))
        }
    }

    fn request(model_id: &str) -> GenerationRequest {
        GenerationRequest {
            prompt: "write a function that adds two numbers".into(),
            language: Some("python".into()),
            model_id: model_id.into(),
        }
    }

    #[tokio::test]
    async fn test_route_dispatches_to_owning_provider() {
        let a = StubProvider::new("alpha", vec!["model-a"]);
        let b = StubProvider::new("beta", vec!["model-b"]);
        let registry = ProviderRegistry::new(vec![a.clone(), b.clone()]);

        let code = registry.route(&request("model-b")).await.unwrap();
        assert!(code.contains("beta"));
        assert_eq!(a.calls.load(Ordering::SeqCst), 0);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_model_fails_without_dispatch() {
        let a = StubProvider::new("alpha", vec!["model-a"]);
        let registry = ProviderRegistry::new(vec![a.clone()]);

        let err = registry.route(&request("nonexistent-model")).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedModel(_)));
        assert!(err.is_client_error());
        assert_eq!(a.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicate_model_id_first_match_wins() {
        let first = StubProvider::new("first", vec!["shared-model"]);
        let second = StubProvider::new("second", vec!["shared-model"]);
        let registry = ProviderRegistry::new(vec![first.clone(), second.clone()]);

        let code = registry.route(&request("shared-model")).await.unwrap();
        assert!(code.contains("first"));
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_prompt_is_client_error() {
        let a = StubProvider::new("alpha", vec!["model-a"]);
        let registry = ProviderRegistry::new(vec![a.clone()]);

        let req = GenerationRequest {
            prompt: String::new(),
            language: None,
            model_id: "model-a".into(),
        };
        let err = registry.route(&req).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidRequest(_)));
        assert_eq!(a.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces_as_provider_error() {
        let a = StubProvider::failing("alpha", vec!["model-a"]);
        let registry = ProviderRegistry::new(vec![a]);

        let err = registry.route(&request("model-a")).await.unwrap_err();
        assert!(!err.is_client_error());
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("backend unavailable"));
    }

    #[test]
    fn test_all_models_aggregates_in_registry_order() {
        let a = StubProvider::new("alpha", vec!["a1", "a2"]);
        let b = StubProvider::new("beta", vec!["b1"]);
        let registry = ProviderRegistry::new(vec![a, b]);

        let models = registry.all_models();
        let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn test_empty_registry_serves_empty_catalog() {
        let registry = ProviderRegistry::new(Vec::new());
        assert!(registry.is_empty());
        assert!(registry.all_models().is_empty());
        assert!(registry.find_provider("anything").is_none());
    }

    #[test]
    fn test_from_config_skips_unconfigured_families() {
        // No credentials anywhere: every family should be skipped, not abort.
        let config = Config::default();
        // Guard against ambient env vars leaking into the test.
        if std::env::var("OPENAI_API_KEY").is_ok()
            || std::env::var("MISTRAL_API_KEY").is_ok()
            || std::env::var("HUGGINGFACE_API_KEY").is_ok()
        {
            return;
        }
        let registry = ProviderRegistry::from_config(&config, Client::new());
        assert!(registry.is_empty());
    }
}
