//! The process-wide, cached model client factory.

use std::sync::Arc;

use dashmap::DashMap;
use genai_core::{AgentDefinition, ChatModel, GenaiError, ModelConfig, ModelProvider};

use crate::provider;

/// Cache key: provider + model name + temperature, rounded to the nearest
/// hundredth so the `f32` participates in `Eq`/`Hash` without pulling in a
/// float-ordering crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ModelKey {
    provider: ModelProvider,
    model: String,
    temperature_hundredths: i32,
}

impl ModelKey {
    fn new(provider: ModelProvider, model: &str, temperature: f32) -> Self {
        Self {
            provider,
            model: model.to_string(),
            temperature_hundredths: (temperature * 100.0).round() as i32,
        }
    }
}

/// Process-wide cache of constructed `ChatModel` clients.
pub struct ModelFactory {
    cache: DashMap<ModelKey, Arc<dyn ChatModel>>,
}

impl Default for ModelFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelFactory {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Obtain a cached model client for the agent's model spec, constructing
    /// one on a cache miss.
    pub fn model_for(&self, agent: &AgentDefinition) -> Result<Arc<dyn ChatModel>, GenaiError> {
        let provider = ModelProvider::parse(&agent.model.provider)
            .ok_or_else(|| GenaiError::UnsupportedProvider(agent.model.provider.clone()))?;
        self.get_or_create(provider, &agent.model.name, agent.model.temperature)
    }

    pub fn get_or_create(
        &self,
        provider: ModelProvider,
        model: &str,
        temperature: f32,
    ) -> Result<Arc<dyn ChatModel>, GenaiError> {
        let key = ModelKey::new(provider, model, temperature);
        if let Some(existing) = self.cache.get(&key) {
            return Ok(existing.clone());
        }

        let config = build_config(provider, model, temperature)?;
        let client = provider::build_client(config)?;
        self.cache.insert(key, client.clone());
        Ok(client)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Pre-populate the cache with a specific client, bypassing provider
    /// construction and credential lookup entirely. Used to wire in a
    /// deterministic mock for engine tests; also a legitimate escape hatch
    /// for a caller that already holds a configured client.
    pub fn register(&self, provider: ModelProvider, model: &str, temperature: f32, client: Arc<dyn ChatModel>) {
        self.cache.insert(ModelKey::new(provider, model, temperature), client);
    }
}

fn build_config(provider: ModelProvider, model: &str, temperature: f32) -> Result<ModelConfig, GenaiError> {
    use std::collections::HashMap;

    let (api_key, endpoint, timeout_secs) = match provider {
        ModelProvider::Openai => (
            required_env("OPENAI_API_KEY", provider)?,
            None,
            60,
        ),
        ModelProvider::Google => (
            first_env(&["GOOGLE_API_KEY", "GEMINI_API_KEY"])
                .ok_or_else(|| GenaiError::MissingCredential("google".to_string()))?
                .into(),
            None,
            60,
        ),
        ModelProvider::Anthropic => (
            required_env("ANTHROPIC_API_KEY", provider)?,
            None,
            60,
        ),
        ModelProvider::Ollama => (
            None,
            Some(std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())),
            60,
        ),
        ModelProvider::Deepseek => (
            required_env("DEEPSEEK_API_KEY", provider)?,
            Some("https://api.deepseek.com".to_string()),
            60,
        ),
        ModelProvider::Groq => (
            required_env("GROQ_API_KEY", provider)?,
            Some("https://api.groq.com/openai/v1".to_string()),
            60,
        ),
        ModelProvider::Azure => {
            let key = required_env("AZURE_OPENAI_API_KEY", provider)?;
            let endpoint = std::env::var("AZURE_OPENAI_ENDPOINT")
                .map_err(|_| GenaiError::MissingCredential("azure".to_string()))?;
            (key, Some(endpoint), 60)
        }
    };

    Ok(ModelConfig {
        provider,
        model: model.to_string(),
        temperature,
        api_key: api_key_to_option(api_key),
        endpoint,
        timeout_secs,
        extra: HashMap::new(),
    })
}

fn api_key_to_option(key: Option<String>) -> Option<String> {
    key
}

fn required_env(var: &str, provider: ModelProvider) -> Result<Option<String>, GenaiError> {
    std::env::var(var)
        .map(Some)
        .map_err(|_| GenaiError::MissingCredential(format!("{provider:?}").to_lowercase()))
}

fn first_env(vars: &[&str]) -> Option<String> {
    vars.iter().find_map(|v| std::env::var(v).ok())
}
