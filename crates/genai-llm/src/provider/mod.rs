//! Per-provider `ChatModel` implementations.

mod anthropic;
mod google;
mod ollama;
mod openai_compatible;

use std::sync::Arc;

use genai_core::{ChatModel, GenaiError, ModelConfig, ModelProvider};

/// Construct the right client for `config.provider`.
pub fn build_client(config: ModelConfig) -> Result<Arc<dyn ChatModel>, GenaiError> {
    match config.provider {
        ModelProvider::Openai => Ok(Arc::new(openai_compatible::OpenAiCompatibleClient::new(
            config,
            "https://api.openai.com/v1".to_string(),
        ))),
        ModelProvider::Deepseek => Ok(Arc::new(openai_compatible::OpenAiCompatibleClient::new(
            config,
            "https://api.deepseek.com".to_string(),
        ))),
        ModelProvider::Groq => Ok(Arc::new(openai_compatible::OpenAiCompatibleClient::new(
            config,
            "https://api.groq.com/openai/v1".to_string(),
        ))),
        ModelProvider::Azure => {
            let endpoint = config
                .endpoint
                .clone()
                .ok_or_else(|| GenaiError::MissingCredential("azure".to_string()))?;
            Ok(Arc::new(openai_compatible::OpenAiCompatibleClient::new(config, endpoint)))
        }
        ModelProvider::Ollama => Ok(Arc::new(ollama::OllamaClient::new(config))),
        ModelProvider::Google => Ok(Arc::new(google::GoogleClient::new(config)?)),
        ModelProvider::Anthropic => Ok(Arc::new(anthropic::AnthropicClient::new(config)?)),
    }
}
