//! The `ChatModel` contract the workflow engine invokes against. Provider
//! client libraries themselves are out of scope (spec.md §1) — this is
//! just the trait the Model Factory's clients implement.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::AgentExecutionError;

/// Supported model providers, keyed exactly as spec.md §4.C names them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    Openai,
    Google,
    Anthropic,
    Ollama,
    Deepseek,
    Groq,
    Azure,
}

impl ModelProvider {
    /// Parse the free-form provider string an `AgentConfig` carries,
    /// accepting the aliases spec.md §4.C lists (`gemini`/`google`,
    /// `anthropic`/`claude`, `azure`/`azure-openai`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "openai" => Some(Self::Openai),
            "gemini" | "google" => Some(Self::Google),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "ollama" => Some(Self::Ollama),
            "deepseek" => Some(Self::Deepseek),
            "groq" => Some(Self::Groq),
            "azure" | "azure-openai" => Some(Self::Azure),
            _ => None,
        }
    }
}

/// Fully-resolved configuration for constructing one model client.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub provider: ModelProvider,
    pub model: String,
    pub temperature: f32,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub extra: HashMap<String, String>,
}

/// A constructed, cached model client. Implementations wrap a specific
/// provider's wire protocol; the engine only ever calls `chat`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, prompt: &str) -> Result<String, AgentExecutionError>;

    fn provider(&self) -> ModelProvider;

    fn config(&self) -> &ModelConfig;
}

impl fmt::Debug for dyn ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatModel")
            .field("provider", &self.provider())
            .field("config", &self.config())
            .finish()
    }
}
