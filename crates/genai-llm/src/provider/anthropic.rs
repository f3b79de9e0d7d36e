//! Anthropic: requires an API key, uses the `/v1/messages` endpoint.

use async_trait::async_trait;
use genai_core::{AgentExecutionError, ChatModel, GenaiError, ModelConfig, ModelProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

pub struct AnthropicClient {
    config: ModelConfig,
    http: Client,
}

impl AnthropicClient {
    pub fn new(config: ModelConfig) -> Result<Self, GenaiError> {
        if config.api_key.is_none() {
            return Err(GenaiError::MissingCredential("anthropic".to_string()));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("reqwest client builds with a static config");
        Ok(Self { config, http })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<MessageIn<'a>>,
}

#[derive(Serialize)]
struct MessageIn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

#[async_trait]
impl ChatModel for AnthropicClient {
    async fn chat(&self, prompt: &str) -> Result<String, AgentExecutionError> {
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: self.config.temperature,
            messages: vec![MessageIn {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", self.config.api_key.as_deref().unwrap_or_default())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentExecutionError::timeout(e.to_string())
                } else {
                    AgentExecutionError::other(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_hint = response.text().await.ok();
            return Err(AgentExecutionError::from_http_status(status.as_u16(), body_hint.as_deref()));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AgentExecutionError::other(format!("malformed response body: {e}")))?;

        parsed
            .content
            .into_iter()
            .next()
            .map(|b| b.text)
            .ok_or_else(|| AgentExecutionError::other("provider returned no content blocks"))
    }

    fn provider(&self) -> ModelProvider {
        ModelProvider::Anthropic
    }

    fn config(&self) -> &ModelConfig {
        &self.config
    }
}
