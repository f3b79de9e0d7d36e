//! A client for the OpenAI chat-completions wire format, reused for
//! `openai`, `deepseek`, `groq` (fixed base URLs) and `azure` (deployment
//! endpoint), per spec.md §4.C.

use async_trait::async_trait;
use genai_core::{AgentExecutionError, ChatModel, ModelConfig, ModelProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct OpenAiCompatibleClient {
    config: ModelConfig,
    base_url: String,
    http: Client,
}

impl OpenAiCompatibleClient {
    pub fn new(config: ModelConfig, base_url: String) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("reqwest client builds with a static config");
        Self {
            config,
            base_url,
            http,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl ChatModel for OpenAiCompatibleClient {
    async fn chat(&self, prompt: &str) -> Result<String, AgentExecutionError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AgentExecutionError::timeout(e.to_string())
            } else {
                AgentExecutionError::other(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body_hint = response.text().await.ok();
            return Err(AgentExecutionError::from_http_status(
                status.as_u16(),
                body_hint.as_deref(),
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentExecutionError::other(format!("malformed response body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AgentExecutionError::other("provider returned no choices"))
    }

    fn provider(&self) -> ModelProvider {
        self.config.provider
    }

    fn config(&self) -> &ModelConfig {
        &self.config
    }
}
