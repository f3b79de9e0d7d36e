//! Ollama: no credential required, talks to a local (or configured) host.

use async_trait::async_trait;
use genai_core::{AgentExecutionError, ChatModel, ModelConfig, ModelProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct OllamaClient {
    config: ModelConfig,
    http: Client,
}

impl OllamaClient {
    pub fn new(config: ModelConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("reqwest client builds with a static config");
        Self { config, http }
    }

    fn base_url(&self) -> &str {
        self.config.endpoint.as_deref().unwrap_or("http://localhost:11434")
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn chat(&self, prompt: &str) -> Result<String, AgentExecutionError> {
        let url = format!("{}/api/generate", self.base_url().trim_end_matches('/'));
        let body = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
            },
        };

        let response = self.http.post(&url).json(&body).send().await.map_err(|e| {
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

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AgentExecutionError::other(format!("malformed response body: {e}")))?;
        Ok(parsed.response)
    }

    fn provider(&self) -> ModelProvider {
        ModelProvider::Ollama
    }

    fn config(&self) -> &ModelConfig {
        &self.config
    }
}
