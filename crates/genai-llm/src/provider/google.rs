//! Gemini/Google: requires an API key, uses the `generateContent` endpoint.

use async_trait::async_trait;
use genai_core::{AgentExecutionError, ChatModel, GenaiError, ModelConfig, ModelProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct GoogleClient {
    config: ModelConfig,
    http: Client,
}

impl GoogleClient {
    pub fn new(config: ModelConfig) -> Result<Self, GenaiError> {
        if config.api_key.is_none() {
            return Err(GenaiError::MissingCredential("google".to_string()));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("reqwest client builds with a static config");
        Ok(Self { config, http })
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: String,
}

#[async_trait]
impl ChatModel for GoogleClient {
    async fn chat(&self, prompt: &str) -> Result<String, AgentExecutionError> {
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.config.model, api_key
        );
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
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

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AgentExecutionError::other(format!("malformed response body: {e}")))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| AgentExecutionError::other("provider returned no candidates"))
    }

    fn provider(&self) -> ModelProvider {
        ModelProvider::Google
    }

    fn config(&self) -> &ModelConfig {
        &self.config
    }
}
