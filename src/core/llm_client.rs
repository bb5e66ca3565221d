// src/core/llm_client.rs
//! HTTP client for the local Ollama inference endpoint

use crate::errors::PipelineError;
use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

const TAGS_ENDPOINT: &str = "/api/tags";
const CHAT_ENDPOINT: &str = "/api/chat";

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub num_predict: u32,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            num_predict: 1000,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: SamplingOptions,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

pub struct LlmClient {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl LlmClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of the models installed on the endpoint. Doubles as the
    /// reachability probe at startup.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}{}", self.base_url, TAGS_ENDPOINT);
        debug!("Listing models from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| PipelineError::Network {
                target: self.base_url.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::HttpStatus {
                target: url,
                status: status.as_u16(),
            }
            .into());
        }

        let tags: TagsResponse = response
            .json()
            .await
            .context("Failed to parse model list")?;

        let mut names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        names.sort();
        Ok(names)
    }

    /// Non-streaming chat completion; returns the assistant's reply text.
    pub async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: SamplingOptions,
    ) -> Result<String> {
        let url = format!("{}{}", self.base_url, CHAT_ENDPOINT);
        let request = ChatRequest {
            model,
            messages,
            stream: false,
            options,
        };

        info!("Sending chat request to {} (model: {})", url, model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Inference endpoint error {}: {}", status, error_text);
            return Err(PipelineError::Inference(format!(
                "HTTP {}: {}",
                status,
                error_text.trim()
            ))
            .into());
        }

        let body = response.text().await.map_err(|e| self.request_error(e))?;
        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            PipelineError::Inference(format!("malformed response ({}): {}", e, body.trim()))
        })?;

        if let Some(message) = parsed.error {
            return Err(PipelineError::Inference(message).into());
        }

        let content = parsed
            .message
            .map(|m| m.content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(PipelineError::Inference("model returned an empty reply".into()).into());
        }

        debug!("Received {} chars from model", content.len());
        Ok(content)
    }

    fn request_error(&self, err: reqwest::Error) -> PipelineError {
        if err.is_timeout() {
            PipelineError::InferenceTimeout(self.timeout_secs)
        } else if err.is_connect() {
            PipelineError::Network {
                target: self.base_url.clone(),
                message: err.to_string(),
            }
        } else {
            PipelineError::Inference(err.to_string())
        }
    }
}

/// Accepts `OLLAMA_HOST`-style values such as `0.0.0.0:11434` or
/// `http://host:11434/`.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_OLLAMA_URL.to_string();
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}
