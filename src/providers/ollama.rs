use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, CompletionResponse, Provider, error_from_response};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model used for completions
    model: String,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    pub content: String,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    stream: bool,
}

/// Chat response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub model: String,
    pub message: ChatMessage,
    pub done: bool,
    /// Number of prompt tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
}

impl ChatRequest {
    /// Create a new non-streaming chat request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
            stream: false,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    pub fn num_predict(mut self, num_predict: u32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).num_predict = Some(num_predict);
        self
    }
}

/// Normalize a configured endpoint into a base URL with scheme
fn normalize_base_url(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "http://localhost:11434".to_string()
    } else if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// Parse a chat response body, accepting a streamed JSONL body as well
pub fn parse_chat_body(body: &str) -> Result<ChatResponse, ProviderError> {
    if let Ok(response) = serde_json::from_str::<ChatResponse>(body) {
        return Ok(response);
    }

    // Streaming responses arrive as one JSON object per line
    let parts: Vec<ChatResponse> = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<ChatResponse>(line).ok())
        .collect();

    let last = parts.last().ok_or_else(|| {
        let preview: String = body.chars().take(500).collect();
        error!("Failed to parse Ollama chat response. Raw response (first 500 chars): {}", preview);
        ProviderError::ParseError("Ollama response contains invalid JSON".to_string())
    })?;

    Ok(ChatResponse {
        model: last.model.clone(),
        message: ChatMessage {
            role: "assistant".to_string(),
            content: parts.iter().map(|p| p.message.content.as_str()).collect(),
        },
        done: true,
        prompt_eval_count: last.prompt_eval_count,
        eval_count: last.eval_count,
    })
}

impl Ollama {
    /// Create a new Ollama client
    pub fn new(endpoint: impl AsRef<str>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: normalize_base_url(endpoint.as_ref()),
            client: Client::builder()
                .timeout(timeout)
                .http1_only()
                .build()
                .unwrap_or_default(),
            model: model.into(),
        }
    }

    /// Chat with the Ollama API
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(&e))?;

        if !response.status().is_success() {
            return Err(error_from_response("Ollama", response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read Ollama response: {}", e)))?;
        parse_chat_body(&body)
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: request.system,
            },
            ChatMessage {
                role: "user".to_string(),
                content: request.prompt,
            },
        ];
        let wire = ChatRequest::new(self.model.clone(), messages)
            .temperature(request.temperature)
            .num_predict(request.max_tokens);

        let response = self.chat(&wire).await?;
        Ok(CompletionResponse {
            text: response.message.content,
            prompt_tokens: response.prompt_eval_count,
            completion_tokens: response.eval_count,
        })
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
