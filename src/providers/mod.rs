/*!
 * Provider implementations for text-generation services.
 *
 * This module contains client implementations for various LLM providers:
 * - OpenAI: OpenAI API integration (also used for LM Studio)
 * - Anthropic: Anthropic API integration
 * - Ollama: Local LLM server
 * - Mock: scriptable provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{SummarizerConfig, SummaryProvider};
use crate::errors::ProviderError;

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;

/// Provider-neutral completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System prompt to guide the model
    pub system: String,
    /// User prompt
    pub prompt: String,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Temperature for generation
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            max_tokens: 1024,
            temperature: 0.3,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Provider-neutral completion response
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompletionResponse {
    /// Generated text
    pub text: String,
    /// Number of prompt tokens, when reported
    pub prompt_tokens: Option<u64>,
    /// Number of completion tokens, when reported
    pub completion_tokens: Option<u64>,
}

/// Common trait for all LLM providers
///
/// The summarizer only ever talks to this trait, so providers can be used
/// interchangeably and replaced by a mock in tests.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Complete a request using this provider
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}

/// Parse a `retry-after` header value given in seconds
pub(crate) fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Turn a non-success HTTP response into a classified provider error
pub(crate) async fn error_from_response(provider: &str, response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let retry_after = retry_after_secs(response.headers());
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    log::error!("{} API error ({}): {}", provider, status, error_text);
    ProviderError::from_status(status, error_text, retry_after)
}

/// Build the configured provider client
pub fn build_provider(config: &SummarizerConfig) -> Arc<dyn Provider> {
    let timeout = Duration::from_secs(config.get_timeout_secs());
    let model = config.get_model();
    let endpoint = config.get_endpoint();
    let api_key = config.get_api_key();

    match config.provider {
        SummaryProvider::OpenAI => Arc::new(openai::OpenAI::new(api_key, endpoint, model, timeout)),
        SummaryProvider::LMStudio => {
            Arc::new(openai::OpenAI::new(api_key, endpoint, model, timeout).with_name("lmstudio"))
        }
        SummaryProvider::Anthropic => Arc::new(anthropic::Anthropic::new(api_key, endpoint, model, timeout)),
        SummaryProvider::Ollama => Arc::new(ollama::Ollama::new(endpoint, model, timeout)),
    }
}
