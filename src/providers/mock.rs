/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with a short summary
 * - `MockProvider::failing()` - Always fails with a server error
 * - `MockProvider::rate_limited(n)` - Rate limited for the first `n` requests
 * - `MockProvider::unauthorized()` - Rejects every request with an auth error
 *
 * Every request is recorded so tests can assert on request shape.
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, CompletionResponse, Provider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, echoing the first timestamped line of the prompt
    Working,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with a 500 error
    Failing,
    /// Returns 429 for the first `times` requests, then works
    RateLimited { times: usize, retry_after_secs: Option<u64> },
    /// Always fails with a 401 error
    Unauthorized,
    /// Returns an empty response
    Empty,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing summarization behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&CompletionRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn rate_limited(times: usize) -> Self {
        Self::new(MockBehavior::RateLimited {
            times,
            retry_after_secs: None,
        })
    }

    pub fn unauthorized() -> Self {
        Self::new(MockBehavior::Unauthorized)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&CompletionRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of all requests received so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Default summary: the first timestamped line of the prompt as a bullet
    pub fn default_summary(request: &CompletionRequest) -> String {
        let line = request
            .prompt
            .lines()
            .map(|l| l.trim().trim_start_matches("- "))
            .find(|l| l.starts_with('['))
            .or_else(|| request.prompt.lines().map(str::trim).find(|l| !l.is_empty()))
            .unwrap_or("nothing to summarize");
        format!("- {}", line)
    }

    fn success(&self, request: &CompletionRequest) -> CompletionResponse {
        let text = match self.custom_response {
            Some(generator) => generator(request),
            None => Self::default_summary(request),
        };
        CompletionResponse {
            prompt_tokens: Some(request.prompt.len() as u64),
            completion_tokens: Some(text.len() as u64),
            text,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        match self.behavior {
            MockBehavior::Working => Ok(self.success(&request)),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    })
                } else {
                    Ok(self.success(&request))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated provider failure".to_string(),
            }),

            MockBehavior::RateLimited { times, retry_after_secs } => {
                if count < times {
                    Err(ProviderError::RateLimitExceeded {
                        message: format!("Simulated rate limit (request #{})", count + 1),
                        retry_after_secs,
                    })
                } else {
                    Ok(self.success(&request))
                }
            }

            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError(
                "Simulated invalid API key".to_string(),
            )),

            MockBehavior::Empty => Ok(CompletionResponse::default()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(self.success(&request))
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
