/*!
 * Transcript summarization through a text-generation provider.
 *
 * The summarizer turns a `TranscriptDocument` into a `SummaryResult`:
 * - Short transcripts are summarized in a single request.
 * - Longer transcripts are split into chunks at line boundaries, each chunk
 *   is summarized on its own, and the partial summaries are consolidated
 *   until one summary remains.
 *
 * Every provider call goes through the summarizer's `RetryPolicy` and, when
 * one is attached, a shared `RequestGate`.
 */

use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{Config, SummaryStyle};
use crate::errors::{ProviderError, SummaryError};
use crate::language_utils;
use crate::providers::{CompletionRequest, Provider};
use crate::retry::RetryPolicy;
use crate::transcript::TranscriptDocument;
use crate::video_resolver::VideoRef;

pub mod chunking;
pub mod prompts;
pub mod rate_limit;

pub use rate_limit::RequestGate;

use prompts::{PromptKind, SummaryPromptBuilder};

/// Separator between partial summaries in a consolidation request
const PARTIAL_SEPARATOR: &str = "\n\n";

/// Options for one summarization
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOptions {
    /// Upper bound on the summary length in words
    pub max_words: usize,
    /// Ask the model to keep timestamp references
    pub preserve_timestamps: bool,
    pub style: SummaryStyle,
    /// Provider input limit for one user prompt, instructions included;
    /// longer transcripts are chunked
    pub max_input_chars: usize,
}

impl SummaryOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_words: config.summary.max_words,
            preserve_timestamps: config.summary.preserve_timestamps,
            style: config.summary.style,
            max_input_chars: config.summarizer.get_max_chars_per_request(),
        }
    }

    /// Token budget for a response of `max_words` words
    fn max_tokens(&self) -> u32 {
        let words = u32::try_from(self.max_words).unwrap_or(u32::MAX);
        words.saturating_mul(2).max(256)
    }
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Outcome of a summarization
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryResult {
    pub source_video: VideoRef,
    pub summary_text: String,
    /// Number of transcript chunks summarized
    pub chunk_count: usize,
    /// Number of successful provider requests
    pub request_count: usize,
    /// Language tag of the transcript
    pub language: String,
}

/// Context for one summarization
#[derive(Debug, Clone, Copy)]
pub struct SummaryInput<'a> {
    pub video: &'a VideoRef,
    pub title: Option<&'a str>,
    /// Language tag of the transcript
    pub language: &'a str,
}

/// Summarizer client
#[derive(Debug, Clone)]
pub struct Summarizer {
    provider: Arc<dyn Provider>,
    retry: RetryPolicy,
    system_prompt: String,
    temperature: f32,
    gate: Option<Arc<RequestGate>>,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn Provider>, retry: RetryPolicy, system_prompt: impl Into<String>) -> Self {
        Self {
            provider,
            retry,
            system_prompt: system_prompt.into(),
            temperature: 0.3,
            gate: None,
        }
    }

    /// Create a summarizer with the configured prompt, temperature and retries
    pub fn from_config(provider: Arc<dyn Provider>, config: &Config) -> Self {
        let common = &config.summarizer.common;
        Self::new(provider, common.retry_policy(), common.system_prompt.clone()).with_temperature(common.temperature)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Route every request through a shared gate
    pub fn with_gate(mut self, gate: Arc<RequestGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Summarize a transcript
    pub async fn summarize(
        &self,
        transcript: &TranscriptDocument,
        input: SummaryInput<'_>,
        options: &SummaryOptions,
    ) -> Result<SummaryResult, SummaryError> {
        if transcript.is_empty() {
            return Err(SummaryError::EmptyTranscript);
        }

        let language_name = language_utils::get_language_name(input.language)
            .unwrap_or_else(|_| input.language.to_string());
        let prompts = SummaryPromptBuilder::new(options, language_name).with_title(input.title);
        let system = prompts.system_prompt(&self.system_prompt);

        let lines = transcript.rendered_lines();
        // There are never more chunks than lines, so this bounds the part numbers
        let overhead = prompts.overhead(PromptKind::Full).max(prompts.overhead(PromptKind::Chunk {
            index: lines.len(),
            total: lines.len(),
        }));
        let chunks = chunking::chunk_lines(&lines, body_budget(options.max_input_chars, overhead));
        let chunk_count = chunks.len();
        let mut request_count = 0;

        info!(
            "Summarizing {} ({} lines, {} chunk(s)) with {}",
            input.video,
            lines.len(),
            chunk_count,
            self.provider.name()
        );

        let summary_text = if chunk_count == 1 {
            request_count += 1;
            self.request(&system, prompts.user_prompt(PromptKind::Full, &chunks[0]), options)
                .await?
        } else {
            let mut partials = Vec::with_capacity(chunk_count);
            for (index, chunk) in chunks.iter().enumerate() {
                debug!("Summarizing chunk {}/{}", index + 1, chunk_count);
                let kind = PromptKind::Chunk {
                    index: index + 1,
                    total: chunk_count,
                };
                partials.push(self.request(&system, prompts.user_prompt(kind, chunk), options).await?);
                request_count += 1;
            }
            self.consolidate(&system, &prompts, partials, options, &mut request_count)
                .await?
        };

        Ok(SummaryResult {
            source_video: input.video.clone(),
            summary_text,
            chunk_count,
            request_count,
            language: input.language.to_string(),
        })
    }

    /// Merge partial summaries until one remains.
    ///
    /// While the joined partials exceed the input limit they are merged in
    /// groups that fit; once they fit (or grouping stops reducing their
    /// number) a final request merges all of them.
    async fn consolidate(
        &self,
        system: &str,
        prompts: &SummaryPromptBuilder<'_>,
        mut partials: Vec<String>,
        options: &SummaryOptions,
        request_count: &mut usize,
    ) -> Result<String, SummaryError> {
        let max_chars = body_budget(options.max_input_chars, prompts.overhead(PromptKind::Consolidation));

        while partials.len() > 1 && partials.join(PARTIAL_SEPARATOR).chars().count() > max_chars {
            let groups = chunking::pack(&partials, max_chars, PARTIAL_SEPARATOR);
            if groups.len() >= partials.len() {
                break;
            }

            debug!("Consolidating {} partial summaries in {} group(s)", partials.len(), groups.len());
            let mut merged = Vec::with_capacity(groups.len());
            for group in groups {
                if group.len() == 1 {
                    merged.extend(group);
                    continue;
                }
                let body = group.join(PARTIAL_SEPARATOR);
                merged.push(
                    self.request(system, prompts.user_prompt(PromptKind::Consolidation, &body), options)
                        .await?,
                );
                *request_count += 1;
            }
            partials = merged;
        }

        match partials.len() {
            0 => Err(SummaryError::EmptyTranscript),
            1 => Ok(partials.remove(0)),
            _ => {
                let body = partials.join(PARTIAL_SEPARATOR);
                let summary = self
                    .request(system, prompts.user_prompt(PromptKind::Consolidation, &body), options)
                    .await?;
                *request_count += 1;
                Ok(summary)
            }
        }
    }

    /// One provider request with gate and retries
    async fn request(&self, system: &str, prompt: String, options: &SummaryOptions) -> Result<String, SummaryError> {
        let request = CompletionRequest::new(system, prompt)
            .max_tokens(options.max_tokens())
            .temperature(self.temperature);

        let label = format!("{} request", self.provider.name());
        let response = self
            .retry
            .run(
                &label,
                || {
                    let request = request.clone();
                    async move {
                        let _permit = match &self.gate {
                            Some(gate) => Some(gate.acquire().await?),
                            None => None,
                        };
                        self.provider.complete(request).await
                    }
                },
                ProviderError::is_retryable,
                retry_after_hint,
            )
            .await?;

        if let (Some(prompt_tokens), Some(completion_tokens)) = (response.prompt_tokens, response.completion_tokens) {
            debug!("Token usage: {} prompt, {} completion", prompt_tokens, completion_tokens);
        }

        let text = response.text.trim();
        if text.is_empty() {
            return Err(SummaryError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

/// Characters left for subtitles or partial summaries once the fixed prompt
/// text is counted against the input limit
fn body_budget(max_input_chars: usize, overhead: usize) -> usize {
    let budget = max_input_chars.saturating_sub(overhead);
    if budget == 0 {
        warn!(
            "Input limit of {} chars does not cover the {} chars of prompt text; sending one item per request",
            max_input_chars, overhead
        );
    }
    budget.max(1)
}

/// Provider-supplied wait before the next attempt
fn retry_after_hint(error: &ProviderError) -> Option<Duration> {
    match error {
        ProviderError::RateLimitExceeded {
            retry_after_secs: Some(secs),
            ..
        } => Some(Duration::from_secs(*secs)),
        _ => None,
    }
}
