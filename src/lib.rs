/*!
 * # YASSWAI - Yet Another Subtitle Summarizer with AI
 *
 * A Rust library that fetches the subtitles of YouTube videos, formats them
 * with `[hh:mm:ss - hh:mm:ss]` timestamps and summarizes them with AI.
 *
 * ## Features
 *
 * - Video lookup from IDs or any common YouTube URL form
 * - Deterministic subtitle track selection with manual/auto-generated and
 *   language-family fallback
 * - Summaries through various AI providers:
 *   - OpenAI API
 *   - Anthropic API
 *   - Ollama (local LLM)
 *   - LM Studio (OpenAI-compatible local server)
 * - Chunking and consolidation for transcripts longer than the provider limit
 * - Batch processing with a shared request gate
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `video_resolver`: Video reference parsing and metadata lookup
 * - `subtitle_fetcher`: Track selection and download
 * - `transcript`: Cues and timestamp formatting
 * - `summarizer`: Chunking, prompts, rate limiting and consolidation
 * - `output`: Rendering to stdout or files
 * - `platform`: The `VideoPlatform` seam and the YouTube client
 * - `providers`: The `Provider` seam and LLM clients:
 *   - `providers::openai`: OpenAI API client (also LM Studio)
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::ollama`: Ollama API client
 *   - `providers::mock`: Scriptable provider for tests
 * - `app_controller`: Main application controller
 * - `app_config`: Configuration management
 * - `language_utils`: Language tag utilities
 * - `retry`: Bounded retry with exponential backoff
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod output;
pub mod platform;
pub mod providers;
pub mod retry;
pub mod subtitle_fetcher;
pub mod summarizer;
pub mod transcript;
pub mod video_resolver;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunOptions};
pub use errors::{AppError, ProviderError, SubtitleError, SummaryError, VideoError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use summarizer::{SummaryOptions, SummaryResult};
pub use transcript::{SubtitleCue, TimestampedLine, TranscriptDocument};
pub use video_resolver::VideoRef;
