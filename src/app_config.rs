use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{AppError, ProviderError};
use crate::retry::RetryPolicy;

/// Application configuration module
/// This module handles loading, validating and saving configuration.
/// Every component receives its settings from here as plain values; there
/// is no global configuration state.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Preferred subtitle language tag
    #[serde(default = "default_language")]
    pub language: String,

    /// Whether to accept a track in another language when the preferred one is missing
    #[serde(default = "default_true")]
    pub allow_fallback: bool,

    /// Summary shape
    #[serde(default)]
    pub summary: SummaryConfig,

    /// Summarizer provider settings
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Video platform access
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Summarization provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SummaryProvider {
    #[default]
    OpenAI,
    Anthropic,
    Ollama,
    /// LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl SummaryProvider {
    /// Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
            Self::LMStudio => "LM Studio",
        }
    }

    /// Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    /// Hosted providers need an API key, local servers do not
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }

    /// Provider-specific environment variable holding the API key
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            _ => None,
        }
    }
}

impl std::fmt::Display for SummaryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    #[serde(default = "String::new")]
    pub model: String,

    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    /// Max concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Max transcript characters per request
    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,

    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,

    /// Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    /// Provider config with defaults
    pub fn new(provider_type: SummaryProvider) -> Self {
        let (model, endpoint, max_chars_per_request, rate_limit) = match provider_type {
            SummaryProvider::OpenAI => (
                default_openai_model(),
                default_openai_endpoint(),
                default_max_chars_per_request(),
                Some(60),
            ),
            SummaryProvider::Anthropic => (
                default_anthropic_model(),
                default_anthropic_endpoint(),
                default_anthropic_max_chars_per_request(),
                // Anthropic's standard tier allows 50 requests per minute
                Some(45),
            ),
            SummaryProvider::Ollama => (
                default_ollama_model(),
                default_ollama_endpoint(),
                default_local_max_chars_per_request(),
                None,
            ),
            SummaryProvider::LMStudio => (
                default_lmstudio_model(),
                default_lmstudio_endpoint(),
                default_local_max_chars_per_request(),
                None,
            ),
        };

        Self {
            provider_type: provider_type.to_lowercase_string(),
            model,
            api_key: String::new(),
            endpoint,
            concurrent_requests: default_concurrent_requests(),
            max_chars_per_request,
            timeout_secs: default_provider_timeout_secs(),
            rate_limit,
        }
    }
}

/// Shape of the requested summary
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryStyle {
    /// A list of key moments, each anchored to a timestamp
    #[default]
    KeyPoints,
    /// A few paragraphs of prose
    Prose,
}

/// Summary settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SummaryConfig {
    /// Upper bound on the summary length in words
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Ask the model to keep timestamp references
    #[serde(default = "default_true")]
    pub preserve_timestamps: bool,

    #[serde(default)]
    pub style: SummaryStyle,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_words: default_max_words(),
            preserve_timestamps: true,
            style: SummaryStyle::default(),
        }
    }
}

/// Summarizer service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SummarizerConfig {
    /// Summarization provider to use
    #[serde(default)]
    pub provider: SummaryProvider,

    /// Available summarization providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common request settings
    #[serde(default)]
    pub common: RequestCommonConfig,
}

/// Request settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RequestCommonConfig {
    /// System prompt sent with every summarization request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Attempts per request, including the first one
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Base backoff for retries in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for RequestCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
        }
    }
}

impl RequestCommonConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, Duration::from_millis(self.retry_backoff_ms))
    }
}

/// Video platform access settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlatformConfig {
    #[serde(default = "default_platform_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_platform_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per request, including the first one
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: default_platform_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_platform_timeout_secs(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl PlatformConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, Duration::from_millis(self.retry_backoff_ms))
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_max_chars_per_request() -> usize {
    12_000
}

fn default_anthropic_max_chars_per_request() -> usize {
    60_000
}

fn default_local_max_chars_per_request() -> usize {
    6_000
}

fn default_provider_timeout_secs() -> u64 {
    60
}

fn default_platform_timeout_secs() -> u64 {
    30
}

fn default_max_words() -> usize {
    250
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000
}

fn default_temperature() -> f32 {
    0.3
}

fn default_true() -> bool {
    true
}

fn default_platform_base_url() -> String {
    "https://www.youtube.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
        .to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_lmstudio_endpoint() -> String {
    "http://localhost:1234/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_lmstudio_model() -> String {
    // Placeholder; users should set to the loaded model name in LM Studio
    "local-model".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional summarizer for YouTube videos. You receive subtitles with timestamps and summarize the key events accurately, without inventing content.".to_string()
}

/// Environment variable that overrides the API key of any provider
pub const API_KEY_ENV_VAR: &str = "YASSWAI_API_KEY";

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_tag(&self.language)
            .context(format!("Invalid subtitle language '{}'", self.language))?;

        if self.summary.max_words == 0 {
            return Err(anyhow!("summary.max_words must be greater than zero"));
        }

        if self.summarizer.get_max_chars_per_request() == 0 {
            return Err(anyhow!("max_chars_per_request must be greater than zero"));
        }

        Ok(())
    }

    /// Load the configuration file, falling back to the user config
    /// directory and then to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        if let Some(user_path) = Self::user_config_path().filter(|p| p.exists()) {
            debug!("Using config file from {:?}", user_path);
            return Self::load(&user_path);
        }

        warn!("Config file not found at {:?}, using defaults.", path);
        Ok(Self::default())
    }

    /// Load and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to open config file: {:?}", path))?;
        serde_json::from_str(&content).context(format!("Failed to parse config file: {:?}", path))
    }

    /// Write the default configuration as pretty JSON.
    ///
    /// An existing file without `force` is a configuration error, a failed
    /// write is an I/O error.
    pub fn write_default(path: &Path, force: bool) -> Result<(), AppError> {
        if path.exists() && !force {
            return Err(AppError::Config(format!(
                "Config file already exists: {:?}. Use --force to overwrite.",
                path
            )));
        }

        let config_json = serde_json::to_string_pretty(&Self::default())
            .map_err(|e| AppError::Config(format!("Failed to serialize default config to JSON: {}", e)))?;
        crate::file_utils::FileManager::write_to_file(path, &config_json)
            .context(format!("Failed to write default config to file: {:?}", path))
            .map_err(|e| AppError::Io(format!("{:#}", e)))
    }

    /// `<config dir>/yasswai/conf.json`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("yasswai").join("conf.json"))
    }

    /// Fill in the API key from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_overrides(|name| std::env::var(name).ok());
    }

    /// Fill in the API key from `lookup`: the generic variable always wins,
    /// the provider-specific one only fills an empty key
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(API_KEY_ENV_VAR) {
            self.summarizer.set_api_key(key);
            return;
        }

        if self.summarizer.get_api_key().is_empty() {
            if let Some(key) = self.summarizer.provider.api_key_env_var().and_then(non_empty) {
                self.summarizer.set_api_key(key);
            }
        }
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            language: default_language(),
            allow_fallback: true,
            summary: SummaryConfig::default(),
            summarizer: SummarizerConfig::default(),
            platform: PlatformConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl SummarizerConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &SummaryProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider entry, created with defaults if missing
    fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str)
        {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.model.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| ProviderConfig::new(self.provider).model)
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.active_provider_config_mut().model = model.into();
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.active_provider_config_mut().api_key = api_key.into();
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.endpoint.clone())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| ProviderConfig::new(self.provider).endpoint)
    }

    /// Get the max transcript characters per request for the active provider
    pub fn get_max_chars_per_request(&self) -> usize {
        self.get_active_provider_config()
            .map(|p| p.max_chars_per_request)
            .filter(|n| *n > 0)
            .unwrap_or_else(|| ProviderConfig::new(self.provider).max_chars_per_request)
    }

    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|t| *t > 0)
            .unwrap_or_else(default_provider_timeout_secs)
    }

    pub fn get_concurrent_requests(&self) -> usize {
        self.get_active_provider_config()
            .map(|p| p.concurrent_requests)
            .filter(|n| *n > 0)
            .unwrap_or_else(default_concurrent_requests)
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        match self.get_active_provider_config() {
            Some(provider_config) => provider_config.rate_limit,
            None => ProviderConfig::new(self.provider).rate_limit,
        }
    }

    /// Fail when the active provider needs a key and none is configured
    pub fn ensure_credentials(&self) -> Result<(), ProviderError> {
        if self.provider.requires_api_key() && self.get_api_key().trim().is_empty() {
            let hint = self
                .provider
                .api_key_env_var()
                .map(|var| format!(" Set {} or {}.", API_KEY_ENV_VAR, var))
                .unwrap_or_default();
            return Err(ProviderError::AuthenticationError(format!(
                "API key is required for the {} provider.{}",
                self.provider.display_name(),
                hint
            )));
        }
        Ok(())
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            provider: SummaryProvider::default(),
            available_providers: vec![
                ProviderConfig::new(SummaryProvider::OpenAI),
                ProviderConfig::new(SummaryProvider::Anthropic),
                ProviderConfig::new(SummaryProvider::Ollama),
                ProviderConfig::new(SummaryProvider::LMStudio),
            ],
            common: RequestCommonConfig::default(),
        }
    }
}
