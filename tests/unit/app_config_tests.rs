/*!
 * Tests for application configuration functionality
 */

use std::collections::HashMap;

use yasswai::app_config::{Config, LogLevel, SummaryProvider, SummaryStyle, API_KEY_ENV_VAR};
use yasswai::errors::{AppError, ProviderError};

use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.language, "en");
    assert!(config.allow_fallback);
    assert_eq!(config.summary.max_words, 250);
    assert!(config.summary.preserve_timestamps);
    assert_eq!(config.summary.style, SummaryStyle::KeyPoints);
    assert_eq!(config.summarizer.provider, SummaryProvider::OpenAI);
    assert_eq!(config.summarizer.available_providers.len(), 4);
    assert_eq!(config.log_level, LogLevel::Info);

    let anthropic = config
        .summarizer
        .get_provider_config(&SummaryProvider::Anthropic)
        .expect("Anthropic provider config should exist");
    assert_eq!(anthropic.model, "claude-3-haiku-20240307");
    assert_eq!(anthropic.max_chars_per_request, 60_000);
    assert_eq!(anthropic.rate_limit, Some(45));
}

#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.language = "xyz".to_string();
    assert!(config.validate().is_err());

    config.language = "pt-BR".to_string();
    assert!(config.validate().is_ok());

    config.summary.max_words = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_getters_withActiveProvider_shouldReadThatEntry() {
    let mut config = Config::default();
    config.summarizer.provider = SummaryProvider::Ollama;

    assert_eq!(config.summarizer.get_model(), "llama3.2:3b");
    assert_eq!(config.summarizer.get_endpoint(), "http://localhost:11434");
    assert_eq!(config.summarizer.get_max_chars_per_request(), 6_000);
    assert_eq!(config.summarizer.get_rate_limit(), None);
}

#[test]
fn test_set_model_withMissingProviderEntry_shouldCreateIt() {
    let mut config = Config::default();
    config.summarizer.available_providers.clear();
    config.summarizer.provider = SummaryProvider::Anthropic;

    config.summarizer.set_model("claude-3-5-sonnet-latest");

    assert_eq!(config.summarizer.available_providers.len(), 1);
    assert_eq!(config.summarizer.get_model(), "claude-3-5-sonnet-latest");
    // Other fields keep their defaults
    assert_eq!(config.summarizer.get_rate_limit(), Some(45));
}

#[test]
fn test_ensure_credentials_withoutKey_shouldFailForHostedProviders() {
    let mut config = Config::default();
    let result = config.summarizer.ensure_credentials();
    assert!(matches!(result, Err(ProviderError::AuthenticationError(_))));

    config.summarizer.provider = SummaryProvider::Ollama;
    assert!(config.summarizer.ensure_credentials().is_ok());

    config.summarizer.provider = SummaryProvider::LMStudio;
    assert!(config.summarizer.ensure_credentials().is_ok());
}

#[test]
fn test_ensure_credentials_withWhitespaceKey_shouldFail() {
    let mut config = Config::default();
    config.summarizer.set_api_key("   ");
    assert!(config.summarizer.ensure_credentials().is_err());
}

#[test]
fn test_apply_env_overrides_withGenericVariable_shouldWin() {
    let mut config = Config::default();
    config.summarizer.set_api_key("from-file");

    let env = HashMap::from([
        (API_KEY_ENV_VAR.to_string(), "from-generic".to_string()),
        ("OPENAI_API_KEY".to_string(), "from-openai".to_string()),
    ]);
    config.apply_env_overrides(|name| env.get(name).cloned());

    assert_eq!(config.summarizer.get_api_key(), "from-generic");
}

#[test]
fn test_apply_env_overrides_withProviderVariable_shouldOnlyFillEmptyKey() {
    let env = HashMap::from([("ANTHROPIC_API_KEY".to_string(), "from-env".to_string())]);

    let mut config = Config::default();
    config.summarizer.provider = SummaryProvider::Anthropic;
    config.apply_env_overrides(|name| env.get(name).cloned());
    assert_eq!(config.summarizer.get_api_key(), "from-env");

    let mut config = Config::default();
    config.summarizer.provider = SummaryProvider::Anthropic;
    config.summarizer.set_api_key("from-file");
    config.apply_env_overrides(|name| env.get(name).cloned());
    assert_eq!(config.summarizer.get_api_key(), "from-file");
}

#[test]
fn test_load_withPartialFile_shouldFillDefaults() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(
        &path,
        r#"{ "language": "de", "summarizer": { "provider": "anthropic" }, "summary": { "style": "prose" } }"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(config.language, "de");
    assert!(config.allow_fallback);
    assert_eq!(config.summary.style, SummaryStyle::Prose);
    assert_eq!(config.summary.max_words, 250);
    assert_eq!(config.summarizer.provider, SummaryProvider::Anthropic);
    // No provider entries in the file: getters fall back to provider defaults
    assert_eq!(config.summarizer.get_model(), "claude-3-haiku-20240307");
    assert_eq!(config.platform.retry_count, 3);
}

#[test]
fn test_load_withMalformedJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Config::load(&path).is_err());
}

#[test]
fn test_write_default_shouldRefuseToOverwriteWithoutForce() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("nested").join("conf.json");

    Config::write_default(&path, false).unwrap();
    let written = Config::load(&path).unwrap();
    assert_eq!(written.language, "en");

    let err = Config::write_default(&path, false).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
    assert_eq!(err.exit_code(), 1);
    assert!(Config::write_default(&path, true).is_ok());
}

#[test]
fn test_write_default_withFileAsParent_shouldFailWithIoExitCode() {
    let dir = common::create_temp_dir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();

    let err = Config::write_default(&blocker.join("conf.json"), false).unwrap_err();

    assert!(matches!(err, AppError::Io(_)), "unexpected error: {:?}", err);
    assert_eq!(err.exit_code(), 14);
}

#[test]
fn test_retry_policy_shouldFollowConfiguredValues() {
    let config = common::test_config();
    let policy = config.platform.retry_policy();

    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.base_delay, common::fast_backoff());
}
