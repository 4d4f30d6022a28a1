/*!
 * Tests for the error taxonomy and its exit codes
 */

use yasswai::errors::{AppError, ProviderError, SubtitleError, SummaryError, VideoError};

#[test]
fn test_exit_codes_shouldBeDistinctPerCategory() {
    assert_eq!(AppError::Config("bad".into()).exit_code(), 1);
    assert_eq!(AppError::VideoNotFound("x".into()).exit_code(), 10);
    assert_eq!(AppError::NoSubtitlesAvailable("x".into()).exit_code(), 11);
    assert_eq!(AppError::Network("x".into()).exit_code(), 12);
    assert_eq!(AppError::Authentication("x".into()).exit_code(), 13);
    assert_eq!(AppError::Provider(ProviderError::RequestFailed("x".into())).exit_code(), 13);
    assert_eq!(AppError::Io("x".into()).exit_code(), 14);
}

#[test]
fn test_from_video_error_shouldMapToVideoNotFoundOrNetwork() {
    let invalid: AppError = VideoError::InvalidReference("nope".into()).into();
    assert!(matches!(invalid, AppError::VideoNotFound(_)));

    let private: AppError = VideoError::Unavailable {
        video_id: "dQw4w9WgXcQ".into(),
        reason: "private".into(),
    }
    .into();
    assert!(matches!(private, AppError::VideoNotFound(ref m) if m.contains("dQw4w9WgXcQ")));

    let network: AppError = VideoError::Network("reset".into()).into();
    assert!(matches!(network, AppError::Network(_)));
}

#[test]
fn test_from_subtitle_error_shouldKeepNetworkSeparate() {
    let missing: AppError = SubtitleError::NoSubtitlesAvailable {
        video_id: "dQw4w9WgXcQ".into(),
        language: "fr".into(),
    }
    .into();
    assert_eq!(missing.exit_code(), 11);

    let network: AppError = SubtitleError::Network("timeout".into()).into();
    assert_eq!(network.exit_code(), 12);
}

#[test]
fn test_from_summary_error_withAuthFailure_shouldBeAuthentication() {
    let error: AppError = SummaryError::Provider(ProviderError::AuthenticationError("bad key".into())).into();
    assert!(matches!(error, AppError::Authentication(_)));
}

#[test]
fn test_from_summary_error_withRateLimit_shouldBeProvider() {
    let error: AppError = SummaryError::Provider(ProviderError::RateLimitExceeded {
        message: "slow down".into(),
        retry_after_secs: Some(2),
    })
    .into();
    assert!(matches!(error, AppError::Provider(ProviderError::RateLimitExceeded { .. })));
    assert_eq!(error.exit_code(), 13);
}

#[test]
fn test_from_status_shouldClassifyHttpErrors() {
    assert!(matches!(
        ProviderError::from_status(401, "unauthorized", None),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(403, "forbidden", None),
        ProviderError::AuthenticationError(_)
    ));
    assert_eq!(
        ProviderError::from_status(429, "busy", Some(7)),
        ProviderError::RateLimitExceeded {
            message: "busy".into(),
            retry_after_secs: Some(7)
        }
    );
    assert_eq!(
        ProviderError::from_status(400, "bad request", None),
        ProviderError::ApiError {
            status_code: 400,
            message: "bad request".into()
        }
    );
}

#[test]
fn test_is_retryable_shouldOnlyRetryTransientErrors() {
    assert!(ProviderError::ConnectionError("x".into()).is_retryable());
    assert!(ProviderError::Timeout("x".into()).is_retryable());
    assert!(ProviderError::from_status(429, "x", None).is_retryable());
    assert!(ProviderError::from_status(503, "x", None).is_retryable());

    assert!(!ProviderError::from_status(400, "x", None).is_retryable());
    assert!(!ProviderError::AuthenticationError("x".into()).is_retryable());
    assert!(!ProviderError::ParseError("x".into()).is_retryable());

    assert!(VideoError::Network("x".into()).is_retryable());
    assert!(!VideoError::InvalidReference("x".into()).is_retryable());
    assert!(SubtitleError::Network("x".into()).is_retryable());
    assert!(!SubtitleError::ParseError("x".into()).is_retryable());
}

#[test]
fn test_error_display_shouldIncludeDetails() {
    let error = SubtitleError::NoSubtitlesAvailable {
        video_id: "abcdefghijk".into(),
        language: "ja".into(),
    };
    let message = error.to_string();
    assert!(message.contains("abcdefghijk"));
    assert!(message.contains("ja"));
}
