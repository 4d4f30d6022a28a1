/*!
 * Error types for the yasswai application.
 *
 * Each pipeline component has its own error enum; `AppError` is the
 * top-level taxonomy the binary maps to process exit codes.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Message from the provider
        message: String,
        /// Delay requested by the provider, if any
        retry_after_secs: Option<u64>,
    },

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether a retry of the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimitExceeded { .. } | Self::ConnectionError(_) | Self::Timeout(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }

    /// Classify a non-success HTTP status returned by a provider
    pub fn from_status(status_code: u16, message: impl Into<String>, retry_after_secs: Option<u64>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded { message, retry_after_secs },
            _ => Self::ApiError { status_code, message },
        }
    }

    /// Classify a transport-level failure from reqwest
    pub fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised while resolving a video and its metadata
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VideoError {
    /// The input is neither a video URL nor a video ID
    #[error("Invalid video reference: {0}")]
    InvalidReference(String),

    /// The platform reports the video as missing, private or unplayable
    #[error("Video {video_id} is unavailable: {reason}")]
    Unavailable {
        video_id: String,
        reason: String,
    },

    /// Transport failure talking to the platform
    #[error("Network error: {0}")]
    Network(String),

    /// The platform answered with something we could not understand
    #[error("Unexpected platform response: {0}")]
    ParseError(String),
}

impl VideoError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Errors that can occur while selecting or downloading subtitles
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubtitleError {
    /// No track satisfies the selection policy
    #[error("No subtitles available for video {video_id} (requested language: {language})")]
    NoSubtitlesAvailable {
        video_id: String,
        language: String,
    },

    /// Transport failure while downloading a track
    #[error("Network error: {0}")]
    Network(String),

    /// The track body could not be parsed
    #[error("Failed to parse subtitle track: {0}")]
    ParseError(String),
}

impl SubtitleError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Errors that can occur during summarization
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SummaryError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Nothing to summarize
    #[error("Transcript is empty")]
    EmptyTranscript,

    /// The provider answered with no text
    #[error("Provider returned an empty summary")]
    EmptyResponse,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("No subtitles available: {0}")]
    NoSubtitlesAvailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Provider error: {0}")]
    Provider(ProviderError),

    /// Error from a file or stream operation
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::VideoNotFound(_) => 10,
            Self::NoSubtitlesAvailable(_) => 11,
            Self::Network(_) => 12,
            Self::Authentication(_) | Self::Provider(_) => 13,
            Self::Io(_) => 14,
        }
    }
}

impl From<VideoError> for AppError {
    fn from(error: VideoError) -> Self {
        match error {
            VideoError::InvalidReference(_) | VideoError::Unavailable { .. } => {
                Self::VideoNotFound(error.to_string())
            }
            VideoError::Network(message) => Self::Network(message),
            VideoError::ParseError(_) => Self::VideoNotFound(error.to_string()),
        }
    }
}

impl From<SubtitleError> for AppError {
    fn from(error: SubtitleError) -> Self {
        match error {
            SubtitleError::Network(message) => Self::Network(message),
            other => Self::NoSubtitlesAvailable(other.to_string()),
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::AuthenticationError(message) => Self::Authentication(message),
            other => Self::Provider(other),
        }
    }
}

impl From<SummaryError> for AppError {
    fn from(error: SummaryError) -> Self {
        match error {
            SummaryError::Provider(provider_error) => provider_error.into(),
            SummaryError::EmptyTranscript => Self::NoSubtitlesAvailable(error.to_string()),
            SummaryError::EmptyResponse => Self::Provider(ProviderError::ParseError(error.to_string())),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}
