/*!
 * Video reference parsing and metadata resolution.
 */

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::errors::VideoError;
use crate::platform::{VideoInfo, VideoPlatform};
use crate::retry::RetryPolicy;

static VIDEO_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid video id regex")
});

/// Path prefixes that carry the video ID as their next segment
const ID_PATH_PREFIXES: [&str; 5] = ["embed", "shorts", "live", "v", "e"];

/// Identifier of a single video
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoRef(String);

impl VideoRef {
    /// Parse a bare video ID or any of the common YouTube URL forms
    pub fn parse(input: &str) -> Result<Self, VideoError> {
        let input = input.trim();
        if VIDEO_ID_REGEX.is_match(input) {
            return Ok(Self(input.to_string()));
        }

        let with_scheme = if input.contains("://") {
            input.to_string()
        } else {
            format!("https://{}", input)
        };

        let url = Url::parse(&with_scheme)
            .map_err(|_| VideoError::InvalidReference(input.to_string()))?;

        Self::from_url(&url).ok_or_else(|| VideoError::InvalidReference(input.to_string()))
    }

    fn from_url(url: &Url) -> Option<Self> {
        let host = url.host_str()?.trim_start_matches("www.").to_lowercase();
        let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();

        let candidate = match host.as_str() {
            "youtu.be" => segments.first().map(|s| s.to_string()),
            "youtube.com" | "m.youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
                match segments.as_slice() {
                    ["watch", ..] => url
                        .query_pairs()
                        .find(|(key, _)| key == "v")
                        .map(|(_, value)| value.into_owned()),
                    [prefix, id, ..] if ID_PATH_PREFIXES.contains(prefix) => Some(id.to_string()),
                    _ => None,
                }
            }
            _ => None,
        }?;

        VIDEO_ID_REGEX.is_match(&candidate).then_some(Self(candidate))
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves user input into video metadata
pub struct VideoResolver {
    platform: Arc<dyn VideoPlatform>,
    retry: RetryPolicy,
}

impl VideoResolver {
    pub fn new(platform: Arc<dyn VideoPlatform>, retry: RetryPolicy) -> Self {
        Self { platform, retry }
    }

    /// Parse the input and look the video up on the platform
    pub async fn resolve(&self, input: &str) -> Result<VideoInfo, VideoError> {
        let video = VideoRef::parse(input)?;
        debug!("Resolved input '{}' to video ID {}", input, video);

        let info = self
            .retry
            .run(
                "Video metadata request",
                || self.platform.video_info(&video),
                VideoError::is_retryable,
                |_| None,
            )
            .await?;

        info!(
            "Found \"{}\" ({} caption track(s))",
            info.title,
            info.tracks.len()
        );
        Ok(info)
    }
}
