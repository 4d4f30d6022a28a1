/*!
 * Video platform access.
 *
 * The pipeline sees the hosting platform through the `VideoPlatform` trait:
 * one call for metadata and caption tracks, one call for the cues of a
 * track. `youtube` holds the real client.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::{SubtitleError, VideoError};
use crate::transcript::SubtitleCue;
use crate::video_resolver::VideoRef;

pub mod youtube;

/// Whether a track was written by a person or generated by speech recognition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Manual,
    AutoGenerated,
}

impl TrackKind {
    pub fn is_manual(self) -> bool {
        self == Self::Manual
    }
}

/// A caption track listed for a video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// Language tag (e.g. `en`, `en-GB`)
    pub language_code: String,
    /// Human readable track name
    pub name: String,
    pub kind: TrackKind,
    /// Download location of the track
    pub base_url: String,
}

/// Video metadata and its caption tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub video: VideoRef,
    pub title: String,
    pub author: Option<String>,
    pub duration_seconds: Option<u64>,
    pub tracks: Vec<CaptionTrack>,
}

impl VideoInfo {
    /// Languages with at least one track, with a flag telling whether a
    /// manual track exists for that language. Sorted by language tag.
    pub fn available_languages(&self) -> Vec<(String, bool)> {
        let mut languages: Vec<(String, bool)> = Vec::new();
        for track in &self.tracks {
            match languages.iter_mut().find(|(code, _)| *code == track.language_code) {
                Some((_, manual)) => *manual |= track.kind.is_manual(),
                None => languages.push((track.language_code.clone(), track.kind.is_manual())),
            }
        }
        languages.sort_by(|a, b| a.0.cmp(&b.0));
        languages
    }
}

/// Read-only access to a video hosting platform
#[async_trait]
pub trait VideoPlatform: Send + Sync + Debug {
    /// Fetch metadata and the caption track list of a video
    async fn video_info(&self, video: &VideoRef) -> Result<VideoInfo, VideoError>;

    /// Download and parse the cues of a caption track
    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<SubtitleCue>, SubtitleError>;
}
