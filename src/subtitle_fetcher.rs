/*!
 * Caption track selection and download.
 *
 * Selection is deterministic and tiered:
 * 1. manual track in the preferred language
 * 2. auto-generated track in the preferred language
 * 3. with fallback enabled only: manual then auto-generated track of the
 *    same language family, then any manual track, then any auto-generated
 *    track
 *
 * Within a tier, tracks are ordered by language code, then by name.
 */

use log::{debug, info, warn};
use std::sync::Arc;

use crate::errors::SubtitleError;
use crate::language_utils::{same_family, tags_equal};
use crate::platform::{CaptionTrack, TrackKind, VideoInfo, VideoPlatform};
use crate::retry::RetryPolicy;
use crate::transcript::SubtitleCue;

/// Which tier of the selection policy matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTier {
    ExactManual,
    ExactAuto,
    FamilyManual,
    FamilyAuto,
    AnyManual,
    AnyAuto,
}

impl SelectionTier {
    /// Tiers in order of preference
    const ORDER: [SelectionTier; 6] = [
        Self::ExactManual,
        Self::ExactAuto,
        Self::FamilyManual,
        Self::FamilyAuto,
        Self::AnyManual,
        Self::AnyAuto,
    ];

    /// Whether the tier is only reachable with fallback enabled
    pub fn is_fallback(self) -> bool {
        !matches!(self, Self::ExactManual | Self::ExactAuto)
    }

    fn kind(self) -> TrackKind {
        match self {
            Self::ExactManual | Self::FamilyManual | Self::AnyManual => TrackKind::Manual,
            Self::ExactAuto | Self::FamilyAuto | Self::AnyAuto => TrackKind::AutoGenerated,
        }
    }

    fn matches(self, track: &CaptionTrack, language: &str) -> bool {
        if track.kind != self.kind() {
            return false;
        }
        match self {
            Self::ExactManual | Self::ExactAuto => tags_equal(&track.language_code, language),
            Self::FamilyManual | Self::FamilyAuto => same_family(&track.language_code, language),
            Self::AnyManual | Self::AnyAuto => true,
        }
    }
}

/// Pick the best track for `language` under the selection policy
pub fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    language: &str,
    allow_fallback: bool,
) -> Option<(&'a CaptionTrack, SelectionTier)> {
    SelectionTier::ORDER
        .into_iter()
        .filter(|tier| allow_fallback || !tier.is_fallback())
        .find_map(|tier| {
            tracks
                .iter()
                .filter(|t| tier.matches(t, language))
                .min_by(|a, b| {
                    a.language_code
                        .cmp(&b.language_code)
                        .then_with(|| a.name.cmp(&b.name))
                })
                .map(|track| (track, tier))
        })
}

/// Subtitles downloaded for a video
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedSubtitles {
    /// The track the cues come from
    pub track: CaptionTrack,
    pub tier: SelectionTier,
    /// Cues sorted by start time
    pub cues: Vec<SubtitleCue>,
}

/// Selects and downloads caption tracks
pub struct SubtitleFetcher {
    platform: Arc<dyn VideoPlatform>,
    retry: RetryPolicy,
}

impl SubtitleFetcher {
    pub fn new(platform: Arc<dyn VideoPlatform>, retry: RetryPolicy) -> Self {
        Self { platform, retry }
    }

    /// Select a track for `language` and download its cues
    pub async fn fetch(
        &self,
        info: &VideoInfo,
        language: &str,
        allow_fallback: bool,
    ) -> Result<FetchedSubtitles, SubtitleError> {
        let (track, tier) = select_track(&info.tracks, language, allow_fallback).ok_or_else(|| {
            SubtitleError::NoSubtitlesAvailable {
                video_id: info.video.id().to_string(),
                language: language.to_string(),
            }
        })?;

        if tier.is_fallback() {
            warn!(
                "No subtitles in '{}', falling back to {} track '{}' ({})",
                language,
                if track.kind.is_manual() { "manual" } else { "auto-generated" },
                track.name,
                track.language_code
            );
        } else {
            debug!("Selected {:?} track '{}' ({})", tier, track.name, track.language_code);
        }

        let mut cues = self
            .retry
            .run(
                "Subtitle download",
                || self.platform.fetch_track(track),
                SubtitleError::is_retryable,
                |_| None,
            )
            .await?;

        cues.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));
        info!("Fetched {} subtitle cues ({})", cues.len(), track.language_code);

        Ok(FetchedSubtitles {
            track: track.clone(),
            tier,
            cues,
        })
    }
}
