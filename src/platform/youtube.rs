/*!
 * YouTube client.
 *
 * Video metadata comes from the watch page: its InnerTube API key is used to
 * ask the player endpoint for the caption track list, and the
 * `ytInitialPlayerResponse` embedded in the page serves when that lookup
 * fails. Track bodies are timedtext XML, either the legacy `<text>` format
 * or srv3 `<p>` paragraphs, parsed into `SubtitleCue`s.
 */

use async_trait::async_trait;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode, header};
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

use crate::app_config::PlatformConfig;
use crate::errors::{SubtitleError, VideoError};
use crate::platform::{CaptionTrack, TrackKind, VideoInfo, VideoPlatform};
use crate::transcript::SubtitleCue;
use crate::video_resolver::VideoRef;

static INNERTUBE_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([A-Za-z0-9_-]+)""#).expect("valid innertube key regex")
});

// Legacy timedtext format: <text start="1.2" dur="3.4">...</text>
static TEXT_ELEMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<text\b([^>]*)>(.*?)</text>").expect("valid text element regex")
});

// srv3 format: <p t="1200" d="3400">...</p>, times in milliseconds
static PARAGRAPH_ELEMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<p\b([^>]*)>(.*?)</p>").expect("valid paragraph element regex")
});

static ATTRIBUTE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_]+)="([^"]*)""#).expect("valid attribute regex")
});

static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

const PLAYER_RESPONSE_MARKER: &str = "ytInitialPlayerResponse = ";

/// Client identity sent to the InnerTube player endpoint
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

/// YouTube client for video metadata and caption tracks
#[derive(Debug)]
pub struct YouTubeClient {
    /// HTTP client for platform requests
    client: Client,
    /// Base URL of the site, without trailing slash
    base_url: String,
}

impl YouTubeClient {
    /// Create a new YouTube client from the platform configuration
    pub fn new(config: &PlatformConfig) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_static("en-US,en;q=0.9"));
        // Skips the EU consent interstitial on the watch page
        headers.insert(header::COOKIE, header::HeaderValue::from_static("CONSENT=YES+1"));

        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent(config.user_agent.clone())
                .default_headers(headers)
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_watch_page(&self, video: &VideoRef) -> Result<String, VideoError> {
        let url = format!("{}/watch?v={}", self.base_url, video.id());
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| VideoError::Network(format!("Failed to load watch page: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(VideoError::Unavailable {
                video_id: video.id().to_string(),
                reason: "watch page not found".to_string(),
            });
        }
        if !status.is_success() {
            return Err(VideoError::Network(format!("Watch page request failed with status {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| VideoError::Network(format!("Failed to read watch page: {}", e)))
    }

    async fn fetch_innertube_player(&self, video: &VideoRef, api_key: &str) -> Result<Value, VideoError> {
        let url = format!("{}/youtubei/v1/player?key={}", self.base_url, api_key);
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video.id(),
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| VideoError::Network(format!("Failed to query player API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VideoError::Network(format!("Player API request failed with status {}", status)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| VideoError::ParseError(format!("Invalid player API response: {}", e)))
    }

    /// Strip the `fmt` parameter so the track downloads in the XML format
    fn track_download_url(base_url: &str) -> String {
        match Url::parse(base_url) {
            Ok(mut url) => {
                let pairs: Vec<(String, String)> = url
                    .query_pairs()
                    .filter(|(key, _)| key != "fmt")
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect();
                url.query_pairs_mut().clear().extend_pairs(pairs);
                url.to_string()
            }
            Err(_) => base_url.to_string(),
        }
    }
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    async fn video_info(&self, video: &VideoRef) -> Result<VideoInfo, VideoError> {
        let page = self.fetch_watch_page(video).await?;

        if let Some(api_key) = INNERTUBE_KEY_REGEX.captures(&page).and_then(|c| c.get(1)) {
            match self.fetch_innertube_player(video, api_key.as_str()).await {
                Ok(player) => return parse_player_response(video, &player),
                Err(VideoError::Network(message)) => return Err(VideoError::Network(message)),
                Err(e) => warn!("Player API lookup failed, falling back to watch page data: {}", e),
            }
        }

        let player = extract_player_response(&page).ok_or_else(|| {
            VideoError::ParseError(format!("No player data found on the watch page of {}", video))
        })?;
        parse_player_response(video, &player)
    }

    async fn fetch_track(&self, track: &CaptionTrack) -> Result<Vec<SubtitleCue>, SubtitleError> {
        let url = Self::track_download_url(&track.base_url);
        debug!("Downloading {} track '{}'", track.language_code, track.name);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SubtitleError::Network(format!("Failed to download subtitle track: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubtitleError::Network(format!(
                "Subtitle track request failed with status {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SubtitleError::Network(format!("Failed to read subtitle track: {}", e)))?;

        parse_timedtext(&body)
    }
}

/// Pull the `ytInitialPlayerResponse` object out of a watch page
pub fn extract_player_response(html: &str) -> Option<Value> {
    let start = html.find(PLAYER_RESPONSE_MARKER)? + PLAYER_RESPONSE_MARKER.len();
    // The object is followed by `;` and more script, so only read one value
    serde_json::Deserializer::from_str(&html[start..])
        .into_iter::<Value>()
        .next()?
        .ok()
}

/// Turn a player response into video metadata
pub fn parse_player_response(video: &VideoRef, player: &Value) -> Result<VideoInfo, VideoError> {
    let playability = &player["playabilityStatus"];
    let status = playability["status"].as_str().unwrap_or("UNKNOWN");
    if status != "OK" {
        let reason = playability["reason"]
            .as_str()
            .or_else(|| playability["messages"][0].as_str())
            .unwrap_or(status)
            .to_string();
        return Err(VideoError::Unavailable {
            video_id: video.id().to_string(),
            reason,
        });
    }

    let details = &player["videoDetails"];
    let title = details["title"].as_str().unwrap_or_default().to_string();
    let author = details["author"].as_str().map(str::to_string);
    let duration_seconds = details["lengthSeconds"]
        .as_str()
        .and_then(|s| s.parse::<u64>().ok())
        .or_else(|| details["lengthSeconds"].as_u64());

    let tracks = player["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"]
        .as_array()
        .map(|tracks| tracks.iter().filter_map(parse_caption_track).collect())
        .unwrap_or_default();

    Ok(VideoInfo {
        video: video.clone(),
        title,
        author,
        duration_seconds,
        tracks,
    })
}

fn parse_caption_track(track: &Value) -> Option<CaptionTrack> {
    let base_url = track["baseUrl"].as_str()?.to_string();
    let language_code = track["languageCode"].as_str()?.to_string();
    let name = track["name"]["simpleText"]
        .as_str()
        .or_else(|| track["name"]["runs"][0]["text"].as_str())
        .unwrap_or(&language_code)
        .to_string();
    let kind = if track["kind"].as_str() == Some("asr") {
        TrackKind::AutoGenerated
    } else {
        TrackKind::Manual
    };

    Some(CaptionTrack {
        language_code,
        name,
        kind,
        base_url,
    })
}

fn attributes(raw: &str) -> Vec<(&str, &str)> {
    ATTRIBUTE_REGEX
        .captures_iter(raw)
        .filter_map(|c| Some((c.get(1)?.as_str(), c.get(2)?.as_str())))
        .collect()
}

fn attribute_f64(attrs: &[(&str, &str)], name: &str) -> Option<f64> {
    attrs
        .iter()
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| value.parse::<f64>().ok())
}

/// Decode caption markup into plain text
///
/// Caption bodies are XML-escaped HTML, so entities are decoded twice and
/// formatting tags such as `<font>` or `<s>` are removed in between.
fn caption_text(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    let stripped = TAG_REGEX.replace_all(&decoded, "");
    html_escape::decode_html_entities(&stripped).into_owned()
}

/// Parse a timedtext body (legacy `<text>` or srv3 `<p>` format) into cues
pub fn parse_timedtext(body: &str) -> Result<Vec<SubtitleCue>, SubtitleError> {
    if body.trim().is_empty() {
        return Err(SubtitleError::ParseError("subtitle track is empty".to_string()));
    }

    let mut cues: Vec<SubtitleCue> = TEXT_ELEMENT_REGEX
        .captures_iter(body)
        .filter_map(|c| {
            let attrs = attributes(c.get(1)?.as_str());
            let start = attribute_f64(&attrs, "start")?;
            let duration = attribute_f64(&attrs, "dur").unwrap_or(0.0);
            Some(SubtitleCue::from_duration(start, duration, caption_text(c.get(2)?.as_str())))
        })
        .collect();

    if cues.is_empty() {
        cues = PARAGRAPH_ELEMENT_REGEX
            .captures_iter(body)
            .filter_map(|c| {
                let attrs = attributes(c.get(1)?.as_str());
                let start_ms = attribute_f64(&attrs, "t")?;
                let duration_ms = attribute_f64(&attrs, "d").unwrap_or(0.0);
                Some(SubtitleCue::from_duration(
                    start_ms / 1000.0,
                    duration_ms / 1000.0,
                    caption_text(c.get(2)?.as_str()),
                ))
            })
            .collect();
    }

    if cues.is_empty() && !body.contains("<transcript") && !body.contains("<timedtext") {
        return Err(SubtitleError::ParseError("unrecognized subtitle format".to_string()));
    }

    cues.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));
    Ok(cues)
}
