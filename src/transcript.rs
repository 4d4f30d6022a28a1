/*!
 * Subtitle cues and the timestamped transcript built from them.
 *
 * Formatting is a pure function of the cue sequence: no I/O, and formatting
 * the same cues twice yields identical documents.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Single subtitle entry as delivered by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// Start time in seconds
    pub start_seconds: f64,
    /// End time in seconds
    pub end_seconds: f64,
    /// Cue text, possibly spanning several lines
    pub text: String,
}

impl SubtitleCue {
    pub fn new(start_seconds: f64, end_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            start_seconds,
            end_seconds,
            text: text.into(),
        }
    }

    /// Build a cue from a start time and a duration
    pub fn from_duration(start_seconds: f64, duration_seconds: f64, text: impl Into<String>) -> Self {
        Self::new(start_seconds, start_seconds + duration_seconds.max(0.0), text)
    }

    /// Cue text on a single line, or `None` when the cue carries no text
    pub fn single_line_text(&self) -> Option<String> {
        let collapsed = self.text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() { None } else { Some(collapsed) }
    }
}

/// One formatted transcript line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampedLine {
    /// `[hh:mm:ss - hh:mm:ss]`
    pub range: String,
    pub text: String,
}

impl fmt::Display for TimestampedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.range, self.text)
    }
}

/// The formatted transcript of one video
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptDocument {
    pub lines: Vec<TimestampedLine>,
}

impl TranscriptDocument {
    /// Format a cue sequence into a transcript
    pub fn from_cues(cues: &[SubtitleCue]) -> Self {
        Self {
            lines: cues.iter().filter_map(format_cue).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Each line rendered as `[start - end] text`
    pub fn rendered_lines(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }

    /// The transcript as newline-separated text
    pub fn serialize(&self) -> String {
        self.rendered_lines().join("\n")
    }
}

/// Convert seconds into `hh:mm:ss`, flooring fractional seconds
///
/// Hours are not wrapped, so a 100 hour offset renders as `100:00:00`.
/// Negative and non-finite inputs render as zero.
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Bracketed `[start - end]` range for a pair of times
pub fn format_range(start_seconds: f64, end_seconds: f64) -> String {
    format!("[{} - {}]", format_timestamp(start_seconds), format_timestamp(end_seconds))
}

/// Format one cue; cues without text yield `None`
pub fn format_cue(cue: &SubtitleCue) -> Option<TimestampedLine> {
    let text = cue.single_line_text()?;
    Some(TimestampedLine {
        range: format_range(cue.start_seconds, cue.end_seconds),
        text,
    })
}
