/*!
 * Tests for timestamp formatting and video references
 */

use yasswai::transcript::{format_cue, format_range, format_timestamp, SubtitleCue, TranscriptDocument};
use yasswai::video_resolver::VideoRef;

#[test]
fn test_format_timestamp_withBoundaryValues_shouldFloorAndPad() {
    assert_eq!(format_timestamp(0.0), "00:00:00");
    assert_eq!(format_timestamp(59.999), "00:00:59");
    assert_eq!(format_timestamp(60.0), "00:01:00");
    assert_eq!(format_timestamp(3599.9), "00:59:59");
    assert_eq!(format_timestamp(3600.0), "01:00:00");
    assert_eq!(format_timestamp(360_000.0), "100:00:00");
}

#[test]
fn test_format_timestamp_withInvalidInput_shouldRenderZero() {
    assert_eq!(format_timestamp(-5.0), "00:00:00");
    assert_eq!(format_timestamp(f64::NAN), "00:00:00");
    assert_eq!(format_timestamp(f64::INFINITY), "00:00:00");
}

#[test]
fn test_format_range_shouldBracketBothEnds() {
    assert_eq!(format_range(61.5, 3725.0), "[00:01:01 - 01:02:05]");
}

#[test]
fn test_format_cue_withMultilineText_shouldCollapseWhitespace() {
    let cue = SubtitleCue::new(1.0, 2.0, "first line\nsecond   line ");
    let line = format_cue(&cue).unwrap();
    assert_eq!(line.to_string(), "[00:00:01 - 00:00:02] first line second line");
}

#[test]
fn test_format_cue_withBlankText_shouldSkip() {
    assert!(format_cue(&SubtitleCue::new(0.0, 1.0, "  \n ")).is_none());
}

#[test]
fn test_from_duration_shouldComputeEnd() {
    let cue = SubtitleCue::from_duration(10.0, 2.5, "text");
    assert_eq!(cue.end_seconds, 12.5);

    let cue = SubtitleCue::from_duration(10.0, -1.0, "text");
    assert_eq!(cue.end_seconds, 10.0);
}

#[test]
fn test_transcript_from_cues_shouldKeepOrderAndDropEmptyCues() {
    let cues = vec![
        SubtitleCue::new(0.0, 4.0, "Welcome back"),
        SubtitleCue::new(4.0, 5.0, ""),
        SubtitleCue::new(5.0, 9.0, "Today we cook"),
    ];

    let transcript = TranscriptDocument::from_cues(&cues);

    assert_eq!(transcript.len(), 2);
    assert_eq!(
        transcript.serialize(),
        "[00:00:00 - 00:00:04] Welcome back\n[00:00:05 - 00:00:09] Today we cook"
    );
}

#[test]
fn test_transcript_from_cues_shouldBeDeterministic() {
    let cues = vec![SubtitleCue::new(0.0, 1.0, "a"), SubtitleCue::new(1.0, 2.0, "b")];
    assert_eq!(TranscriptDocument::from_cues(&cues), TranscriptDocument::from_cues(&cues));
}

#[test]
fn test_transcript_from_no_cues_shouldBeEmpty() {
    let transcript = TranscriptDocument::from_cues(&[]);
    assert!(transcript.is_empty());
    assert_eq!(transcript.serialize(), "");
}

#[test]
fn test_video_ref_shouldDisplayAsIdAndDeduplicate() {
    let from_url = VideoRef::parse("https://youtu.be/dQw4w9WgXcQ?t=10").unwrap();
    let from_id = VideoRef::parse(" dQw4w9WgXcQ ").unwrap();

    assert_eq!(from_url, from_id);
    assert_eq!(from_url.to_string(), "dQw4w9WgXcQ");

    let unique: std::collections::HashSet<VideoRef> = [from_url, from_id].into_iter().collect();
    assert_eq!(unique.len(), 1);
}

#[test]
fn test_video_ref_parse_withNonsense_shouldFail() {
    assert!(VideoRef::parse("not a url at all").is_err());
    assert!(VideoRef::parse("https://youtu.be/").is_err());
}
