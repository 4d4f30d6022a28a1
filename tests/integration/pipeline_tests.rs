/*!
 * End-to-end tests of the single-video pipeline against a mock platform
 * and a mock provider
 */

use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use yasswai::app_controller::{Controller, RunOptions};
use yasswai::errors::{AppError, ProviderError};
use yasswai::file_utils::FileManager;
use yasswai::output::{OutputContent, ShowMode};
use yasswai::platform::TrackKind;
use yasswai::providers::mock::MockProvider;

use crate::common::{self, MockPlatform};

const VIDEO_ID: &str = "dQw4w9WgXcQ";

fn controller(platform: &MockPlatform, provider: &MockProvider) -> Controller {
    common::init_test_logging();
    Controller::with_components(
        common::test_config(),
        Arc::new(platform.clone()),
        Arc::new(provider.clone()),
    )
}

fn options(controller: &Controller, show: ShowMode, output: &Path) -> RunOptions {
    let mut options = RunOptions::from_config(controller.config());
    options.show = show;
    options.output = Some(output.to_path_buf());
    options
}

fn english_video() -> MockPlatform {
    MockPlatform::new().with_video(
        common::video_info(VIDEO_ID, vec![common::track("en", TrackKind::Manual)]),
        common::sample_cues(3),
    )
}

#[tokio::test]
async fn test_run_withTranscriptOnly_shouldWriteTimestampedLinesWithoutProvider() {
    let platform = english_video();
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();
    let output = dir.path().join("transcript.txt");

    controller
        .run(VIDEO_ID, &options(&controller, ShowMode::Transcript, &output))
        .await
        .unwrap();

    let written = FileManager::read_to_string(&output).unwrap();
    assert_eq!(
        written,
        "[00:00:00 - 00:00:05] caption line 0\n\
         [00:00:05 - 00:00:10] caption line 1\n\
         [00:00:10 - 00:00:15] caption line 2\n"
    );
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_run_withTranscriptOnly_shouldNotRequireApiKey() {
    let platform = english_video();
    let provider = MockProvider::working();
    let mut config = common::test_config();
    config.summarizer.set_api_key("");
    let controller = Controller::with_components(config, Arc::new(platform.clone()), Arc::new(provider.clone()));
    let dir = common::create_temp_dir().unwrap();

    let result = controller
        .run(VIDEO_ID, &options(&controller, ShowMode::Transcript, &dir.path().join("out.txt")))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_run_withBoth_shouldWriteTranscriptAndSummarySections() {
    let platform = english_video();
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();
    let output = dir.path().join("both.txt");

    let processed = controller
        .run(&format!("https://youtu.be/{}", VIDEO_ID), &options(&controller, ShowMode::Both, &output))
        .await
        .unwrap();

    let written = FileManager::read_to_string(&output).unwrap();
    assert!(written.starts_with("Subtitles with Timestamps:\n[00:00:00 - 00:00:05] caption line 0\n"));
    assert!(written.contains("\n\nSummary with Timestamps:\n- [00:00:00 - 00:00:05] caption line 0\n"));
    assert_eq!(provider.request_count(), 1);

    match processed.content {
        OutputContent::Both(transcript, summary) => {
            assert_eq!(transcript.len(), 3);
            assert_eq!(summary.source_video.id(), VIDEO_ID);
            assert_eq!(summary.language, "en");
            assert_eq!(summary.chunk_count, 1);
        }
        other => panic!("unexpected content: {:?}", other),
    }
}

#[tokio::test]
async fn test_run_withFallbackDisabled_shouldFailWithoutProviderRequests() {
    let platform = MockPlatform::new().with_video(
        common::video_info(VIDEO_ID, vec![common::track("fr", TrackKind::Manual)]),
        common::sample_cues(3),
    );
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();
    let mut options = options(&controller, ShowMode::Both, &dir.path().join("out.txt"));
    options.allow_fallback = false;

    let error = controller.run(VIDEO_ID, &options).await.unwrap_err();

    assert!(matches!(error, AppError::NoSubtitlesAvailable(_)));
    assert_eq!(error.exit_code(), 11);
    assert_eq!(provider.request_count(), 0);
    assert_eq!(platform.tracker().fetch_track_calls.load(Ordering::SeqCst), 0);
    assert!(!FileManager::file_exists(dir.path().join("out.txt")));
}

#[tokio::test]
async fn test_run_withFallbackEnabled_shouldUseOtherLanguage() {
    let platform = MockPlatform::new().with_video(
        common::video_info(
            VIDEO_ID,
            vec![common::track("fr", TrackKind::AutoGenerated), common::track("de", TrackKind::Manual)],
        ),
        common::sample_cues(2),
    );
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();

    let processed = controller
        .run(VIDEO_ID, &options(&controller, ShowMode::Summary, &dir.path().join("out.txt")))
        .await
        .unwrap();

    // Any manual track beats any auto-generated one
    assert_eq!(processed.track.language_code, "de");
    match processed.content {
        OutputContent::Summary(summary) => assert_eq!(summary.language, "de"),
        other => panic!("unexpected content: {:?}", other),
    }
    let requests = provider.requests();
    assert!(requests[0].prompt.contains("Write in German."));
}

#[tokio::test]
async fn test_run_withManualAndAutoTracks_shouldDownloadManual() {
    let auto = common::track("en", TrackKind::AutoGenerated);
    let manual = common::track("en", TrackKind::Manual);
    let platform = MockPlatform::new()
        .with_video(common::video_info(VIDEO_ID, vec![auto.clone(), manual.clone()]), common::sample_cues(1));
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();

    controller
        .run(VIDEO_ID, &options(&controller, ShowMode::Transcript, &dir.path().join("out.txt")))
        .await
        .unwrap();

    let fetched = platform.tracker().fetched_urls.lock().unwrap().clone();
    assert_eq!(fetched, vec![manual.base_url]);
}

#[tokio::test]
async fn test_run_withoutCredential_shouldFailBeforeAnyNetworkCall() {
    let platform = english_video();
    let provider = MockProvider::working();
    let mut config = common::test_config();
    config.summarizer.set_api_key("");
    let controller = Controller::with_components(config, Arc::new(platform.clone()), Arc::new(provider.clone()));
    let dir = common::create_temp_dir().unwrap();

    let error = controller
        .run(VIDEO_ID, &options(&controller, ShowMode::Summary, &dir.path().join("out.txt")))
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Authentication(_)));
    assert_eq!(error.exit_code(), 13);
    assert_eq!(platform.tracker().total_calls(), 0);
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_run_withUnavailableVideo_shouldReturnVideoNotFound() {
    let platform = MockPlatform::new().with_unavailable(VIDEO_ID);
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();

    let error = controller
        .run(VIDEO_ID, &options(&controller, ShowMode::Both, &dir.path().join("out.txt")))
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::VideoNotFound(_)));
    assert_eq!(error.exit_code(), 10);
    // Unavailable is not a transient failure
    assert_eq!(platform.tracker().video_info_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_run_withUnwritableDestination_shouldReturnIoError() {
    let platform = english_video();
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "regular file").unwrap();

    let error = controller
        .run(VIDEO_ID, &options(&controller, ShowMode::Transcript, &blocker.join("out.txt")))
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Io(_)), "unexpected error: {:?}", error);
    assert_eq!(error.exit_code(), 14);
    assert_eq!(FileManager::read_to_string(&blocker).unwrap(), "regular file");
}

#[tokio::test]
async fn test_run_withInvalidReference_shouldNotContactPlatform() {
    let platform = english_video();
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();

    let error = controller
        .run("https://vimeo.com/12345", &options(&controller, ShowMode::Both, &dir.path().join("out.txt")))
        .await
        .unwrap_err();

    assert_eq!(error.exit_code(), 10);
    assert_eq!(platform.tracker().total_calls(), 0);
}

#[tokio::test]
async fn test_run_withTransientNetworkFailures_shouldRetryAndSucceed() {
    let platform = english_video().with_network_failures(2);
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();

    let result = controller
        .run(VIDEO_ID, &options(&controller, ShowMode::Transcript, &dir.path().join("out.txt")))
        .await;

    assert!(result.is_ok());
    assert_eq!(platform.tracker().fetch_track_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_run_withPersistentNetworkFailures_shouldReturnNetworkError() {
    let platform = english_video().with_network_failures(10);
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();

    let error = controller
        .run(VIDEO_ID, &options(&controller, ShowMode::Transcript, &dir.path().join("out.txt")))
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Network(_)));
    assert_eq!(error.exit_code(), 12);
    assert_eq!(platform.tracker().fetch_track_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_run_withBlankCues_shouldReportNoSubtitles() {
    let platform = MockPlatform::new().with_video(
        common::video_info(VIDEO_ID, vec![common::track("en", TrackKind::Manual)]),
        vec![yasswai::SubtitleCue::new(0.0, 1.0, "  ")],
    );
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();

    let error = controller
        .run(VIDEO_ID, &options(&controller, ShowMode::Both, &dir.path().join("out.txt")))
        .await
        .unwrap_err();

    assert_eq!(error.exit_code(), 11);
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_run_withPersistentRateLimit_shouldSurfaceProviderError() {
    let platform = english_video();
    let provider = MockProvider::rate_limited(100);
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();

    let error = controller
        .run(VIDEO_ID, &options(&controller, ShowMode::Both, &dir.path().join("out.txt")))
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Provider(ProviderError::RateLimitExceeded { .. })));
    assert_eq!(error.exit_code(), 13);
    // Three attempts per the configured retry count
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn test_list_tracks_shouldReturnAllTracks() {
    let platform = MockPlatform::new().with_video(
        common::video_info(
            VIDEO_ID,
            vec![common::track("en", TrackKind::Manual), common::track("en", TrackKind::AutoGenerated)],
        ),
        common::sample_cues(1),
    );
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);

    let info = controller.list_tracks(VIDEO_ID).await.unwrap();

    assert_eq!(info.tracks.len(), 2);
    assert_eq!(platform.tracker().fetch_track_calls.load(Ordering::SeqCst), 0);
}
