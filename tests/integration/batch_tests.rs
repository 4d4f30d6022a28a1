/*!
 * Multi-video runs: per-video files, input ordering and exit codes
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use yasswai::app_controller::{Controller, RunOptions};
use yasswai::errors::AppError;
use yasswai::file_utils::FileManager;
use yasswai::output::ShowMode;
use yasswai::platform::TrackKind;
use yasswai::providers::mock::MockProvider;

use crate::common::{self, MockPlatform};

const FIRST: &str = "aaaaaaaaaaa";
const SECOND: &str = "bbbbbbbbbbb";
const PRIVATE: &str = "ccccccccccc";
const FRENCH_ONLY: &str = "ddddddddddd";

fn platform() -> MockPlatform {
    MockPlatform::new()
        .with_video(
            common::video_info(FIRST, vec![common::track("en", TrackKind::Manual)]),
            common::sample_cues(2),
        )
        .with_video(
            common::video_info(SECOND, vec![common::track("en-US", TrackKind::AutoGenerated)]),
            common::sample_cues(4),
        )
        .with_video(
            common::video_info(FRENCH_ONLY, vec![common::track("fr", TrackKind::Manual)]),
            common::sample_cues(1),
        )
        .with_unavailable(PRIVATE)
}

fn controller(platform: &MockPlatform, provider: &MockProvider) -> Controller {
    common::init_test_logging();
    Controller::with_components(
        common::test_config(),
        Arc::new(platform.clone()),
        Arc::new(provider.clone()),
    )
}

fn inputs(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
async fn test_run_batch_withOutputDir_shouldWriteOneFilePerVideo() {
    let platform = platform();
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();
    let out_dir = dir.path().join("summaries");

    let mut options = RunOptions::from_config(controller.config());
    options.show = ShowMode::Summary;
    options.output = Some(out_dir.clone());
    options.jobs = 2;

    let items = controller
        .run_batch(&inputs(&[FIRST, SECOND]), &options)
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item.result.is_ok()));
    assert_eq!(Controller::batch_exit_code(&items), 0);

    let first = FileManager::read_to_string(FileManager::generate_output_path(&out_dir, FIRST, "summary")).unwrap();
    assert_eq!(first, "- [00:00:00 - 00:00:05] caption line 0\n");
    assert!(FileManager::file_exists(out_dir.join(format!("{}.summary.txt", SECOND))));
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn test_run_batch_withDashOutput_shouldPrintInsteadOfCreatingDirectory() {
    let platform = platform();
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);
    let dash = Path::new("-");
    assert!(!dash.exists());

    let mut options = RunOptions::from_config(controller.config());
    options.show = ShowMode::Transcript;
    options.output = Some(PathBuf::from("-"));
    options.jobs = 2;

    let items = controller
        .run_batch(&inputs(&[FIRST, SECOND]), &options)
        .await
        .unwrap();

    assert!(items.iter().all(|item| item.result.is_ok()));
    assert!(!dash.exists(), "a directory named '-' was created");
    assert!(!FileManager::file_exists(FileManager::generate_output_path(dash, FIRST, "transcript")));
}

#[tokio::test]
async fn test_run_batch_withFailures_shouldKeepInputOrderAndContinue() {
    let platform = platform();
    let provider = MockProvider::slow(10);
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();

    let mut options = RunOptions::from_config(controller.config());
    options.allow_fallback = false;
    options.output = Some(dir.path().to_path_buf());
    options.jobs = 4;

    let items = controller
        .run_batch(&inputs(&[FIRST, PRIVATE, FRENCH_ONLY]), &options)
        .await
        .unwrap();

    let order: Vec<&str> = items.iter().map(|item| item.input.as_str()).collect();
    assert_eq!(order, vec![FIRST, PRIVATE, FRENCH_ONLY]);

    assert!(items[0].result.is_ok());
    assert!(matches!(items[1].result, Err(AppError::VideoNotFound(_))));
    assert!(matches!(items[2].result, Err(AppError::NoSubtitlesAvailable(_))));

    // First failure in input order decides the exit code
    assert_eq!(Controller::batch_exit_code(&items), 10);

    assert!(FileManager::file_exists(dir.path().join(format!("{}.both.txt", FIRST))));
    assert!(!FileManager::file_exists(dir.path().join(format!("{}.both.txt", FRENCH_ONLY))));
}

#[tokio::test]
async fn test_run_batch_withFamilyMatch_shouldUseRegionalTrack() {
    let platform = platform();
    let provider = MockProvider::working();
    let controller = controller(&platform, &provider);
    let dir = common::create_temp_dir().unwrap();

    let mut options = RunOptions::from_config(controller.config());
    options.show = ShowMode::Transcript;
    options.output = Some(dir.path().to_path_buf());

    let items = controller.run_batch(&inputs(&[SECOND]), &options).await.unwrap();

    let processed = items[0].result.as_ref().unwrap();
    assert_eq!(processed.track.language_code, "en-US");
    let written = FileManager::read_to_string(dir.path().join(format!("{}.transcript.txt", SECOND))).unwrap();
    assert_eq!(written.lines().count(), 4);
}

#[tokio::test]
async fn test_run_batch_withoutCredential_shouldFailBeforeProcessing() {
    let platform = platform();
    let provider = MockProvider::working();
    let mut config = common::test_config();
    config.summarizer.set_api_key("");
    let controller = Controller::with_components(config, Arc::new(platform.clone()), Arc::new(provider.clone()));
    let options = RunOptions::from_config(controller.config());

    let error = controller
        .run_batch(&inputs(&[FIRST, SECOND]), &options)
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Authentication(_)));
    assert_eq!(platform.tracker().total_calls(), 0);
}

#[test]
fn test_batch_exit_code_withNoItems_shouldBeZero() {
    assert_eq!(Controller::batch_exit_code(&[]), 0);
}
