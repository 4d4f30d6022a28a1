use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, error, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::output::{Destination, OutputContent, OutputPresenter, ShowMode};
use crate::platform::youtube::YouTubeClient;
use crate::platform::{CaptionTrack, VideoInfo, VideoPlatform};
use crate::providers::{self, Provider};
use crate::subtitle_fetcher::SubtitleFetcher;
use crate::summarizer::{RequestGate, Summarizer, SummaryInput, SummaryOptions};
use crate::transcript::TranscriptDocument;
use crate::video_resolver::VideoResolver;

// @module: Application controller for the summarization pipeline

/// Per-run settings, resolved from configuration and command line
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Preferred subtitle language
    pub language: String,
    pub allow_fallback: bool,
    pub show: ShowMode,
    pub summary: SummaryOptions,
    /// Output file for a single video, output directory for several
    pub output: Option<PathBuf>,
    /// Videos processed concurrently in batch runs
    pub jobs: usize,
    pub show_progress: bool,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            language: config.language.clone(),
            allow_fallback: config.allow_fallback,
            show: ShowMode::default(),
            summary: SummaryOptions::from_config(config),
            output: None,
            jobs: 1,
            show_progress: false,
        }
    }
}

/// Result of processing one video
#[derive(Debug, Clone)]
pub struct ProcessedVideo {
    pub info: VideoInfo,
    /// Track the transcript was taken from
    pub track: CaptionTrack,
    pub content: OutputContent,
}

/// Outcome of one video in a batch, in input order
#[derive(Debug)]
pub struct BatchItem {
    pub input: String,
    pub result: Result<ProcessedVideo, AppError>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    resolver: VideoResolver,
    fetcher: SubtitleFetcher,
    provider: Arc<dyn Provider>,
}

impl Controller {
    // @method: Create a controller talking to YouTube and the configured provider
    pub fn from_config(config: Config) -> Self {
        let platform: Arc<dyn VideoPlatform> = Arc::new(YouTubeClient::new(&config.platform));
        let provider = providers::build_provider(&config.summarizer);
        Self::with_components(config, platform, provider)
    }

    /// Create a controller with explicit platform and provider implementations
    pub fn with_components(config: Config, platform: Arc<dyn VideoPlatform>, provider: Arc<dyn Provider>) -> Self {
        let retry = config.platform.retry_policy();
        Self {
            resolver: VideoResolver::new(Arc::clone(&platform), retry),
            fetcher: SubtitleFetcher::new(platform, retry),
            provider,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Look a video up and return its metadata and caption tracks
    pub async fn list_tracks(&self, input: &str) -> Result<VideoInfo, AppError> {
        Ok(self.resolver.resolve(input).await?)
    }

    /// Process one video and present the result
    pub async fn run(&self, input: &str, options: &RunOptions) -> Result<ProcessedVideo, AppError> {
        self.check_credentials(options)?;

        let summarizer = self.summarizer();
        let progress = Self::spinner(options.show_progress, None);
        let result = self.process(input, options, &summarizer, &progress).await;
        progress.finish_and_clear();

        let processed = result?;
        OutputPresenter::present(&processed.content, &Destination::from_path(options.output.as_deref()))?;
        Ok(processed)
    }

    /// Process several videos with at most `options.jobs` in flight.
    ///
    /// With an output directory each video is written to
    /// `<video_id>.<kind>.txt`; otherwise results go to stdout in input order.
    pub async fn run_batch(&self, inputs: &[String], options: &RunOptions) -> Result<Vec<BatchItem>, AppError> {
        self.check_credentials(options)?;

        // "-" selects stdout, as for a single video
        let output_dir = options.output.as_deref().filter(|dir| dir.as_os_str() != "-");
        if let Some(dir) = output_dir {
            FileManager::ensure_dir(dir).map_err(|e| AppError::Io(format!("{:#}", e)))?;
        }

        let summarizer = self.summarizer();
        let jobs = options.jobs.max(1);
        let multi_progress = MultiProgress::new();
        if !options.show_progress {
            multi_progress.set_draw_target(ProgressDrawTarget::hidden());
        }

        info!("Processing {} video(s), {} at a time", inputs.len(), jobs);

        let mut results = stream::iter(inputs.iter().enumerate())
            .map(|(index, input)| {
                let summarizer = &summarizer;
                let multi_progress = &multi_progress;
                async move {
                    let progress = Self::spinner(options.show_progress, Some(multi_progress));
                    let result = self.process(input, options, summarizer, &progress).await;
                    progress.finish_and_clear();

                    let result = match (result, output_dir) {
                        (Ok(processed), Some(dir)) => {
                            let path = FileManager::generate_output_path(
                                dir,
                                processed.info.video.id(),
                                options.show.file_kind(),
                            );
                            OutputPresenter::present(&processed.content, &Destination::File(path.clone()))
                                .map(|_| {
                                    info!("Wrote {}", path.display());
                                    processed
                                })
                        }
                        (result, _) => result,
                    };

                    if let Err(e) = &result {
                        error!("{}: {}", input, e);
                    }
                    (index, result)
                }
            })
            .buffer_unordered(jobs)
            .collect::<Vec<_>>()
            .await;

        results.sort_by_key(|(index, _)| *index);

        let items: Vec<BatchItem> = results
            .into_iter()
            .map(|(index, result)| BatchItem {
                input: inputs[index].clone(),
                result,
            })
            .collect();

        if output_dir.is_none() {
            for item in &items {
                if let Ok(processed) = &item.result {
                    let header = format!("==> {} <==\n", processed.info.video);
                    OutputPresenter::present_with_header(&header, &processed.content, &Destination::Stdout)?;
                }
            }
        }

        Ok(items)
    }

    /// Exit code of a batch: that of the first failed video in input order
    pub fn batch_exit_code(items: &[BatchItem]) -> i32 {
        items
            .iter()
            .find_map(|item| item.result.as_ref().err())
            .map_or(0, AppError::exit_code)
    }

    /// Fail fast when a summary is wanted and the provider has no credential
    fn check_credentials(&self, options: &RunOptions) -> Result<(), AppError> {
        if options.show.needs_summary() {
            self.config.summarizer.ensure_credentials()?;
        }
        Ok(())
    }

    fn summarizer(&self) -> Summarizer {
        let gate = RequestGate::new(
            self.config.summarizer.get_concurrent_requests(),
            self.config.summarizer.get_rate_limit(),
        );
        Summarizer::from_config(Arc::clone(&self.provider), &self.config).with_gate(Arc::new(gate))
    }

    fn spinner(visible: bool, multi_progress: Option<&MultiProgress>) -> ProgressBar {
        if !visible {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new_spinner();
        let progress = match multi_progress {
            Some(multi_progress) => multi_progress.add(progress),
            None => progress,
        };
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress.set_style(style);
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }

    /// Resolve, fetch, format and (when asked) summarize one video
    async fn process(
        &self,
        input: &str,
        options: &RunOptions,
        summarizer: &Summarizer,
        progress: &ProgressBar,
    ) -> Result<ProcessedVideo, AppError> {
        progress.set_message(format!("Resolving {}", input));
        let info = self.resolver.resolve(input).await?;

        progress.set_message(format!("Fetching subtitles for \"{}\"", info.title));
        let fetched = self
            .fetcher
            .fetch(&info, &options.language, options.allow_fallback)
            .await?;

        let transcript = TranscriptDocument::from_cues(&fetched.cues);
        debug!("Formatted {} of {} cues", transcript.len(), fetched.cues.len());
        if transcript.is_empty() {
            return Err(AppError::NoSubtitlesAvailable(format!(
                "track '{}' of video {} has no text",
                fetched.track.language_code, info.video
            )));
        }

        let content = if options.show.needs_summary() {
            progress.set_message(format!(
                "Summarizing \"{}\" with {}",
                info.title,
                summarizer.provider_name()
            ));
            let input = SummaryInput {
                video: &info.video,
                title: Some(info.title.as_str()),
                language: &fetched.track.language_code,
            };
            let summary = summarizer.summarize(&transcript, input, &options.summary).await?;
            info!(
                "Summary of {} done ({} chunk(s), {} request(s))",
                info.video, summary.chunk_count, summary.request_count
            );
            match options.show {
                ShowMode::Summary => OutputContent::Summary(summary),
                _ => OutputContent::Both(transcript, summary),
            }
        } else {
            OutputContent::Transcript(transcript)
        };

        Ok(ProcessedVideo {
            info,
            track: fetched.track,
            content,
        })
    }
}
