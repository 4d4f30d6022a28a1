// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use yasswai::app_config::{self, Config, SummaryProvider, SummaryStyle};
use yasswai::app_controller::{Controller, RunOptions};
use yasswai::errors::AppError;
use yasswai::language_utils;
use yasswai::output::ShowMode;
use yasswai::platform::{TrackKind, VideoInfo};

/// CLI Wrapper for SummaryProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliProvider> for SummaryProvider {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::OpenAI => SummaryProvider::OpenAI,
            CliProvider::Anthropic => SummaryProvider::Anthropic,
            CliProvider::Ollama => SummaryProvider::Ollama,
            CliProvider::LMStudio => SummaryProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for SummaryStyle to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliStyle {
    KeyPoints,
    Prose,
}

impl From<CliStyle> for SummaryStyle {
    fn from(cli_style: CliStyle) -> Self {
        match cli_style {
            CliStyle::KeyPoints => SummaryStyle::KeyPoints,
            CliStyle::Prose => SummaryStyle::Prose,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Options shared by every command that loads the configuration
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug, Clone)]
struct SummarizeArgs {
    /// Video URLs or IDs to process
    #[arg(value_name = "VIDEO")]
    videos: Vec<String>,

    /// Preferred subtitle language (e.g. 'en', 'de', 'pt-BR')
    #[arg(short, long)]
    lang: Option<String>,

    /// Upper bound on the summary length in words
    #[arg(long)]
    max_words: Option<usize>,

    /// Output file (one video) or directory (several videos); '-' for stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fail instead of falling back to subtitles in another language
    #[arg(long)]
    no_fallback: bool,

    /// What to print
    #[arg(long, value_enum, default_value_t = ShowMode::Both)]
    show: ShowMode,

    /// Summary style
    #[arg(long, value_enum)]
    style: Option<CliStyle>,

    /// Do not ask the model to keep timestamps in the summary
    #[arg(long)]
    no_timestamps: bool,

    /// Summarization provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliProvider>,

    /// Model name to use for summarization
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the provider
    #[arg(long, env = "YASSWAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Number of videos processed concurrently
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch subtitles and summarize videos (default command)
    Summarize(SummarizeArgs),

    /// List the caption tracks of a video
    Tracks {
        /// Video URL or ID
        #[arg(value_name = "VIDEO")]
        video: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Write a default configuration file
    InitConfig {
        /// Where to write the file
        #[arg(value_name = "PATH", default_value = "conf.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completions for yasswai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// YASSWAI - Yet Another Subtitle Summarizer with AI
///
/// Fetches the subtitles of YouTube videos, prints them with timestamps and
/// summarizes them with an AI provider (OpenAI, Anthropic, Ollama, LM Studio).
#[derive(Parser, Debug)]
#[command(name = "yasswai")]
#[command(version)]
#[command(about = "Summarize YouTube videos from their subtitles")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "YASSWAI fetches the subtitles of YouTube videos, formats them with timestamps and summarizes them with AI providers.

EXAMPLES:
    yasswai https://youtu.be/dQw4w9WgXcQ                 # Transcript and summary
    yasswai --show summary dQw4w9WgXcQ                    # Summary only
    yasswai --show transcript --lang de dQw4w9WgXcQ       # German transcript, no API key needed
    yasswai -p ollama -m llama3.2:3b dQw4w9WgXcQ          # Summarize with a local model
    yasswai -j 4 -o summaries/ ID1 ID2 ID3                # Batch, one file per video
    yasswai tracks dQw4w9WgXcQ                            # List caption tracks
    yasswai init-config                                   # Write conf.json
    yasswai completions bash > yasswai.bash               # Generate bash completions

CONFIGURATION:
    Configuration is read from conf.json by default, then from the user config
    directory. The API key comes from --api-key / YASSWAI_API_KEY, the config
    file, or OPENAI_API_KEY / ANTHROPIC_API_KEY.

EXIT CODES:
    0 success, 1 configuration or usage error, 10 video not found,
    11 no subtitles available, 12 network error, 13 provider error,
    14 I/O error")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    summarize: SummarizeArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger; verbosity is adjusted later with `log::set_max_level`
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => match e.downcast_ref::<AppError>() {
            Some(app_error) => {
                error!("{}", app_error);
                app_error.exit_code()
            }
            None => {
                error!("{:#}", e);
                1
            }
        },
    };

    log::logger().flush();
    std::process::exit(code);
}

async fn run(cli: CommandLineOptions) -> Result<i32> {
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "yasswai", &mut std::io::stdout());
            Ok(0)
        }
        Some(Commands::InitConfig { path, force }) => {
            Config::write_default(&path, force)?;
            info!("Wrote default configuration to {:?}", path);
            Ok(0)
        }
        Some(Commands::Tracks { video, common }) => run_tracks(&video, &common).await,
        Some(Commands::Summarize(args)) => run_summarize(args).await,
        None => run_summarize(cli.summarize).await,
    }
}

/// Apply the log level: command line first, then configuration
fn apply_log_level(cli_level: Option<&CliLogLevel>, config: &Config) {
    let level = cli_level.cloned().map_or(config.log_level, app_config::LogLevel::from);
    log::set_max_level(level.into());
}

fn load_config(common: &CommonArgs) -> Result<Config> {
    if let Some(level) = &common.log_level {
        log::set_max_level(app_config::LogLevel::from(level.clone()).into());
    }
    let config = Config::load_or_default(Path::new(&common.config_path))
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;
    apply_log_level(common.log_level.as_ref(), &config);
    Ok(config)
}

async fn run_tracks(video: &str, common: &CommonArgs) -> Result<i32> {
    let config = load_config(common)?;
    let controller = Controller::from_config(config);
    let info = controller.list_tracks(video).await?;

    print_tracks(&info).map_err(AppError::from)?;
    Ok(0)
}

fn print_tracks(info: &VideoInfo) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{} ({})", info.title, info.video.watch_url())?;
    if let Some(author) = &info.author {
        writeln!(stdout, "Author: {}", author)?;
    }
    if info.tracks.is_empty() {
        writeln!(stdout, "No caption tracks")?;
    }
    for track in &info.tracks {
        let kind = match track.kind {
            TrackKind::Manual => "manual",
            TrackKind::AutoGenerated => "auto",
        };
        let language = language_utils::get_language_name(&track.language_code).unwrap_or_default();
        writeln!(stdout, "{:<10} {:<7} {} {}", track.language_code, kind, track.name, language)?;
    }
    stdout.flush()
}

async fn run_summarize(args: SummarizeArgs) -> Result<i32> {
    if args.videos.is_empty() {
        return Err(anyhow!("At least one VIDEO is required. See 'yasswai --help'."));
    }

    let mut config = load_config(&args.common)?;

    // Command line overrides
    if let Some(provider) = &args.provider {
        config.summarizer.provider = provider.clone().into();
    }
    if let Some(model) = &args.model {
        config.summarizer.set_model(model.clone());
    }
    if let Some(lang) = &args.lang {
        config.language = lang.clone();
    }
    if args.no_fallback {
        config.allow_fallback = false;
    }
    if let Some(max_words) = args.max_words {
        config.summary.max_words = max_words;
    }
    if let Some(style) = &args.style {
        config.summary.style = style.clone().into();
    }
    if args.no_timestamps {
        config.summary.preserve_timestamps = false;
    }

    match args.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(api_key) => config.summarizer.set_api_key(api_key),
        None => config.apply_env(),
    }

    config
        .validate()
        .context("Configuration validation failed")
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;

    let mut options = RunOptions::from_config(&config);
    options.show = args.show;
    options.output = args.output.clone();
    options.jobs = args.jobs.max(1);
    options.show_progress = std::io::stderr().is_terminal();

    let controller = Controller::from_config(config);

    if args.videos.len() == 1 {
        controller.run(&args.videos[0], &options).await?;
        return Ok(0);
    }

    let items = controller.run_batch(&args.videos, &options).await?;
    let failed = items.iter().filter(|item| item.result.is_err()).count();
    info!("{} of {} video(s) processed", items.len() - failed, items.len());
    Ok(Controller::batch_exit_code(&items))
}
