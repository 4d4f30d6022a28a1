/*!
 * Rendering of transcripts and summaries.
 *
 * Transcripts render as one `[hh:mm:ss - hh:mm:ss] text` line per cue and
 * summaries as the provider's text block. When both are shown, each gets a
 * section header.
 */

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::summarizer::SummaryResult;
use crate::transcript::TranscriptDocument;

pub const TRANSCRIPT_HEADER: &str = "Subtitles with Timestamps:";
pub const SUMMARY_HEADER: &str = "Summary with Timestamps:";

/// What a run should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ShowMode {
    Transcript,
    Summary,
    #[default]
    Both,
}

impl ShowMode {
    pub fn needs_summary(self) -> bool {
        self != Self::Transcript
    }

    /// Short name used in batch file names
    pub fn file_kind(self) -> &'static str {
        match self {
            Self::Transcript => "transcript",
            Self::Summary => "summary",
            Self::Both => "both",
        }
    }
}

/// Content produced by one run
#[derive(Debug, Clone, PartialEq)]
pub enum OutputContent {
    Transcript(TranscriptDocument),
    Summary(SummaryResult),
    Both(TranscriptDocument, SummaryResult),
}

impl OutputContent {
    /// Plain text rendering, always ending with a newline
    pub fn render(&self) -> String {
        match self {
            Self::Transcript(transcript) => render_transcript(transcript),
            Self::Summary(summary) => render_summary(summary),
            Self::Both(transcript, summary) => format!(
                "{}\n{}\n\n{}\n{}",
                TRANSCRIPT_HEADER,
                render_transcript(transcript),
                SUMMARY_HEADER,
                render_summary(summary)
            ),
        }
    }
}

fn render_transcript(transcript: &TranscriptDocument) -> String {
    let mut text = transcript.serialize();
    text.push('\n');
    text
}

fn render_summary(summary: &SummaryResult) -> String {
    let mut text = summary.summary_text.trim_end().to_string();
    text.push('\n');
    text
}

/// Where rendered output goes
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) if path.as_os_str() != "-" => Self::File(path.to_path_buf()),
            _ => Self::Stdout,
        }
    }
}

/// Writes rendered output to its destination
pub struct OutputPresenter;

impl OutputPresenter {
    pub fn present(content: &OutputContent, destination: &Destination) -> Result<(), AppError> {
        Self::write(content.render(), destination)
    }

    /// Present content preceded by a header line (batch output on stdout)
    pub fn present_with_header(header: &str, content: &OutputContent, destination: &Destination) -> Result<(), AppError> {
        Self::write(format!("{}{}", header, content.render()), destination)
    }

    fn write(text: String, destination: &Destination) -> Result<(), AppError> {
        match destination {
            Destination::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(text.as_bytes())?;
                handle.flush()?;
                Ok(())
            }
            Destination::File(path) => FileManager::write_to_file(path, &text)
                .map_err(|e| AppError::Io(format!("{:#}", e))),
        }
    }
}
