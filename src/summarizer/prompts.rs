/*!
 * Prompt construction for transcript summarization.
 *
 * Three request shapes exist: a whole transcript, one chunk of a longer
 * transcript, and the consolidation of partial summaries. All of them
 * carry the same constraints (word budget, style, timestamp handling and
 * output language).
 */

use crate::app_config::SummaryStyle;
use crate::summarizer::SummaryOptions;

/// What the prompt asks the model to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PromptKind {
    /// The whole transcript fits in one request
    Full,
    /// One chunk of a transcript split into `total` parts (1-based `index`)
    Chunk { index: usize, total: usize },
    /// Merge partial summaries into one
    Consolidation,
}

/// Builder for summarization prompts
#[derive(Debug, Clone)]
pub struct SummaryPromptBuilder<'a> {
    options: &'a SummaryOptions,
    language_name: String,
    title: Option<String>,
}

impl<'a> SummaryPromptBuilder<'a> {
    pub fn new(options: &'a SummaryOptions, language_name: impl Into<String>) -> Self {
        Self {
            options,
            language_name: language_name.into(),
            title: None,
        }
    }

    /// Mention the video title in the prompt
    pub fn with_title(mut self, title: Option<&str>) -> Self {
        self.title = title.map(str::to_string).filter(|t| !t.trim().is_empty());
        self
    }

    /// System prompt: the configured base prompt plus the fixed constraints
    pub fn system_prompt(&self, base: &str) -> String {
        let mut prompt = base.trim().to_string();
        prompt.push_str(&format!(
            "\n\nAlways answer in {}, the language of the transcript.",
            self.language_name
        ));
        if self.options.preserve_timestamps {
            prompt.push_str(" Keep the [hh:mm:ss] timestamp references of the source for every point you make.");
        }
        prompt
    }

    fn style_instruction(&self) -> &'static str {
        match self.options.style {
            SummaryStyle::KeyPoints => "a concise list of key events, one per line",
            SummaryStyle::Prose => "a few short paragraphs of prose",
        }
    }

    fn constraints(&self) -> String {
        let mut lines = vec![format!(
            "Write {} in at most {} words.",
            self.style_instruction(),
            self.options.max_words
        )];
        if self.options.preserve_timestamps {
            lines.push(
                "Preserve the timestamps: start each point with the [hh:mm:ss] time it refers to, copied from the input."
                    .to_string(),
            );
        } else {
            lines.push("Do not include timestamps.".to_string());
        }
        lines.push(format!("Write in {}.", self.language_name));
        lines.join("\n")
    }

    /// Characters a prompt of `kind` carries besides its body
    pub fn overhead(&self, kind: PromptKind) -> usize {
        self.user_prompt(kind, "").chars().count()
    }

    /// User prompt for the given kind and body
    pub fn user_prompt(&self, kind: PromptKind, body: &str) -> String {
        let mut prompt = String::new();

        if let Some(title) = &self.title {
            prompt.push_str(&format!("Video title: {}\n\n", title));
        }

        match kind {
            PromptKind::Full => {
                prompt.push_str("Below are subtitles with timestamps from a video. Summarize the key events.\n\n");
                prompt.push_str(&format!("Subtitles:\n{}\n\n", body));
            }
            PromptKind::Chunk { index, total } => {
                prompt.push_str(&format!(
                    "Below is part {} of {} of the subtitles of a video, with timestamps. Summarize the key events of this part only.\n\n",
                    index, total
                ));
                prompt.push_str(&format!("Subtitles:\n{}\n\n", body));
            }
            PromptKind::Consolidation => {
                prompt.push_str(
                    "Below are summaries of consecutive parts of a video, in order. Merge them into one summary of the whole video, removing repetition.\n\n",
                );
                prompt.push_str(&format!("Partial summaries:\n{}\n\n", body));
            }
        }

        prompt.push_str(&self.constraints());
        prompt
    }
}
