use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::oracle::{GenerationParams, SummarizationOracle};
use crate::config::SummarizerConfig;
use crate::error::SummarizationError;
use crate::timing::ScopedTimer;

/// Split `text` into contiguous windows of at most `window_size` characters.
///
/// Boundaries fall on char boundaries, so multi-byte text never splits a code point.
pub fn split_windows(text: &str, window_size: usize) -> Vec<&str> {
    if window_size == 0 || text.is_empty() {
        return Vec::new();
    }

    let mut windows = Vec::with_capacity(text.len() / window_size + 1);
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == window_size {
            windows.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    windows.push(&text[start..]);

    windows
}

/// Windows paired 1:1 with their summaries
#[derive(Debug, Clone)]
pub struct SummaryChunkSet {
    pub windows: Vec<String>,
    pub summaries: Vec<String>,
}

impl SummaryChunkSet {
    pub fn final_summary(&self) -> String {
        self.summaries.join(" ")
    }
}

/// Summarizes text too long for a single oracle call
pub struct ChunkedSummarizer {
    oracle: Arc<dyn SummarizationOracle>,
    window_size: usize,
    preamble: String,
    params: GenerationParams,
    max_concurrent: usize,
    timeout: Duration,
}

impl ChunkedSummarizer {
    pub fn new(config: &SummarizerConfig, oracle: Arc<dyn SummarizationOracle>) -> Result<Self, SummarizationError> {
        if config.window_size == 0 {
            return Err(SummarizationError::Configuration(
                "window_size must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            oracle,
            window_size: config.window_size,
            preamble: config.preamble.clone(),
            params: GenerationParams {
                min_length: config.min_length,
                max_length: config.max_length,
                num_beams: config.num_beams,
                length_penalty: config.length_penalty,
                early_stopping: config.early_stopping,
            },
            max_concurrent: config.max_concurrent_windows.max(1),
            timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    pub fn build_prompt(&self, text: &str) -> String {
        format!("{}\n{}\n", self.preamble, text)
    }

    /// Summarize normalized text into one final summary
    pub async fn summarize(&self, normalized_text: &str) -> Result<String, SummarizationError> {
        let chunk_set = self.summarize_chunks(normalized_text).await?;
        let final_summary = chunk_set.final_summary();
        info!("📝 Final Summary: {}", final_summary);
        Ok(final_summary)
    }

    /// Summarize every window of the prompt; any failing window fails the call
    pub async fn summarize_chunks(&self, normalized_text: &str) -> Result<SummaryChunkSet, SummarizationError> {
        let _timer = ScopedTimer::start("summarize_articles");

        let prompt = self.build_prompt(normalized_text);
        let windows: Vec<String> = split_windows(&prompt, self.window_size)
            .into_iter()
            .map(str::to_string)
            .collect();

        info!(
            "🧠 Summarizing {} chars in {} window(s) of {} chars",
            prompt.chars().count(),
            windows.len(),
            self.window_size
        );

        // buffered() yields in submission order regardless of completion order
        let summaries: Vec<String> = stream::iter(windows.iter().enumerate())
            .map(|(index, window)| self.summarize_window(index, window))
            .buffered(self.max_concurrent)
            .try_collect()
            .await?;

        Ok(SummaryChunkSet { windows, summaries })
    }

    async fn summarize_window(&self, index: usize, window: &str) -> Result<String, SummarizationError> {
        debug!("Summarizing window {} ({} chars)", index, window.chars().count());

        let summary = tokio::time::timeout(self.timeout, self.oracle.generate(window, &self.params))
            .await
            .map_err(|_| SummarizationError::Timeout(self.timeout))??;

        debug!("Window {} summarized into {} chars", index, summary.chars().count());
        Ok(summary)
    }
}
