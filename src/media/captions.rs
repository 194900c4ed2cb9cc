use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// One on-screen caption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSegment {
    pub text: String,
    pub start: Duration,
    pub duration: Duration,
}

impl CaptionSegment {
    pub fn end(&self) -> Duration {
        self.start + self.duration
    }
}

/// Spread the script's words evenly over the narration.
///
/// Captions hold `words_per_segment` words (the last may hold fewer) and are
/// spaced `narration * words_per_segment / word_count` apart, assuming a uniform
/// speaking rate. The last caption ends exactly at `narration`, so the timeline
/// has no gaps or overlaps and its durations sum to the narration length.
pub fn build_caption_timeline(script: &str, words_per_segment: usize, narration: Duration) -> Vec<CaptionSegment> {
    let words: Vec<&str> = script.split_whitespace().collect();
    if words.is_empty() || words_per_segment == 0 {
        return Vec::new();
    }

    let word_count = words.len() as u128;
    let total_nanos = narration.as_nanos();

    // Integer math keeps boundaries exact for evenly divisible scripts
    let start_of = |word_index: usize| -> Duration {
        let nanos = total_nanos * word_index as u128 / word_count;
        Duration::from_nanos(nanos as u64)
    };

    let chunks: Vec<&[&str]> = words.chunks(words_per_segment).collect();
    let last = chunks.len() - 1;

    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let start = start_of(i * words_per_segment);
            let end = if i == last {
                narration
            } else {
                start_of((i + 1) * words_per_segment)
            };
            CaptionSegment {
                text: chunk.join(" "),
                start,
                duration: end - start,
            }
        })
        .collect()
}

/// SubRip rendering of a caption timeline
pub struct SrtWriter<'a> {
    segments: &'a [CaptionSegment],
}

struct SrtEntry<'a> {
    index: usize,
    segment: &'a CaptionSegment,
}

impl fmt::Display for SrtEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{} --> {}\n{}\n",
            self.index,
            format_timestamp(self.segment.start),
            format_timestamp(self.segment.end()),
            self.segment.text
        )
    }
}

impl<'a> SrtWriter<'a> {
    pub fn new(segments: &'a [CaptionSegment]) -> Self {
        Self { segments }
    }

    /// Generate SRT content as string
    pub fn generate(&self) -> String {
        let mut srt_content = String::new();

        for (i, segment) in self.segments.iter().enumerate() {
            let entry = SrtEntry { index: i + 1, segment };
            srt_content.push_str(&entry.to_string());
            srt_content.push('\n');
        }

        srt_content
    }

    /// Save SRT to file
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        tokio::fs::write(path.as_ref(), self.generate()).await?;
        Ok(())
    }
}

/// Format duration as SRT timestamp (HH:MM:SS,mmm)
pub fn format_timestamp(duration: Duration) -> String {
    let total_millis = duration.as_millis();
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let seconds = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}
