/// Summarization stages
///
/// The chunked summarizer compresses the normalized articles into one summary;
/// the condenser turns that summary into a short narration script.

pub mod chunker;
pub mod condense;
pub mod oracle;

pub use chunker::{split_windows, ChunkedSummarizer, SummaryChunkSet};
pub use condense::ScriptCondenser;
pub use oracle::{GenerationParams, LlmSummarizationOracle, SummarizationOracle};
