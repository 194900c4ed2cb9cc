/// News Reel
///
/// Scrapes trending articles, compresses them into one summary, translates it,
/// and narrates a short captioned vertical video from it.

pub mod config;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod media;
pub mod normalize;
pub mod pipeline;
pub mod summarize;
pub mod timing;
pub mod translate;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{FetchError, PipelineError, SummarizationError, SynthesisError, TranslationError};
pub use crate::ingest::{DocumentBatch, DocumentProvider, IngestionGate, RawDocument};
pub use crate::llm::{LLMConfig, LLMProvider};
pub use crate::media::{BackgroundSource, CaptionSegment, MediaBackend, MediaSynthesizer, TtsProvider};
pub use crate::normalize::Normalizer;
pub use crate::pipeline::{Collaborators, Pipeline, PipelineReport, PipelineStage};
pub use crate::summarize::{ChunkedSummarizer, GenerationParams, ScriptCondenser, SummarizationOracle};
pub use crate::translate::{MultiTargetTranslator, TranslationOracle, TranslationOutcome, TranslationResult};
