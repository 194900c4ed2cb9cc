use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::PipelineError;
use crate::ingest::{DocumentBatch, DocumentProvider, HttpDocumentProvider, IngestionGate};
use crate::media::{BackgroundSource, FfmpegBackend, GoogleTts, MediaBackend, MediaSynthesizer, RenderedVideo, TtsProvider};
use crate::normalize::Normalizer;
use crate::summarize::{ChunkedSummarizer, LlmSummarizationOracle, ScriptCondenser, SummarizationOracle};
use crate::translate::{DeepLTranslator, MultiTargetTranslator, TranslationOracle, TranslationResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PipelineStage {
    Ingestion,
    Normalization,
    Summarization,
    Translation,
    ScriptCondensing,
    MediaSynthesis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTiming {
    pub stage: PipelineStage,
    pub elapsed: Duration,
}

/// Everything produced by one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub started_at: DateTime<Utc>,
    pub source_urls: Vec<String>,
    pub normalized_chars: usize,
    pub summary: String,
    pub translations: Option<TranslationResult>,
    pub script: Option<String>,
    pub video: Option<RenderedVideo>,
    pub stages: Vec<StageTiming>,
    pub total_time: Duration,
}

impl PipelineReport {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            source_urls: Vec::new(),
            normalized_chars: 0,
            summary: String::new(),
            translations: None,
            script: None,
            video: None,
            stages: Vec::new(),
            total_time: Duration::ZERO,
        }
    }

    fn record(&mut self, stage: PipelineStage, started: Instant) {
        self.stages.push(StageTiming {
            stage,
            elapsed: started.elapsed(),
        });
    }

    pub fn completed(&self, stage: PipelineStage) -> bool {
        self.stages.iter().any(|s| s.stage == stage)
    }
}

/// External services used by the pipeline
#[derive(Clone)]
pub struct Collaborators {
    pub documents: Arc<dyn DocumentProvider>,
    pub oracle: Arc<dyn SummarizationOracle>,
    pub translator: Option<Arc<dyn TranslationOracle>>,
    pub tts: Arc<dyn TtsProvider>,
    pub media: Arc<dyn MediaBackend>,
}

impl Collaborators {
    /// Network and ffmpeg backed collaborators built from configuration
    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let documents = HttpDocumentProvider::new(&config.ingestion)?;
        let oracle = LlmSummarizationOracle::new(&config.llm)?;

        let translator: Option<Arc<dyn TranslationOracle>> = if config.translation.enabled {
            let deepl = DeepLTranslator::new(&config.translation)
                .map_err(|e| PipelineError::Configuration(e.to_string()))?;
            Some(Arc::new(deepl))
        } else {
            None
        };

        Ok(Self {
            documents: Arc::new(documents),
            oracle: Arc::new(oracle),
            translator,
            tts: Arc::new(GoogleTts::new(&config.video)?),
            media: Arc::new(FfmpegBackend::new(Duration::from_secs(config.video.render_timeout_seconds))),
        })
    }
}

/// Ingestion → normalization → summarization, then translation and video
pub struct Pipeline {
    config: Config,
    ingestion: IngestionGate,
    normalizer: Normalizer,
    summarizer: ChunkedSummarizer,
    translator: Option<MultiTargetTranslator>,
    condenser: ScriptCondenser,
    synthesizer: MediaSynthesizer,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self, PipelineError> {
        let collaborators = Collaborators::from_config(&config)?;
        Self::with_collaborators(config, collaborators)
    }

    pub fn with_collaborators(config: Config, collaborators: Collaborators) -> Result<Self, PipelineError> {
        info!("🔧 Initializing pipeline");

        let ingestion = IngestionGate::new(&config.ingestion, collaborators.documents)?;
        let normalizer = Normalizer::new(&config.normalizer)
            .map_err(|e| PipelineError::Configuration(format!("invalid normalizer phrases: {}", e)))?;
        let summarizer = ChunkedSummarizer::new(&config.summarizer, collaborators.oracle.clone())?;
        let condenser = ScriptCondenser::new(&config.summarizer, collaborators.oracle);

        let translator = match (config.translation.enabled, collaborators.translator) {
            (true, Some(oracle)) => Some(MultiTargetTranslator::new(
                oracle,
                config.translation.max_concurrent_requests,
            )),
            (true, None) => {
                return Err(PipelineError::Configuration(
                    "translation enabled without a translation service".to_string(),
                ))
            }
            (false, _) => None,
        };

        let synthesizer = MediaSynthesizer::new(config.video.clone(), collaborators.tts, collaborators.media);

        Ok(Self {
            config,
            ingestion,
            normalizer,
            summarizer,
            translator,
            condenser,
            synthesizer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Full run: articles, translations and, when enabled, the narrated video
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let start_time = Instant::now();
        let mut report = PipelineReport::new();

        info!("🚀 Starting news pipeline...");

        self.run_articles_into(&mut report).await?;

        if self.config.video.enabled {
            self.run_video_into(&mut report).await?;
        }

        report.total_time = start_time.elapsed();
        info!("🎉 Pipeline completed in {:.2}s", report.total_time.as_secs_f64());
        Ok(report)
    }

    /// Fetch, summarize and translate
    pub async fn run_articles(&self) -> Result<PipelineReport, PipelineError> {
        let start_time = Instant::now();
        let mut report = PipelineReport::new();
        self.run_articles_into(&mut report).await?;
        report.total_time = start_time.elapsed();
        Ok(report)
    }

    /// Condense an existing summary and render the video
    pub async fn run_video(&self, summary: &str) -> Result<PipelineReport, PipelineError> {
        let start_time = Instant::now();
        let mut report = PipelineReport::new();
        report.summary = summary.to_string();
        self.run_video_into(&mut report).await?;
        report.total_time = start_time.elapsed();
        Ok(report)
    }

    async fn run_articles_into(&self, report: &mut PipelineReport) -> Result<(), PipelineError> {
        let stage_start = Instant::now();
        let batch: DocumentBatch = self
            .ingestion
            .fetch_batch(&self.config.ingestion.listing_url, self.config.ingestion.max_items)
            .await?;
        report.source_urls = batch.urls();
        report.record(PipelineStage::Ingestion, stage_start);

        let stage_start = Instant::now();
        let normalized = self.normalizer.normalize(&batch.joined_text());
        report.normalized_chars = normalized.chars().count();
        report.record(PipelineStage::Normalization, stage_start);
        info!("🧹 Normalized {} articles into {} chars", batch.len(), report.normalized_chars);

        let stage_start = Instant::now();
        report.summary = self.summarizer.summarize(&normalized).await?;
        report.record(PipelineStage::Summarization, stage_start);

        if let Some(translator) = &self.translator {
            let stage_start = Instant::now();
            let translations = translator
                .translate(&report.summary, &self.config.translation.target_languages)
                .await;
            if translations.failures() > 0 {
                warn!(
                    "⚠️ {}/{} translations failed",
                    translations.failures(),
                    translations.len()
                );
            }
            report.translations = Some(translations);
            report.record(PipelineStage::Translation, stage_start);
        }

        Ok(())
    }

    async fn run_video_into(&self, report: &mut PipelineReport) -> Result<(), PipelineError> {
        let stage_start = Instant::now();
        let script = self.condenser.condense(&report.summary).await?;
        report.script = Some(script.clone());
        report.record(PipelineStage::ScriptCondensing, stage_start);

        let stage_start = Instant::now();
        let background = BackgroundSource::from_config(&self.config.video)?;
        let video = self
            .synthesizer
            .synthesize(&script, &background, &self.config.output.video_path)
            .await?;
        report.video = Some(video);
        report.record(PipelineStage::MediaSynthesis, stage_start);

        Ok(())
    }

    /// Write run_report.json and translations.txt under the output directory
    pub async fn save_report(&self, report: &PipelineReport) -> Result<Vec<PathBuf>, PipelineError> {
        let output_dir = &self.config.output.base_dir;
        tokio::fs::create_dir_all(output_dir).await?;

        let mut written = Vec::new();

        let report_path = output_dir.join("run_report.json");
        tokio::fs::write(&report_path, serde_json::to_string_pretty(report)?).await?;
        info!("💾 Report saved to: {}", report_path.display());
        written.push(report_path);

        if let Some(translations) = &report.translations {
            let translations_path = output_dir.join("translations.txt");
            tokio::fs::write(&translations_path, translations.render()).await?;
            info!("💾 Translations saved to: {}", translations_path.display());
            written.push(translations_path);
        }

        Ok(written)
    }
}
