/// Error kinds for each pipeline stage.
///
/// Ingestion, summarization and media synthesis are fail-fast and surface their
/// error to the caller. Translation failures are recorded per language inside the
/// translation result instead of aborting the run.
use std::path::PathBuf;
use std::time::Duration;

/// Listing/article retrieval or extraction failure
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("HTTP error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid selector '{0}'")]
    Selector(String),

    #[error("No article links found on listing page {0}")]
    NoLinks(String),

    #[error("No qualifying content found in article {0}")]
    EmptyArticle(String),
}

/// Summarization oracle failure
#[derive(thiserror::Error, Debug)]
pub enum SummarizationError {
    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Oracle call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Oracle returned an empty video script")]
    EmptyScript,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<anyhow::Error> for SummarizationError {
    fn from(err: anyhow::Error) -> Self {
        SummarizationError::Oracle(format!("{:#}", err))
    }
}

/// Failure of a single target-language translation
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    #[error("Error: {status}, {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Translation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Any media-stage failure
#[derive(thiserror::Error, Debug)]
pub enum SynthesisError {
    #[error("Script is empty")]
    EmptyScript,

    #[error("Text-to-speech failed: {0}")]
    Tts(String),

    #[error("Could not probe {path}: {reason}")]
    Probe { path: PathBuf, reason: String },

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Rendering timed out after {0:?}")]
    Timeout(Duration),

    #[error("Media configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal error for a whole pipeline run
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Summarization failed: {0}")]
    Summarization(#[from] SummarizationError),

    #[error("Synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
