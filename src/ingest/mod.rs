/// Article ingestion
///
/// Resolves a listing page into a bounded, ordered batch of raw article texts.
/// Fetches are strictly sequential with a mandatory pause between articles.

pub mod provider;
pub mod scraper;

pub use provider::{DocumentProvider, HttpDocumentProvider};
pub use scraper::IngestionGate;

use serde::{Deserialize, Serialize};

/// Text of one article, identified by its source URL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawDocument {
    pub url: String,
    pub text: String,
}

/// Articles in listing order, never longer than the configured maximum
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentBatch {
    documents: Vec<RawDocument>,
}

impl DocumentBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, document: RawDocument) {
        self.documents.push(document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[RawDocument] {
        &self.documents
    }

    pub fn urls(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.url.clone()).collect()
    }

    /// All article texts joined by a single space, in batch order
    pub fn joined_text(&self) -> String {
        self.documents
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<Vec<RawDocument>> for DocumentBatch {
    fn from(documents: Vec<RawDocument>) -> Self {
        Self { documents }
    }
}
