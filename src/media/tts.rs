use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::config::VideoConfig;
use crate::error::SynthesisError;

/// Text-to-speech provider writing an audio file
#[async_trait]
pub trait TtsProvider: Send + Sync {
    async fn synthesize(&self, text: &str, language: &str, output: &Path) -> Result<(), SynthesisError>;
}

/// Longest text accepted by a single translate_tts request
const MAX_PIECE_CHARS: usize = 100;

/// Google Translate speech endpoint; long text is spoken in pieces and the MP3 frames concatenated
pub struct GoogleTts {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleTts {
    pub fn new(config: &VideoConfig) -> Result<Self, SynthesisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.tts_timeout_seconds))
            .user_agent("Mozilla/5.0")
            .build()
            .map_err(|e| SynthesisError::Tts(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.tts_endpoint.clone(),
        })
    }

    fn piece_url(&self, piece: &str, language: &str, index: usize, total: usize) -> String {
        format!(
            "{}?ie=UTF-8&client=tw-ob&tl={}&q={}&total={}&idx={}&textlen={}",
            self.endpoint,
            urlencoding::encode(language),
            urlencoding::encode(piece),
            total,
            index,
            piece.chars().count()
        )
    }
}

/// Split text into pieces of at most `max_chars` characters on word boundaries.
///
/// Words longer than `max_chars` are hard-split.
pub fn split_tts_pieces(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    if max_chars == 0 {
        return pieces;
    }
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word_chars: Vec<char> = word.chars().collect();

        while word_chars.len() > max_chars {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word_chars.split_off(max_chars);
            pieces.push(word_chars.into_iter().collect());
            word_chars = rest;
        }

        if word_chars.is_empty() {
            continue;
        }

        let needed = if current.is_empty() { word_chars.len() } else { word_chars.len() + 1 };
        if current_len + needed > max_chars {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current_len += word_chars.len();
        current.extend(word_chars);
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

#[async_trait]
impl TtsProvider for GoogleTts {
    async fn synthesize(&self, text: &str, language: &str, output: &Path) -> Result<(), SynthesisError> {
        let pieces = split_tts_pieces(text, MAX_PIECE_CHARS);
        if pieces.is_empty() {
            return Err(SynthesisError::EmptyScript);
        }

        info!("🗣️ Synthesizing narration in {} piece(s)", pieces.len());

        let mut file = tokio::fs::File::create(output).await?;
        for (index, piece) in pieces.iter().enumerate() {
            let url = self.piece_url(piece, language, index, pieces.len());
            debug!("TTS request {}/{}", index + 1, pieces.len());

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| SynthesisError::Tts(e.to_string()))?;

            if !response.status().is_success() {
                return Err(SynthesisError::Tts(format!(
                    "TTS request {} failed with status {}",
                    index,
                    response.status()
                )));
            }

            let bytes = response.bytes().await.map_err(|e| SynthesisError::Tts(e.to_string()))?;
            file.write_all(&bytes).await?;
        }
        file.flush().await?;

        Ok(())
    }
}
