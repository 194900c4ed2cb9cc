use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::TranslationConfig;
use crate::error::TranslationError;

/// Text-in/text-out translation service keyed by target language
#[async_trait]
pub trait TranslationOracle: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError>;
}

/// DeepL REST translator
pub struct DeepLTranslator {
    client: reqwest::Client,
    endpoint: String,
    auth_key: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

impl DeepLTranslator {
    pub fn new(config: &TranslationConfig) -> anyhow::Result<Self> {
        let auth_key = config
            .auth_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("DeepL auth key not configured"))?;

        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            auth_key,
            timeout,
        })
    }

    /// Extract the first translation from a DeepL response body
    pub fn parse_response(body: &str) -> Result<String, TranslationError> {
        let response: DeepLResponse =
            serde_json::from_str(body).map_err(|e| TranslationError::Malformed(e.to_string()))?;

        response
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| TranslationError::Malformed("no translations in response".to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> TranslationError {
        if err.is_timeout() {
            TranslationError::Timeout(self.timeout)
        } else {
            TranslationError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl TranslationOracle for DeepLTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        let target = target_language.to_uppercase();
        let params = [
            ("auth_key", self.auth_key.as_str()),
            ("text", text),
            ("target_lang", target.as_str()),
        ];

        debug!("Sending {} chars to DeepL for {}", text.len(), target);

        let response = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if status.as_u16() != 200 {
            return Err(TranslationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Self::parse_response(&body)
    }
}

/// Outcome for a single target language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum TranslationOutcome {
    Translated(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub language: String,
    pub outcome: TranslationOutcome,
}

/// One entry per requested language, in request order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub entries: Vec<TranslationEntry>,
}

impl TranslationResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, language: &str) -> Option<&TranslationOutcome> {
        self.entries
            .iter()
            .find(|e| e.language == language)
            .map(|e| &e.outcome)
    }

    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, TranslationOutcome::Failed(_)))
            .count()
    }

    /// Human-readable report, one block per language
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| match &entry.outcome {
                TranslationOutcome::Translated(text) => {
                    format!("Translated to {}:\n{}\n", entry.language.to_uppercase(), text)
                }
                TranslationOutcome::Failed(reason) => {
                    format!("Error translating to {}: {}\n", entry.language.to_uppercase(), reason)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Fans one text out to every target language; a failed language never aborts the others
pub struct MultiTargetTranslator {
    oracle: Arc<dyn TranslationOracle>,
    max_concurrent: usize,
}

impl MultiTargetTranslator {
    pub fn new(oracle: Arc<dyn TranslationOracle>, max_concurrent: usize) -> Self {
        Self {
            oracle,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub async fn translate(&self, text: &str, target_languages: &[String]) -> TranslationResult {
        info!("🌍 Translating into {} language(s): {}", target_languages.len(), target_languages.join(", "));

        let entries: Vec<TranslationEntry> = stream::iter(target_languages.iter())
            .map(|language| async move {
                let outcome = match self.oracle.translate(text, language).await {
                    Ok(translated) => {
                        info!("✅ Translated to {}", language.to_uppercase());
                        TranslationOutcome::Translated(translated)
                    }
                    Err(e) => {
                        warn!("❌ Error translating to {}: {}", language, e);
                        TranslationOutcome::Failed(e.to_string())
                    }
                };
                TranslationEntry {
                    language: language.clone(),
                    outcome,
                }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        TranslationResult { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deepl_response() {
        let body = r#"{"translations":[{"detected_source_language":"EN","text":"Hola"}]}"#;
        assert_eq!(DeepLTranslator::parse_response(body).unwrap(), "Hola");
    }

    #[test]
    fn test_parse_deepl_response_rejects_empty() {
        assert!(matches!(
            DeepLTranslator::parse_response(r#"{"translations":[]}"#),
            Err(TranslationError::Malformed(_))
        ));
        assert!(matches!(
            DeepLTranslator::parse_response("not json"),
            Err(TranslationError::Malformed(_))
        ));
    }

    #[test]
    fn test_render_report() {
        let result = TranslationResult {
            entries: vec![
                TranslationEntry {
                    language: "es".to_string(),
                    outcome: TranslationOutcome::Translated("Hola".to_string()),
                },
                TranslationEntry {
                    language: "pl".to_string(),
                    outcome: TranslationOutcome::Failed("Error: 456, quota".to_string()),
                },
            ],
        };

        assert_eq!(
            result.render(),
            "Translated to ES:\nHola\n\nError translating to PL: Error: 456, quota\n"
        );
        assert_eq!(result.failures(), 1);
    }

    #[test]
    fn test_deepl_requires_key() {
        let config = crate::config::Config::default().translation;
        assert!(DeepLTranslator::new(&config).is_err());
    }

    #[test]
    fn test_no_languages_yields_empty_result() {
        struct Unused;

        #[async_trait]
        impl TranslationOracle for Unused {
            async fn translate(&self, _text: &str, _target: &str) -> Result<String, TranslationError> {
                panic!("no language was requested")
            }
        }

        let translator = MultiTargetTranslator::new(Arc::new(Unused), 2);
        let result = tokio_test::block_on(translator.translate("Hello", &[]));
        assert!(result.is_empty());
        assert_eq!(result.render(), "");
    }
}
