#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use news_reel::media::RenderPlan;
use news_reel::{
    DocumentProvider, FetchError, GenerationParams, MediaBackend, SummarizationError, SummarizationOracle,
    SynthesisError, TranslationError, TranslationOracle, TtsProvider,
};

/// Serves canned pages; unknown URLs answer 404
#[derive(Default)]
pub struct FakeDocuments {
    pages: HashMap<String, String>,
    pub calls: Mutex<Vec<(String, Instant)>>,
}

impl FakeDocuments {
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
    }
}

#[async_trait]
impl DocumentProvider for FakeDocuments {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push((url.to_string(), Instant::now()));
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

pub const LISTING_URL: &str = "https://www.allure.com/topic/trends";

pub fn listing_html(paths: &[&str]) -> String {
    let links: String = paths
        .iter()
        .map(|p| format!(r#"<a class="SummaryItemHedLink-civMjp" href="{}">headline</a>"#, p))
        .collect();
    format!(r#"<html><body><div class="summary-list__items">{}</div></body></html>"#, links)
}

pub fn article_html(text: &str) -> String {
    format!(
        r#"<html><body><div class="body__inner-container"><p>{}</p></div></body></html>"#,
        text
    )
}

/// Summarizes each window as "S<index>" and records every input it saw
#[derive(Default)]
pub struct ScriptedOracle {
    pub inputs: Mutex<Vec<String>>,
    pub fail_on_call: Option<usize>,
    pub reply: Option<String>,
    pub delay: Option<Duration>,
}

impl ScriptedOracle {
    pub fn calls(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }
}

#[async_trait]
impl SummarizationOracle for ScriptedOracle {
    async fn generate(&self, input: &str, _params: &GenerationParams) -> Result<String, SummarizationError> {
        let index = {
            let mut inputs = self.inputs.lock().unwrap();
            inputs.push(input.to_string());
            inputs.len() - 1
        };

        if let Some(delay) = self.delay {
            // Later windows finish first to expose ordering bugs
            tokio::time::sleep(delay / (index as u32 + 1)).await;
        }

        if self.fail_on_call == Some(index) {
            return Err(SummarizationError::Oracle(format!("window {} exploded", index)));
        }

        Ok(self.reply.clone().unwrap_or_else(|| format!("S{}", index)))
    }
}

/// Translates to "<text> [lang]" except for the languages listed as failing
pub struct FakeTranslator {
    pub failing: Vec<String>,
}

#[async_trait]
impl TranslationOracle for FakeTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslationError> {
        if self.failing.iter().any(|l| l == target_language) {
            return Err(TranslationError::Status {
                status: 456,
                body: "Quota exceeded".to_string(),
            });
        }
        Ok(format!("{} [{}]", text, target_language))
    }
}

/// Writes a placeholder audio file; when `fail` is set it leaves a partial file and errors
#[derive(Default)]
pub struct FakeTts {
    pub calls: Mutex<Vec<PathBuf>>,
    pub fail: bool,
}

#[async_trait]
impl TtsProvider for FakeTts {
    async fn synthesize(&self, _text: &str, _language: &str, output: &Path) -> Result<(), SynthesisError> {
        self.calls.lock().unwrap().push(output.to_path_buf());
        tokio::fs::write(output, b"ID3 fake mp3").await?;
        if self.fail {
            return Err(SynthesisError::Tts("speech service returned 503".to_string()));
        }
        Ok(())
    }
}

/// Reports a fixed narration length and optionally fails rendering
pub struct FakeMedia {
    pub narration: Duration,
    pub background: Duration,
    pub fail_render: bool,
    pub plans: Mutex<Vec<RenderPlan>>,
}

impl FakeMedia {
    pub fn new(narration: Duration) -> Self {
        Self {
            narration,
            background: Duration::from_secs(30),
            fail_render: false,
            plans: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MediaBackend for FakeMedia {
    async fn probe_duration(&self, path: &Path) -> Result<Duration, SynthesisError> {
        if path.extension().map_or(false, |e| e == "mp3") {
            Ok(self.narration)
        } else {
            Ok(self.background)
        }
    }

    async fn render(&self, plan: &RenderPlan) -> Result<(), SynthesisError> {
        // Scratch files must still exist while rendering
        assert!(plan.narration.exists());
        assert!(plan.captions.exists());
        self.plans.lock().unwrap().push(plan.clone());

        if self.fail_render {
            return Err(SynthesisError::Render("encoder crashed".to_string()));
        }
        tokio::fs::write(&plan.output, b"fake mp4").await?;
        Ok(())
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
