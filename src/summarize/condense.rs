use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::oracle::{GenerationParams, SummarizationOracle};
use crate::config::SummarizerConfig;
use crate::error::SummarizationError;

/// Condenses the article summary into a narration script of about a minute
pub struct ScriptCondenser {
    oracle: Arc<dyn SummarizationOracle>,
    prompt: String,
    params: GenerationParams,
    timeout: Duration,
}

impl ScriptCondenser {
    pub fn new(config: &SummarizerConfig, oracle: Arc<dyn SummarizationOracle>) -> Self {
        Self {
            oracle,
            prompt: config.script_prompt.clone(),
            params: GenerationParams {
                min_length: config.script_min_length,
                max_length: config.script_max_length,
                num_beams: config.script_num_beams,
                length_penalty: 1.0,
                early_stopping: false,
            },
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub async fn condense(&self, final_summary: &str) -> Result<String, SummarizationError> {
        let input = format!("{}\n{}", self.prompt, final_summary);

        let script = tokio::time::timeout(self.timeout, self.oracle.generate(&input, &self.params))
            .await
            .map_err(|_| SummarizationError::Timeout(self.timeout))??;

        let script = script.trim().to_string();
        if script.is_empty() {
            return Err(SummarizationError::EmptyScript);
        }

        info!("🎙️ Video script ready: {} words", script.split_whitespace().count());
        Ok(script)
    }
}
