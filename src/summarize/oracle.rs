use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SummarizationError;
use crate::llm::{create_llm, ChatMessage, LLMConfig, LLM};

/// Length bounds and decoding hints handed to the oracle with every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub min_length: u32,
    pub max_length: u32,
    pub num_beams: u32,
    pub length_penalty: f32,
    pub early_stopping: bool,
}

/// Black-box text generator with a bounded output length
#[async_trait]
pub trait SummarizationOracle: Send + Sync {
    async fn generate(&self, input: &str, params: &GenerationParams) -> Result<String, SummarizationError>;
}

/// Oracle backed by a chat-completion LLM
pub struct LlmSummarizationOracle {
    llm: Box<dyn LLM>,
}

impl LlmSummarizationOracle {
    pub fn new(config: &LLMConfig) -> Result<Self, SummarizationError> {
        let llm = create_llm(config)?;
        Ok(Self { llm })
    }

    pub fn from_llm(llm: Box<dyn LLM>) -> Self {
        Self { llm }
    }

    fn system_prompt(params: &GenerationParams) -> String {
        format!(
            "You are a news editor. Follow the instruction at the start of the user message. \
             Answer with plain prose only, between {} and {} tokens long.",
            params.min_length, params.max_length
        )
    }
}

#[async_trait]
impl SummarizationOracle for LlmSummarizationOracle {
    async fn generate(&self, input: &str, params: &GenerationParams) -> Result<String, SummarizationError> {
        // Beam search settings have no chat-API equivalent
        debug!(
            "Generating with {:?} (beams={}, length_penalty={} ignored by chat backends)",
            self.llm.provider_type(),
            params.num_beams,
            params.length_penalty
        );

        let messages = vec![
            ChatMessage::system(Self::system_prompt(params)),
            ChatMessage::user(input),
        ];

        let response = self.llm.chat(messages, params.max_length).await?;

        debug!("Oracle call completed (tokens: {:?})", response.tokens_used);
        Ok(response.content.trim().to_string())
    }
}
