use super::{ChatMessage, LLMConfig, LLMProvider, LLMResponse, LLM};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

fn http_client(config: &LLMConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()?)
}

/// Turn a non-2xx response into an error carrying the body
async fn ensure_success(provider: &LLMProvider, response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(anyhow!("{:?} API error {}: {}", provider, status, body))
}

/// Chat-completions provider for LMStudio and OpenAI (same wire format)
pub struct OpenAICompatibleProvider {
    config: LLMConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
    usage: Option<ChatCompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionUsage {
    total_tokens: u32,
}

impl OpenAICompatibleProvider {
    pub fn new(config: LLMConfig) -> Result<Self> {
        if config.provider == LLMProvider::OpenAI && config.api_key.is_none() {
            return Err(anyhow!("OpenAI API key required"));
        }

        let client = http_client(&config)?;
        Ok(Self { config, client })
    }

    /// Chat endpoint; OpenAI falls back to the public API, local servers must be configured
    fn endpoint(&self) -> Result<&str> {
        match (&self.config.provider, self.config.endpoint.as_deref()) {
            (_, Some(endpoint)) => Ok(endpoint),
            (LLMProvider::OpenAI, None) => Ok(OPENAI_CHAT_URL),
            (provider, None) => Err(anyhow!("{:?} endpoint not configured", provider)),
        }
    }
}

#[async_trait]
impl LLM for OpenAICompatibleProvider {
    async fn chat(&self, messages: Vec<ChatMessage>, max_tokens: u32) -> Result<LLMResponse> {
        let endpoint = self.endpoint()?;
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: &messages,
            max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending {} message(s) to {:?} at {}", messages.len(), self.config.provider, endpoint);

        let mut builder = self.client.post(endpoint).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }
        let response = ensure_success(&self.config.provider, builder.send().await?).await?;
        let completion: ChatCompletionResponse = response.json().await?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("{:?} returned no choices", self.config.provider))?;

        Ok(LLMResponse {
            content: choice.message.content,
            tokens_used: completion.usage.map(|u| u.total_tokens),
        })
    }

    fn provider_type(&self) -> LLMProvider {
        self.config.provider.clone()
    }
}

/// Google Gemini generateContent provider
pub struct GeminiProvider {
    config: LLMConfig,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    total_token_count: u32,
}

impl GeminiRequest {
    /// System messages become the system instruction; the rest keep their order as turns
    fn from_messages(messages: &[ChatMessage], max_tokens: u32, temperature: f32) -> Self {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == "system")
            .map(|m| m.content.as_str())
            .collect();

        let contents = messages
            .iter()
            .filter(|m| m.role != "system")
            .map(|m| GeminiContent {
                role: Some(if m.role == "assistant" { "model" } else { "user" }.to_string()),
                parts: vec![GeminiPart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        Self {
            system_instruction: (!system.is_empty()).then(|| GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: system.join("\n"),
                }],
            }),
            contents,
            generation_config: GeminiGenerationConfig {
                max_output_tokens: max_tokens,
                temperature,
            },
        }
    }
}

impl GeminiResponse {
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.parts;
        if parts.is_empty() {
            return None;
        }
        Some(parts.iter().map(|p| p.text.as_str()).collect())
    }
}

impl GeminiProvider {
    pub fn new(config: LLMConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow!("Gemini API key required"))?;
        let client = http_client(&config)?;
        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn generate_url(&self) -> String {
        let base = self.config.endpoint.as_deref().unwrap_or(GEMINI_API_BASE);
        format!("{}/{}:generateContent", base.trim_end_matches('/'), self.config.model)
    }
}

#[async_trait]
impl LLM for GeminiProvider {
    async fn chat(&self, messages: Vec<ChatMessage>, max_tokens: u32) -> Result<LLMResponse> {
        let request = GeminiRequest::from_messages(&messages, max_tokens, self.config.temperature);
        let url = self.generate_url();

        debug!("Sending {} turn(s) to Gemini model {}", request.contents.len(), self.config.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(&LLMProvider::Gemini, response).await?;
        let gemini_response: GeminiResponse = response.json().await?;

        let content = gemini_response
            .text()
            .ok_or_else(|| anyhow!("Gemini returned no candidates"))?;

        Ok(LLMResponse {
            content,
            tokens_used: gemini_response.usage_metadata.map(|u| u.total_token_count),
        })
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::Gemini
    }
}
