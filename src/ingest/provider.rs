use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::IngestionConfig;
use crate::error::FetchError;

/// Source of raw page markup
#[async_trait]
pub trait DocumentProvider: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Plain HTTP GET provider
#[derive(Clone)]
pub struct HttpDocumentProvider {
    client: Client,
}

impl HttpDocumentProvider {
    pub fn new(config: &IngestionConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|source| FetchError::Transport {
                url: config.listing_url.clone(),
                source,
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentProvider for HttpDocumentProvider {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let html_content = response.text().await.map_err(transport)?;
        debug!("📄 Downloaded {} characters of HTML from {}", html_content.len(), url);

        Ok(html_content)
    }
}
