/// Listing and article page scraping
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::{DocumentBatch, DocumentProvider, RawDocument};
use crate::config::IngestionConfig;
use crate::error::FetchError;

/// Fetches a bounded batch of articles from a listing page
#[derive(Clone)]
pub struct IngestionGate {
    provider: Arc<dyn DocumentProvider>,
    base_url: Url,
    delay: Duration,
    listing_container: Selector,
    link: Selector,
    article_container: Selector,
    paragraph: Selector,
}

fn parse_selector(selector: &str) -> Result<Selector, FetchError> {
    Selector::parse(selector).map_err(|_| FetchError::Selector(selector.to_string()))
}

impl IngestionGate {
    pub fn new(config: &IngestionConfig, provider: Arc<dyn DocumentProvider>) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| FetchError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            provider,
            base_url,
            delay: Duration::from_secs_f64(config.seconds_between_fetch.max(0.0)),
            listing_container: parse_selector(&config.listing_container_selector)?,
            link: parse_selector(&config.link_selector)?,
            article_container: parse_selector(&config.article_container_selector)?,
            paragraph: parse_selector(&config.paragraph_selector)?,
        })
    }

    /// Fetch at most `max_items` articles linked from `listing_url`, in listing order.
    ///
    /// Any failed article aborts the whole batch.
    pub async fn fetch_batch(&self, listing_url: &str, max_items: usize) -> Result<DocumentBatch, FetchError> {
        info!("📰 Fetching headlines from {}", listing_url);

        let listing_html = self.provider.fetch(listing_url).await?;
        let links = self.extract_links(&listing_html, max_items)?;

        if links.is_empty() {
            return Err(FetchError::NoLinks(listing_url.to_string()));
        }

        info!("🔗 Found {} article links", links.len());

        let mut batch = DocumentBatch::new();
        for (index, link) in links.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                debug!("Waiting {:.1}s before next fetch", self.delay.as_secs_f64());
                tokio::time::sleep(self.delay).await;
            }

            let article_html = self.provider.fetch(link).await?;
            let text = self
                .extract_article_text(&article_html)
                .ok_or_else(|| FetchError::EmptyArticle(link.clone()))?;

            info!("✅ Got article from {} ({} chars)", link, text.chars().count());
            batch.push(RawDocument {
                url: link.clone(),
                text,
            });
        }

        Ok(batch)
    }

    /// Absolute article URLs from the first listing container, in document order
    pub fn extract_links(&self, html: &str, max_items: usize) -> Result<Vec<String>, FetchError> {
        let document = Html::parse_document(html);

        let Some(container) = document.select(&self.listing_container).next() else {
            return Ok(Vec::new());
        };

        let mut links = Vec::new();
        for anchor in container.select(&self.link) {
            if links.len() >= max_items {
                break;
            }
            let Some(href) = anchor.value().attr("href") else {
                debug!("Skipping headline without href");
                continue;
            };
            let absolute = self.base_url.join(href).map_err(|e| FetchError::InvalidUrl {
                url: href.to_string(),
                reason: e.to_string(),
            })?;
            links.push(absolute.to_string());
        }

        Ok(links)
    }

    /// Concatenated paragraph text of every article body container
    pub fn extract_article_text(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);

        let paragraphs: Vec<String> = document
            .select(&self.article_container)
            .flat_map(|container| container.select(&self.paragraph))
            .map(|p| p.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();

        if paragraphs.is_empty() {
            None
        } else {
            Some(paragraphs.join(" "))
        }
    }
}
