use regex::{Regex, RegexBuilder};

use crate::config::NormalizerConfig;

/// Upper bound on the compiled size of one phrase alternation
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Strips advertising and brand noise from concatenated article text.
#[derive(Debug, Clone)]
pub struct Normalizer {
    ad_pattern: Option<Regex>,
    brand_pattern: Option<Regex>,
    whitespace: Regex,
}

impl Normalizer {
    /// Fails when a phrase list is too large to compile into one pattern.
    pub fn new(config: &NormalizerConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            ad_pattern: Self::literal_alternation(&config.ad_phrases)?,
            brand_pattern: Self::literal_alternation(&config.brand_names)?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    /// Case-insensitive alternation of escaped literals; `None` when the list is empty.
    fn literal_alternation(phrases: &[String]) -> Result<Option<Regex>, regex::Error> {
        let escaped: Vec<String> = phrases
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| regex::escape(p))
            .collect();

        if escaped.is_empty() {
            return Ok(None);
        }

        RegexBuilder::new(&escaped.join("|"))
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
            .map(Some)
    }

    /// Remove configured phrases, collapse whitespace and trim.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = self.collapse(text);

        // Removal and collapsing can splice a new match together; repeat to a fixed point
        loop {
            let mut next = current.clone();
            if let Some(ad) = &self.ad_pattern {
                next = ad.replace_all(&next, "").into_owned();
            }
            if let Some(brand) = &self.brand_pattern {
                next = brand.replace_all(&next, "").into_owned();
            }
            let next = self.collapse(&next);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn collapse(&self, text: &str) -> String {
        self.whitespace.replace_all(text, " ").trim().to_string()
    }
}
