use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::llm::LLMConfig;

/// Configuration for the news-reel pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listing page scraping settings
    pub ingestion: IngestionConfig,

    /// Noise phrases stripped before summarization
    pub normalizer: NormalizerConfig,

    /// Windowed summarization and script condensing
    pub summarizer: SummarizerConfig,

    /// LLM backend used as the summarization oracle
    pub llm: LLMConfig,

    /// DeepL translation settings
    pub translation: TranslationConfig,

    /// Narrated video settings
    pub video: VideoConfig,

    /// Output and report settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Page listing the latest headlines
    pub listing_url: String,

    /// Base used to resolve relative article links
    pub base_url: String,

    /// Maximum number of articles fetched per run
    pub max_items: usize,

    /// Mandatory pause between two article fetches (seconds)
    pub seconds_between_fetch: f64,

    /// HTTP request timeout in seconds
    pub request_timeout_seconds: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Element holding the headline list
    pub listing_container_selector: String,

    /// Headline links inside the listing container
    pub link_selector: String,

    /// Article body containers
    pub article_container_selector: String,

    /// Text blocks inside an article body container
    pub paragraph_selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Advertising phrases removed case-insensitively
    pub ad_phrases: Vec<String>,

    /// Brand and newspaper names removed case-insensitively
    pub brand_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Window size in characters
    pub window_size: usize,

    /// Instruction placed before the article text
    pub preamble: String,

    /// Generation bounds for article windows
    pub min_length: u32,
    pub max_length: u32,
    pub num_beams: u32,
    pub length_penalty: f32,
    pub early_stopping: bool,

    /// Windows summarized at the same time (1 = sequential)
    pub max_concurrent_windows: usize,

    /// Timeout per oracle call in seconds
    pub timeout_seconds: u64,

    /// Instruction for the narration script
    pub script_prompt: String,

    /// Generation bounds for the narration script (~60 seconds spoken)
    pub script_min_length: u32,
    pub script_max_length: u32,
    pub script_num_beams: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Enable translation of the final summary
    pub enabled: bool,

    /// DeepL API endpoint
    pub endpoint: String,

    /// DeepL authentication key
    pub auth_key: Option<String>,

    /// Target language codes, in report order
    pub target_languages: Vec<String>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// Languages translated at the same time (1 = sequential)
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Enable narrated video generation
    pub enabled: bool,

    /// Words shown per caption
    pub words_per_segment: usize,

    /// Output frame height; width follows from the 9:16 crop
    pub height: u32,

    /// Output frame rate
    pub fps: u32,

    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,

    /// Background video, image or directory of clips
    pub background_path: Option<PathBuf>,

    /// Solid background used when no background path is configured
    pub background_color: String,

    /// Extensions accepted when picking a clip from a background directory
    pub background_extensions: Vec<String>,

    /// Narration language
    pub tts_language: String,

    /// Text-to-speech endpoint
    pub tts_endpoint: String,

    /// Text-to-speech request timeout in seconds
    pub tts_timeout_seconds: u64,

    /// ffmpeg timeout in seconds
    pub render_timeout_seconds: u64,

    /// Encoder threads handed to ffmpeg
    pub render_threads: usize,

    /// Caption styling
    pub font_name: String,
    pub font_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for reports and translations
    pub base_dir: PathBuf,

    /// Rendered video file
    pub video_path: PathBuf,

    /// Log level
    pub log_level: String,

    /// Write run_report.json and translations.txt
    pub save_report: bool,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let mut config_paths = vec![
            PathBuf::from("news-reel.toml"),
            PathBuf::from("config/news-reel.toml"),
        ];
        if let Ok(home) = std::env::var("HOME") {
            config_paths.push(PathBuf::from(home).join(".config/news-reel/config.toml"));
        }

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path.display());
                        config.apply_env_overrides();
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env_overrides();
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("DEEPL_API_KEY") {
            self.translation.auth_key = Some(key);
        }

        if let Ok(seconds) = std::env::var("SECONDS_BETWEEN_FETCH") {
            match seconds.parse() {
                Ok(seconds) => self.ingestion.seconds_between_fetch = seconds,
                Err(_) => tracing::warn!("Ignoring invalid SECONDS_BETWEEN_FETCH: {}", seconds),
            }
        }

        if let Ok(max_items) = std::env::var("NEWS_REEL_MAX_HEADLINES") {
            self.ingestion.max_items = max_items.parse().unwrap_or(self.ingestion.max_items);
        }

        if let Ok(path) = std::env::var("NEWS_REEL_OUTPUT_PATH") {
            self.output.video_path = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("NEWS_REEL_BACKGROUND_PATH") {
            self.video.background_path = Some(PathBuf::from(path));
        }

        if let Ok(key) = std::env::var("NEWS_REEL_LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }

        if let Ok(log_level) = std::env::var("NEWS_REEL_LOG_LEVEL") {
            self.output.log_level = log_level;
        }
    }

    /// Same configuration with translation turned off (video-only runs need no DeepL key)
    pub fn without_translation(mut self) -> Self {
        self.translation.enabled = false;
        self
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.ingestion.max_items == 0 {
            return Err(anyhow!("max_items must be greater than 0"));
        }

        if !self.ingestion.seconds_between_fetch.is_finite() || self.ingestion.seconds_between_fetch < 0.0 {
            return Err(anyhow!("seconds_between_fetch must be a non-negative number"));
        }

        if self.summarizer.window_size == 0 {
            return Err(anyhow!("window_size must be greater than 0"));
        }

        if self.summarizer.min_length > self.summarizer.max_length {
            return Err(anyhow!("min_length must not exceed max_length"));
        }

        if self.translation.enabled {
            if self.translation.target_languages.is_empty() {
                return Err(anyhow!("translation enabled but no target languages configured"));
            }
            if self.translation.auth_key.is_none() {
                return Err(anyhow!("DeepL auth key required when translation is enabled"));
            }
        }

        if self.video.words_per_segment == 0 {
            return Err(anyhow!("words_per_segment must be greater than 0"));
        }

        if self.video.fps == 0 {
            return Err(anyhow!("fps must be greater than 0"));
        }

        if self.video.height < 16 {
            return Err(anyhow!("video height must be at least 16 pixels"));
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "News Reel Configuration:\n\
            - Listing: {}\n\
            - Max Headlines: {}\n\
            - Delay Between Fetches: {}s\n\
            - Window Size: {} chars\n\
            - LLM Provider: {:?}\n\
            - Target Languages: {}\n\
            - Video: {} ({}px high @ {}fps)\n\
            - Output Directory: {}",
            self.ingestion.listing_url,
            self.ingestion.max_items,
            self.ingestion.seconds_between_fetch,
            self.summarizer.window_size,
            self.llm.provider,
            self.translation.target_languages.join(", "),
            self.output.video_path.display(),
            self.video.height,
            self.video.fps,
            self.output.base_dir.display(),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ingestion: IngestionConfig {
                listing_url: "https://www.allure.com/topic/trends".to_string(),
                base_url: "https://www.allure.com".to_string(),
                max_items: 3,
                seconds_between_fetch: 3.0,
                request_timeout_seconds: 30,
                user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
                listing_container_selector: "div.summary-list__items".to_string(),
                link_selector: "a.SummaryItemHedLink-civMjp".to_string(),
                article_container_selector: "div.body__inner-container".to_string(),
                paragraph_selector: "p".to_string(),
            },
            normalizer: NormalizerConfig {
                ad_phrases: [
                    "read this",
                    "watch this",
                    "advertisement",
                    "sponsored",
                    "brought to you by",
                    "subscribe now",
                    "learn more",
                    "buy now",
                    "follow us",
                    "like this",
                    "click here",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                brand_names: ["New York Times", "CNN", "BBC", "Forbes", "Reuters", "Allure"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
            summarizer: SummarizerConfig {
                window_size: 4000,
                preamble: "Summarize the following articles into a single coherent article with an introduction, body, and conclusion:".to_string(),
                min_length: 100,
                max_length: 300,
                num_beams: 8,
                length_penalty: 2.0,
                early_stopping: true,
                max_concurrent_windows: 1,
                timeout_seconds: 120,
                script_prompt: "Summarize this into a 50-second script:".to_string(),
                script_min_length: 100,
                script_max_length: 150, // ~60 seconds when spoken
                script_num_beams: 4,
            },
            llm: LLMConfig::default(),
            translation: TranslationConfig {
                enabled: true,
                endpoint: "https://api-free.deepl.com/v2/translate".to_string(),
                auth_key: None,
                target_languages: vec!["es".to_string(), "pl".to_string(), "tr".to_string()],
                timeout_seconds: 30,
                max_concurrent_requests: 1,
            },
            video: VideoConfig {
                enabled: true,
                words_per_segment: 3,
                height: 1920,
                fps: 30,
                video_codec: "libx264".to_string(),
                audio_codec: "aac".to_string(),
                preset: "medium".to_string(),
                background_path: None,
                background_color: "white".to_string(),
                background_extensions: ["mp4", "mov", "mkv", "webm", "m4v", "jpg", "jpeg", "png"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                tts_language: "en".to_string(),
                tts_endpoint: "https://translate.google.com/translate_tts".to_string(),
                tts_timeout_seconds: 30,
                render_timeout_seconds: 600,
                render_threads: num_cpus::get().min(8),
                font_name: "Arial".to_string(),
                font_size: 16,
            },
            output: OutputConfig {
                base_dir: PathBuf::from("./output"),
                video_path: PathBuf::from("output.mp4"),
                log_level: "info".to_string(),
                save_report: true,
            },
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.config.ingestion.max_items = max_items;
        self
    }

    pub fn with_fetch_delay(mut self, seconds: f64) -> Self {
        self.config.ingestion.seconds_between_fetch = seconds;
        self
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.config.summarizer.window_size = window_size;
        self
    }

    pub fn with_target_languages(mut self, languages: &[&str]) -> Self {
        self.config.translation.target_languages = languages.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_deepl_key(mut self, key: String) -> Self {
        self.config.translation.auth_key = Some(key);
        self
    }

    pub fn with_words_per_segment(mut self, words: usize) -> Self {
        self.config.video.words_per_segment = words;
        self
    }

    pub fn with_background(mut self, path: PathBuf) -> Self {
        self.config.video.background_path = Some(path);
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.base_dir = dir;
        self
    }

    pub fn with_video_path(mut self, path: PathBuf) -> Self {
        self.config.output.video_path = path;
        self
    }

    pub fn enable_translation(mut self, enable: bool) -> Self {
        self.config.translation.enabled = enable;
        self
    }

    pub fn enable_video(mut self, enable: bool) -> Self {
        self.config.video.enabled = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
