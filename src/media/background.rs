use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

use crate::config::VideoConfig;
use crate::error::SynthesisError;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Visual layer behind the captions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BackgroundSource {
    /// Solid color (any ffmpeg color name or hex value)
    Color(String),
    /// Still image held for the whole narration
    Image(PathBuf),
    /// Clip looped or trimmed to the narration
    Video(PathBuf),
}

impl BackgroundSource {
    /// Resolve the configured background path.
    ///
    /// A directory resolves to its first supported file in name order.
    pub fn from_config(config: &VideoConfig) -> Result<Self, SynthesisError> {
        match &config.background_path {
            None => Ok(BackgroundSource::Color(config.background_color.clone())),
            Some(path) if path.is_dir() => {
                let clip = Self::first_supported(path, &config.background_extensions).ok_or_else(|| {
                    SynthesisError::Config(format!("No usable background in {}", path.display()))
                })?;
                info!("🎞️ Using background {}", clip.display());
                Ok(Self::from_file(clip))
            }
            Some(path) if path.is_file() => Ok(Self::from_file(path.clone())),
            Some(path) => Err(SynthesisError::Config(format!(
                "Background not found: {}",
                path.display()
            ))),
        }
    }

    fn from_file(path: PathBuf) -> Self {
        if has_extension(&path, &IMAGE_EXTENSIONS) {
            BackgroundSource::Image(path)
        } else {
            BackgroundSource::Video(path)
        }
    }

    fn first_supported(dir: &Path, extensions: &[String]) -> Option<PathBuf> {
        WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .find(|path| has_extension(path, extensions))
    }
}

fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            extensions.iter().any(|e| e.as_ref() == ext)
        })
        .unwrap_or(false)
}
