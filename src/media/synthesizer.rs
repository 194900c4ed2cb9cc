use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::background::BackgroundSource;
use super::captions::{build_caption_timeline, CaptionSegment, SrtWriter};
use super::ffmpeg::{MediaBackend, RenderPlan};
use super::tts::TtsProvider;
use crate::config::VideoConfig;
use crate::error::SynthesisError;
use crate::timing::ScopedTimer;

/// Summary of a finished render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedVideo {
    pub path: PathBuf,
    pub duration: Duration,
    pub captions: Vec<CaptionSegment>,
}

/// Turns a narration script into a captioned 9:16 video
pub struct MediaSynthesizer {
    tts: Arc<dyn TtsProvider>,
    backend: Arc<dyn MediaBackend>,
    config: VideoConfig,
    scratch_root: PathBuf,
}

impl MediaSynthesizer {
    pub fn new(config: VideoConfig, tts: Arc<dyn TtsProvider>, backend: Arc<dyn MediaBackend>) -> Self {
        Self {
            tts,
            backend,
            config,
            scratch_root: std::env::temp_dir(),
        }
    }

    /// Directory under which per-run scratch directories are created
    pub fn with_scratch_root(mut self, root: PathBuf) -> Self {
        self.scratch_root = root;
        self
    }

    /// Output frame size: configured height, width cropped to 9:16 (even for yuv420p)
    pub fn frame_size(&self) -> Result<(u32, u32), SynthesisError> {
        let height = self.config.height;
        let width = (height as u64 * 9 / 16) as u32 & !1;
        if width == 0 || height == 0 {
            return Err(SynthesisError::Config(format!(
                "frame height {} leaves no width after 9:16 crop",
                height
            )));
        }
        Ok((width, height & !1))
    }

    /// Render `script` over `background` into `output_path`.
    ///
    /// The scratch directory holding narration audio and captions is removed
    /// whether or not rendering succeeds.
    pub async fn synthesize(
        &self,
        script: &str,
        background: &BackgroundSource,
        output_path: &Path,
    ) -> Result<RenderedVideo, SynthesisError> {
        let _timer = ScopedTimer::start("create_video");

        if script.split_whitespace().next().is_none() {
            return Err(SynthesisError::EmptyScript);
        }

        let scratch = tempfile::Builder::new()
            .prefix("news-reel-")
            .tempdir_in(&self.scratch_root)?;
        debug!("Scratch directory: {}", scratch.path().display());

        let result = self.render_in(&scratch, script, background, output_path).await;

        let scratch_path = scratch.path().to_path_buf();
        match scratch.close() {
            Ok(()) => debug!("🧹 Removed scratch directory {}", scratch_path.display()),
            Err(e) => warn!("Failed to remove scratch directory {}: {}", scratch_path.display(), e),
        }

        result
    }

    async fn render_in(
        &self,
        scratch: &TempDir,
        script: &str,
        background: &BackgroundSource,
        output_path: &Path,
    ) -> Result<RenderedVideo, SynthesisError> {
        let (width, height) = self.frame_size()?;
        self.check_settings(background).await?;

        let narration_path = scratch.path().join("narration.mp3");
        self.tts
            .synthesize(script, &self.config.tts_language, &narration_path)
            .await?;

        let duration = self.backend.probe_duration(&narration_path).await?;
        if duration.is_zero() {
            return Err(SynthesisError::Probe {
                path: narration_path,
                reason: "narration has zero duration".to_string(),
            });
        }
        info!("🔊 Narration duration: {:.2}s", duration.as_secs_f64());

        let captions = build_caption_timeline(script, self.config.words_per_segment, duration);
        let captions_path = scratch.path().join("captions.srt");
        SrtWriter::new(&captions)
            .save_to_file(&captions_path)
            .await
            .map_err(|e| SynthesisError::Render(format!("failed to write captions: {}", e)))?;
        info!("💬 {} caption segments", captions.len());

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let plan = RenderPlan {
            background: background.clone(),
            narration: narration_path,
            captions: captions_path,
            duration,
            width,
            height,
            fps: self.config.fps,
            video_codec: self.config.video_codec.clone(),
            audio_codec: self.config.audio_codec.clone(),
            preset: self.config.preset.clone(),
            threads: self.config.render_threads,
            font_name: self.config.font_name.clone(),
            font_size: self.config.font_size,
            output: output_path.to_path_buf(),
        };

        self.backend.render(&plan).await?;
        info!("✅ Video written to {}", output_path.display());

        Ok(RenderedVideo {
            path: output_path.to_path_buf(),
            duration,
            captions,
        })
    }

    /// Reject settings that cannot produce a captioned timeline; video backgrounds must last at least one frame
    async fn check_settings(&self, background: &BackgroundSource) -> Result<(), SynthesisError> {
        if self.config.words_per_segment == 0 {
            return Err(SynthesisError::Config(
                "words_per_segment must be greater than 0".to_string(),
            ));
        }

        if self.config.fps == 0 {
            return Err(SynthesisError::Config("fps must be greater than 0".to_string()));
        }

        if let BackgroundSource::Video(path) = background {
            let clip = self.backend.probe_duration(path).await?;
            let frame = Duration::from_secs_f64(1.0 / self.config.fps as f64);
            if clip < frame {
                return Err(SynthesisError::Config(format!(
                    "background {} is shorter than one frame ({:.3}s)",
                    path.display(),
                    clip.as_secs_f64()
                )));
            }
        }

        Ok(())
    }
}
