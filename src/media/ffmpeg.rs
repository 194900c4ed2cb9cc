use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::background::BackgroundSource;
use crate::error::SynthesisError;

/// Everything needed to render one narrated video
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub background: BackgroundSource,
    pub narration: PathBuf,
    pub captions: PathBuf,
    pub duration: Duration,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,
    pub threads: usize,
    pub font_name: String,
    pub font_size: u32,
    pub output: PathBuf,
}

/// Media probing and composition
#[async_trait]
pub trait MediaBackend: Send + Sync {
    async fn probe_duration(&self, path: &Path) -> Result<Duration, SynthesisError>;
    async fn render(&self, plan: &RenderPlan) -> Result<(), SynthesisError>;
}

/// ffmpeg/ffprobe command line backend
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    render_timeout: Duration,
}

impl FfmpegBackend {
    pub fn new(render_timeout: Duration) -> Self {
        Self { render_timeout }
    }

    /// Quote a path as a filter option value.
    ///
    /// Option-level escapes for `\`, `:` and `'` are applied first. The result is then
    /// single-quoted for the filtergraph level, where a quote is written `'\''`.
    fn quote_filter_path(path: &Path) -> String {
        let option_escaped = path
            .to_string_lossy()
            .replace('\\', "\\\\")
            .replace(':', "\\:")
            .replace('\'', "\\'");
        format!("'{}'", option_escaped.replace('\'', "'\\''"))
    }

    /// ffmpeg arguments for a render plan
    pub fn render_args(plan: &RenderPlan) -> Vec<String> {
        let mut args: Vec<String> = vec!["-y".into(), "-hide_banner".into(), "-loglevel".into(), "error".into()];

        match &plan.background {
            BackgroundSource::Color(color) => {
                args.extend([
                    "-f".into(),
                    "lavfi".into(),
                    "-i".into(),
                    format!("color=c={}:s={}x{}:r={}", color, plan.width, plan.height, plan.fps),
                ]);
            }
            BackgroundSource::Image(path) => {
                args.extend(["-loop".into(), "1".into(), "-i".into(), path.to_string_lossy().into_owned()]);
            }
            BackgroundSource::Video(path) => {
                // Loop forever; -t below trims to the narration
                args.extend([
                    "-stream_loop".into(),
                    "-1".into(),
                    "-i".into(),
                    path.to_string_lossy().into_owned(),
                ]);
            }
        }

        args.extend(["-i".into(), plan.narration.to_string_lossy().into_owned()]);

        let style = format!(
            "FontName={},FontSize={},PrimaryColour=&H00FFFFFF,OutlineColour=&H00000000,BorderStyle=1,Outline=2,Alignment=2,MarginV=40",
            plan.font_name, plan.font_size
        );
        let filter = format!(
            "[0:v]scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},setsar=1,fps={fps},subtitles=filename={srt}:force_style='{style}'[v]",
            w = plan.width,
            h = plan.height,
            fps = plan.fps,
            srt = Self::quote_filter_path(&plan.captions),
            style = style,
        );

        args.extend([
            "-filter_complex".into(),
            filter,
            "-map".into(),
            "[v]".into(),
            "-map".into(),
            "1:a".into(),
            "-t".into(),
            format!("{:.3}", plan.duration.as_secs_f64()),
            "-r".into(),
            plan.fps.to_string(),
            "-c:v".into(),
            plan.video_codec.clone(),
            "-preset".into(),
            plan.preset.clone(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-c:a".into(),
            plan.audio_codec.clone(),
            "-threads".into(),
            plan.threads.to_string(),
            plan.output.to_string_lossy().into_owned(),
        ]);

        args
    }

    /// Parse `format.duration` out of ffprobe JSON output
    pub fn parse_probe_duration(json_str: &str) -> Option<Duration> {
        let ffprobe_data: serde_json::Value = serde_json::from_str(json_str).ok()?;
        let seconds: f64 = ffprobe_data["format"]["duration"].as_str()?.parse().ok()?;
        if seconds.is_finite() && seconds >= 0.0 {
            Some(Duration::from_secs_f64(seconds))
        } else {
            None
        }
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}

#[async_trait]
impl MediaBackend for FfmpegBackend {
    async fn probe_duration(&self, path: &Path) -> Result<Duration, SynthesisError> {
        let probe_error = |reason: String| SynthesisError::Probe {
            path: path.to_path_buf(),
            reason,
        };

        let output = tokio::process::Command::new("ffprobe")
            .args(["-v", "quiet", "-print_format", "json", "-show_format"])
            .arg(path)
            .output()
            .await
            .map_err(|e| probe_error(e.to_string()))?;

        if !output.status.success() {
            return Err(probe_error(format!("ffprobe exited with {}", output.status)));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        Self::parse_probe_duration(&json_str).ok_or_else(|| probe_error("no duration in ffprobe output".to_string()))
    }

    async fn render(&self, plan: &RenderPlan) -> Result<(), SynthesisError> {
        let args = Self::render_args(plan);
        debug!("ffmpeg {}", args.join(" "));

        info!(
            "🎬 Rendering {:.1}s video at {}x{} {}fps",
            plan.duration.as_secs_f64(),
            plan.width,
            plan.height,
            plan.fps
        );

        let mut command = tokio::process::Command::new("ffmpeg");
        command.args(&args).kill_on_drop(true);

        let output = tokio::time::timeout(self.render_timeout, command.output())
            .await
            .map_err(|_| SynthesisError::Timeout(self.render_timeout))?
            .map_err(|e| SynthesisError::Render(format!("failed to start ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SynthesisError::Render(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
