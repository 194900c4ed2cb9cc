/// Narrated video synthesis
///
/// Speech, caption timing and ffmpeg composition for short vertical videos.

pub mod background;
pub mod captions;
pub mod ffmpeg;
pub mod synthesizer;
pub mod tts;

pub use background::BackgroundSource;
pub use captions::{build_caption_timeline, CaptionSegment, SrtWriter};
pub use ffmpeg::{FfmpegBackend, MediaBackend, RenderPlan};
pub use synthesizer::{MediaSynthesizer, RenderedVideo};
pub use tts::{GoogleTts, TtsProvider};
