//! Speech engine trait and types.

#[cfg(feature = "kokoro")]
pub mod kokoro;
pub mod mock;
pub mod silence;

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Voice settings passed through to the speech engine.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceOptions {
    /// Engine-specific voice identifier (e.g. `am_onyx` for Kokoro)
    pub voice: String,
    /// Speaking rate multiplier (0.5-2.0, default 1.25)
    pub speed: f32,
}

impl Default for VoiceOptions {
    fn default() -> Self {
        Self {
            voice: "am_onyx".to_string(),
            speed: 1.25,
        }
    }
}

impl VoiceOptions {
    /// Create new voice options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the voice identifier.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Set the speaking rate.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.clamp(0.5, 2.0);
        self
    }
}

/// One item produced by an engine for part of a chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOutput {
    /// Text the engine spoke for this item
    pub graphemes: String,
    /// Phoneme string the engine used
    pub phonemes: String,
    /// Mono PCM frames, or `None` if the engine yielded something unusable
    pub audio: Option<Vec<f32>>,
}

impl SynthesisOutput {
    /// Create an output item carrying audio.
    pub fn new(graphemes: impl Into<String>, phonemes: impl Into<String>, audio: Vec<f32>) -> Self {
        Self {
            graphemes: graphemes.into(),
            phonemes: phonemes.into(),
            audio: Some(audio),
        }
    }

    /// Number of audio frames (0 when there is no audio).
    pub fn frames(&self) -> usize {
        self.audio.as_ref().map_or(0, Vec::len)
    }
}

/// Lazy, finite, ordered sequence of synthesis items for one chapter.
pub type ChunkStream = Box<dyn Iterator<Item = Result<SynthesisOutput>> + Send>;

/// Speech engine trait - every synthesis backend implements this.
///
/// Engines are blocking; the pipeline drives them from a blocking task.
pub trait SpeechEngine: Send + Sync {
    /// Start synthesizing `text`, returning items as the engine produces them.
    fn synthesize(&self, text: &str, voice: &VoiceOptions) -> Result<ChunkStream>;

    /// Sample rate of every buffer this engine emits.
    fn sample_rate(&self) -> u32;

    /// Engine name for display.
    fn name(&self) -> &'static str;
}

/// Available engine implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Kokoro neural TTS (requires the `kokoro` feature and Python package)
    Kokoro,
    /// Silent placeholder audio sized from word count, for dry runs
    Silence,
}

/// Create a speech engine.
///
/// # Arguments
/// * `kind` - Which engine to build
/// * `sample_rate` - Rate the pipeline expects (used by engines that can adapt)
/// * `lang_code` - Kokoro pipeline language code
/// * `device` - Device to use: "cuda", "cpu", or None for auto-detect
#[cfg_attr(not(feature = "kokoro"), allow(unused_variables))]
pub fn create_engine(
    kind: EngineKind,
    sample_rate: u32,
    lang_code: &str,
    device: Option<&str>,
) -> Result<Arc<dyn SpeechEngine>> {
    match kind {
        EngineKind::Silence => Ok(Arc::new(silence::SilenceEngine::new(sample_rate))),
        #[cfg(feature = "kokoro")]
        EngineKind::Kokoro => Ok(Arc::new(kokoro::KokoroEngine::new(lang_code, device)?)),
        #[cfg(not(feature = "kokoro"))]
        EngineKind::Kokoro => Err(PipelineError::EngineUnavailable(
            "gen-serial was built without the 'kokoro' feature; rebuild with --features kokoro or use --engine silence"
                .to_string(),
        )),
    }
}
