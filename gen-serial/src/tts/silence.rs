//! Silent placeholder engine for dry runs.
//!
//! Emits one buffer of silence per paragraph, sized from the word count at a
//! nominal narration pace. Batch boundaries, file names and timestamps come
//! out the same shape as a real run, without loading a speech model.

use super::{ChunkStream, SpeechEngine, SynthesisOutput, VoiceOptions};
use crate::error::Result;

/// Nominal narration pace at speed 1.0.
const WORDS_PER_MINUTE: f64 = 150.0;

/// Silent placeholder engine.
pub struct SilenceEngine {
    sample_rate: u32,
}

impl SilenceEngine {
    /// Create a silence engine emitting at `sample_rate`.
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    /// Frames needed to speak `words` words at `speed`.
    fn frames_for(&self, words: usize, speed: f32) -> usize {
        let words_per_second = WORDS_PER_MINUTE * f64::from(speed.max(0.1)) / 60.0;
        let seconds = words as f64 / words_per_second;
        (seconds * f64::from(self.sample_rate)).round() as usize
    }
}

impl SpeechEngine for SilenceEngine {
    fn synthesize(&self, text: &str, voice: &VoiceOptions) -> Result<ChunkStream> {
        let outputs: Vec<Result<SynthesisOutput>> = paragraphs(text)
            .into_iter()
            .map(|paragraph| {
                let words = paragraph.split_whitespace().count();
                let frames = self.frames_for(words, voice.speed);
                Ok(SynthesisOutput::new(paragraph, "", vec![0.0; frames]))
            })
            .collect();

        Ok(Box::new(outputs.into_iter()))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn name(&self) -> &'static str {
        "silence"
    }
}

/// Split text on blank lines, dropping empty paragraphs.
fn paragraphs(text: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                result.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line.trim());
        }
    }
    if !current.is_empty() {
        result.push(current.join(" "));
    }

    result
}
