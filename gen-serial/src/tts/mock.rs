//! Scripted speech engine for testing
//!
//! Returns a configurable sequence of chunk lengths per call, so tests can
//! simulate empty chapters, invalid buffers and engine failures.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ChunkStream, SpeechEngine, SynthesisOutput, VoiceOptions};
use crate::error::{PipelineError, Result};

/// What the mock yields for one chapter.
#[derive(Debug, Clone)]
pub enum MockChapter {
    /// One buffer per entry with that many frames (0 = empty buffer)
    Chunks(Vec<usize>),
    /// A single item whose audio could not be converted
    Unusable,
    /// Fail before producing anything
    Fail(String),
    /// Yield these buffers, then fail mid-stream
    FailAfter(Vec<usize>, String),
}

/// A mock engine that replays scripted chapters in call order
pub struct MockEngine {
    /// Scripted responses, consumed one per `synthesize` call
    script: Mutex<VecDeque<MockChapter>>,
    /// Response used once the script runs out
    fallback: MockChapter,
    /// Sample value written into every frame
    level: f32,
    sample_rate: u32,
    call_count: AtomicUsize,
}

impl MockEngine {
    /// Create an engine that answers every call with the same chunk lengths
    pub fn uniform(chunk_frames: Vec<usize>, sample_rate: u32) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: MockChapter::Chunks(chunk_frames),
            level: 0.25,
            sample_rate,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create an engine that answers calls from `script`, then with no audio
    pub fn scripted(script: Vec<MockChapter>, sample_rate: u32) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: MockChapter::Chunks(Vec::new()),
            level: 0.25,
            sample_rate,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Set the sample value written into every frame
    pub fn with_level(mut self, level: f32) -> Self {
        self.level = level;
        self
    }

    /// Get the number of times synthesize() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn next_chapter(&self) -> MockChapter {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        script.pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

impl SpeechEngine for MockEngine {
    fn synthesize(&self, text: &str, _voice: &VoiceOptions) -> Result<ChunkStream> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let graphemes = text.lines().next().unwrap_or_default().to_string();

        let outputs: Vec<Result<SynthesisOutput>> = match self.next_chapter() {
            MockChapter::Chunks(frames) => frames
                .into_iter()
                .map(|n| Ok(SynthesisOutput::new(graphemes.clone(), "", vec![self.level; n])))
                .collect(),
            MockChapter::Unusable => vec![Ok(SynthesisOutput {
                graphemes,
                phonemes: String::new(),
                audio: None,
            })],
            MockChapter::FailAfter(frames, message) => frames
                .into_iter()
                .map(|n| Ok(SynthesisOutput::new(graphemes.clone(), "", vec![self.level; n])))
                .chain(std::iter::once(Err(PipelineError::Synthesis {
                    chapter: graphemes.clone(),
                    message,
                })))
                .collect(),
            MockChapter::Fail(message) => {
                return Err(PipelineError::Synthesis {
                    chapter: graphemes,
                    message,
                });
            }
        };

        Ok(Box::new(outputs.into_iter()))
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(engine: &MockEngine, text: &str) -> Result<Vec<SynthesisOutput>> {
        engine.synthesize(text, &VoiceOptions::default())?.collect()
    }

    #[test]
    fn test_uniform_repeats() {
        let engine = MockEngine::uniform(vec![10, 0], 24000);
        for _ in 0..3 {
            let outputs = collect(&engine, "Hello").unwrap();
            assert_eq!(outputs.len(), 2);
            assert_eq!(outputs[0].frames(), 10);
            assert_eq!(outputs[1].frames(), 0);
        }
        assert_eq!(engine.call_count(), 3);
    }

    #[test]
    fn test_scripted_then_empty() {
        let engine = MockEngine::scripted(
            vec![MockChapter::Unusable, MockChapter::Fail("boom".to_string())],
            24000,
        );

        let first = collect(&engine, "A").unwrap();
        assert_eq!(first.len(), 1);
        assert!(first[0].audio.is_none());

        let err = collect(&engine, "B").unwrap_err();
        assert!(err.to_string().contains("boom"));

        assert!(collect(&engine, "C").unwrap().is_empty());
    }

    #[test]
    fn test_fail_after_yields_chunks_first() {
        let engine = MockEngine::scripted(
            vec![MockChapter::FailAfter(vec![5, 7], "stream broke".to_string())],
            24000,
        );

        let items: Vec<Result<SynthesisOutput>> = engine
            .synthesize("Chapter", &VoiceOptions::default())
            .unwrap()
            .collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap().frames(), 5);
        assert_eq!(items[1].as_ref().unwrap().frames(), 7);
        assert!(items[2].is_err());
    }
}
