//! Kokoro TTS engine using PyO3 to embed Python.
//!
//! Drives `kokoro.KPipeline`, which yields `(graphemes, phonemes, audio)`
//! items lazily for a block of text. Audio comes back as a torch tensor or
//! numpy array of 24 kHz mono float samples.

use super::{ChunkStream, SpeechEngine, SynthesisOutput, VoiceOptions};
use crate::error::{PipelineError, Result};
use pyo3::prelude::*;
use pyo3::types::PyDict;

/// Kokoro always synthesizes at 24 kHz.
pub const KOKORO_SAMPLE_RATE: u32 = 24000;

/// Kokoro TTS engine.
pub struct KokoroEngine {
    /// The loaded `KPipeline` instance
    pipeline: Py<PyAny>,
}

impl KokoroEngine {
    /// Load a Kokoro pipeline.
    ///
    /// # Arguments
    /// * `lang_code` - Kokoro language code (`a` = American English)
    /// * `device` - Device to use: "cuda", "cpu", or None for auto-detect
    pub fn new(lang_code: &str, device: Option<&str>) -> Result<Self> {
        Python::with_gil(|py| {
            let kokoro = py.import("kokoro").map_err(|e| {
                PipelineError::EngineUnavailable(format!(
                    "Python package 'kokoro' could not be imported ({}). Install it with 'pip install kokoro'",
                    e
                ))
            })?;

            let kwargs = PyDict::new(py);
            kwargs.set_item("lang_code", lang_code).map_err(engine_error)?;
            if let Some(device) = device {
                kwargs.set_item("device", device).map_err(engine_error)?;
            }

            let pipeline = kokoro
                .getattr("KPipeline")
                .and_then(|class| class.call((), Some(&kwargs)))
                .map_err(engine_error)?;

            log::info!(
                "Loaded Kokoro pipeline (lang_code={}, device={})",
                lang_code,
                device.unwrap_or("auto")
            );

            Ok(Self {
                pipeline: pipeline.unbind(),
            })
        })
    }
}

impl SpeechEngine for KokoroEngine {
    fn synthesize(&self, text: &str, voice: &VoiceOptions) -> Result<ChunkStream> {
        let generator = Python::with_gil(|py| -> PyResult<Py<PyAny>> {
            let kwargs = PyDict::new(py);
            kwargs.set_item("voice", &voice.voice)?;
            kwargs.set_item("speed", voice.speed)?;
            let generator = self.pipeline.bind(py).call((text,), Some(&kwargs))?;
            Ok(generator.unbind())
        })
        .map_err(|e| synthesis_error(text, e))?;

        Ok(Box::new(KokoroStream {
            generator,
            chapter: text.lines().next().unwrap_or_default().to_string(),
            finished: false,
        }))
    }

    fn sample_rate(&self) -> u32 {
        KOKORO_SAMPLE_RATE
    }

    fn name(&self) -> &'static str {
        "kokoro"
    }
}

/// Pulls one item from the Python generator per `next()` call.
struct KokoroStream {
    generator: Py<PyAny>,
    chapter: String,
    finished: bool,
}

impl Iterator for KokoroStream {
    type Item = Result<SynthesisOutput>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let item = Python::with_gil(|py| -> PyResult<Option<SynthesisOutput>> {
            let next = py.import("builtins")?.getattr("next")?;
            let item = next.call1((self.generator.bind(py), py.None()))?;
            if item.is_none() {
                return Ok(None);
            }

            let graphemes: String = item.get_item(0)?.extract().unwrap_or_default();
            let phonemes: String = item.get_item(1)?.extract().unwrap_or_default();
            let audio = item.get_item(2)?;

            Ok(Some(SynthesisOutput {
                graphemes,
                phonemes,
                audio: audio_frames(&audio),
            }))
        });

        match item {
            Ok(Some(output)) => Some(Ok(output)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(synthesis_error(&self.chapter, e)))
            }
        }
    }
}

/// Convert a tensor or array into frames; `None` when it is not audio.
fn audio_frames(audio: &Bound<'_, PyAny>) -> Option<Vec<f32>> {
    if audio.is_none() {
        return None;
    }
    let flat = audio
        .call_method0("flatten")
        .and_then(|a| a.call_method0("tolist"))
        .ok()?;
    flat.extract::<Vec<f32>>().ok()
}

fn engine_error(e: PyErr) -> PipelineError {
    PipelineError::EngineUnavailable(e.to_string())
}

fn synthesis_error(text: &str, e: PyErr) -> PipelineError {
    PipelineError::Synthesis {
        chapter: text.lines().next().unwrap_or_default().to_string(),
        message: e.to_string(),
    }
}
