//! gen-serial - turn chaptered web-serial text into batched audio files.
//!
//! The pipeline normalizes scraped text, splits it into chapters on
//! `Book <n> and Chapter <m>` headers, synthesizes each chapter with a
//! [`tts::SpeechEngine`], and writes consecutive chapters in batches: one WAV
//! file per batch plus a `HH:MM:SS <title>` index of where each chapter starts.

pub mod batch;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod text;
pub mod tts;

pub use batch::{Batch, BatchAccumulator, BatchSettings, BatchWriter, WrittenBatch};
pub use config::GenSerialConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{CancelFlag, Pipeline, PipelineProgress, PipelineReport, PipelineSettings};
pub use text::{ChapterRecord, prepare_chapters};
pub use tts::{EngineKind, SpeechEngine, VoiceOptions, create_engine};
