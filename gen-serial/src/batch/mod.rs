//! Chapter batching: accumulating chapter audio into bounded batches and
//! writing each batch as an audio file plus a timestamp index.

pub mod accumulator;
pub mod writer;

pub use accumulator::{BatchAccumulator, BatchSettings, ClipSummary, PushOutcome};
pub use writer::{BatchWriter, SampleEncoding, WriterSettings, WrittenBatch};

/// Synthesized audio for part of one chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    /// Mono PCM frames in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Index of the chapter this chunk belongs to
    pub origin_chapter: usize,
}

impl AudioChunk {
    /// Create a new audio chunk.
    pub fn new(samples: Vec<f32>, origin_chapter: usize) -> Self {
        Self {
            samples,
            origin_chapter,
        }
    }

    /// Number of frames in this chunk.
    pub fn frames(&self) -> usize {
        self.samples.len()
    }
}

/// All audio for one chapter, positioned inside its batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterClip {
    pub title: String,
    pub samples: Vec<f32>,
    /// Seconds from the start of the batch file to this chapter
    pub start_offset_seconds: f64,
}

/// One line of a batch's timestamp index.
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampEntry {
    pub title: String,
    pub start_offset_seconds: f64,
}

/// A run of consecutive chapters written together as one file pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub clips: Vec<ChapterClip>,
    pub entries: Vec<TimestampEntry>,
}

impl Batch {
    /// Number of chapters in the batch.
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Check if the batch holds no chapters.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Title of the first chapter, which names the batch files.
    pub fn first_title(&self) -> Option<&str> {
        self.clips.first().map(|c| c.title.as_str())
    }

    /// Total frames across all clips.
    pub fn total_frames(&self) -> usize {
        self.clips.iter().map(|c| c.samples.len()).sum()
    }
}
