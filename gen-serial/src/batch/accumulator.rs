//! Batch accumulation with running-offset accounting.

use super::{AudioChunk, Batch, ChapterClip, TimestampEntry};
use crate::error::{PipelineError, Result};
use crate::text::ChapterRecord;

/// Default number of chapters per batch file.
pub const DEFAULT_BATCH_LIMIT: usize = 10;

/// Default pipeline sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// Batch sizing and timing settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Maximum chapters per batch
    pub batch_limit: usize,
    /// Sample rate shared by every clip
    pub sample_rate: u32,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_limit: DEFAULT_BATCH_LIMIT,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl BatchSettings {
    /// Create settings, rejecting values that could never form a batch.
    pub fn new(batch_limit: usize, sample_rate: u32) -> Result<Self> {
        if batch_limit == 0 {
            return Err(PipelineError::Config(
                "batch_limit must be at least 1".to_string(),
            ));
        }
        if sample_rate == 0 {
            return Err(PipelineError::Config(
                "sample_rate must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            batch_limit,
            sample_rate,
        })
    }
}

/// Where a pushed chapter landed in its batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSummary {
    pub title: String,
    pub frames: usize,
    pub start_offset_seconds: f64,
}

/// Result of pushing one chapter.
#[derive(Debug, Default)]
pub struct PushOutcome {
    /// The chapter's clip, or `None` if it had no usable audio and was skipped
    pub clip: Option<ClipSummary>,
    /// A completed batch, ready to be written
    pub flushed: Option<Batch>,
}

/// Groups consecutive chapter clips into bounded batches.
///
/// Chapters must be pushed in document order. A batch is handed back once it
/// holds `batch_limit` clips or the final expected chapter has been pushed.
pub struct BatchAccumulator {
    settings: BatchSettings,
    /// Number of records the caller will push in total
    total_records: usize,
    /// Records pushed so far, including skipped ones
    pushed: usize,
    current: Batch,
    /// Frames already in the current batch
    cumulative_samples: u64,
}

impl BatchAccumulator {
    /// Create an accumulator expecting `total_records` pushes.
    pub fn new(settings: BatchSettings, total_records: usize) -> Self {
        Self {
            settings,
            total_records,
            pushed: 0,
            current: Batch::default(),
            cumulative_samples: 0,
        }
    }

    /// Add one chapter's synthesized audio.
    ///
    /// Empty chunks are dropped. A chapter with no usable audio is skipped
    /// without moving the running offset.
    pub fn push(&mut self, record: &ChapterRecord, chunks: Vec<AudioChunk>) -> PushOutcome {
        self.pushed += 1;
        let is_last = self.pushed >= self.total_records;

        let mut samples = Vec::new();
        for (i, chunk) in chunks.into_iter().enumerate() {
            if chunk.frames() == 0 {
                log::warn!(
                    "Empty audio in chapter {} ({}), chunk {}. Skipping.",
                    record.index + 1,
                    record.title,
                    i
                );
                continue;
            }
            samples.extend(chunk.samples);
        }

        let clip = if samples.is_empty() {
            log::warn!("No valid audio chunks for chapter {}, skipping.", record.title);
            None
        } else {
            Some(self.append(record, samples))
        };

        let batch_full = self.current.len() >= self.settings.batch_limit;
        let flushed = if batch_full || is_last {
            self.take_batch()
        } else {
            None
        };

        PushOutcome { clip, flushed }
    }

    /// Hand back whatever is in progress, for callers that stop early.
    pub fn flush_remaining(&mut self) -> Option<Batch> {
        self.take_batch()
    }

    /// Number of chapters in the batch being built.
    pub fn pending_clips(&self) -> usize {
        self.current.len()
    }

    /// Seconds of audio in the batch being built.
    pub fn pending_seconds(&self) -> f64 {
        self.cumulative_samples as f64 / f64::from(self.settings.sample_rate)
    }

    fn append(&mut self, record: &ChapterRecord, samples: Vec<f32>) -> ClipSummary {
        let start_offset_seconds = self.pending_seconds();
        let frames = samples.len();

        self.current.clips.push(ChapterClip {
            title: record.title.clone(),
            samples,
            start_offset_seconds,
        });
        self.current.entries.push(TimestampEntry {
            title: record.title.clone(),
            start_offset_seconds,
        });
        self.cumulative_samples += frames as u64;

        log::debug!(
            "Added {} at {:.2}s ({} frames, {} in batch)",
            record.title,
            start_offset_seconds,
            frames,
            self.current.len()
        );

        ClipSummary {
            title: record.title.clone(),
            frames,
            start_offset_seconds,
        }
    }

    /// Move the current batch out and reset running state.
    fn take_batch(&mut self) -> Option<Batch> {
        let batch = std::mem::take(&mut self.current);
        self.cumulative_samples = 0;
        if batch.is_empty() { None } else { Some(batch) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 24000;

    fn records(n: usize) -> Vec<ChapterRecord> {
        (0..n)
            .map(|i| ChapterRecord::new(format!("Book_1_Chapter_{}", i + 1), "text", i))
            .collect()
    }

    fn chunks(index: usize, frames: &[usize]) -> Vec<AudioChunk> {
        frames
            .iter()
            .map(|&n| AudioChunk::new(vec![0.5; n], index))
            .collect()
    }

    fn settings(limit: usize) -> BatchSettings {
        BatchSettings::new(limit, RATE).unwrap()
    }

    #[test]
    fn test_settings_validation() {
        assert!(BatchSettings::new(0, RATE).is_err());
        assert!(BatchSettings::new(1, 0).is_err());
        assert_eq!(BatchSettings::default().batch_limit, 10);
        assert_eq!(BatchSettings::default().sample_rate, 24000);
    }

    #[test]
    fn test_offsets_accumulate_within_batch() {
        let records = records(3);
        let mut acc = BatchAccumulator::new(settings(10), 3);

        let a = acc.push(&records[0], chunks(0, &[12000, 12000]));
        let b = acc.push(&records[1], chunks(1, &[36000]));
        let c = acc.push(&records[2], chunks(2, &[100]));

        assert_eq!(a.clip.unwrap().start_offset_seconds, 0.0);
        assert_eq!(b.clip.unwrap().start_offset_seconds, 1.0);
        assert_eq!(c.clip.as_ref().unwrap().start_offset_seconds, 2.5);
        assert!(a.flushed.is_none());
        assert!(b.flushed.is_none());

        let batch = c.flushed.expect("last record flushes");
        assert_eq!(batch.len(), 3);
        let offsets: Vec<f64> = batch.entries.iter().map(|e| e.start_offset_seconds).collect();
        assert_eq!(offsets, [0.0, 1.0, 2.5]);
    }

    #[test]
    fn test_chunks_concatenate_in_order() {
        let records = records(1);
        let mut acc = BatchAccumulator::new(settings(10), 1);
        let chunks = vec![
            AudioChunk::new(vec![0.1, 0.2], 0),
            AudioChunk::new(vec![0.3], 0),
        ];

        let batch = acc.push(&records[0], chunks).flushed.unwrap();
        assert_eq!(batch.clips[0].samples, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_empty_chunks_filtered() {
        let records = records(1);
        let mut acc = BatchAccumulator::new(settings(10), 1);

        let outcome = acc.push(&records[0], chunks(0, &[0, 10, 0, 5]));
        assert_eq!(outcome.clip.unwrap().frames, 15);
        assert_eq!(outcome.flushed.unwrap().total_frames(), 15);
    }

    #[test]
    fn test_skipped_chapter_does_not_move_offset() {
        let records = records(3);
        let mut acc = BatchAccumulator::new(settings(10), 3);

        acc.push(&records[0], chunks(0, &[24000]));
        let skipped = acc.push(&records[1], chunks(1, &[0, 0]));
        assert!(skipped.clip.is_none());
        assert_eq!(acc.pending_clips(), 1);
        assert_eq!(acc.pending_seconds(), 1.0);

        let third = acc.push(&records[2], chunks(2, &[24000]));
        assert_eq!(third.clip.unwrap().start_offset_seconds, 1.0);
        let batch = third.flushed.unwrap();
        let titles: Vec<&str> = batch.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Book_1_Chapter_1", "Book_1_Chapter_3"]);
    }

    #[test]
    fn test_flush_at_limit_resets_offset() {
        let records = records(5);
        let mut acc = BatchAccumulator::new(settings(2), 5);
        let mut batches = Vec::new();

        for record in &records {
            if let Some(batch) = acc.push(record, chunks(record.index, &[24000])).flushed {
                batches.push(batch);
            }
        }

        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, [2, 2, 1]);
        for batch in &batches {
            assert_eq!(batch.entries[0].start_offset_seconds, 0.0);
            assert!(batch.len() <= 2);
        }
        assert_eq!(batches[2].first_title(), Some("Book_1_Chapter_5"));
    }

    #[test]
    fn test_skipped_final_chapter_flushes_remaining() {
        let records = records(3);
        let mut acc = BatchAccumulator::new(settings(10), 3);

        assert!(acc.push(&records[0], chunks(0, &[10])).flushed.is_none());
        assert!(acc.push(&records[1], chunks(1, &[10])).flushed.is_none());
        let last = acc.push(&records[2], Vec::new());

        assert!(last.clip.is_none());
        assert_eq!(last.flushed.unwrap().len(), 2);
    }

    #[test]
    fn test_all_chapters_skipped_yields_no_batches() {
        let records = records(4);
        let mut acc = BatchAccumulator::new(settings(2), 4);

        for record in &records {
            let outcome = acc.push(record, chunks(record.index, &[0]));
            assert!(outcome.clip.is_none());
            assert!(outcome.flushed.is_none());
        }
        assert!(acc.flush_remaining().is_none());
    }

    #[test]
    fn test_trailing_empty_batch_after_full_flush() {
        let records = records(3);
        let mut acc = BatchAccumulator::new(settings(2), 3);

        acc.push(&records[0], chunks(0, &[10]));
        assert!(acc.push(&records[1], chunks(1, &[10])).flushed.is_some());
        assert!(acc.push(&records[2], Vec::new()).flushed.is_none());
    }

    #[test]
    fn test_flush_remaining_on_early_stop() {
        let records = records(10);
        let mut acc = BatchAccumulator::new(settings(4), 10);

        for record in &records[..3] {
            assert!(acc.push(record, chunks(record.index, &[48000])).flushed.is_none());
        }
        let batch = acc.flush_remaining().unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(acc.pending_clips(), 0);
        assert_eq!(acc.pending_seconds(), 0.0);
        assert!(acc.flush_remaining().is_none());
    }

    #[test]
    fn test_single_chapter_batch_limit_one() {
        let records = records(2);
        let mut acc = BatchAccumulator::new(settings(1), 2);

        let first = acc.push(&records[0], chunks(0, &[24000])).flushed.unwrap();
        let second = acc.push(&records[1], chunks(1, &[24000])).flushed.unwrap();
        assert_eq!(first.entries[0].start_offset_seconds, 0.0);
        assert_eq!(second.entries[0].start_offset_seconds, 0.0);
        assert_eq!(second.first_title(), Some("Book_1_Chapter_2"));
    }
}
