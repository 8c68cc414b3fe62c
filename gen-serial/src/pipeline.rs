//! Ordered synthesis, accumulation and batch writing.
//!
//! A producer task synthesizes chapters one at a time on the blocking pool and
//! hands them over a channel of capacity 1, so synthesis of the next chapter
//! overlaps accumulation of the current one. The consumer owns the
//! [`BatchAccumulator`] and pushes strictly in chapter order. Completed batches
//! go to a single writer task that writes them in order, off the consumer's
//! path, and is drained before [`Pipeline::run`] returns.

use crate::batch::{
    AudioChunk, Batch, BatchAccumulator, BatchSettings, BatchWriter, WriterSettings, WrittenBatch,
};
use crate::error::{PipelineError, Result};
use crate::text::ChapterRecord;
use crate::tts::{SpeechEngine, VoiceOptions};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinError;

/// Everything the pipeline needs besides the engine and the chapters.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub batch: BatchSettings,
    pub writer: WriterSettings,
    pub voice: VoiceOptions,
    /// Extra write attempts per batch before giving up
    pub write_retries: u32,
}

/// Shared stop request, honoured between chapters.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the pipeline to stop after the chapter in progress.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One synthesized item, as seen by observers.
#[derive(Debug, Clone)]
pub struct ChunkEvent<'a> {
    pub chapter_index: usize,
    pub chapter_title: &'a str,
    pub chunk_index: usize,
    pub graphemes: &'a str,
    pub phonemes: &'a str,
    pub frames: usize,
}

/// Receives every synthesized item alongside the accumulator.
///
/// Observers see chunks before filtering and cannot influence batching.
pub trait ChunkObserver: Send + Sync {
    fn on_chunk(&self, event: &ChunkEvent<'_>);
}

/// Logs engine diagnostics for each chunk at debug level.
#[derive(Debug, Default)]
pub struct LogObserver;

impl ChunkObserver for LogObserver {
    fn on_chunk(&self, event: &ChunkEvent<'_>) {
        log::debug!(
            "Chapter {}, chunk {}: {} {} ({} frames)",
            event.chapter_index + 1,
            event.chunk_index,
            event.graphemes,
            event.phonemes,
            event.frames
        );
    }
}

/// Progress snapshot passed to the caller after every chapter.
#[derive(Debug, Clone, Default)]
pub struct PipelineProgress {
    pub total_chapters: usize,
    pub processed: usize,
    pub skipped: usize,
    pub batches_written: usize,
    /// Title of the chapter just processed
    pub last_title: Option<String>,
}

/// Outcome of a full run.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    /// Written batches in output order
    pub batches: Vec<WrittenBatch>,
    /// Titles of chapters that produced no audio
    pub skipped: Vec<String>,
    pub chapters_processed: usize,
    /// Whether the run stopped early on request
    pub cancelled: bool,
}

/// One chapter handed from the producer to the consumer.
///
/// `error` is set when the engine failed partway; `chunks` then holds what it
/// yielded before failing.
struct SynthesizedChapter {
    record: ChapterRecord,
    chunks: Vec<AudioChunk>,
    error: Option<PipelineError>,
}

/// The chapter-to-batch pipeline.
pub struct Pipeline {
    engine: Arc<dyn SpeechEngine>,
    settings: PipelineSettings,
    observer: Arc<dyn ChunkObserver>,
    cancel: CancelFlag,
}

impl Pipeline {
    /// Create a pipeline with the default log observer.
    pub fn new(engine: Arc<dyn SpeechEngine>, settings: PipelineSettings) -> Self {
        Self {
            engine,
            settings,
            observer: Arc::new(LogObserver),
            cancel: CancelFlag::new(),
        }
    }

    /// Replace the chunk observer.
    pub fn with_observer(mut self, observer: Arc<dyn ChunkObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Use a cancel flag shared with the caller.
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Synthesize, batch and write every record.
    ///
    /// Batches are written one at a time in the order they fill, so a later
    /// batch with the same identifier replaces an earlier one completely.
    /// On cancellation or an engine error the batch in progress is still
    /// written before returning. A write failure stops the run and nothing
    /// further is written.
    pub async fn run<F>(
        &self,
        records: Vec<ChapterRecord>,
        mut on_progress: F,
    ) -> Result<PipelineReport>
    where
        F: FnMut(&PipelineProgress),
    {
        let engine_rate = self.engine.sample_rate();
        for configured in [self.settings.batch.sample_rate, self.settings.writer.sample_rate] {
            if engine_rate != configured {
                return Err(PipelineError::SampleRateMismatch {
                    engine: engine_rate,
                    configured,
                });
            }
        }

        let total = records.len();
        log::info!(
            "Processing {} chapters with {} engine (batch limit {})",
            total,
            self.engine.name(),
            self.settings.batch.batch_limit
        );

        let (tx, mut rx) = mpsc::channel::<Result<SynthesizedChapter>>(1);
        let producer = tokio::spawn(produce(
            records,
            Arc::clone(&self.engine),
            self.settings.voice.clone(),
            Arc::clone(&self.observer),
            self.cancel.clone(),
            tx,
        ));

        let (batch_tx, batch_rx) = mpsc::unbounded_channel::<Batch>();
        let (result_tx, mut results) = mpsc::unbounded_channel::<Result<WrittenBatch>>();
        let writer = tokio::spawn(write_batches(
            BatchWriter::new(self.settings.writer.clone()),
            self.settings.write_retries,
            batch_rx,
            result_tx,
        ));

        let mut accumulator = BatchAccumulator::new(self.settings.batch, total);
        let mut written: Vec<WrittenBatch> = Vec::new();
        let mut skipped = Vec::new();
        let mut progress = PipelineProgress {
            total_chapters: total,
            ..Default::default()
        };
        let mut engine_failure: Option<PipelineError> = None;
        let mut write_failure: Option<PipelineError> = None;

        while let Some(item) = rx.recv().await {
            let chapter = match item {
                Ok(chapter) => chapter,
                Err(e) => {
                    engine_failure = Some(e);
                    break;
                }
            };
            let SynthesizedChapter {
                record,
                chunks,
                error,
            } = chapter;

            // A failed chapter keeps whatever audio it produced, but is not
            // reported as skipped when it produced none.
            if error.is_none() || !chunks.is_empty() {
                let outcome = accumulator.push(&record, chunks);
                progress.processed += 1;
                progress.last_title = Some(record.title.clone());
                if outcome.clip.is_none() {
                    progress.skipped += 1;
                    skipped.push(record.title.clone());
                }
                if let Some(batch) = outcome.flushed {
                    dispatch_write(&batch_tx, batch);
                }
            }

            while let Ok(outcome) = results.try_recv() {
                match outcome {
                    Ok(batch) => written.push(batch),
                    Err(e) => {
                        write_failure.get_or_insert(e);
                    }
                }
            }
            progress.batches_written = written.len();
            on_progress(&progress);

            if let Some(e) = error {
                engine_failure = Some(e);
                break;
            }
            if write_failure.is_some() {
                break;
            }
            if self.cancel.is_cancelled() {
                log::info!("Stopping after {} (cancel requested)", record.title);
                break;
            }
        }

        // Closing the channel stops the producer at its next chapter boundary.
        drop(rx);
        if let Err(e) = producer.await {
            engine_failure.get_or_insert(task_failed("chapter producer", e));
        }

        if write_failure.is_none() {
            if let Some(batch) = accumulator.flush_remaining() {
                if engine_failure.is_some() {
                    log::warn!("Writing {} chapters finished before the engine failed", batch.len());
                }
                dispatch_write(&batch_tx, batch);
            }
        }

        drop(batch_tx);
        while let Some(outcome) = results.recv().await {
            match outcome {
                Ok(batch) => written.push(batch),
                Err(e) => {
                    write_failure.get_or_insert(e);
                }
            }
        }
        if let Err(e) = writer.await {
            write_failure.get_or_insert(task_failed("batch writer", e));
        }

        if let Some(e) = write_failure.or(engine_failure) {
            return Err(e);
        }

        progress.batches_written = written.len();
        on_progress(&progress);

        Ok(PipelineReport {
            batches: written,
            skipped,
            chapters_processed: progress.processed,
            cancelled: progress.processed < total && self.cancel.is_cancelled(),
        })
    }
}

/// Queue a batch for the writer task.
fn dispatch_write(batches: &mpsc::UnboundedSender<Batch>, batch: Batch) {
    let id = batch.first_title().unwrap_or_default().to_string();
    log::debug!("Dispatching batch {} ({} chapters)", id, batch.len());
    // The writer only hangs up after a failure, which the caller collects
    // from the result channel.
    if batches.send(batch).is_err() {
        log::debug!("Writer stopped; batch {} not written", id);
    }
}

/// Write batches in arrival order; each write owns its batch until it is
/// confirmed or its retries run out. Stops at the first failure.
async fn write_batches(
    writer: BatchWriter,
    retries: u32,
    mut batches: mpsc::UnboundedReceiver<Batch>,
    results: mpsc::UnboundedSender<Result<WrittenBatch>>,
) {
    while let Some(batch) = batches.recv().await {
        let writer = writer.clone();
        let outcome = tokio::task::spawn_blocking(move || writer.write_with_retry(&batch, retries))
            .await
            .unwrap_or_else(|e| Err(task_failed("batch write", e)));

        let failed = outcome.is_err();
        if results.send(outcome).is_err() || failed {
            break;
        }
    }
}

/// Synthesize records in order, sending each chapter's chunks downstream.
async fn produce(
    records: Vec<ChapterRecord>,
    engine: Arc<dyn SpeechEngine>,
    voice: VoiceOptions,
    observer: Arc<dyn ChunkObserver>,
    cancel: CancelFlag,
    tx: mpsc::Sender<Result<SynthesizedChapter>>,
) {
    for record in records {
        if cancel.is_cancelled() || tx.is_closed() {
            break;
        }

        let title = record.title.clone();
        let engine = Arc::clone(&engine);
        let voice = voice.clone();
        let observer = Arc::clone(&observer);

        let item = tokio::task::spawn_blocking(move || {
            synthesize_chapter(engine.as_ref(), record, &voice, observer.as_ref())
        })
        .await
        .map_err(|e| task_failed(&format!("synthesis of {}", title), e));

        let failed = match &item {
            Ok(chapter) => chapter.error.is_some(),
            Err(_) => true,
        };
        if tx.send(item).await.is_err() || failed {
            break;
        }
    }
}

/// Pull every item for one chapter, keeping buffers that carry audio.
///
/// An engine error ends the chapter; chunks gathered before it are kept.
fn synthesize_chapter(
    engine: &dyn SpeechEngine,
    record: ChapterRecord,
    voice: &VoiceOptions,
    observer: &dyn ChunkObserver,
) -> SynthesizedChapter {
    let with_title = |e: PipelineError| match e {
        PipelineError::Synthesis { message, .. } => PipelineError::Synthesis {
            chapter: record.title.clone(),
            message,
        },
        other => other,
    };

    let mut chunks = Vec::new();
    let stream = match engine.synthesize(&record.body, voice) {
        Ok(stream) => stream,
        Err(e) => {
            let error = Some(with_title(e));
            return SynthesizedChapter {
                record,
                chunks,
                error,
            };
        }
    };

    let mut error = None;
    for (i, item) in stream.enumerate() {
        let output = match item {
            Ok(output) => output,
            Err(e) => {
                error = Some(with_title(e));
                break;
            }
        };
        observer.on_chunk(&ChunkEvent {
            chapter_index: record.index,
            chapter_title: &record.title,
            chunk_index: i,
            graphemes: &output.graphemes,
            phonemes: &output.phonemes,
            frames: output.frames(),
        });

        match output.audio {
            Some(samples) => chunks.push(AudioChunk::new(samples, record.index)),
            None => log::warn!(
                "Empty or invalid audio in chapter {} ({}), chunk {}. Skipping.",
                record.index + 1,
                record.title,
                i
            ),
        }
    }

    SynthesizedChapter {
        record,
        chunks,
        error,
    }
}

fn task_failed(what: &str, e: JoinError) -> PipelineError {
    PipelineError::TaskFailed(format!("{} did not complete: {}", what, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::SampleEncoding;
    use crate::text::prepare_chapters;
    use crate::tts::mock::{MockChapter, MockEngine};
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn settings(dir: &Path, batch_limit: usize) -> PipelineSettings {
        PipelineSettings {
            batch: BatchSettings::new(batch_limit, 24000).unwrap(),
            writer: WriterSettings {
                output_dir: dir.to_path_buf(),
                sample_rate: 24000,
                file_prefix: String::new(),
                encoding: SampleEncoding::Pcm16,
            },
            voice: VoiceOptions::default(),
            write_retries: 0,
        }
    }

    fn book(chapters: usize) -> Vec<ChapterRecord> {
        let text: String = (1..=chapters)
            .map(|i| format!("Book 1 and Chapter {}\nText of chapter {}.\n", i, i))
            .collect();
        prepare_chapters(&text)
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(usize, usize, usize)>>);

    impl ChunkObserver for Recorder {
        fn on_chunk(&self, event: &ChunkEvent<'_>) {
            self.0
                .lock()
                .unwrap()
                .push((event.chapter_index, event.chunk_index, event.frames));
        }
    }

    #[tokio::test]
    async fn test_two_chapters_batch_limit_one() {
        let temp_dir = TempDir::new().unwrap();
        let records = prepare_chapters("Book 1 and Chapter 1\nHello\nBook 1 and Chapter 2\nWorld");
        let engine = Arc::new(MockEngine::uniform(vec![24000], 24000));

        let report = Pipeline::new(engine, settings(temp_dir.path(), 1))
            .run(records, |_| {})
            .await
            .unwrap();

        assert_eq!(report.batches.len(), 2);
        assert_eq!(report.batches[0].batch_id, "Book_1_Chapter_1");
        assert_eq!(report.batches[1].batch_id, "Book_1_Chapter_2");
        for written in &report.batches {
            let index = std::fs::read_to_string(&written.timestamps_path).unwrap();
            assert_eq!(index, format!("00:00:00 {}\n", written.batch_id));
            assert_eq!(written.duration_seconds, 1.0);
        }
        assert!(!report.cancelled);
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_batches_bounded_and_ordered() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::uniform(vec![12000, 12000], 24000));

        let report = Pipeline::new(engine, settings(temp_dir.path(), 3))
            .run(book(7), |_| {})
            .await
            .unwrap();

        let sizes: Vec<usize> = report.batches.iter().map(|b| b.clip_count).collect();
        assert_eq!(sizes, [3, 3, 1]);
        let ids: Vec<&str> = report.batches.iter().map(|b| b.batch_id.as_str()).collect();
        assert_eq!(ids, ["Book_1_Chapter_1", "Book_1_Chapter_4", "Book_1_Chapter_7"]);

        let index = std::fs::read_to_string(&report.batches[1].timestamps_path).unwrap();
        assert_eq!(
            index,
            "00:00:00 Book_1_Chapter_4\n00:00:01 Book_1_Chapter_5\n00:00:02 Book_1_Chapter_6\n"
        );
    }

    #[tokio::test]
    async fn test_skipped_chapters_reported() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::scripted(
            vec![
                MockChapter::Chunks(vec![24000]),
                MockChapter::Unusable,
                MockChapter::Chunks(vec![0]),
                MockChapter::Chunks(vec![48000]),
            ],
            24000,
        ));

        let report = Pipeline::new(engine, settings(temp_dir.path(), 10))
            .run(book(4), |_| {})
            .await
            .unwrap();

        assert_eq!(report.skipped, ["Book_1_Chapter_2", "Book_1_Chapter_3"]);
        assert_eq!(report.batches.len(), 1);
        let index = std::fs::read_to_string(&report.batches[0].timestamps_path).unwrap();
        assert_eq!(index, "00:00:00 Book_1_Chapter_1\n00:00:01 Book_1_Chapter_4\n");
    }

    #[tokio::test]
    async fn test_all_skipped_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("audio");
        let engine = Arc::new(MockEngine::uniform(vec![0], 24000));

        let report = Pipeline::new(engine, settings(&out, 2))
            .run(book(3), |_| {})
            .await
            .unwrap();

        assert!(report.batches.is_empty());
        assert_eq!(report.skipped.len(), 3);
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_sample_rate_mismatch_fails_fast() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::uniform(vec![100], 22050));
        let probe = Arc::clone(&engine);

        let err = Pipeline::new(engine, settings(temp_dir.path(), 2))
            .run(book(2), |_| {})
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::SampleRateMismatch {
                engine: 22050,
                configured: 24000
            }
        ));
        assert_eq!(probe.call_count(), 0);
    }

    #[tokio::test]
    async fn test_engine_failure_names_chapter() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::scripted(
            vec![
                MockChapter::Chunks(vec![100]),
                MockChapter::Fail("CUDA out of memory".to_string()),
            ],
            24000,
        ));

        let err = Pipeline::new(engine, settings(temp_dir.path(), 10))
            .run(book(3), |_| {})
            .await
            .unwrap_err();

        match err {
            PipelineError::Synthesis { chapter, message } => {
                assert_eq!(chapter, "Book_1_Chapter_2");
                assert!(message.contains("CUDA"));
            }
            other => panic!("expected Synthesis error, got {other:?}"),
        }

        let index =
            std::fs::read_to_string(temp_dir.path().join("Book_1_Chapter_1_timestamps.txt"))
                .unwrap();
        assert_eq!(index, "00:00:00 Book_1_Chapter_1\n");
        let reader = hound::WavReader::open(temp_dir.path().join("Book_1_Chapter_1.wav")).unwrap();
        assert_eq!(reader.len(), 100);
    }

    #[tokio::test]
    async fn test_mid_stream_failure_keeps_partial_chapter() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::scripted(
            vec![
                MockChapter::Chunks(vec![24000]),
                MockChapter::FailAfter(vec![50, 0, 30], "decoder crashed".to_string()),
            ],
            24000,
        ));

        let err = Pipeline::new(engine, settings(temp_dir.path(), 10))
            .run(book(3), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Synthesis { ref chapter, .. } if chapter == "Book_1_Chapter_2"));

        let index =
            std::fs::read_to_string(temp_dir.path().join("Book_1_Chapter_1_timestamps.txt"))
                .unwrap();
        assert_eq!(index, "00:00:00 Book_1_Chapter_1\n00:00:01 Book_1_Chapter_2\n");
        let reader = hound::WavReader::open(temp_dir.path().join("Book_1_Chapter_1.wav")).unwrap();
        assert_eq!(reader.len(), 24000 + 80);
    }

    #[tokio::test]
    async fn test_repeated_titles_last_batch_wins() {
        let temp_dir = TempDir::new().unwrap();
        let text = "Book 1 and Chapter 1\nAgain.\n".repeat(4);
        let engine = Arc::new(MockEngine::scripted(
            vec![
                MockChapter::Chunks(vec![24000 * 100]),
                MockChapter::Chunks(vec![100]),
                MockChapter::Chunks(vec![100]),
                MockChapter::Chunks(vec![100]),
            ],
            24000,
        ));

        let report = Pipeline::new(engine, settings(temp_dir.path(), 2))
            .run(prepare_chapters(&text), |_| {})
            .await
            .unwrap();

        assert_eq!(report.batches.len(), 2);
        assert!(report.batches.iter().all(|b| b.batch_id == "Book_1_Chapter_1"));
        assert_eq!(report.batches[0].clip_count, 2);

        let index =
            std::fs::read_to_string(temp_dir.path().join("Book_1_Chapter_1_timestamps.txt"))
                .unwrap();
        assert_eq!(index, "00:00:00 Book_1_Chapter_1\n00:00:00 Book_1_Chapter_1\n");
        let reader = hound::WavReader::open(temp_dir.path().join("Book_1_Chapter_1.wav")).unwrap();
        assert_eq!(reader.len(), 200);
    }

    #[tokio::test]
    async fn test_writer_rate_must_match_engine() {
        let temp_dir = TempDir::new().unwrap();
        let mut settings = settings(temp_dir.path(), 2);
        settings.writer.sample_rate = 22050;

        let err = Pipeline::new(Arc::new(MockEngine::uniform(vec![100], 24000)), settings)
            .run(book(2), |_| {})
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::SampleRateMismatch {
                engine: 24000,
                configured: 22050
            }
        ));
        assert!(!temp_dir.path().join("Book_1_Chapter_1.wav").exists());
    }

    #[tokio::test]
    async fn test_cancel_flushes_partial_batch() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::uniform(vec![24000], 24000));
        let cancel = CancelFlag::new();
        let trigger = cancel.clone();

        let report = Pipeline::new(engine, settings(temp_dir.path(), 10))
            .with_cancel_flag(cancel)
            .run(book(6), |progress| {
                if progress.processed == 2 {
                    trigger.cancel();
                }
            })
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.chapters_processed, 2);
        assert_eq!(report.batches.len(), 1);
        assert_eq!(report.batches[0].clip_count, 2);
        let index = std::fs::read_to_string(&report.batches[0].timestamps_path).unwrap();
        assert_eq!(index, "00:00:00 Book_1_Chapter_1\n00:00:01 Book_1_Chapter_2\n");
    }

    #[tokio::test]
    async fn test_write_failure_aborts_run() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("occupied");
        std::fs::write(&blocker, "not a directory").unwrap();
        let engine = Arc::new(MockEngine::uniform(vec![100], 24000));

        let err = Pipeline::new(engine, settings(&blocker, 1))
            .run(book(3), |_| {})
            .await
            .unwrap_err();

        match err {
            PipelineError::WriteFailure { batch_id, path, .. } => {
                assert!(batch_id.starts_with("Book_1_Chapter_"));
                assert!(path.starts_with(&blocker));
            }
            other => panic!("expected WriteFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_observer_sees_every_chunk() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::uniform(vec![10, 0, 20], 24000));
        let recorder = Arc::new(Recorder::default());

        Pipeline::new(engine, settings(temp_dir.path(), 10))
            .with_observer(recorder.clone())
            .run(book(2), |_| {})
            .await
            .unwrap();

        let events = recorder.0.lock().unwrap().clone();
        assert_eq!(
            events,
            [(0, 0, 10), (0, 1, 0), (0, 2, 20), (1, 0, 10), (1, 1, 0), (1, 2, 20)]
        );
    }

    #[tokio::test]
    async fn test_progress_reports_each_chapter() {
        let temp_dir = TempDir::new().unwrap();
        let engine = Arc::new(MockEngine::uniform(vec![100], 24000));
        let mut seen = Vec::new();

        Pipeline::new(engine, settings(temp_dir.path(), 2))
            .run(book(3), |p| seen.push((p.processed, p.total_chapters)))
            .await
            .unwrap();

        assert_eq!(seen.first(), Some(&(1, 3)));
        assert_eq!(seen.last(), Some(&(3, 3)));
    }
}
