//! Batch output: a mono WAV file plus a `HH:MM:SS <title>` timestamp index.

use super::Batch;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Suffix of the timestamp index written next to each audio file.
pub const TIMESTAMPS_SUFFIX: &str = "_timestamps.txt";

/// Sample format of written audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    /// 16-bit signed integer PCM
    #[default]
    Pcm16,
    /// 32-bit IEEE float
    Float32,
}

/// Where and how batches are written.
#[derive(Debug, Clone, PartialEq)]
pub struct WriterSettings {
    /// Directory receiving the batch files
    pub output_dir: PathBuf,
    /// Sample rate of every written file
    pub sample_rate: u32,
    /// Prepended to each batch identifier (e.g. `Audio_`)
    pub file_prefix: String,
    pub encoding: SampleEncoding,
}

/// Files produced for one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenBatch {
    pub batch_id: String,
    pub audio_path: PathBuf,
    pub timestamps_path: PathBuf,
    pub clip_count: usize,
    pub duration_seconds: f64,
}

/// Writes completed batches to disk, replacing earlier files of the same name.
#[derive(Debug, Clone)]
pub struct BatchWriter {
    settings: WriterSettings,
}

impl BatchWriter {
    /// Create a writer.
    pub fn new(settings: WriterSettings) -> Self {
        Self { settings }
    }

    /// Output directory of this writer.
    pub fn output_dir(&self) -> &Path {
        &self.settings.output_dir
    }

    /// Identifier used for a batch's file names.
    pub fn batch_id(&self, batch: &Batch) -> Option<String> {
        batch
            .first_title()
            .map(|title| format!("{}{}", self.settings.file_prefix, sanitize_batch_id(title)))
    }

    /// Write the batch's audio file and timestamp index.
    ///
    /// Existing files at either path are deleted first; nothing is merged.
    pub fn write(&self, batch: &Batch) -> Result<WrittenBatch> {
        let batch_id = self
            .batch_id(batch)
            .ok_or_else(|| PipelineError::Config("Cannot write an empty batch".to_string()))?;

        let dir = &self.settings.output_dir;
        fs::create_dir_all(dir).map_err(|e| PipelineError::write_failure(&batch_id, dir, e))?;

        let audio_path = dir.join(format!("{}.wav", batch_id));
        let timestamps_path = dir.join(format!("{}{}", batch_id, TIMESTAMPS_SUFFIX));

        remove_existing(&batch_id, &audio_path)?;
        remove_existing(&batch_id, &timestamps_path)?;

        self.write_audio(batch, &audio_path)
            .map_err(|e| PipelineError::write_failure(&batch_id, &audio_path, e))?;
        write_timestamps(batch, &timestamps_path)
            .map_err(|e| PipelineError::write_failure(&batch_id, &timestamps_path, e))?;

        let duration_seconds = batch.total_frames() as f64 / f64::from(self.settings.sample_rate);
        log::info!(
            "Wrote {} ({} chapters, {})",
            audio_path.display(),
            batch.len(),
            format_timestamp(duration_seconds)
        );

        Ok(WrittenBatch {
            batch_id,
            audio_path,
            timestamps_path,
            clip_count: batch.len(),
            duration_seconds,
        })
    }

    /// Write with up to `max_retries` further attempts after a failure.
    pub fn write_with_retry(&self, batch: &Batch, max_retries: u32) -> Result<WrittenBatch> {
        let attempts = max_retries + 1;
        let mut attempt = 1;

        loop {
            match self.write(batch) {
                Ok(written) => return Ok(written),
                Err(e) if attempt < attempts => {
                    log::warn!("Write failed (attempt {}/{}): {}", attempt, attempts, e);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn write_audio(&self, batch: &Batch, path: &Path) -> std::result::Result<(), hound::Error> {
        let spec = match self.settings.encoding {
            SampleEncoding::Pcm16 => hound::WavSpec {
                channels: 1,
                sample_rate: self.settings.sample_rate,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            },
            SampleEncoding::Float32 => hound::WavSpec {
                channels: 1,
                sample_rate: self.settings.sample_rate,
                bits_per_sample: 32,
                sample_format: hound::SampleFormat::Float,
            },
        };

        let mut writer = hound::WavWriter::create(path, spec)?;
        let samples = batch.clips.iter().flat_map(|clip| clip.samples.iter().copied());

        match self.settings.encoding {
            SampleEncoding::Pcm16 => {
                for sample in samples {
                    let scaled = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
                    writer.write_sample(scaled)?;
                }
            }
            SampleEncoding::Float32 => {
                for sample in samples {
                    writer.write_sample(sample)?;
                }
            }
        }

        writer.finalize()
    }
}

fn remove_existing(batch_id: &str, path: &Path) -> Result<()> {
    if path.exists() {
        log::debug!("Replacing existing {}", path.display());
        fs::remove_file(path).map_err(|e| PipelineError::write_failure(batch_id, path, e))?;
    }
    Ok(())
}

fn write_timestamps(batch: &Batch, path: &Path) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(render_timestamps(batch).as_bytes())?;
    file.flush()
}

/// Render a batch's timestamp index, one `HH:MM:SS <title>` line per chapter.
pub fn render_timestamps(batch: &Batch) -> String {
    batch
        .entries
        .iter()
        .map(|entry| format!("{} {}\n", format_timestamp(entry.start_offset_seconds), entry.title))
        .collect()
}

/// Format seconds as `HH:MM:SS`, truncating any fraction.
pub fn format_timestamp(seconds: f64) -> String {
    // `as` saturates: negative and NaN become 0.
    let total = seconds as u64;
    let (minutes, secs) = (total / 60, total % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Make a chapter title safe to use as a file name.
pub fn sanitize_batch_id(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}
