//! gen-serial configuration management.

use crate::batch::accumulator::{DEFAULT_BATCH_LIMIT, DEFAULT_SAMPLE_RATE};
use crate::batch::{BatchSettings, SampleEncoding, WriterSettings};
use crate::error::{PipelineError, Result};
use crate::pipeline::PipelineSettings;
use crate::tts::VoiceOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

// Defaults for Kokoro narration
const DEFAULT_VOICE: &str = "am_onyx";
const DEFAULT_SPEED: f32 = 1.25;
const DEFAULT_LANG_CODE: &str = "a";
const DEFAULT_WRITE_RETRIES: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenSerialConfig {
    /// Maximum chapters per output file
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,

    /// Sample rate of synthesized and written audio (Hz)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Voice identifier passed to the speech engine
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Speaking rate (0.5-2.0)
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Directory receiving the batch files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Prefix for batch file names (e.g. "Audio_")
    #[serde(default)]
    pub file_prefix: String,

    /// Sample format of written audio
    #[serde(default)]
    pub encoding: SampleEncoding,

    /// Kokoro pipeline language code
    #[serde(default = "default_lang_code")]
    pub lang_code: String,

    /// Device to use (cuda, cpu). None means auto-detect.
    #[serde(default)]
    pub device: Option<String>,

    /// Extra attempts when writing a batch fails
    #[serde(default = "default_write_retries")]
    pub write_retries: u32,
}

fn default_batch_limit() -> usize {
    DEFAULT_BATCH_LIMIT
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_speed() -> f32 {
    DEFAULT_SPEED
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("audio")
}

fn default_lang_code() -> String {
    DEFAULT_LANG_CODE.to_string()
}

fn default_write_retries() -> u32 {
    DEFAULT_WRITE_RETRIES
}

impl Default for GenSerialConfig {
    fn default() -> Self {
        Self {
            batch_limit: default_batch_limit(),
            sample_rate: default_sample_rate(),
            voice: default_voice(),
            speed: default_speed(),
            output_dir: default_output_dir(),
            file_prefix: String::new(),
            encoding: SampleEncoding::default(),
            lang_code: default_lang_code(),
            device: None,
            write_retries: default_write_retries(),
        }
    }
}

impl GenSerialConfig {
    /// Get the config file path: <config_dir>/cli-programs/gen-serial.toml
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cli-programs")
            .join("gen-serial.toml")
    }

    /// Load config from the default location, returning defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    /// Parse and validate config from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: GenSerialConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        BatchSettings::new(self.batch_limit, self.sample_rate)?;
        if !(0.5..=2.0).contains(&self.speed) {
            return Err(PipelineError::Config(format!(
                "speed must be between 0.5 and 2.0, got {}",
                self.speed
            )));
        }
        Ok(())
    }

    /// Build the pipeline settings this config describes
    pub fn pipeline_settings(&self) -> Result<PipelineSettings> {
        self.validate()?;
        Ok(PipelineSettings {
            batch: BatchSettings::new(self.batch_limit, self.sample_rate)?,
            writer: WriterSettings {
                output_dir: self.output_dir.clone(),
                sample_rate: self.sample_rate,
                file_prefix: self.file_prefix.clone(),
                encoding: self.encoding,
            },
            voice: VoiceOptions::new()
                .with_voice(&self.voice)
                .with_speed(self.speed),
            write_retries: self.write_retries,
        })
    }
}
