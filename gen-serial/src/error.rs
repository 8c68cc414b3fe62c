use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to write batch {batch_id} to {}: {source}", path.display())]
    WriteFailure {
        batch_id: String,
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(
        "Sample rate mismatch: engine produces {engine} Hz but pipeline is configured for {configured} Hz"
    )]
    SampleRateMismatch { engine: u32, configured: u32 },

    #[error("Synthesis failed for chapter {chapter}: {message}")]
    Synthesis { chapter: String, message: String },

    #[error("Speech engine not available: {0}")]
    EngineUnavailable(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl PipelineError {
    /// Wrap any error raised while producing one of a batch's files.
    pub fn write_failure(
        batch_id: impl Into<String>,
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::WriteFailure {
            batch_id: batch_id.into(),
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
