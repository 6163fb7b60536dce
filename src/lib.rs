/// Subtitle Forge - caption generation from timed transcripts
///
/// Turns a speech-to-text result (full text plus timed segments) into plain text,
/// SRT and WebVTT caption files with wrapped lines and per-line timing.

pub mod batch;
pub mod config;
pub mod subtitle;
pub mod transcription;

// Re-export main types for easy access
pub use crate::batch::{BatchRenderer, BatchResult, RenderOutcome, RenderStatus};
pub use crate::config::{Config, ConfigBuilder, SubtitleConfig, TimingPolicy, TxtSource};
pub use crate::subtitle::{
    CaptionEmitter, Captions, Cue, CueSheet, GeneratedSubtitles, SubtitleFormat, TimestampStyle,
};
pub use crate::transcription::{TranscriptionResult, TranscriptionSegment};

/// Result type for subtitle generation
pub type Result<T> = std::result::Result<T, SubtitleError>;

/// Error types for subtitle generation
#[derive(thiserror::Error, Debug)]
pub enum SubtitleError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Missing field: {field}")]
    MissingField { field: String },

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SubtitleError {
    pub(crate) fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SubtitleError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
