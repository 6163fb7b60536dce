//! Transcription results as returned by a speech-to-text provider

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::{Result, SubtitleError};

/// Transcription segment with timing information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Transcribed text
    pub text: String,
}

impl TranscriptionSegment {
    /// Create new transcription segment
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Length of the segment in seconds, never negative
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Complete transcription result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// Full transcription text
    pub text: String,
    /// Individual segments with timestamps
    #[serde(default)]
    pub segments: Vec<TranscriptionSegment>,
    /// Detected language
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Media duration reported by the provider, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl TranscriptionResult {
    /// Create new transcription result
    pub fn new(text: impl Into<String>, segments: Vec<TranscriptionSegment>) -> Self {
        Self {
            text: text.into(),
            segments,
            language: None,
            duration: None,
        }
    }

    /// Set detected language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Parse a provider response (`verbose_json` shape).
    ///
    /// Only `text` is required. `segments` may be absent or null; when present
    /// it must be an array. Segments lacking `start`, `end` or `text` are
    /// skipped, while fields that are present but malformed are rejected with
    /// the offending path, e.g. `segments[2].start`.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| SubtitleError::invalid_field("$", format!("expected an object, found {}", kind(value))))?;

        let text = match object.get("text") {
            Some(Value::String(text)) => text.clone(),
            None | Some(Value::Null) => {
                return Err(SubtitleError::MissingField {
                    field: "text".to_string(),
                })
            }
            Some(other) => {
                return Err(SubtitleError::invalid_field(
                    "text",
                    format!("expected a string, found {}", kind(other)),
                ))
            }
        };

        let segments = match object.get("segments") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => {
                let mut segments = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    if let Some(segment) = parse_segment(i, item)? {
                        segments.push(segment);
                    }
                }
                segments
            }
            Some(other) => {
                return Err(SubtitleError::invalid_field(
                    "segments",
                    format!("expected an array, found {}", kind(other)),
                ))
            }
        };

        let language = object
            .get("language")
            .and_then(Value::as_str)
            .map(str::to_string);
        let duration = object.get("duration").and_then(Value::as_f64);

        Ok(Self {
            text,
            segments,
            language,
            duration,
        })
    }

    /// Check every segment's timing
    pub fn validate(&self) -> Result<()> {
        for (i, segment) in self.segments.iter().enumerate() {
            check_bounds(i, segment.start, segment.end)?;
        }
        Ok(())
    }

    pub fn has_segments(&self) -> bool {
        !self.segments.is_empty()
    }
}

fn parse_segment(index: usize, item: &Value) -> Result<Option<TranscriptionSegment>> {
    let field = |name: &str| format!("segments[{}].{}", index, name);

    let object: &Map<String, Value> = item.as_object().ok_or_else(|| {
        SubtitleError::invalid_field(
            format!("segments[{}]", index),
            format!("expected an object, found {}", kind(item)),
        )
    })?;

    let start = number_field(object, "start", &field)?;
    let end = number_field(object, "end", &field)?;
    let text = match object.get("text") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            return Err(SubtitleError::invalid_field(
                field("text"),
                format!("expected a string, found {}", kind(other)),
            ))
        }
    };

    let (start, end, text) = match (start, end, text) {
        (Some(start), Some(end), Some(text)) => (start, end, text),
        _ => {
            warn!("Skipping segments[{}]: missing start, end or text", index);
            return Ok(None);
        }
    };

    check_bounds(index, start, end)?;
    Ok(Some(TranscriptionSegment::new(start, end, text)))
}

fn number_field(
    object: &Map<String, Value>,
    name: &str,
    field: &dyn Fn(&str) -> String,
) -> Result<Option<f64>> {
    match object.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_f64()
            .map(Some)
            .ok_or_else(|| SubtitleError::invalid_field(field(name), "number out of range")),
        Some(other) => Err(SubtitleError::invalid_field(
            field(name),
            format!("expected a number, found {}", kind(other)),
        )),
    }
}

fn check_bounds(index: usize, start: f64, end: f64) -> Result<()> {
    for (name, value) in [("start", start), ("end", end)] {
        if !value.is_finite() || value < 0.0 {
            return Err(SubtitleError::invalid_field(
                format!("segments[{}].{}", index, name),
                format!("must be a non-negative number of seconds, got {}", value),
            ));
        }
    }

    if end < start {
        return Err(SubtitleError::invalid_field(
            format!("segments[{}].end", index),
            format!("end ({}) is before start ({})", end, start),
        ));
    }

    Ok(())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
