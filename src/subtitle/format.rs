use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::{Result, SubtitleError};

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubtitleFormat {
    #[serde(rename = "txt")]
    Text,
    #[serde(rename = "srt")]
    Srt,
    #[serde(rename = "vtt")]
    Vtt,
}

impl SubtitleFormat {
    pub const ALL: [SubtitleFormat; 3] = [SubtitleFormat::Text, SubtitleFormat::Srt, SubtitleFormat::Vtt];

    pub fn extension(&self) -> &'static str {
        match self {
            SubtitleFormat::Text => "txt",
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::Vtt => "vtt",
        }
    }

    /// MIME type used when the file is offered for download
    pub fn mime_type(&self) -> &'static str {
        match self {
            SubtitleFormat::Text => "text/plain",
            SubtitleFormat::Srt => "application/x-subrip",
            SubtitleFormat::Vtt => "text/vtt",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for SubtitleFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(SubtitleFormat::Text),
            "srt" => Ok(SubtitleFormat::Srt),
            "vtt" | "webvtt" => Ok(SubtitleFormat::Vtt),
            other => Err(SubtitleError::Configuration(format!(
                "unknown output format '{}' (expected txt, srt or vtt)",
                other
            ))),
        }
    }
}

/// The three renderings of one transcription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSubtitles {
    pub txt: String,
    pub srt: String,
    pub vtt: String,
}

impl GeneratedSubtitles {
    pub fn get(&self, format: SubtitleFormat) -> &str {
        match format {
            SubtitleFormat::Text => &self.txt,
            SubtitleFormat::Srt => &self.srt,
            SubtitleFormat::Vtt => &self.vtt,
        }
    }

    /// Path `<dir>/<stem>.<ext>` for a format
    pub fn output_path(dir: &Path, stem: &str, format: SubtitleFormat) -> PathBuf {
        dir.join(format!("{}.{}", stem, format.extension()))
    }

    /// Write the requested formats into `dir`, returning the written paths
    pub async fn write_to_dir(
        &self,
        dir: &Path,
        stem: &str,
        formats: &[SubtitleFormat],
    ) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(dir).await?;

        let mut written = Vec::with_capacity(formats.len());
        for &format in formats {
            let path = Self::output_path(dir, stem, format);
            tokio::fs::write(&path, self.get(format)).await?;
            debug!("Wrote {} ({})", path.display(), format.mime_type());
            written.push(path);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("txt".parse::<SubtitleFormat>().unwrap(), SubtitleFormat::Text);
        assert_eq!(" SRT ".parse::<SubtitleFormat>().unwrap(), SubtitleFormat::Srt);
        assert_eq!("webvtt".parse::<SubtitleFormat>().unwrap(), SubtitleFormat::Vtt);
        assert!("ass".parse::<SubtitleFormat>().is_err());
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(SubtitleFormat::Srt.mime_type(), "application/x-subrip");
        assert_eq!(SubtitleFormat::Vtt.mime_type(), "text/vtt");
        assert_eq!(SubtitleFormat::Text.extension(), "txt");
        assert_eq!(SubtitleFormat::Vtt.to_string(), "vtt");
    }

    #[test]
    fn test_output_path() {
        let path = GeneratedSubtitles::output_path(Path::new("/tmp/out"), "transcript", SubtitleFormat::Srt);
        assert_eq!(path, PathBuf::from("/tmp/out/transcript.srt"));
    }

    #[tokio::test]
    async fn test_write_to_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let subtitles = GeneratedSubtitles {
            txt: "hello".to_string(),
            srt: "1\n00:00:00,000 --> 00:00:01,000\nhello".to_string(),
            vtt: "WEBVTT\n\n00:00:00.000 --> 00:00:01.000\nhello".to_string(),
        };

        let written = subtitles
            .write_to_dir(temp_dir.path(), "clip", &[SubtitleFormat::Srt, SubtitleFormat::Vtt])
            .await
            .unwrap();

        assert_eq!(written.len(), 2);
        let srt = tokio::fs::read_to_string(temp_dir.path().join("clip.srt")).await.unwrap();
        assert_eq!(srt, subtitles.srt);
        assert!(!temp_dir.path().join("clip.txt").exists());
    }
}
