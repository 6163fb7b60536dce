use serde::{Deserialize, Serialize};
use std::fmt;

use super::timestamp::{format_timestamp, TimestampStyle};

/// Header line every WebVTT file starts with
pub const VTT_HEADER: &str = "WEBVTT";

/// One timed caption entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Sequential number, 1-based
    pub index: u32,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Caption text
    pub text: String,
}

impl Cue {
    /// Create a new cue
    pub fn new(index: u32, start: f64, end: f64, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            index,
            start,
            end,
            text: text.trim().to_string(),
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Render the cue as an SRT block (with index) or a VTT block (without)
    pub fn render(&self, style: TimestampStyle) -> String {
        let timing = format!(
            "{} --> {}",
            format_timestamp(self.start, style),
            format_timestamp(self.end, style)
        );
        match style {
            TimestampStyle::Srt => format!("{}\n{}\n{}\n\n", self.index, timing, self.text),
            TimestampStyle::Vtt => format!("{}\n{}\n\n", timing, self.text),
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{} --> {}\n{}\n",
            self.index,
            format_timestamp(self.start, TimestampStyle::Srt),
            format_timestamp(self.end, TimestampStyle::Srt),
            self.text
        )
    }
}

/// Ordered cue list with SRT and WebVTT rendering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CueSheet {
    cues: Vec<Cue>,
}

impl CueSheet {
    pub fn new() -> Self {
        Self { cues: Vec::new() }
    }

    /// Append a cue numbered after the last one
    pub fn push(&mut self, start: f64, end: f64, text: impl Into<String>) -> &Cue {
        let index = self.cues.len() as u32 + 1;
        self.cues.push(Cue::new(index, start, end, text));
        &self.cues[self.cues.len() - 1]
    }

    /// Render as an SRT file, trailing whitespace trimmed
    pub fn render_srt(&self) -> String {
        let mut srt_content = String::new();
        for cue in &self.cues {
            srt_content.push_str(&cue.render(TimestampStyle::Srt));
        }
        srt_content.trim_end().to_string()
    }

    /// Render as a WebVTT file, trailing whitespace trimmed
    pub fn render_vtt(&self) -> String {
        let mut vtt_content = format!("{}\n\n", VTT_HEADER);
        for cue in &self.cues {
            vtt_content.push_str(&cue.render(TimestampStyle::Vtt));
        }
        vtt_content.trim_end().to_string()
    }

    /// Latest end time across all cues, in seconds
    pub fn total_duration(&self) -> f64 {
        self.cues.iter().map(|cue| cue.end).fold(0.0, f64::max)
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Validate cues for common issues
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for (i, cue) in self.cues.iter().enumerate() {
            if cue.index as usize != i + 1 {
                issues.push(format!("Cue {}: Index is {}, expected {}", i + 1, cue.index, i + 1));
            }

            if cue.end < cue.start {
                issues.push(format!("Cue {}: End time is before start time", i + 1));
            }

            if cue.text.is_empty() {
                issues.push(format!("Cue {}: Empty text", i + 1));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_creation() {
        let cue = Cue::new(1, 10.0, 15.0, "  Test subtitle ");

        assert_eq!(cue.index, 1);
        assert_eq!(cue.start, 10.0);
        assert_eq!(cue.end, 15.0);
        assert_eq!(cue.text, "Test subtitle");
        assert_eq!(cue.duration(), 5.0);
    }

    #[test]
    fn test_cue_display() {
        let cue = Cue::new(1, 10.0, 15.0, "Test subtitle");
        assert_eq!(cue.to_string(), "1\n00:00:10,000 --> 00:00:15,000\nTest subtitle\n");
    }

    #[test]
    fn test_cue_render_styles() {
        let cue = Cue::new(3, 1.25, 2.5, "Hello");
        assert_eq!(
            cue.render(TimestampStyle::Srt),
            "3\n00:00:01,250 --> 00:00:02,500\nHello\n\n"
        );
        assert_eq!(
            cue.render(TimestampStyle::Vtt),
            "00:00:01.250 --> 00:00:02.500\nHello\n\n"
        );
    }

    #[test]
    fn test_cue_sheet_rendering() {
        let mut sheet = CueSheet::new();
        sheet.push(0.0, 5.0, "First subtitle");
        sheet.push(5.0, 10.0, "Second subtitle");

        assert_eq!(sheet.len(), 2);
        assert_eq!(
            sheet.render_srt(),
            "1\n00:00:00,000 --> 00:00:05,000\nFirst subtitle\n\n\
             2\n00:00:05,000 --> 00:00:10,000\nSecond subtitle"
        );
        assert_eq!(
            sheet.render_vtt(),
            "WEBVTT\n\n00:00:00.000 --> 00:00:05.000\nFirst subtitle\n\n\
             00:00:05.000 --> 00:00:10.000\nSecond subtitle"
        );
        assert_eq!(sheet.total_duration(), 10.0);
        assert!(sheet.validate().is_empty());
    }

    #[test]
    fn test_empty_sheet() {
        let sheet = CueSheet::new();
        assert!(sheet.is_empty());
        assert_eq!(sheet.render_srt(), "");
        assert_eq!(sheet.render_vtt(), "WEBVTT");
        assert_eq!(sheet.total_duration(), 0.0);
    }

    #[test]
    fn test_validation() {
        let mut sheet = CueSheet::new();
        sheet.push(10.0, 5.0, "Invalid");
        sheet.push(15.0, 20.0, "");

        let issues = sheet.validate();
        assert!(issues.iter().any(|issue| issue.contains("End time is before start time")));
        assert!(issues.iter().any(|issue| issue.contains("Empty text")));
    }
}
