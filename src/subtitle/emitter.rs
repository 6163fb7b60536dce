use tracing::debug;

use super::cue::CueSheet;
use super::filler::{collapse_whitespace, strip_fillers};
use super::format::GeneratedSubtitles;
use super::timing::allocate;
use super::wrap::wrap_text;
use crate::config::{SubtitleConfig, TxtSource};
use crate::transcription::TranscriptionResult;
use crate::Result;

/// End of the single cue emitted when a transcript has no segments
/// (99:59:59.999), so players keep the text on screen throughout.
pub const UNBOUNDED_CUE_END: f64 = 359_999.999;

/// Cue sheet plus plain-text transcript for one transcription
#[derive(Debug, Clone, PartialEq)]
pub struct Captions {
    pub cues: CueSheet,
    pub txt: String,
}

impl Captions {
    pub fn to_subtitles(&self) -> GeneratedSubtitles {
        GeneratedSubtitles {
            txt: self.txt.trim_end().to_string(),
            srt: self.cues.render_srt(),
            vtt: self.cues.render_vtt(),
        }
    }
}

/// Builds caption files from a transcription result.
///
/// Holds only its configuration, so one emitter can serve any number of
/// transcripts, including from several threads.
#[derive(Debug, Clone, Default)]
pub struct CaptionEmitter {
    config: SubtitleConfig,
}

impl CaptionEmitter {
    pub fn new(config: SubtitleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SubtitleConfig {
        &self.config
    }

    /// Render `result` as plain text, SRT and WebVTT
    pub fn emit(&self, result: &TranscriptionResult) -> Result<GeneratedSubtitles> {
        Ok(self.build(result)?.to_subtitles())
    }

    /// Build the cue sheet and plain-text transcript for `result`
    pub fn build(&self, result: &TranscriptionResult) -> Result<Captions> {
        self.config.validate()?;
        result.validate()?;

        let mut cues = CueSheet::new();

        if result.segments.is_empty() {
            cues.push(0.0, UNBOUNDED_CUE_END, result.text.as_str());
            debug!("No segments, emitted a single unbounded cue");
            return Ok(Captions {
                cues,
                txt: self.plain_text(result, &[]),
            });
        }

        if self.config.emit_lead_in_cue {
            let first_start = result.segments[0].start;
            if first_start > 0.0 {
                cues.push(0.0, first_start, self.config.lead_in_label.as_str());
            }
        }

        let mut segment_texts = Vec::with_capacity(result.segments.len());
        for segment in &result.segments {
            let text = self.clean(&segment.text);
            let lines = wrap_text(&text, self.config.max_chars);
            let text_len = text.chars().count();

            for line in allocate(segment, text_len, lines, self.config.timing) {
                cues.push(line.start, line.end, line.text);
            }

            if !text.is_empty() {
                segment_texts.push(text);
            }
        }

        debug!(
            "Built {} cues from {} segments ({:?})",
            cues.len(),
            result.segments.len(),
            self.config.timing
        );

        Ok(Captions {
            txt: self.plain_text(result, &segment_texts),
            cues,
        })
    }

    fn clean(&self, text: &str) -> String {
        if self.config.strip_fillers {
            strip_fillers(text)
        } else {
            collapse_whitespace(text)
        }
    }

    fn plain_text(&self, result: &TranscriptionResult, segment_texts: &[String]) -> String {
        match self.config.txt_source {
            TxtSource::Raw => result.text.clone(),
            TxtSource::Segments if result.segments.is_empty() => self.clean(&result.text),
            TxtSource::Segments => segment_texts.join(" "),
        }
    }
}
