//! Caption generation: timestamps, line wrapping, timing and rendering

pub mod cue;
pub mod emitter;
pub mod filler;
pub mod format;
pub mod timestamp;
pub mod timing;
pub mod wrap;

pub use cue::{Cue, CueSheet};
pub use emitter::{CaptionEmitter, Captions, UNBOUNDED_CUE_END};
pub use filler::{collapse_whitespace, strip_fillers};
pub use format::{GeneratedSubtitles, SubtitleFormat};
pub use timestamp::{format_timestamp, parse_timestamp, TimestampStyle};
pub use timing::{allocate, TimedLine};
pub use wrap::wrap_text;
