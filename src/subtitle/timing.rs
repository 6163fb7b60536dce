use serde::{Deserialize, Serialize};

use crate::config::TimingPolicy;
use crate::transcription::TranscriptionSegment;

/// A wrapped line with its display interval, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedLine {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Assign each wrapped line of `segment` a display interval.
///
/// `text_len` is the character length of the cleaned segment text the lines
/// were wrapped from. Under the proportional policy lines are laid end to end
/// from `segment.start`, each lasting `len * duration / text_len` but at least
/// `min_line_duration`, and every end is clamped to `segment.end`. Trailing
/// lines of a short segment can therefore end up shorter than the minimum.
pub fn allocate(
    segment: &TranscriptionSegment,
    text_len: usize,
    lines: Vec<String>,
    policy: TimingPolicy,
) -> Vec<TimedLine> {
    match policy {
        TimingPolicy::Flat => lines
            .into_iter()
            .map(|text| TimedLine {
                text,
                start: segment.start,
                end: segment.end,
            })
            .collect(),
        TimingPolicy::Proportional { min_line_duration } => {
            let per_char = if text_len == 0 {
                None
            } else {
                Some(segment.duration() / text_len as f64)
            };

            let mut cursor = segment.start;
            lines
                .into_iter()
                .map(|text| {
                    let line_duration = match per_char {
                        Some(per_char) => {
                            (text.chars().count() as f64 * per_char).max(min_line_duration)
                        }
                        None => min_line_duration,
                    };
                    let end = (cursor + line_duration).min(segment.end).max(cursor);
                    let line = TimedLine {
                        text,
                        start: cursor,
                        end,
                    };
                    cursor = end;
                    line
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proportional() -> TimingPolicy {
        TimingPolicy::Proportional {
            min_line_duration: 1.5,
        }
    }

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_single_line_fills_segment() {
        let segment = TranscriptionSegment::new(0.0, 2.0, "hello world");
        let timed = allocate(&segment, 11, lines(&["hello world"]), proportional());

        assert_eq!(timed.len(), 1);
        assert_eq!(timed[0].start, 0.0);
        assert_eq!(timed[0].end, 2.0);
    }

    #[test]
    fn test_proportional_split() {
        // 20 chars + 1 space + 19 chars = 40 chars over 40 seconds
        let first = "a".repeat(20);
        let second = "b".repeat(19);
        let segment = TranscriptionSegment::new(10.0, 50.0, format!("{} {}", first, second));
        let timed = allocate(&segment, 40, vec![first, second], proportional());

        assert_eq!(timed[0].start, 10.0);
        assert_eq!(timed[0].end, 30.0);
        assert_eq!(timed[1].start, 30.0);
        assert_eq!(timed[1].end, 49.0);
    }

    #[test]
    fn test_minimum_duration_and_clamp() {
        let segment = TranscriptionSegment::new(5.0, 7.0, "a b c");
        let timed = allocate(&segment, 5, lines(&["a", "b", "c"]), proportional());

        assert_eq!((timed[0].start, timed[0].end), (5.0, 6.5));
        assert_eq!((timed[1].start, timed[1].end), (6.5, 7.0));
        assert_eq!((timed[2].start, timed[2].end), (7.0, 7.0));

        for line in &timed {
            assert!(segment.start <= line.start && line.end <= segment.end);
            assert!(line.start <= line.end);
        }
    }

    #[test]
    fn test_zero_length_text_uses_minimum() {
        let segment = TranscriptionSegment::new(0.0, 10.0, "");
        let timed = allocate(&segment, 0, lines(&["x", "y"]), proportional());

        assert_eq!((timed[0].start, timed[0].end), (0.0, 1.5));
        assert_eq!((timed[1].start, timed[1].end), (1.5, 3.0));
    }

    #[test]
    fn test_flat_policy() {
        let segment = TranscriptionSegment::new(3.0, 9.0, "one two");
        let timed = allocate(&segment, 7, lines(&["one", "two"]), TimingPolicy::Flat);

        for line in &timed {
            assert_eq!((line.start, line.end), (3.0, 9.0));
        }
    }

    #[test]
    fn test_zero_duration_segment() {
        let segment = TranscriptionSegment::new(4.0, 4.0, "hi");
        let timed = allocate(&segment, 2, lines(&["hi"]), proportional());
        assert_eq!((timed[0].start, timed[0].end), (4.0, 4.0));
    }
}
