use regex::Regex;
use std::sync::OnceLock;

/// Disfluencies removed by [`strip_fillers`]
pub const FILLER_WORDS: [&str; 5] = ["um", "uh", "er", "ah", "like"];

fn filler_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let alternation = FILLER_WORDS.join("|");
        Regex::new(&format!(r"(?i)\b(?:{})\b,?", alternation)).expect("filler pattern is valid")
    })
}

/// Collapse every whitespace run to a single space and trim both ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Remove standalone filler words, case-insensitively, then collapse whitespace.
///
/// Matching is on word boundaries, so "Liked" and "umbrella" are untouched.
/// A comma directly after a filler is removed with it.
pub fn strip_fillers(text: &str) -> String {
    collapse_whitespace(&filler_pattern().replace_all(text, ""))
}
