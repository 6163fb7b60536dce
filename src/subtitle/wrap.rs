/// Wrap text into caption lines of at most `max_chars` characters.
///
/// Words are kept whole and joined greedily with single spaces. A word longer
/// than `max_chars` is cut into `max_chars`-sized chunks; its final chunk stays
/// open so following words can join it. Lengths count `char`s, not bytes.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
            }

            let chars: Vec<char> = word.chars().collect();
            let mut chunks: Vec<String> = chars
                .chunks(max_chars)
                .map(|chunk| chunk.iter().collect())
                .collect();
            let remainder = chunks.pop().unwrap_or_default();
            lines.extend(chunks);

            current_len = remainder.chars().count();
            current_line = remainder;
        } else if current_line.is_empty() {
            current_line.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::replace(&mut current_line, word.to_string()));
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_wrapping() {
        let long_text = "This is a very long line that should be wrapped at a specific length";
        let lines = wrap_text(long_text, 20);

        for line in &lines {
            assert!(line.chars().count() <= 20, "line too long: {:?}", line);
        }
        assert_eq!(lines.join(" "), long_text);
    }

    #[test]
    fn test_greedy_fill_is_exact() {
        // "aaaa bbbb" is exactly 9 characters
        assert_eq!(wrap_text("aaaa bbbb cc", 9), vec!["aaaa bbbb", "cc"]);
        assert_eq!(wrap_text("aaaa bbbb cc", 8), vec!["aaaa", "bbbb cc"]);
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(wrap_text("  hello \t  world\n", 42), vec!["hello world"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(wrap_text("", 42).is_empty());
        assert!(wrap_text("   \n\t ", 42).is_empty());
    }

    #[test]
    fn test_overlong_word_is_split() {
        let word = "a".repeat(100);
        let lengths: Vec<usize> = wrap_text(&word, 42).iter().map(|l| l.len()).collect();
        assert_eq!(lengths, vec![42, 42, 16]);
    }

    #[test]
    fn test_overlong_word_between_words() {
        let lines = wrap_text("go abcdefghij ok", 4);
        assert_eq!(lines, vec!["go", "abcd", "efgh", "ij", "ok"]);

        // the final chunk stays open for the next word
        let lines = wrap_text("abcdefghi x", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "i x"]);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let lines = wrap_text("ééééé ñ", 7);
        assert_eq!(lines, vec!["ééééé ñ"]);

        let lines = wrap_text("ééééé", 2);
        assert_eq!(lines, vec!["éé", "éé", "é"]);
    }
}
