/// Maximum rendered column width before a dialogue wraps
pub const MAX_LINE_WIDTH: usize = 45;

/// A trailing wrapped line at or under this length merges into its
/// predecessor instead of rendering as an orphan
pub const ORPHAN_MERGE_LIMIT: usize = 18;

/// Soft-break sentinel joining wrapped lines; converted to the subtitle
/// format's `\N` marker when the line is written back
pub const SOFT_BREAK: char = '~';

/// Word-wrap a translated dialogue for on-screen display.
///
/// Single-line output returns the text unmodified; multi-line output merges
/// short orphan tails and joins the survivors with [`SOFT_BREAK`].
pub fn reflow(text: &str) -> String {
    let mut lines = wrap(text, MAX_LINE_WIDTH);
    if lines.len() <= 1 {
        return text.to_string();
    }

    if let Some(last) = lines.last() {
        if last.chars().count() <= ORPHAN_MERGE_LIMIT {
            let orphan = lines.pop().expect("checked non-empty");
            let prev = lines.last_mut().expect("len > 1 before pop");
            prev.push(' ');
            prev.push_str(&orphan);
        }
    }

    if lines.len() > 1 {
        lines.join(&SOFT_BREAK.to_string())
    } else {
        text.to_string()
    }
}

/// Greedy whitespace wrap measured in characters, not bytes, since target
/// scripts are mostly multi-byte. Words longer than `width` stand alone.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(reflow("short line"), "short line");
    }

    #[test]
    fn test_wraps_at_width() {
        let text = "aaaa ".repeat(20);
        let wrapped = reflow(text.trim());
        for segment in wrapped.split(SOFT_BREAK) {
            assert!(segment.chars().count() <= MAX_LINE_WIDTH);
        }
        assert!(wrapped.contains(SOFT_BREAK));
    }

    #[test]
    fn test_orphan_tail_merges_into_previous_segment() {
        // Segments of 44 and 10 characters: the 10-char tail merges
        let text = format!("{} {}", "a".repeat(44), "b".repeat(10));
        let reflowed = reflow(&text);
        assert!(!reflowed.contains(SOFT_BREAK));
        assert_eq!(reflowed, text);
    }

    #[test]
    fn test_long_tail_stays_separate() {
        let text = format!("{} {}", "a".repeat(44), "b".repeat(30));
        let reflowed = reflow(&text);
        let segments: Vec<&str> = reflowed.split(SOFT_BREAK).collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].chars().count(), 30);
    }

    #[test]
    fn test_merge_then_multiple_segments() {
        let text = format!("{} {} {}", "a".repeat(40), "b".repeat(40), "c".repeat(5));
        let reflowed = reflow(&text);
        let segments: Vec<&str> = reflowed.split(SOFT_BREAK).collect();
        assert_eq!(segments.len(), 2);
        assert!(segments[1].ends_with(&"c".repeat(5)));
    }

    #[test]
    fn test_width_measured_in_chars_not_bytes() {
        // Persian words: multi-byte UTF-8, well under the width in chars
        let text = "سلام دنیا چطوری خوبی ممنون";
        assert_eq!(reflow(text), text);
    }
}
