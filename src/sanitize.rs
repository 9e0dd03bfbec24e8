use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::SanitizeConfig;
use crate::dialogue::{
    dialogue_text_pattern, extract_dialogues, parse_line_timing, DialogueRecord, Timestamp,
};
use crate::document::SubtitleDocument;
use crate::error::Result;

/// Hard cap on cleanup passes. Removals shift dialogue positions, so the
/// pass is repeated until it converges or this bound is hit.
pub const MAX_PASSES: usize = 40;

/// Vector drawing directive inside an override block (`{...m <x> <y>...}`),
/// used for decorative shapes and watermarks rather than text.
static DRAW_DIRECTIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]*\bm\s+\d").unwrap());

/// Arabic letter variants normalized to their Persian equivalents. Source
/// files mix the two scripts inconsistently, so this runs on every line.
fn arabic_to_persian(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ي' | 'ى' => 'ی',
            'ك' => 'ک',
            'ۀ' | 'ة' => 'ه',
            other => other,
        })
        .collect()
}

/// Iterative noise-removal filter for advertising and credit injections.
///
/// Injected lines often carry deliberately anomalous timing (overlapping the
/// real opening/ending, or beyond the media's duration), so position-based
/// timing checks run alongside the text denylist.
pub struct Sanitizer<'a> {
    config: &'a SanitizeConfig,
    media_duration: f64,
}

impl<'a> Sanitizer<'a> {
    pub fn new(config: &'a SanitizeConfig, media_duration: f64) -> Self {
        Self {
            config,
            media_duration,
        }
    }

    /// Run cleanup passes until a pass removes nothing, bounded by
    /// [`MAX_PASSES`]. Returns the total number of removed lines.
    pub fn run(&self, doc: &mut SubtitleDocument) -> Result<usize> {
        let mut total_removed = 0;

        for pass in 1..=MAX_PASSES {
            let removed = self.run_pass(doc)?;
            total_removed += removed;

            debug!("Sanitizer pass {} removed {} lines", pass, removed);
            if removed == 0 {
                info!(
                    "Sanitizer converged after {} pass(es), {} lines removed",
                    pass, total_removed
                );
                return Ok(total_removed);
            }
        }

        info!(
            "Sanitizer hit the {}-pass cap, {} lines removed",
            MAX_PASSES, total_removed
        );
        Ok(total_removed)
    }

    fn run_pass(&self, doc: &mut SubtitleDocument) -> Result<usize> {
        // Removals shift ordinal positions, so each pass classifies against a
        // freshly extracted dialogue sequence.
        let schema = doc.events_schema()?;
        let dialogues = extract_dialogues(doc, schema, 0, 0);
        let text_pattern = dialogue_text_pattern(schema);

        let before = doc.lines().len();
        let mut new_lines = Vec::with_capacity(before);
        let mut dialogue_index = 0usize;

        for line in doc.lines() {
            let line = arabic_to_persian(line);

            if line.starts_with("Dialogue:") {
                // Classification counts the same lines the extractor turned
                // into records, keeping sibling lookups aligned
                match parse_line_timing(&line) {
                    Some((start, end)) if text_pattern.is_match(&line) => {
                        let index = dialogue_index;
                        dialogue_index += 1;

                        if self.is_anomalous(index, start, end, &dialogues) {
                            continue;
                        }
                    }
                    _ => {
                        // Unparsable timing: the line skips classification but
                        // is otherwise retained.
                        warn!("Malformed dialogue line left in place: {}", line);
                    }
                }
            }

            if self
                .config
                .denylist
                .iter()
                .any(|needle| line.contains(needle.as_str()))
            {
                continue;
            }

            if DRAW_DIRECTIVE.is_match(&line) {
                continue;
            }

            new_lines.push(line);
        }

        let removed = before - new_lines.len();
        doc.replace_lines(new_lines);
        Ok(removed)
    }

    /// Positional timing heuristic: early dialogues are compared with the
    /// following sibling, late dialogues with the preceding one. Ordering is
    /// compared at whole-second resolution while the endpoint-inequality
    /// guard uses exact times.
    fn is_anomalous(
        &self,
        index: usize,
        start: Timestamp,
        end: Timestamp,
        dialogues: &[DialogueRecord],
    ) -> bool {
        if index > self.config.tail_start {
            if let Some(prev) = index.checked_sub(1).and_then(|i| dialogues.get(i)) {
                let prev_end = prev.range.end;
                if start.whole_seconds() < prev_end.whole_seconds() && prev_end != end {
                    return true;
                }
            }
        } else if index < self.config.head_window {
            if let Some(next) = dialogues.get(index + 1) {
                let next_end = next.range.end;
                if start.whole_seconds() > next_end.whole_seconds() && next_end != end {
                    return true;
                }
            }
        }

        start.whole_seconds() as f64 > self.media_duration
            || end.whole_seconds() as f64 > self.media_duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SanitizeConfig;

    const FORMAT_LINE: &str = "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

    fn test_config() -> SanitizeConfig {
        SanitizeConfig {
            denylist: vec!["t.me".to_string(), "encode".to_string()],
            head_window: 3,
            tail_start: 20,
        }
    }

    fn dialogue(start: &str, end: &str, text: &str) -> String {
        format!("Dialogue: 0,{},{},Default,,0,0,0,,{}", start, end, text)
    }

    fn doc_from_dialogues(dialogues: Vec<String>) -> SubtitleDocument {
        let mut lines = vec!["[Events]".to_string(), FORMAT_LINE.to_string()];
        lines.extend(dialogues);
        SubtitleDocument::from_lines("test.ass", lines)
    }

    fn dialogue_count(doc: &SubtitleDocument) -> usize {
        doc.lines().iter().filter(|l| l.starts_with("Dialogue:")).count()
    }

    #[test]
    fn test_denylist_removes_matching_lines() {
        let mut doc = doc_from_dialogues(vec![
            dialogue("0:00:01.00", "0:00:02.00", "join t.me/channel now"),
            dialogue("0:00:03.00", "0:00:04.00", "real dialogue"),
        ]);

        let config = test_config();
        let removed = Sanitizer::new(&config, 1000.0).run(&mut doc).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(dialogue_count(&doc), 1);
    }

    #[test]
    fn test_vector_draw_lines_removed() {
        let mut doc = doc_from_dialogues(vec![
            dialogue("0:00:01.00", "0:00:02.00", r"{\p1\pos(0,0)m 151 9 l 155 14 l}watermark"),
            dialogue("0:00:03.00", "0:00:04.00", "kept"),
        ]);

        let config = test_config();
        Sanitizer::new(&config, 1000.0).run(&mut doc).unwrap();
        assert_eq!(dialogue_count(&doc), 1);
        assert!(doc.lines().iter().any(|l| l.contains("kept")));
    }

    #[test]
    fn test_duration_bound_removes_overlong_lines() {
        let mut doc = doc_from_dialogues(vec![
            dialogue("0:00:01.00", "0:00:02.00", "inside"),
            dialogue("0:30:00.00", "0:30:05.00", "beyond the media"),
        ]);

        let config = test_config();
        let removed = Sanitizer::new(&config, 60.0).run(&mut doc).unwrap();
        assert_eq!(removed, 1);
        assert!(doc.lines().iter().any(|l| l.contains("inside")));
    }

    #[test]
    fn test_head_anomaly_checked_against_next_sibling() {
        // First dialogue starts after the second one has already ended:
        // a bogus injection timed over the opening.
        let mut doc = doc_from_dialogues(vec![
            dialogue("0:10:00.00", "0:10:30.00", "injected credit"),
            dialogue("0:00:05.00", "0:00:07.00", "real first line"),
            dialogue("0:00:08.00", "0:00:09.00", "real second line"),
        ]);

        let config = test_config();
        let removed = Sanitizer::new(&config, 3600.0).run(&mut doc).unwrap();
        assert_eq!(removed, 1);
        assert!(!doc.lines().iter().any(|l| l.contains("injected credit")));
    }

    #[test]
    fn test_tail_anomaly_checked_against_previous_sibling() {
        let mut dialogues: Vec<String> = (0..22)
            .map(|i| {
                dialogue(
                    &format!("0:00:{:02}.00", i * 2),
                    &format!("0:00:{:02}.00", i * 2 + 1),
                    &format!("line {}", i),
                )
            })
            .collect();
        // Ordinal 22: starts before the previous sibling's end with a
        // different end time — overlapping injection near the outro.
        dialogues.push(dialogue("0:00:30.00", "0:01:20.00", "overlapping ad"));

        let mut doc = doc_from_dialogues(dialogues);
        let config = test_config();
        let removed = Sanitizer::new(&config, 3600.0).run(&mut doc).unwrap();
        assert_eq!(removed, 1);
        assert!(!doc.lines().iter().any(|l| l.contains("overlapping ad")));
    }

    #[test]
    fn test_clean_document_is_fixed_point() {
        let mut doc = doc_from_dialogues(vec![
            dialogue("0:00:01.00", "0:00:02.00", "one"),
            dialogue("0:00:03.00", "0:00:04.00", "two"),
        ]);

        let config = test_config();
        let sanitizer = Sanitizer::new(&config, 1000.0);
        assert_eq!(sanitizer.run(&mut doc).unwrap(), 0);

        // Second run on its own output is a no-op
        let snapshot = doc.lines().to_vec();
        assert_eq!(sanitizer.run(&mut doc).unwrap(), 0);
        assert_eq!(doc.lines(), snapshot.as_slice());
    }

    #[test]
    fn test_normalizes_arabic_codepoints() {
        let mut doc = doc_from_dialogues(vec![dialogue(
            "0:00:01.00",
            "0:00:02.00",
            "كتاب يك",
        )]);

        let config = test_config();
        Sanitizer::new(&config, 1000.0).run(&mut doc).unwrap();
        assert!(doc.lines().iter().any(|l| l.contains("کتاب یک")));
    }

    #[test]
    fn test_unparsable_timing_retained() {
        let mut doc = doc_from_dialogues(vec![
            "Dialogue: 0,bogus,0:00:02.00,Default,,0,0,0,,still here".to_string(),
            dialogue("0:00:03.00", "0:00:04.00", "fine"),
        ]);

        let config = test_config();
        let removed = Sanitizer::new(&config, 1000.0).run(&mut doc).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(dialogue_count(&doc), 2);
    }

    #[test]
    fn test_arabic_to_persian_mapping() {
        assert_eq!(arabic_to_persian("علي"), "علی");
        assert_eq!(arabic_to_persian("ة ۀ ك ى"), "ه ه ک ی");
        assert_eq!(arabic_to_persian("plain"), "plain");
    }
}
