use tracing::{debug, info};

use crate::config::BrandingConfig;
use crate::dialogue::{extract_dialogues, DialogueRecord, Timestamp, DIALOGUE_TIMING};
use crate::document::SubtitleDocument;
use crate::error::Result;

/// The intro cue always covers the first ten seconds of the file.
const INTRO_CUE_END_SECS: u64 = 10;

/// Styling overrides for the intro card: fade, top-center anchor, fixed
/// size/colour with a black outline.
const INTRO_OVERRIDES: &str = r"{\fad(3000,3000)\an8\fs50\c&H26D9D9&\3c&H000000&}";

/// Styling overrides for gap cues: same look, opaque primary fill.
const GAP_OVERRIDES: &str = r"{\fad(3000,3000)\an8\fs50\c&H26D9D9&\1a&H00&}";

/// A dialogue-free interval, candidate for a branding cue. Boundaries are
/// truncated to whole seconds the way the subtitle's cue timing is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub start: Timestamp,
    pub end: Timestamp,
}

/// Injects timed branding cues into detected silence gaps and applies
/// global time shifts.
pub struct BrandingEngine<'a> {
    config: &'a BrandingConfig,
    media_duration: f64,
}

impl<'a> BrandingEngine<'a> {
    pub fn new(config: &'a BrandingConfig, media_duration: f64) -> Self {
        Self {
            config,
            media_duration,
        }
    }

    /// Find significant dialogue-free gaps by ordinal position: the interval
    /// between consecutive dialogues when it exceeds the threshold and the
    /// current dialogue starts past the minimum offset, plus a synthesized
    /// trailing gap when the last dialogue ends well before the media does.
    pub fn detect_gaps(&self, dialogues: &[DialogueRecord]) -> Vec<Gap> {
        let mut gaps = Vec::new();

        for pair in dialogues.windows(2) {
            let previous_end = pair[0].range.end;
            let current_start = pair[1].range.start;

            let gap_secs = current_start.total_seconds() - previous_end.total_seconds();
            if gap_secs > self.config.gap_threshold_secs
                && current_start.total_seconds() > self.config.min_cue_offset_secs
            {
                gaps.push(Gap {
                    start: truncate(previous_end),
                    end: truncate(current_start),
                });
            }
        }

        if let Some(last) = dialogues.last() {
            let end_secs = last.range.end.whole_seconds() as f64;
            if self.media_duration > end_secs
                && self.media_duration - end_secs > self.config.gap_threshold_secs
            {
                gaps.push(Gap {
                    start: truncate(last.range.end),
                    end: Timestamp::from_centis((self.media_duration.floor() as i64) * 100),
                });
            }
        }

        debug!("Detected {} significant gap(s)", gaps.len());
        gaps
    }

    /// Append branding cues to the document: the fixed intro card, the
    /// opening cue in the first significant gap and the ending cue in the
    /// last. A single gap receives only the opening; intermediate gaps stay
    /// empty.
    pub fn apply_cues(&self, doc: &mut SubtitleDocument) -> Result<usize> {
        let schema = doc.events_schema()?;
        let dialogues = extract_dialogues(doc, schema, 0, 0);
        let gaps = self.detect_gaps(&dialogues);

        let mut cues = vec![format!(
            "Dialogue: 0,0:00:00.00,0:00:{:02}.00,Default,,0,0,0,,{}{}",
            INTRO_CUE_END_SECS, INTRO_OVERRIDES, self.config.intro
        )];

        for (i, gap) in gaps.iter().enumerate() {
            if i == 0 {
                cues.push(gap_cue(gap, &self.config.opening));
            } else if i + 1 == gaps.len() {
                cues.push(gap_cue(gap, &self.config.ending));
            }
        }

        let count = cues.len();
        let mut new_lines = doc.lines().to_vec();
        new_lines.extend(cues);
        doc.replace_lines(new_lines);

        info!("Appended {} branding cue(s)", count);
        Ok(count)
    }
}

fn gap_cue(gap: &Gap, text: &str) -> String {
    format!(
        "Dialogue: 0,{},{},Default,,0,0,0,,{}{}",
        gap.start, gap.end, GAP_OVERRIDES, text
    )
}

fn truncate(ts: Timestamp) -> Timestamp {
    Timestamp::from_centis((ts.whole_seconds() as i64) * 100)
}

/// Shift every dialogue's start and end by a signed fractional offset,
/// clamped to non-negative, keeping the file's timestamp representation.
/// Returns the number of shifted lines.
pub fn shift_document(doc: &mut SubtitleDocument, offset_secs: f64) -> usize {
    let mut shifted = 0;
    let new_lines = doc
        .lines()
        .iter()
        .map(|line| match shift_line(line, offset_secs) {
            Some(new_line) => {
                shifted += 1;
                new_line
            }
            None => line.clone(),
        })
        .collect();

    doc.replace_lines(new_lines);
    info!("Shifted {} dialogue line(s) by {}s", shifted, offset_secs);
    shifted
}

fn shift_line(line: &str, offset_secs: f64) -> Option<String> {
    let caps = DIALOGUE_TIMING.captures(line)?;
    let (start_match, end_match) = (caps.get(1)?, caps.get(2)?);

    let start = Timestamp::parse(start_match.as_str()).ok()?;
    let end = Timestamp::parse(end_match.as_str()).ok()?;

    Some(format!(
        "{}{}{}{}{}",
        &line[..start_match.start()],
        start.shift(offset_secs),
        &line[start_match.end()..end_match.start()],
        end.shift(offset_secs),
        &line[end_match.end()..]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::TimeRange;

    fn config() -> BrandingConfig {
        BrandingConfig {
            copyright: "Studio".to_string(),
            intro: "INTRO".to_string(),
            opening: "OPENING".to_string(),
            ending: "ENDING".to_string(),
            font_path: "assets/font.ttf".to_string(),
            gap_threshold_secs: 20.0,
            min_cue_offset_secs: 10.0,
        }
    }

    fn record(position: usize, start_secs: f64, end_secs: f64) -> DialogueRecord {
        DialogueRecord {
            source: format!("line {}", position),
            range: TimeRange {
                start: Timestamp::from_seconds(start_secs),
                end: Timestamp::from_seconds(end_secs),
            },
            position,
            before: vec![],
            after: vec![],
            translated: String::new(),
            edited: String::new(),
        }
    }

    #[test]
    fn test_single_gap_detected_between_pair() {
        let config = config();
        let engine = BrandingEngine::new(&config, 42.0);
        let dialogues = vec![record(0, 10.0, 12.0), record(1, 40.0, 42.0)];

        let gaps = engine.detect_gaps(&dialogues);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].start.to_string(), "0:00:12.00");
        assert_eq!(gaps[0].end.to_string(), "0:00:40.00");
    }

    #[test]
    fn test_small_gap_ignored() {
        let config = config();
        let engine = BrandingEngine::new(&config, 100.0);
        let dialogues = vec![record(0, 10.0, 12.0), record(1, 20.0, 22.0)];
        // Trailing interval 100 - 22 = 78s still forms a gap; the pair gap
        // of 8s does not.
        let gaps = engine.detect_gaps(&dialogues);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].start.to_string(), "0:00:22.00");
    }

    #[test]
    fn test_early_gap_before_min_offset_ignored() {
        let config = config();
        let engine = BrandingEngine::new(&config, 30.0);
        // Second dialogue starts at 8s, before the 10s minimum offset
        let dialogues = vec![record(0, 0.0, 1.0), record(1, 8.0, 30.0)];
        assert!(engine.detect_gaps(&dialogues).is_empty());
    }

    #[test]
    fn test_trailing_gap_to_media_end() {
        let config = config();
        let engine = BrandingEngine::new(&config, 120.0);
        let dialogues = vec![record(0, 10.0, 12.0), record(1, 40.0, 42.0)];

        let gaps = engine.detect_gaps(&dialogues);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[1].start.to_string(), "0:00:42.00");
        assert_eq!(gaps[1].end.to_string(), "0:02:00.00");
    }

    fn doc_with_dialogues(dialogues: &[&str]) -> SubtitleDocument {
        let mut lines = vec![
            "[Events]".to_string(),
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
                .to_string(),
        ];
        lines.extend(dialogues.iter().map(|d| d.to_string()));
        SubtitleDocument::from_lines("test.ass", lines)
    }

    #[test]
    fn test_single_gap_receives_opening_only() {
        let config = config();
        let engine = BrandingEngine::new(&config, 42.0);
        let mut doc = doc_with_dialogues(&[
            "Dialogue: 0,0:00:10.00,0:00:12.00,Default,,0,0,0,,one",
            "Dialogue: 0,0:00:40.00,0:00:42.00,Default,,0,0,0,,two",
        ]);

        let count = engine.apply_cues(&mut doc).unwrap();
        assert_eq!(count, 2); // intro + opening

        let text = doc.lines().join("\n");
        assert!(text.contains("0:00:00.00,0:00:10.00") && text.contains("INTRO"));
        assert!(text.contains("0:00:12.00,0:00:40.00") && text.contains("OPENING"));
        assert!(!text.contains("ENDING"));
    }

    #[test]
    fn test_first_and_last_gaps_receive_opening_and_ending() {
        let config = config();
        let engine = BrandingEngine::new(&config, 300.0);
        let mut doc = doc_with_dialogues(&[
            "Dialogue: 0,0:00:10.00,0:00:12.00,Default,,0,0,0,,one",
            "Dialogue: 0,0:00:40.00,0:00:42.00,Default,,0,0,0,,two",
            "Dialogue: 0,0:02:00.00,0:02:02.00,Default,,0,0,0,,three",
        ]);

        let count = engine.apply_cues(&mut doc).unwrap();
        assert_eq!(count, 3);

        let text = doc.lines().join("\n");
        assert!(text.contains("OPENING"));
        assert!(text.contains("ENDING"));
    }

    #[test]
    fn test_intro_cue_always_present() {
        let config = config();
        let engine = BrandingEngine::new(&config, 30.0);
        let mut doc = doc_with_dialogues(&[
            "Dialogue: 0,0:00:01.00,0:00:28.00,Default,,0,0,0,,wall to wall",
        ]);

        let count = engine.apply_cues(&mut doc).unwrap();
        assert_eq!(count, 1);
        assert!(doc.lines().last().unwrap().contains("INTRO"));
    }

    #[test]
    fn test_shift_forward_and_backward() {
        let mut doc = doc_with_dialogues(&[
            "Dialogue: 0,0:00:10.00,0:00:12.50,Default,,0,0,0,,text, with comma",
        ]);

        assert_eq!(shift_document(&mut doc, 2.5), 1);
        assert!(doc.lines()[2].starts_with("Dialogue: 0,0:00:12.50,0:00:15.00,"));
        assert!(doc.lines()[2].ends_with("text, with comma"));

        assert_eq!(shift_document(&mut doc, -2.5), 1);
        assert!(doc.lines()[2].starts_with("Dialogue: 0,0:00:10.00,0:00:12.50,"));
    }

    #[test]
    fn test_shift_clamps_at_zero() {
        let mut doc = doc_with_dialogues(&[
            "Dialogue: 0,0:00:03.00,0:00:05.00,Default,,0,0,0,,early",
        ]);

        shift_document(&mut doc, -10.0);
        assert!(doc.lines()[2].starts_with("Dialogue: 0,0:00:00.00,0:00:00.00,"));
    }
}
