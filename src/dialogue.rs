use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::document::{EventsSchema, SubtitleDocument};
use crate::error::{Result, AniburnError};

/// Timing prefix of a dialogue line: layer, start, end.
pub static DIALOGUE_TIMING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Dialogue: \d+,(\d+:\d+:\d+\.\d+),(\d+:\d+:\d+\.\d+),").unwrap()
});

/// A point in time with centisecond precision, clamped non-negative.
///
/// Rendered as `H:MM:SS.CC` — hours unpadded, minutes/seconds zero-padded,
/// two centisecond digits — the representation used by the subtitle format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    centis: u64,
}

impl Timestamp {
    pub fn from_centis(centis: i64) -> Self {
        Self {
            centis: centis.max(0) as u64,
        }
    }

    pub fn from_seconds(seconds: f64) -> Self {
        Self::from_centis((seconds * 100.0).round() as i64)
    }

    /// Parse `H:MM:SS.CC`. Fractional seconds beyond two digits are truncated,
    /// a single digit counts as tenths.
    pub fn parse(text: &str) -> Result<Self> {
        let mut parts = text.trim().split(':');
        let (hours, minutes, seconds) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(m), Some(s), None) => (h, m, s),
            _ => {
                return Err(AniburnError::Subtitle(format!(
                    "Invalid timestamp: {}",
                    text
                )))
            }
        };

        let (secs, frac) = match seconds.split_once('.') {
            Some((s, f)) => (s, f),
            None => (seconds, ""),
        };

        let hours: u64 = hours
            .parse()
            .map_err(|_| AniburnError::Subtitle(format!("Invalid hours in timestamp: {}", text)))?;
        let minutes: u64 = minutes
            .parse()
            .map_err(|_| AniburnError::Subtitle(format!("Invalid minutes in timestamp: {}", text)))?;
        let secs: u64 = secs
            .parse()
            .map_err(|_| AniburnError::Subtitle(format!("Invalid seconds in timestamp: {}", text)))?;

        if minutes >= 60 || secs >= 60 {
            return Err(AniburnError::Subtitle(format!(
                "Out-of-range time components in timestamp: {}",
                text
            )));
        }

        let centis = match frac.len() {
            0 => 0,
            1 => {
                let d: u64 = frac.parse().map_err(|_| {
                    AniburnError::Subtitle(format!("Invalid fraction in timestamp: {}", text))
                })?;
                d * 10
            }
            _ => frac
                .get(..2)
                .and_then(|f| f.parse().ok())
                .ok_or_else(|| {
                    AniburnError::Subtitle(format!("Invalid fraction in timestamp: {}", text))
                })?,
        };

        Ok(Self {
            centis: hours * 360_000 + minutes * 6_000 + secs * 100 + centis,
        })
    }

    pub fn total_seconds(&self) -> f64 {
        self.centis as f64 / 100.0
    }

    /// Seconds with the fraction dropped, used by the sanitizer's
    /// second-resolution ordering comparisons.
    pub fn whole_seconds(&self) -> u64 {
        self.centis / 100
    }

    /// Shift by a signed fractional second count, clamping at zero.
    pub fn shift(&self, offset_secs: f64) -> Self {
        Self::from_centis(self.centis as i64 + (offset_secs * 100.0).round() as i64)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hours = self.centis / 360_000;
        let minutes = (self.centis % 360_000) / 6_000;
        let seconds = (self.centis % 6_000) / 100;
        let centis = self.centis % 100;
        write!(f, "{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
    }
}

/// Display window of one dialogue. Well-formed input yields start <= end;
/// malformed boundary lines deliberately violate this and are exactly what
/// the sanitizer hunts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

/// One timed subtitle entry with its translation context.
#[derive(Debug, Clone)]
pub struct DialogueRecord {
    /// Text field verbatim, `\N` break markers included
    pub source: String,
    pub range: TimeRange,
    /// Ordinal position within the Events section, which is not necessarily
    /// the temporal order near file boundaries
    pub position: usize,
    /// Up to k preceding sibling texts
    pub before: Vec<String>,
    /// Up to k following sibling texts
    pub after: Vec<String>,
    /// Machine translation output, empty until the translation pass runs
    pub translated: String,
    /// Manual override; wins over `translated` when non-empty
    pub edited: String,
}

impl DialogueRecord {
    pub fn final_text(&self) -> &str {
        if self.edited.is_empty() {
            &self.translated
        } else {
            &self.edited
        }
    }
}

/// Start/end timing of a dialogue line, or None when either timestamp is
/// absent or unparsable.
pub fn parse_line_timing(line: &str) -> Option<(Timestamp, Timestamp)> {
    let caps = DIALOGUE_TIMING.captures(line)?;
    match (Timestamp::parse(&caps[1]), Timestamp::parse(&caps[2])) {
        (Ok(start), Ok(end)) => Some((start, end)),
        _ => None,
    }
}

/// Pattern skipping exactly `text_field` comma-delimited fields, so commas
/// inside the trailing text field survive.
pub fn dialogue_text_pattern(schema: EventsSchema) -> Regex {
    Regex::new(&format!(
        r"^Dialogue: (?:[^,]*,){{{}}}(.*)$",
        schema.text_field
    ))
    .expect("dialogue text pattern construction")
}

/// Build the ordered dialogue sequence from the document's Events block.
///
/// Re-run whenever fresh structured data is needed: in-place edits invalidate
/// previously captured context strings, so records are never maintained
/// incrementally. Lines with unparsable timing are skipped with a warning.
pub fn extract_dialogues(
    doc: &SubtitleDocument,
    schema: EventsSchema,
    context_before: usize,
    context_after: usize,
) -> Vec<DialogueRecord> {
    let text_pattern = dialogue_text_pattern(schema);
    let mut records = Vec::new();

    for line in doc.lines() {
        if !line.starts_with("Dialogue:") {
            continue;
        }

        let Some(text) = text_pattern.captures(line).map(|c| c[1].trim().to_string()) else {
            warn!("Dialogue line with too few fields skipped: {}", line);
            continue;
        };

        let Some((start, end)) = parse_line_timing(line) else {
            warn!("Dialogue line with unparsable timing skipped: {}", line);
            continue;
        };

        let position = records.len();
        records.push(DialogueRecord {
            source: text,
            range: TimeRange { start, end },
            position,
            before: Vec::new(),
            after: Vec::new(),
            translated: String::new(),
            edited: String::new(),
        });
    }

    let sources: Vec<String> = records.iter().map(|r| r.source.clone()).collect();
    for (i, record) in records.iter_mut().enumerate() {
        record.before = (1..=context_before)
            .filter_map(|k| i.checked_sub(k))
            .map(|j| sources[j].clone())
            .collect();
        record.after = (1..=context_after)
            .filter(|k| i + k < sources.len())
            .map(|k| sources[i + k].clone())
            .collect();
    }

    records
}
