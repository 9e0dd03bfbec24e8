use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::{Result, AniburnError};

/// Field layout of the Events block, parsed once per document from its
/// `Format:` line and passed to every consumer. The position of the `Text`
/// field varies by source file and is never assumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventsSchema {
    /// Line index of the Events `Format:` line
    pub format_line: usize,
    /// Zero-based position of the `Text` field
    pub text_field: usize,
}

/// One subtitle file held in memory as an ordered line sequence.
///
/// The document owns all lines; every mutation replaces the full sequence
/// atomically and persistence only happens on an explicit [`save`](Self::save).
#[derive(Debug, Clone)]
pub struct SubtitleDocument {
    path: PathBuf,
    lines: Vec<String>,
}

impl SubtitleDocument {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AniburnError::FileNotFound(path.display().to_string()));
        }

        let content = fs::read_to_string(path).await?;
        let lines = content
            .lines()
            .map(|l| l.trim_end_matches('\r').to_string())
            .collect::<Vec<_>>();

        debug!("Loaded {} lines from {}", lines.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            lines,
        })
    }

    pub fn from_lines<P: AsRef<Path>>(path: P, lines: Vec<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Locate the Events `Format:` line, identified by an `[Events]` section
    /// header on the preceding line.
    pub fn locate_events_format(&self) -> Result<usize> {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 && line.contains("Format:") && self.lines[i - 1].contains("[Events]") {
                return Ok(i);
            }
        }
        Err(AniburnError::FormatNotFound)
    }

    /// Parse the Events schema: the `Format:` line position and the index of
    /// the `Text` field within it.
    pub fn events_schema(&self) -> Result<EventsSchema> {
        let format_line = self.locate_events_format()?;
        let text_field = text_field_index(&self.lines[format_line])?;
        Ok(EventsSchema {
            format_line,
            text_field,
        })
    }

    /// Atomically replace the whole line sequence.
    pub fn replace_lines(&mut self, new_lines: Vec<String>) {
        self.lines = new_lines;
    }

    /// Write the document back to its path as a full overwrite.
    pub async fn save(&self) -> Result<()> {
        let mut content = self.lines.join("\n");
        content.push('\n');
        fs::write(&self.path, content).await?;
        debug!("Wrote {} lines to {}", self.lines.len(), self.path.display());
        Ok(())
    }
}

/// Zero-based index of the field named `Text` in an Events `Format:` line.
pub fn text_field_index(format_line: &str) -> Result<usize> {
    let fields = format_line
        .trim()
        .strip_prefix("Format:")
        .ok_or(AniburnError::FormatNotFound)?;

    fields
        .split(',')
        .map(|f| f.trim())
        .position(|f| f == "Text")
        .ok_or_else(|| AniburnError::FieldNotFound("Text".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT_LINE: &str =
        "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

    #[test]
    fn test_text_field_index_standard_layout() {
        assert_eq!(text_field_index(FORMAT_LINE).unwrap(), 9);
    }

    #[test]
    fn test_text_field_index_nonstandard_layout() {
        let line = "Format: Start, End, Text";
        assert_eq!(text_field_index(line).unwrap(), 2);

        let unspaced = "Format: Start,End,Text,Effect";
        assert_eq!(text_field_index(unspaced).unwrap(), 2);
    }

    #[test]
    fn test_text_field_index_missing() {
        let line = "Format: Layer, Start, End";
        assert!(matches!(
            text_field_index(line),
            Err(AniburnError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_locate_events_format() {
        let doc = SubtitleDocument::from_lines(
            "test.ass",
            vec![
                "[Script Info]".to_string(),
                "Title: test".to_string(),
                "[V4+ Styles]".to_string(),
                "Format: Name, Fontname".to_string(),
                "[Events]".to_string(),
                FORMAT_LINE.to_string(),
                "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Hi".to_string(),
            ],
        );

        // The style block's Format line must not be picked up
        assert_eq!(doc.locate_events_format().unwrap(), 5);
        let schema = doc.events_schema().unwrap();
        assert_eq!(schema.format_line, 5);
        assert_eq!(schema.text_field, 9);
    }

    #[test]
    fn test_locate_events_format_missing() {
        let doc = SubtitleDocument::from_lines(
            "test.ass",
            vec!["[Script Info]".to_string(), "Title: test".to_string()],
        );
        assert!(matches!(
            doc.locate_events_format(),
            Err(AniburnError::FormatNotFound)
        ));
    }

    #[tokio::test]
    async fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub.ass");

        let doc = SubtitleDocument::from_lines(
            &path,
            vec!["[Events]".to_string(), FORMAT_LINE.to_string()],
        );
        doc.save().await.unwrap();

        let reloaded = SubtitleDocument::load(&path).await.unwrap();
        assert_eq!(reloaded.lines(), doc.lines());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = SubtitleDocument::load("does-not-exist.ass").await;
        assert!(matches!(result, Err(AniburnError::FileNotFound(_))));
    }
}
