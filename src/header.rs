use std::path::Path;
use tracing::debug;

use crate::config::BrandingConfig;
use crate::document::SubtitleDocument;
use crate::error::{Result, AniburnError};

const PLAY_RES_LINES: [&str; 3] = [
    "PlayResX: 1920",
    "PlayResY: 1080",
    "ScaledBorderAndShadow: yes",
];

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

fn default_style(font_name: &str) -> String {
    format!(
        "Style: Default,{},70,&H26D9D9&,&H000000FF,&H00000000,&H00000000,-1,0,0,0,100,100,0,0,1,2.50001,0,2,20,20,30,1",
        font_name
    )
}

/// Single-pass rewrite of the document header: studio credit in the
/// script-info block, forced play resolution, a canonical Default style
/// derived from the embedded font, and a `[Fonts]` declaration ahead of the
/// Events section.
///
/// Re-running on its own output changes nothing; every insertion is guarded
/// by a presence check and the style block is replaced rather than extended.
pub struct HeaderRewriter<'a> {
    config: &'a BrandingConfig,
}

impl<'a> HeaderRewriter<'a> {
    pub fn new(config: &'a BrandingConfig) -> Self {
        Self { config }
    }

    pub fn rewrite(&self, doc: &mut SubtitleDocument) -> Result<()> {
        let font_name = font_display_name(&self.config.font_path)?;
        let copyright_line = format!("; Script Copy Right: {}", self.config.copyright);

        let has_copyright = doc.lines().iter().any(|l| l == &copyright_line);
        let has_fonts = doc.lines().iter().any(|l| l.trim() == "[Fonts]");

        let mut new_lines = Vec::with_capacity(doc.lines().len() + 10);
        let mut in_styles = false;

        for line in doc.lines() {
            if line.starts_with('[') {
                in_styles = false;
            }

            if line.contains("[Script Info]") {
                new_lines.push(line.clone());
                if !has_copyright {
                    new_lines.push(copyright_line.clone());
                }
                continue;
            }

            // Resolution keys are forced, stale ones dropped
            if line.starts_with("PlayResX:")
                || line.starts_with("PlayResY:")
                || line.starts_with("ScaledBorderAndShadow:")
            {
                continue;
            }

            if line.starts_with('[') && line.contains("Styles]") {
                new_lines.extend(PLAY_RES_LINES.iter().map(|l| l.to_string()));
                new_lines.push(line.clone());
                new_lines.push(STYLE_FORMAT.to_string());
                new_lines.push(default_style(&font_name));
                in_styles = true;
                continue;
            }

            if in_styles && (line.starts_with("Format:") || line.starts_with("Style:")) {
                continue;
            }

            if line.contains("[Events]") && !has_fonts {
                new_lines.push(String::new());
                new_lines.push("[Fonts]".to_string());
                new_lines.push(format!("fontname: {}", font_name));
                new_lines.push(String::new());
            }

            new_lines.push(line.clone());
        }

        debug!(
            "Header rewritten: style font '{}', {} lines",
            font_name,
            new_lines.len()
        );
        doc.replace_lines(new_lines);
        Ok(())
    }
}

/// Display font name from the font resource path: the file stem.
fn font_display_name(font_path: &str) -> Result<String> {
    Path::new(font_path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| AniburnError::Config(format!("Invalid font path: {}", font_path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BrandingConfig {
        BrandingConfig {
            copyright: "Studio.example".to_string(),
            intro: String::new(),
            opening: String::new(),
            ending: String::new(),
            font_path: "assets/Vazir Black.ttf".to_string(),
            gap_threshold_secs: 20.0,
            min_cue_offset_secs: 10.0,
        }
    }

    fn source_doc() -> SubtitleDocument {
        SubtitleDocument::from_lines(
            "test.ass",
            vec![
                "[Script Info]".to_string(),
                "Title: episode".to_string(),
                "PlayResX: 1280".to_string(),
                "PlayResY: 720".to_string(),
                "[V4+ Styles]".to_string(),
                "Format: Name, Fontname, Fontsize".to_string(),
                "Style: Default,Arial,20".to_string(),
                "Style: Signs,Arial,16".to_string(),
                "[Events]".to_string(),
                "Format: Layer, Start, End, Text".to_string(),
                "Dialogue: 0,0:00:01.00,0:00:02.00,hello".to_string(),
            ],
        )
    }

    #[test]
    fn test_rewrite_injects_all_sections() {
        let config = config();
        let mut doc = source_doc();
        HeaderRewriter::new(&config).rewrite(&mut doc).unwrap();

        let text = doc.lines().join("\n");
        assert!(text.contains("; Script Copy Right: Studio.example"));
        assert!(text.contains("PlayResX: 1920"));
        assert!(text.contains("ScaledBorderAndShadow: yes"));
        assert!(text.contains("Style: Default,Vazir Black,70,"));
        assert!(text.contains("[Fonts]\nfontname: Vazir Black"));

        // Stale resolution and styles are gone
        assert!(!text.contains("PlayResX: 1280"));
        assert!(!text.contains("Style: Default,Arial,20"));
        assert!(!text.contains("Style: Signs,Arial,16"));

        // The Events Format line survives untouched
        assert!(text.contains("Format: Layer, Start, End, Text"));
    }

    #[test]
    fn test_fonts_block_precedes_events() {
        let config = config();
        let mut doc = source_doc();
        HeaderRewriter::new(&config).rewrite(&mut doc).unwrap();

        let fonts = doc.lines().iter().position(|l| l == "[Fonts]").unwrap();
        let events = doc.lines().iter().position(|l| l == "[Events]").unwrap();
        assert!(fonts < events);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let config = config();
        let mut doc = source_doc();
        let rewriter = HeaderRewriter::new(&config);

        rewriter.rewrite(&mut doc).unwrap();
        let first = doc.lines().to_vec();

        rewriter.rewrite(&mut doc).unwrap();
        assert_eq!(doc.lines(), first.as_slice());
    }

    #[test]
    fn test_font_display_name() {
        assert_eq!(font_display_name("assets/Vazir Black.ttf").unwrap(), "Vazir Black");
        assert_eq!(font_display_name("Roboto.otf").unwrap(), "Roboto");
    }
}
