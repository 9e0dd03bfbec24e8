use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::error::{Result, AniburnError};

// Default values for the sanitizer window heuristics
fn default_head_window() -> usize {
    3
}

fn default_tail_start() -> usize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub media: MediaConfig,
    pub translate: TranslateConfig,
    pub sanitize: SanitizeConfig,
    pub branding: BrandingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary
    pub probe_path: String,
    /// Directory holding the fonts used when burning subtitles
    pub fonts_dir: String,
    /// Additional encoding options for the final mux/encode
    /// Common options: ["-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p"]
    pub encode_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Source language code (e.g. "en")
    pub source_lang: String,
    /// Target language code (e.g. "fa")
    pub target_lang: String,
    /// Per-call timeout for remote translation requests (seconds)
    pub timeout_secs: u64,
    /// Substituted when both providers fail for a line; kept in the
    /// target language's script
    pub placeholder: String,
    /// Number of preceding sibling lines supplied as context
    pub context_before: usize,
    /// Number of following sibling lines supplied as context
    pub context_after: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizeConfig {
    /// Case-sensitive substrings that mark a line as injected noise
    pub denylist: Vec<String>,
    /// Dialogues with ordinal below this are checked against the next sibling
    #[serde(default = "default_head_window")]
    pub head_window: usize,
    /// Dialogues with ordinal above this are checked against the previous sibling
    #[serde(default = "default_tail_start")]
    pub tail_start: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandingConfig {
    /// Studio credit written into the script-info block
    pub copyright: String,
    /// Cue text shown during the first ten seconds
    pub intro: String,
    /// Cue text for the first dialogue-free gap
    pub opening: String,
    /// Cue text for the last dialogue-free gap
    pub ending: String,
    /// Font file embedded into the subtitle and named in the style block
    pub font_path: String,
    /// Minimum dialogue-free interval that becomes a branding slot (seconds)
    pub gap_threshold_secs: f64,
    /// Gaps starting earlier than this never receive a cue (seconds)
    pub min_cue_offset_secs: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                probe_path: "ffprobe".to_string(),
                fonts_dir: "assets".to_string(),
                encode_options: vec![
                    // Example encoding options users can customize:
                    // "-preset".to_string(), "medium".to_string(),  // Encoding speed
                    // "-crf".to_string(), "23".to_string(),         // Quality (0-51)
                    // "-pix_fmt".to_string(), "yuv420p".to_string(), // Pixel format
                ],
            },
            translate: TranslateConfig {
                source_lang: "en".to_string(),
                target_lang: "fa".to_string(),
                timeout_secs: 30,
                placeholder: "بدون ترجمه".to_string(),
                context_before: 1,
                context_after: 1,
            },
            sanitize: SanitizeConfig {
                denylist: vec![
                    "t.me".to_string(),
                    "@".to_string(),
                    "telegram".to_string(),
                    "instagram".to_string(),
                    "encode".to_string(),
                    "encoder".to_string(),
                    "translator".to_string(),
                    "translated".to_string(),
                    ".com".to_string(),
                    ".ir".to_string(),
                    ".site".to_string(),
                    ".top".to_string(),
                    "زیرنویس".to_string(),
                    "ترجمه و تنظیم".to_string(),
                    "تنظیم و ترجمه".to_string(),
                    "کاری از تیم".to_string(),
                    "ارائه شده".to_string(),
                    "مترجم".to_string(),
                    "انکود".to_string(),
                    "》".to_string(),
                    "《".to_string(),
                    ".::".to_string(),
                    "::.".to_string(),
                ],
                head_window: default_head_window(),
                tail_start: default_tail_start(),
            },
            branding: BrandingConfig {
                copyright: "AniBurn".to_string(),
                intro: String::new(),
                opening: String::new(),
                ending: String::new(),
                font_path: "assets/Vazir Black.ttf".to_string(),
                gap_threshold_secs: 20.0,
                min_cue_offset_secs: 10.0,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AniburnError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| AniburnError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| AniburnError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| AniburnError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
