use thiserror::Error;

#[derive(Error, Debug)]
pub enum AniburnError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No Events Format line found in subtitle file")]
    FormatNotFound,

    #[error("No '{0}' field found in the Events Format line")]
    FieldNotFound(String),

    #[error("Sentinel markers missing from translated text: {0}")]
    MarkerExtraction(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Subtitle processing error: {0}")]
    Subtitle(String),
}

pub type Result<T> = std::result::Result<T, AniburnError>;
