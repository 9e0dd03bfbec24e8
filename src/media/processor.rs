use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, AniburnError};
use super::{MediaCommandBuilder, MediaProbe, MediaProcessorTrait};

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    index: usize,
    codec_type: String,
}

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path, &config.probe_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    /// Probe duration and stream layout via ffprobe JSON output
    async fn probe(&self, media_path: &Path) -> Result<MediaProbe> {
        info!("Probing media file: {}", media_path.display());

        if !media_path.exists() {
            return Err(AniburnError::FileNotFound(media_path.display().to_string()));
        }

        let stdout = self.command_builder.probe(media_path).execute_capture()?;
        parse_probe_output(&stdout)
    }

    /// Extract the n-th subtitle stream to a subtitle document
    async fn extract_subtitle(
        &self,
        media_path: &Path,
        stream_index: usize,
        output_path: &Path,
    ) -> Result<()> {
        info!(
            "Extracting subtitle stream {} from {} -> {}",
            stream_index,
            media_path.display(),
            output_path.display()
        );

        let command =
            self.command_builder
                .extract_subtitle(media_path, stream_index, output_path);
        command.execute()?;

        info!("Subtitle extraction completed");
        Ok(())
    }

    /// Soft-mux a subtitle into the container as the default track
    async fn embed_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        track_title: &str,
        output_path: &Path,
    ) -> Result<()> {
        info!(
            "Embedding subtitles from {} into {} -> {}",
            subtitle_path.display(),
            video_path.display(),
            output_path.display()
        );

        let command = self.command_builder.embed_subtitles(
            video_path,
            subtitle_path,
            track_title,
            output_path,
        );
        command.execute()?;

        info!("Subtitle embedding completed successfully");
        Ok(())
    }

    /// Burn a subtitle into the video stream, re-encoding with the
    /// configured options
    async fn hardcode_subtitle(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        info!(
            "Burning subtitles from {} into {} -> {}",
            subtitle_path.display(),
            video_path.display(),
            output_path.display()
        );

        let command = self.command_builder.hardcode_subtitle(
            video_path,
            subtitle_path,
            &self.config.fonts_dir,
            &self.config.encode_options,
            output_path,
        );
        command.execute()?;

        info!("Subtitle burn-in completed successfully");
        Ok(())
    }

    /// Check if the media binaries are available
    fn check_availability(&self) -> Result<()> {
        for binary in [&self.config.binary_path, &self.config.probe_path] {
            let output = Command::new(binary)
                .arg("-version")
                .output()
                .map_err(|e| AniburnError::Media(format!("{} not found: {}", binary, e)))?;

            if !output.status.success() {
                return Err(AniburnError::Media(format!(
                    "{} version check failed",
                    binary
                )));
            }
        }

        info!("Media binaries are available");
        Ok(())
    }

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let stdout = self.command_builder.version_check().execute_capture()?;
        let first_line = stdout.lines().next().unwrap_or("Unknown version");
        Ok(first_line.to_string())
    }
}

fn parse_probe_output(stdout: &str) -> Result<MediaProbe> {
    let probe: ProbeOutput = serde_json::from_str(stdout)?;

    let duration = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| AniburnError::Media("Container reports no duration".to_string()))?;

    let subtitle_streams = probe
        .streams
        .iter()
        .filter(|s| s.codec_type == "subtitle")
        .map(|s| s.index)
        .collect();

    Ok(MediaProbe {
        duration,
        subtitle_streams,
    })
}
