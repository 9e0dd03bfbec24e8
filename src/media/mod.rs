// Modular media processing architecture
//
// A thin abstraction over the external ffmpeg/ffprobe binaries. The core
// pipeline only needs a media duration, a subtitle stream to extract, and
// somewhere to write the result; everything else stays behind this seam.

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Stream layout and duration of one media file
#[derive(Debug, Clone)]
pub struct MediaProbe {
    /// Container duration in seconds
    pub duration: f64,
    /// Absolute indexes of subtitle streams, in container order
    pub subtitle_streams: Vec<usize>,
}

/// Main trait for media processing operations
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Probe duration and stream layout
    async fn probe(&self, media_path: &Path) -> Result<MediaProbe>;

    /// Extract the n-th subtitle stream to a subtitle document
    async fn extract_subtitle(
        &self,
        media_path: &Path,
        stream_index: usize,
        output_path: &Path,
    ) -> Result<()>;

    /// Soft-mux a subtitle into the container as the default track
    async fn embed_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        track_title: &str,
        output_path: &Path,
    ) -> Result<()>;

    /// Burn a subtitle into the video stream
    async fn hardcode_subtitle(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()>;

    /// Check if the media binaries are available
    fn check_availability(&self) -> Result<()>;

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config))
    }
}
