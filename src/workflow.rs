use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::branding::{shift_document, BrandingEngine};
use crate::config::Config;
use crate::document::SubtitleDocument;
use crate::error::{Result, AniburnError};
use crate::header::HeaderRewriter;
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::sanitize::Sanitizer;
use crate::translate::TranslationPass;

const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];

/// Cooperative cancellation flag. Checked between documents and between
/// dialogue lines, never mid-call.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Drives one subtitle document end-to-end: extract, sanitize, translate,
/// brand, rewrite the header and burn the result back into the video.
pub struct Workflow {
    config: Config,
    media: Box<dyn MediaProcessorTrait>,
    cancel: CancelToken,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        // Check dependencies
        media.check_availability()?;

        Ok(Self {
            config,
            media,
            cancel: CancelToken::new(),
        })
    }

    /// Clone of the cancellation handle, for wiring into signal handlers
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Process a single video file end-to-end
    pub async fn process_single_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        stream_index: usize,
        output_dir: Option<Q>,
    ) -> Result<PathBuf> {
        let input_path = input_path.as_ref();
        info!("Processing single file: {}", input_path.display());

        if !input_path.exists() {
            return Err(AniburnError::FileNotFound(input_path.display().to_string()));
        }

        let output_dir = match output_dir {
            Some(dir) => dir.as_ref().to_path_buf(),
            None => input_path
                .parent()
                .ok_or_else(|| AniburnError::Config("Cannot determine output directory".to_string()))?
                .to_path_buf(),
        };

        fs::create_dir_all(&output_dir).await?;

        self.process_video_file(input_path, &output_dir, stream_index)
            .await
    }

    /// Process all video files in a directory. A failure in one file is
    /// reported with its path and never halts the rest of the batch.
    pub async fn process_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        stream_index: usize,
        output_dir: Option<Q>,
    ) -> Result<()> {
        let input_dir = input_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(AniburnError::Config(
                "Input path is not a directory".to_string(),
            ));
        }

        let output_dir = match output_dir {
            Some(dir) => dir.as_ref().to_path_buf(),
            None => input_dir.to_path_buf(),
        };

        fs::create_dir_all(&output_dir).await?;

        let mut video_files = Vec::new();
        for entry in WalkDir::new(input_dir).into_iter().filter_map(|e| e.ok()) {
            if is_video_file(entry.path()) {
                video_files.push(entry.path().to_path_buf());
            }
        }

        info!("Found {} video files to process", video_files.len());

        for video_path in video_files {
            if self.cancel.is_cancelled() {
                warn!("Batch cancelled, remaining files skipped");
                break;
            }

            match self
                .process_video_file(&video_path, &output_dir, stream_index)
                .await
            {
                Ok(output) => info!(
                    "Successfully processed: {} -> {}",
                    video_path.display(),
                    output.display()
                ),
                Err(e) => warn!("Failed to process {}: {}", video_path.display(), e),
            }
        }

        Ok(())
    }

    async fn process_video_file(
        &self,
        video_path: &Path,
        output_dir: &Path,
        stream_index: usize,
    ) -> Result<PathBuf> {
        let video_stem = video_path
            .file_stem()
            .ok_or_else(|| AniburnError::Config("Invalid video filename".to_string()))?
            .to_string_lossy();

        // Step 1: Probe duration and stream layout
        let probe = self.media.probe(video_path).await?;
        if probe.subtitle_streams.len() <= stream_index {
            return Err(AniburnError::Media(format!(
                "No subtitle stream {} in {} ({} present)",
                stream_index,
                video_path.display(),
                probe.subtitle_streams.len()
            )));
        }

        // Step 2: Extract the embedded subtitle
        let subtitle_path = output_dir.join(format!(
            "{}_extracted_{}.ass",
            video_stem,
            Uuid::new_v4().simple()
        ));
        self.media
            .extract_subtitle(video_path, stream_index, &subtitle_path)
            .await?;

        // Step 3: Strip advertising/credit injections
        self.clean_subtitle(&subtitle_path, probe.duration).await?;

        // Step 4: Translate dialogue in place
        self.translate_subtitle(&subtitle_path).await?;

        // Step 5: Branding cues and header rewrite
        self.brand_subtitle(&subtitle_path, probe.duration).await?;

        // Step 6: Burn the finished subtitle into the video
        let output_path = output_dir.join(format!(
            "{}_{}.mkv",
            video_stem, self.config.translate.target_lang
        ));
        self.media
            .hardcode_subtitle(video_path, &subtitle_path, &output_path)
            .await?;

        Ok(output_path)
    }

    /// Probe a media file's container duration
    pub async fn probe_duration<P: AsRef<Path>>(&self, media_path: P) -> Result<f64> {
        Ok(self.media.probe(media_path.as_ref()).await?.duration)
    }

    /// Extract a subtitle stream without further processing
    pub async fn extract_subtitle<P: AsRef<Path>>(
        &self,
        input_path: P,
        stream_index: usize,
        output_path: P,
    ) -> Result<()> {
        self.media
            .extract_subtitle(input_path.as_ref(), stream_index, output_path.as_ref())
            .await
    }

    /// Run the sanitizer over a subtitle document on disk. The media path
    /// supplies the duration bound for anomalous timing.
    pub async fn clean_subtitle<P: AsRef<Path>>(
        &self,
        subtitle_path: P,
        media_duration: f64,
    ) -> Result<usize> {
        let mut doc = SubtitleDocument::load(subtitle_path).await?;
        let sanitizer = Sanitizer::new(&self.config.sanitize, media_duration);
        let removed = sanitizer.run(&mut doc)?;
        doc.save().await?;
        Ok(removed)
    }

    /// Translate every dialogue line of a subtitle document on disk
    pub async fn translate_subtitle<P: AsRef<Path>>(&self, subtitle_path: P) -> Result<()> {
        let mut doc = SubtitleDocument::load(subtitle_path).await?;
        let pass = TranslationPass::new(&self.config.translate);
        pass.translate_document(&mut doc, &self.cancel).await?;
        doc.save().await
    }

    /// Insert branding cues and rewrite the header of a subtitle document
    pub async fn brand_subtitle<P: AsRef<Path>>(
        &self,
        subtitle_path: P,
        media_duration: f64,
    ) -> Result<()> {
        let font_path = Path::new(&self.config.branding.font_path);
        if !font_path.exists() {
            return Err(AniburnError::FileNotFound(font_path.display().to_string()));
        }

        let mut doc = SubtitleDocument::load(subtitle_path).await?;
        BrandingEngine::new(&self.config.branding, media_duration).apply_cues(&mut doc)?;
        HeaderRewriter::new(&self.config.branding).rewrite(&mut doc)?;
        doc.save().await
    }

    /// Shift all dialogue timing in a subtitle document on disk
    pub async fn shift_subtitle<P: AsRef<Path>>(
        &self,
        subtitle_path: P,
        offset_secs: f64,
    ) -> Result<usize> {
        let mut doc = SubtitleDocument::load(subtitle_path).await?;
        let shifted = shift_document(&mut doc, offset_secs);
        doc.save().await?;
        Ok(shifted)
    }

    /// Soft-mux a finished subtitle into a video container
    pub async fn embed_subtitles<P: AsRef<Path>>(
        &self,
        video_path: P,
        subtitle_path: P,
        output_path: P,
    ) -> Result<()> {
        self.media
            .embed_subtitles(
                video_path.as_ref(),
                subtitle_path.as_ref(),
                &self.config.translate.target_lang,
                output_path.as_ref(),
            )
            .await
    }
}

fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
