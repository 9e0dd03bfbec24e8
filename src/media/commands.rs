use std::path::Path;
use std::process::Command;
use tracing::debug;

use crate::error::{Result, AniburnError};

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set subtitle codec
    pub fn subtitle_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:s").arg(codec)
    }

    /// Copy video stream
    pub fn copy_video(self) -> Self {
        self.arg("-c:v").arg("copy")
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.arg("-c:a").arg("copy")
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    /// Select a stream by mapping specifier
    pub fn map<S: Into<String>>(self, specifier: S) -> Self {
        self.arg("-map").arg(specifier)
    }

    /// Execute the command, discarding output
    pub fn execute(&self) -> Result<()> {
        self.execute_capture().map(|_| ())
    }

    /// Execute the command and return its stdout
    pub fn execute_capture(&self) -> Result<String> {
        debug!(
            "Executing media processing command: {} {:?}",
            self.binary_path, self.args
        );
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .map_err(|e| AniburnError::Media(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AniburnError::Media(format!(
                "{} failed: {}",
                self.description, stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Builder for the pipeline's media operations
pub struct MediaCommandBuilder {
    binary_path: String,
    probe_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, probe_path: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            probe_path: probe_path.into(),
        }
    }

    /// Build stream/duration probe command (ffprobe, JSON output)
    pub fn probe<P: AsRef<Path>>(&self, media_path: P) -> MediaCommand {
        MediaCommand::new(&self.probe_path, "Media probe")
            .arg("-v")
            .arg("quiet")
            .arg("-print_format")
            .arg("json")
            .arg("-show_format")
            .arg("-show_streams")
            .output(media_path)
    }

    /// Build subtitle extraction command for the n-th subtitle stream
    pub fn extract_subtitle<P: AsRef<Path>>(
        &self,
        media_path: P,
        stream_index: usize,
        output_path: P,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Subtitle extraction")
            .overwrite()
            .arg("-sub_charenc")
            .arg("UTF-8")
            .input(media_path)
            .map(format!("0:s:{}", stream_index))
            .subtitle_codec("ass")
            .output(output_path)
    }

    /// Build soft-mux command adding a subtitle as the default track
    pub fn embed_subtitles<P: AsRef<Path>>(
        &self,
        video_path: P,
        subtitle_path: P,
        track_title: &str,
        output_path: P,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Subtitle embedding")
            .overwrite()
            .input(video_path)
            .input(subtitle_path)
            .map("0")
            .map("1:0")
            .copy_video()
            .copy_audio()
            .subtitle_codec("ass")
            .arg("-metadata:s:s:0")
            .arg(format!("title={}", track_title))
            .arg("-disposition:s:s:0")
            .arg("default")
            .output(output_path)
    }

    /// Build burn-in command rendering the subtitle into the video stream
    pub fn hardcode_subtitle<P: AsRef<Path>>(
        &self,
        video_path: P,
        subtitle_path: P,
        fonts_dir: &str,
        encode_options: &[String],
        output_path: P,
    ) -> MediaCommand {
        let mut cmd = MediaCommand::new(&self.binary_path, "Subtitle burn-in")
            .overwrite()
            .input(&video_path)
            .video_filter(format!(
                "subtitles={}:fontsdir={}",
                subtitle_path.as_ref().display(),
                fonts_dir
            ))
            .copy_audio();

        // Add user-specified additional options
        for option in encode_options {
            cmd = cmd.arg(option);
        }

        cmd.output(output_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_subtitle_maps_requested_stream() {
        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe");
        let cmd = builder.extract_subtitle("in.mkv", 2, "out.ass");

        assert_eq!(cmd.binary_path, "ffmpeg");
        let args = cmd.args.join(" ");
        assert!(args.contains("-map 0:s:2"));
        assert!(args.contains("-c:s ass"));
        assert!(args.ends_with("out.ass"));
    }

    #[test]
    fn test_embed_marks_track_default() {
        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe");
        let cmd = builder.embed_subtitles("in.mkv", "subs.ass", "Persian", "out.mkv");

        let args = cmd.args.join(" ");
        assert!(args.contains("title=Persian"));
        assert!(args.contains("-disposition:s:s:0 default"));
        assert!(args.contains("-c:v copy"));
    }

    #[test]
    fn test_hardcode_appends_encode_options() {
        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe");
        let options = vec!["-crf".to_string(), "23".to_string()];
        let cmd = builder.hardcode_subtitle("in.mkv", "subs.ass", "assets", &options, "out.mkv");

        let args = cmd.args.join(" ");
        assert!(args.contains("subtitles=subs.ass:fontsdir=assets"));
        assert!(args.contains("-crf 23"));
    }

    #[test]
    fn test_probe_uses_probe_binary() {
        let builder = MediaCommandBuilder::new("ffmpeg", "ffprobe");
        let cmd = builder.probe("in.mkv");
        assert_eq!(cmd.binary_path, "ffprobe");
        assert!(cmd.args.join(" ").contains("-show_streams"));
    }
}
