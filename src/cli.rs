use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process a single video file end-to-end
    Process {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Subtitle stream to extract (by subtitle-stream order)
        #[arg(short, long, default_value = "0")]
        stream_index: usize,

        /// Output directory for processed files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Process all video files in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Subtitle stream to extract (by subtitle-stream order)
        #[arg(short, long, default_value = "0")]
        stream_index: usize,

        /// Output directory for processed files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Extract an embedded subtitle stream from a video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output subtitle file
        #[arg(short, long)]
        output: PathBuf,

        /// Subtitle stream to extract (by subtitle-stream order)
        #[arg(short, long, default_value = "0")]
        stream_index: usize,
    },

    /// Strip advertising and credit injections from a subtitle file
    Clean {
        /// Subtitle file to clean in place
        #[arg(short, long)]
        subtitle: PathBuf,

        /// Media duration in seconds, bounding valid dialogue timing
        #[arg(short, long)]
        duration: Option<f64>,

        /// Media file to probe for the duration instead
        #[arg(short, long)]
        media: Option<PathBuf>,
    },

    /// Machine-translate all dialogue in a subtitle file
    Translate {
        /// Subtitle file to translate in place
        #[arg(short, long)]
        subtitle: PathBuf,
    },

    /// Insert branding cues and rewrite the subtitle header
    Brand {
        /// Subtitle file to brand in place
        #[arg(short, long)]
        subtitle: PathBuf,

        /// Media duration in seconds, used for gap detection
        #[arg(short, long)]
        duration: Option<f64>,

        /// Media file to probe for the duration instead
        #[arg(short, long)]
        media: Option<PathBuf>,
    },

    /// Shift all dialogue timing by a signed offset
    Shift {
        /// Subtitle file to shift in place
        #[arg(short, long)]
        subtitle: PathBuf,

        /// Offset in seconds; positive shifts forward, negative backward
        #[arg(long, allow_hyphen_values = true)]
        seconds: f64,
    },

    /// Embed a finished subtitle into a video container
    Embed {
        /// Input video file
        #[arg(short, long)]
        video: PathBuf,

        /// Subtitle file
        #[arg(short, long)]
        subtitles: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,
    },
}
