//! AniBurn - Automated Fansub Re-branding Workflow
//!
//! This is the main entry point for the AniBurn application, which extracts
//! embedded subtitles from fan-subtitled releases, strips injected
//! advertising, machine-translates the dialogue, re-brands the subtitle with
//! studio credits and burns the result back into the video using ffmpeg.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use aniburn::cli::{Args, Commands};
use aniburn::config::Config;
use aniburn::error::AniburnError;
use aniburn::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    info!("Starting AniBurn - Automated Fansub Re-branding Workflow");

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    // Create workflow instance
    let workflow = Workflow::new(config)?;

    // Cancel cooperatively on Ctrl-C; the flag is checked between
    // documents and lines
    let cancel = workflow.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing the current call then stopping");
            cancel.cancel();
        }
    });

    // Execute command
    match args.command {
        Commands::Process {
            input,
            stream_index,
            output_dir,
        } => {
            info!("Processing video file: {}", input.display());
            let output = workflow
                .process_single_file(&input, stream_index, output_dir.as_ref())
                .await?;
            println!("Finished: {}", output.display());
        }
        Commands::Batch {
            input_dir,
            stream_index,
            output_dir,
        } => {
            info!("Processing directory: {}", input_dir.display());
            workflow
                .process_directory(&input_dir, stream_index, output_dir.as_ref())
                .await?;
        }
        Commands::Extract {
            input,
            output,
            stream_index,
        } => {
            info!("Extracting subtitle from: {}", input.display());
            workflow
                .extract_subtitle(&input, stream_index, &output)
                .await?;
        }
        Commands::Clean {
            subtitle,
            duration,
            media,
        } => {
            info!("Cleaning subtitle file: {}", subtitle.display());
            let duration = resolve_duration(&workflow, duration, media).await?;
            let removed = workflow.clean_subtitle(&subtitle, duration).await?;
            println!("Removed {} line(s)", removed);
        }
        Commands::Translate { subtitle } => {
            info!("Translating subtitle file: {}", subtitle.display());
            workflow.translate_subtitle(&subtitle).await?;
        }
        Commands::Brand {
            subtitle,
            duration,
            media,
        } => {
            info!("Branding subtitle file: {}", subtitle.display());
            let duration = resolve_duration(&workflow, duration, media).await?;
            workflow.brand_subtitle(&subtitle, duration).await?;
        }
        Commands::Shift { subtitle, seconds } => {
            info!("Shifting subtitle file: {}", subtitle.display());
            let shifted = workflow.shift_subtitle(&subtitle, seconds).await?;
            println!("Shifted {} line(s)", shifted);
        }
        Commands::Embed {
            video,
            subtitles,
            output,
        } => {
            info!("Embedding subtitles into video: {}", video.display());
            workflow.embed_subtitles(&video, &subtitles, &output).await?;
        }
    }

    info!("AniBurn workflow completed successfully");
    Ok(())
}

/// Duration for subtitle-only commands: an explicit value wins, otherwise a
/// media file is probed.
async fn resolve_duration(
    workflow: &Workflow,
    duration: Option<f64>,
    media: Option<PathBuf>,
) -> Result<f64> {
    match (duration, media) {
        (Some(secs), _) => Ok(secs),
        (None, Some(media_path)) => Ok(workflow.probe_duration(&media_path).await?),
        (None, None) => Err(AniburnError::Config(
            "Either --duration or --media is required".to_string(),
        )
        .into()),
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let aniburn_dir = std::env::current_dir()?.join(".aniburn");
    let log_dir = aniburn_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "aniburn.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    // Initialize the subscriber
    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("aniburn.log").display()
    );

    Ok(())
}
