//! AniBurn - Automated Fansub Re-branding Workflow
//!
//! A Rust implementation of a fansub processing pipeline: extracting
//! embedded subtitles, stripping injected advertising, machine-translating
//! dialogue with provider fallback, re-branding with studio credits and
//! burning the result back into the video via ffmpeg.

pub mod branding;
pub mod cli;
pub mod config;
pub mod dialogue;
pub mod document;
pub mod error;
pub mod header;
pub mod media;
pub mod sanitize;
pub mod translate;
pub mod workflow;
