use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::config::TranslateConfig;
use crate::dialogue::{dialogue_text_pattern, extract_dialogues, parse_line_timing, DialogueRecord};
use crate::document::SubtitleDocument;
use crate::error::{Result, AniburnError};
use crate::workflow::CancelToken;
use super::reflow::{reflow, SOFT_BREAK};
use super::{ProviderFactory, TranslationProvider};

/// Sentinel marker pair delimiting the line under translation inside its
/// context string. Chosen not to collide with literal source text.
pub const SENTINEL: &str = "[~]";

static MARKED_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[~\](.*?)\[~\]").unwrap());

/// Context-aware machine translation over one document.
///
/// Each dialogue is submitted wrapped in sentinel markers together with its
/// neighbour texts; failures fall back from the primary provider to the
/// secondary and finally to a fixed placeholder, so a single bad line never
/// aborts the batch.
pub struct TranslationPass<'a> {
    config: &'a TranslateConfig,
    primary: Box<dyn TranslationProvider>,
    fallback: Box<dyn TranslationProvider>,
}

impl<'a> TranslationPass<'a> {
    pub fn new(config: &'a TranslateConfig) -> Self {
        let (primary, fallback) = ProviderFactory::create_pair(config);
        Self::with_providers(config, primary, fallback)
    }

    pub fn with_providers(
        config: &'a TranslateConfig,
        primary: Box<dyn TranslationProvider>,
        fallback: Box<dyn TranslationProvider>,
    ) -> Self {
        Self {
            config,
            primary,
            fallback,
        }
    }

    /// Translate every dialogue line in place, leaving all other fields and
    /// lines untouched.
    pub async fn translate_document(
        &self,
        doc: &mut SubtitleDocument,
        cancel: &CancelToken,
    ) -> Result<()> {
        let schema = doc.events_schema()?;
        let mut records = extract_dialogues(
            doc,
            schema,
            self.config.context_before,
            self.config.context_after,
        );
        let text_pattern = dialogue_text_pattern(schema);
        let prefix_pattern = Regex::new(&format!(
            r"^(Dialogue: (?:[^,]*,){{{}}})",
            schema.text_field
        ))
        .expect("dialogue prefix pattern construction");

        let total = records.len();
        info!(
            "Translating {} dialogues {} -> {}",
            total, self.config.source_lang, self.config.target_lang
        );

        let progress = ProgressBar::new(total as u64);
        progress.set_style(
            ProgressStyle::with_template("{msg} {pos}/{len} [{bar:40}]")
                .expect("progress template")
                .progress_chars("=> "),
        );
        progress.set_message("Translating");

        let mut new_lines = Vec::with_capacity(doc.lines().len());
        let mut dialogue_index = 0usize;
        let mut cancelled = false;

        for line in doc.lines() {
            // Mirror the extractor's record criteria so records and lines
            // stay aligned even around malformed entries
            let is_dialogue = line.starts_with("Dialogue:")
                && text_pattern.is_match(line)
                && parse_line_timing(line).is_some();

            if !is_dialogue || cancelled || dialogue_index >= records.len() {
                new_lines.push(line.clone());
                continue;
            }

            if cancel.is_cancelled() {
                warn!("Translation cancelled, remaining lines left untranslated");
                cancelled = true;
                new_lines.push(line.clone());
                continue;
            }

            let translated = self.translate_record(&records[dialogue_index]).await;
            let record = &mut records[dialogue_index];
            record.translated = translated;
            dialogue_index += 1;

            let text = record
                .final_text()
                .replace(SOFT_BREAK, r"\N");

            let prefix = prefix_pattern
                .captures(line)
                .map(|c| c[1].to_string())
                .unwrap_or_else(|| line.clone());
            new_lines.push(format!("{}{}", prefix, text));

            progress.inc(1);
            info!("{}/{}", dialogue_index, total);
        }

        progress.finish_and_clear();
        doc.replace_lines(new_lines);
        Ok(())
    }

    /// Primary attempt, one fallback attempt, then the placeholder. Never
    /// errors: a translation failure for one line must not abort the batch.
    async fn translate_record(&self, record: &DialogueRecord) -> String {
        let context = build_context(record);

        match self.attempt(self.primary.as_ref(), &context).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "Provider '{}' failed ({}), retrying with '{}'",
                    self.primary.name(),
                    e,
                    self.fallback.name()
                );
                match self.attempt(self.fallback.as_ref(), &context).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(
                            "Provider '{}' failed ({}), substituting placeholder",
                            self.fallback.name(),
                            e
                        );
                        self.config.placeholder.clone()
                    }
                }
            }
        }
    }

    async fn attempt(&self, provider: &dyn TranslationProvider, context: &str) -> Result<String> {
        let raw = provider
            .translate(context, &self.config.source_lang, &self.config.target_lang)
            .await?;
        let target = extract_marked(&raw)?;
        Ok(reflow(target.trim()))
    }
}

/// Concatenate the context window around the sentinel-wrapped target text.
/// Break markers are flattened to spaces for the provider's benefit.
fn build_context(record: &DialogueRecord) -> String {
    let mut parts = Vec::with_capacity(record.before.len() + record.after.len() + 1);
    parts.extend(record.before.iter().map(|t| flatten_breaks(t)));
    parts.push(format!(
        "{}{}{}",
        SENTINEL,
        flatten_breaks(&record.source),
        SENTINEL
    ));
    parts.extend(record.after.iter().map(|t| flatten_breaks(t)));
    parts.join(" ")
}

fn flatten_breaks(text: &str) -> String {
    text.replace(r"\N", " ")
}

/// The translated context words around the markers are translation artifacts;
/// only the text between the sentinel pair is kept.
fn extract_marked(translated: &str) -> Result<&str> {
    MARKED_TEXT
        .captures(translated)
        .map(|c| c.get(1).expect("capture group").as_str())
        .ok_or_else(|| AniburnError::MarkerExtraction(translated.to_string()))
}
