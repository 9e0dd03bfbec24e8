// Modular translation architecture
//
// Providers are interchangeable remote backends behind a common trait; the
// pipeline drives one document through primary/fallback translation with
// context windows and line reflow.

pub mod pipeline;
pub mod providers;
pub mod reflow;

use async_trait::async_trait;

pub use pipeline::TranslationPass;

use crate::config::TranslateConfig;
use crate::error::Result;

/// Main trait for remote translation backends
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &'static str;

    /// Translate `text` between the given language codes
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;
}

/// Factory for the primary/fallback provider pair
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_pair(
        config: &TranslateConfig,
    ) -> (Box<dyn TranslationProvider>, Box<dyn TranslationProvider>) {
        (
            Box::new(providers::GoogleWebTranslator::new(config.timeout_secs)),
            Box::new(providers::MyMemoryTranslator::new(config.timeout_secs)),
        )
    }
}
