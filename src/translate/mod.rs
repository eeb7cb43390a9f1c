// Translation architecture
//
// - `TextTranslator`: translates one piece of text; the seam the pipeline mocks
// - `deepseek`: chat-completions client for the DeepSeek API
// - `srt`: applies a `TextTranslator` cue by cue to an SRT file

pub mod deepseek;
pub mod srt;

use async_trait::async_trait;

pub use deepseek::DeepSeekTranslator;
pub use srt::{translate_cues, translate_srt_file, TranslationReport};

use crate::config::TranslateConfig;
use crate::error::Result;

/// Main trait for translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextTranslator: Send + Sync {
    /// Translate a single subtitle text into the configured target language
    async fn translate_text(&self, text: &str) -> Result<String>;

    /// Verify the translator is usable (credentials present, endpoint set)
    fn check_availability(&self) -> Result<()>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    pub fn create_translator(config: TranslateConfig) -> Result<Box<dyn TextTranslator>> {
        Ok(Box::new(DeepSeekTranslator::new(config)?))
    }
}
