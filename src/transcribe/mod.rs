// Transcription abstraction
//
// `Transcriber` turns a media file into a source-language SRT file.
// `whisper` wraps the openai-whisper command line tool.

pub mod whisper;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use whisper::WhisperTranscriber;

use crate::config::TranscriberConfig;
use crate::error::Result;

/// Main trait for transcription operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe `media_path` into an SRT file inside `output_dir` and
    /// return its path
    async fn transcribe(
        &self,
        media_path: &Path,
        model: &str,
        language: &str,
        output_dir: &Path,
    ) -> Result<PathBuf>;

    /// Check the transcriber can be run
    async fn check_availability(&self) -> Result<String>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create_transcriber(config: TranscriberConfig) -> Box<dyn Transcriber> {
        Box::new(WhisperTranscriber::new(config))
    }
}
