// OpenAI Whisper command line implementation

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::command::ToolCommand;
use crate::config::TranscriberConfig;
use crate::error::{Result, SetmError};
use super::Transcriber;

pub struct WhisperTranscriber {
    config: TranscriberConfig,
}

impl WhisperTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    fn build_command(
        &self,
        media_path: &Path,
        model: &str,
        language: &str,
        output_dir: &Path,
    ) -> ToolCommand {
        // Media path goes after `--` so a name starting with `-` is not an option.
        ToolCommand::new(&self.config.binary_path, "Whisper transcription")
            .arg("--model")
            .arg(model)
            .arg("--language")
            .arg(language)
            .args(["--output_format", "srt"])
            .arg("--output_dir")
            .path_arg(output_dir)
            .arg("--")
            .path_arg(media_path)
    }
}

/// whisper names its output after the input file stem.
pub fn expected_srt_path(media_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let stem = media_path
        .file_stem()
        .ok_or_else(|| SetmError::Config(format!("Invalid media filename: {}", media_path.display())))?;
    let mut name = stem.to_os_string();
    name.push(".srt");
    Ok(output_dir.join(name))
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(
        &self,
        media_path: &Path,
        model: &str,
        language: &str,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        info!(
            "Transcribing {} with whisper model '{}' (language: {}). This may take a while.",
            media_path.display(),
            model,
            language
        );

        let srt_path = expected_srt_path(media_path, output_dir)?;

        self.build_command(media_path, model, language, output_dir)
            .execute_streaming(|line| {
                if !line.is_empty() {
                    debug!("{}", line);
                }
            })
            .await?;

        if !srt_path.exists() {
            return Err(SetmError::MissingArtifact(srt_path.display().to_string()));
        }

        info!("Transcription written to {}", srt_path.display());
        Ok(srt_path)
    }

    async fn check_availability(&self) -> Result<String> {
        ToolCommand::new(&self.config.binary_path, "Whisper check")
            .arg("--help")
            .execute()
            .await?;
        Ok("openai-whisper".to_string())
    }
}
