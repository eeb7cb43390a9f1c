use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SetmError};
use crate::job::VideoQuality;

/// Environment variable that overrides `translate.api_key`.
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub downloader: DownloaderConfig,
    pub transcriber: TranscriberConfig,
    pub translate: TranslateConfig,
    pub media: MediaConfig,
    pub output: OutputConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderConfig {
    /// Path to the yt-dlp binary
    pub binary_path: String,
    /// Default video quality when none is given on the command line
    pub quality: VideoQuality,
    /// MP3 bitrate for audio-only downloads
    pub audio_quality: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Path to the openai-whisper command line tool
    pub binary_path: String,
    /// Whisper model name (tiny, small, medium, ...)
    pub model: String,
    /// Spoken language of the source video
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Base URL of the chat-completions API
    pub endpoint: String,
    /// Model used for translation
    pub model: String,
    /// API key; the DEEPSEEK_API_KEY environment variable takes precedence
    pub api_key: Option<String>,
    /// Human readable name of the target language, used in the prompt
    pub target_language: String,
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary
    pub probe_path: String,
    pub video_codec: String,
    /// x264 preset used when burning in subtitles
    pub preset: String,
    /// CRF used when the source bitrate cannot be detected
    pub fallback_crf: u32,
    /// Additional ffmpeg options appended before the output file
    pub subtitle_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where final files go when --output-dir is not given
    pub directory: PathBuf,
    /// Keep the per-job working directory with intermediate files
    pub keep_intermediates: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub path: PathBuf,
    /// Number of records shown by `history list` by default
    pub limit: usize,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            binary_path: "yt-dlp".to_string(),
            quality: VideoQuality::Best,
            audio_quality: "192K".to_string(),
        }
    }
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            binary_path: "whisper".to_string(),
            model: "small".to_string(),
            language: "en".to_string(),
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            api_key: None,
            target_language: "simplified Chinese".to_string(),
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            probe_path: "ffprobe".to_string(),
            video_codec: "libx264".to_string(),
            preset: "medium".to_string(),
            fallback_crf: 23,
            subtitle_options: vec![
                // Example encoding options users can add:
                // "-pix_fmt".to_string(), "yuv420p".to_string(),
                // "-movflags".to_string(), "+faststart".to_string(),
            ],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            keep_intermediates: false,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".setm/history.json"),
            limit: 50,
        }
    }
}

impl TranslateConfig {
    /// API key from the environment, falling back to the config file.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .or_else(|| self.api_key.clone())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SetmError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SetmError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SetmError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SetmError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
