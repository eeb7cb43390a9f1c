// Downloader abstraction
//
// The pipeline only talks to the `Downloader` trait; `yt_dlp` is the one
// implementation and shells out to the yt-dlp executable.

pub mod yt_dlp;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use yt_dlp::YtDlpDownloader;

use crate::config::DownloaderConfig;
use crate::error::Result;
use crate::job::VideoQuality;

/// Metadata about the remote video, fetched before downloading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    pub uploader: String,
    pub thumbnail: String,
    /// Seconds; 0 when unknown
    pub duration: f64,
}

/// Main trait for fetching remote media
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Fetch title and other metadata without downloading
    async fn probe(&self, url: &str) -> Result<VideoInfo>;

    /// Download video+audio merged into an MP4 at `output_path`
    async fn download_video(
        &self,
        url: &str,
        quality: VideoQuality,
        output_path: &Path,
    ) -> Result<PathBuf>;

    /// Download the audio track as MP3; returns `<output_stem>.mp3`
    async fn download_audio(&self, url: &str, output_stem: &Path) -> Result<PathBuf>;

    /// Version line of the underlying tool
    async fn check_availability(&self) -> Result<String>;
}

/// Factory for creating downloader instances
pub struct DownloaderFactory;

impl DownloaderFactory {
    pub fn create_downloader(config: DownloaderConfig) -> Box<dyn Downloader> {
        Box::new(YtDlpDownloader::new(config))
    }
}
