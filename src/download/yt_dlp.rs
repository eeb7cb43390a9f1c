use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::command::ToolCommand;
use crate::config::DownloaderConfig;
use crate::error::{Result, SetmError};
use crate::job::VideoQuality;
use crate::progress::{percent_bar, to_position};
use super::{Downloader, VideoInfo};

/// Subset of `yt-dlp -J` output we care about
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    title: Option<String>,
    uploader: Option<String>,
    thumbnail: Option<String>,
    duration: Option<f64>,
}

impl From<YtDlpInfo> for VideoInfo {
    fn from(info: YtDlpInfo) -> Self {
        Self {
            title: info.title.unwrap_or_else(|| "Unknown Title".to_string()),
            uploader: info.uploader.unwrap_or_else(|| "Unknown Uploader".to_string()),
            thumbnail: info.thumbnail.unwrap_or_default(),
            duration: info.duration.unwrap_or(0.0),
        }
    }
}

pub fn parse_video_info(json: &str) -> Result<VideoInfo> {
    let info: YtDlpInfo = serde_json::from_str(json)?;
    Ok(info.into())
}

/// Percentage from a `[download]  42.3% of ...` progress line.
pub fn parse_download_progress(line: &str) -> Option<f64> {
    static PROGRESS: OnceLock<Option<Regex>> = OnceLock::new();
    let re = PROGRESS
        .get_or_init(|| Regex::new(r"^\[download\]\s+(\d+(?:\.\d+)?)%").ok())
        .as_ref()?;
    re.captures(line)?.get(1)?.as_str().parse().ok()
}

/// yt-dlp treats `-o` as a printf-style template; literal `%` must be doubled.
fn output_template(path: &Path) -> String {
    path.to_string_lossy().replace('%', "%%")
}

fn with_appended_extension(stem: &Path, ext: &str) -> PathBuf {
    let mut name = OsString::from(stem.as_os_str());
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// yt-dlp backed downloader
pub struct YtDlpDownloader {
    config: DownloaderConfig,
}

impl YtDlpDownloader {
    pub fn new(config: DownloaderConfig) -> Self {
        Self { config }
    }

    fn command<S: Into<String>>(&self, description: S) -> ToolCommand {
        ToolCommand::new(&self.config.binary_path, description)
    }

    fn video_command(&self, url: &str, quality: VideoQuality, output_path: &Path) -> ToolCommand {
        self.command("Video download")
            .arg("-f")
            .arg(quality.format_selector())
            .args(["--merge-output-format", "mp4", "--no-playlist", "--newline"])
            .arg("-o")
            .arg(output_template(output_path))
            .args(["--", url])
    }

    fn audio_command(&self, url: &str, output_stem: &Path) -> ToolCommand {
        self.command("Audio download")
            .args(["-f", "bestaudio/best", "-x", "--audio-format", "mp3"])
            .arg("--audio-quality")
            .arg(&self.config.audio_quality)
            .args(["--no-playlist", "--newline"])
            .arg("-o")
            .arg(format!("{}.%(ext)s", output_template(output_stem)))
            .args(["--", url])
    }

    async fn run_with_progress(&self, command: ToolCommand, label: &str) -> Result<()> {
        let pb = percent_bar(label);
        let result = command
            .execute_streaming(|line| {
                if let Some(percent) = parse_download_progress(line) {
                    pb.set_position(to_position(percent));
                } else if !line.is_empty() {
                    debug!("{}", line);
                }
            })
            .await;

        match &result {
            Ok(()) => pb.finish_with_message("done"),
            Err(_) => pb.abandon_with_message("failed"),
        }
        result
    }
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    async fn probe(&self, url: &str) -> Result<VideoInfo> {
        info!("Getting info for URL: {}", url);

        let output = self
            .command("Video info")
            .args(["-J", "--no-playlist", "--no-warnings", "--", url])
            .execute()
            .await?;

        let info = parse_video_info(&output.stdout)?;
        info!("Title: {} | Uploader: {} | Duration: {:.0}s", info.title, info.uploader, info.duration);
        Ok(info)
    }

    async fn download_video(
        &self,
        url: &str,
        quality: VideoQuality,
        output_path: &Path,
    ) -> Result<PathBuf> {
        info!("Downloading video ({}) to {}", quality, output_path.display());

        let command = self.video_command(url, quality, output_path);
        self.run_with_progress(command, "download").await?;

        if !output_path.exists() {
            return Err(SetmError::MissingArtifact(output_path.display().to_string()));
        }
        Ok(output_path.to_path_buf())
    }

    async fn download_audio(&self, url: &str, output_stem: &Path) -> Result<PathBuf> {
        let output_path = with_appended_extension(output_stem, "mp3");
        info!("Downloading audio (MP3) to {}", output_path.display());

        let command = self.audio_command(url, output_stem);
        self.run_with_progress(command, "download").await?;

        if !output_path.exists() {
            return Err(SetmError::MissingArtifact(output_path.display().to_string()));
        }
        Ok(output_path)
    }

    async fn check_availability(&self) -> Result<String> {
        self.command("Version check").arg("--version").version_line().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_info_defaults() {
        let info = parse_video_info(r#"{"title": "Talk", "duration": 12.5, "formats": []}"#).unwrap();
        assert_eq!(info.title, "Talk");
        assert_eq!(info.uploader, "Unknown Uploader");
        assert_eq!(info.thumbnail, "");
        assert_eq!(info.duration, 12.5);

        let info = parse_video_info(r#"{"title": null, "duration": null}"#).unwrap();
        assert_eq!(info.title, "Unknown Title");
        assert_eq!(info.duration, 0.0);
    }

    #[test]
    fn test_parse_download_progress() {
        assert_eq!(
            parse_download_progress("[download]  42.3% of ~ 10.00MiB at 1.00MiB/s ETA 00:05"),
            Some(42.3)
        );
        assert_eq!(parse_download_progress("[download] 100% of 10.00MiB"), Some(100.0));
        assert_eq!(parse_download_progress("[download] Destination: a.mp4"), None);
        assert_eq!(parse_download_progress("[Merger] Merging formats"), None);
    }

    #[test]
    fn test_video_command_arguments() {
        let downloader = YtDlpDownloader::new(DownloaderConfig::default());
        let cmd = downloader.video_command(
            "https://youtu.be/abc",
            VideoQuality::P480,
            Path::new("/work/100% Real.mp4"),
        );

        assert_eq!(cmd.binary_path, "yt-dlp");
        assert_eq!(
            cmd.args,
            vec![
                "-f",
                "bv[height<=480]+ba/b[height<=480]",
                "--merge-output-format",
                "mp4",
                "--no-playlist",
                "--newline",
                "-o",
                "/work/100%% Real.mp4",
                "--",
                "https://youtu.be/abc",
            ]
        );
    }

    #[test]
    fn test_dash_url_is_not_an_option() {
        let downloader = YtDlpDownloader::new(DownloaderConfig::default());
        let cmd = downloader.video_command("-U", VideoQuality::Best, Path::new("/work/a.mp4"));
        assert_eq!(cmd.args[cmd.args.len() - 2..], ["--", "-U"]);
    }

    #[test]
    fn test_audio_command_and_output_name() {
        let downloader = YtDlpDownloader::new(DownloaderConfig::default());
        let cmd = downloader.audio_command("https://youtu.be/abc", Path::new("/work/Mr. Song"));

        assert!(cmd.args.windows(2).any(|w| w == ["--audio-format", "mp3"]));
        assert!(cmd.args.windows(2).any(|w| w == ["--audio-quality", "192K"]));
        assert!(cmd.args.contains(&"/work/Mr. Song.%(ext)s".to_string()));
        assert_eq!(cmd.args[cmd.args.len() - 2..], ["--", "https://youtu.be/abc"]);
        assert_eq!(
            with_appended_extension(Path::new("/work/Mr. Song"), "mp3"),
            PathBuf::from("/work/Mr. Song.mp3")
        );
    }
}
