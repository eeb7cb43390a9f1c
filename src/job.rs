//! Per-invocation job description and the artifacts each stage produces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::SetmError;

/// Pipeline stages in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Probe,
    Download,
    Transcribe,
    Translate,
    Mux,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Probe => "probe",
            Self::Download => "download",
            Self::Transcribe => "transcribe",
            Self::Translate => "translate",
            Self::Mux => "mux",
        }
    }

    /// Stages a job of the given mode goes through.
    pub fn sequence(mode: JobMode) -> &'static [Stage] {
        match mode {
            JobMode::Video => &[
                Stage::Probe,
                Stage::Download,
                Stage::Transcribe,
                Stage::Translate,
                Stage::Mux,
            ],
            JobMode::Audio => &[Stage::Probe, Stage::Download],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobMode {
    /// Download, transcribe, translate and burn in subtitles
    Video,
    /// Download the audio track as MP3 only
    Audio,
}

impl fmt::Display for JobMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

impl FromStr for JobMode {
    type Err = SetmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" | "v" => Ok(Self::Video),
            "audio" | "a" | "mp3" => Ok(Self::Audio),
            _ => Err(SetmError::Config(format!(
                "Invalid mode '{}'. Valid modes: video, audio",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VideoQuality {
    #[default]
    #[serde(rename = "best")]
    Best,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
}

impl VideoQuality {
    /// yt-dlp format selector for this quality.
    pub fn format_selector(&self) -> String {
        match self.max_height() {
            None => "bv*+ba/b".to_string(),
            Some(h) => format!("bv[height<={h}]+ba/b[height<={h}]"),
        }
    }

    fn max_height(&self) -> Option<u32> {
        match self {
            Self::Best => None,
            Self::P1080 => Some(1080),
            Self::P720 => Some(720),
            Self::P480 => Some(480),
        }
    }
}

impl fmt::Display for VideoQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Best => f.write_str("best"),
            Self::P1080 => f.write_str("1080p"),
            Self::P720 => f.write_str("720p"),
            Self::P480 => f.write_str("480p"),
        }
    }
}

impl FromStr for VideoQuality {
    type Err = SetmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "best" => Ok(Self::Best),
            "1080p" | "1080" => Ok(Self::P1080),
            "720p" | "720" => Ok(Self::P720),
            "480p" | "480" => Ok(Self::P480),
            _ => Err(SetmError::Config(format!(
                "Invalid quality '{}'. Valid qualities: best, 1080p, 720p, 480p",
                s
            ))),
        }
    }
}

/// Options the user picked for a single run.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub url: String,
    pub mode: JobMode,
    pub quality: VideoQuality,
    pub language: String,
    pub model: String,
    pub output_dir: PathBuf,
}

/// Files produced along the way. Each is set by exactly one stage.
#[derive(Debug, Clone, Default)]
pub struct Artifacts {
    pub media: Option<PathBuf>,
    pub source_subtitles: Option<PathBuf>,
    pub translated_subtitles: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub request: JobRequest,
    pub work_dir: PathBuf,
    pub title: Option<String>,
    pub artifacts: Artifacts,
}

impl Job {
    pub fn new(request: JobRequest, work_dir: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            work_dir,
            title: None,
            artifacts: Artifacts::default(),
        }
    }

    /// File-system safe name derived from the title.
    pub fn base_name(&self) -> String {
        sanitize_title(self.title.as_deref().unwrap_or("video"))
    }

    pub fn downloaded_video_path(&self) -> PathBuf {
        self.work_dir.join(format!("{}.mp4", self.base_name()))
    }

    /// Stem handed to yt-dlp for audio; it appends `.mp3` itself.
    pub fn audio_stem(&self) -> PathBuf {
        self.work_dir.join(self.base_name())
    }

    pub fn translated_subtitles_path(&self) -> PathBuf {
        self.work_dir.join(format!("{}_zh.srt", self.base_name()))
    }

    /// Final artifact name, without a directory.
    fn output_file_name(&self) -> String {
        match self.request.mode {
            JobMode::Video => format!("{}_translated.mp4", self.base_name()),
            JobMode::Audio => format!("{}.mp3", self.base_name()),
        }
    }

    /// Where ffmpeg encodes; moved to `final_output_path` only on success.
    pub fn muxed_video_path(&self) -> PathBuf {
        self.work_dir.join(self.output_file_name())
    }

    pub fn final_output_path(&self) -> PathBuf {
        self.request.output_dir.join(self.output_file_name())
    }
}

/// Strips characters that are invalid in file names on common platforms.
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "video".to_string()
    } else {
        cleaned.to_string()
    }
}

/// True when the path exists and has content.
pub fn artifact_ready(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(mode: JobMode) -> JobRequest {
        JobRequest {
            url: "https://youtu.be/abc".to_string(),
            mode,
            quality: VideoQuality::Best,
            language: "en".to_string(),
            model: "small".to_string(),
            output_dir: PathBuf::from("/out"),
        }
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("What? A \"Talk\": Part 1/2"), "What A Talk Part 12");
        assert_eq!(sanitize_title("  <|>  "), "video");
        assert_eq!(sanitize_title("日本語のタイトル"), "日本語のタイトル");
    }

    #[test]
    fn test_quality_selectors() {
        assert_eq!(VideoQuality::Best.format_selector(), "bv*+ba/b");
        assert_eq!(
            VideoQuality::P720.format_selector(),
            "bv[height<=720]+ba/b[height<=720]"
        );
        assert_eq!("1080P".parse::<VideoQuality>().unwrap(), VideoQuality::P1080);
        assert!("4k".parse::<VideoQuality>().is_err());
    }

    #[test]
    fn test_mode_parsing_and_sequence() {
        assert_eq!("Audio".parse::<JobMode>().unwrap(), JobMode::Audio);
        assert!("gif".parse::<JobMode>().is_err());
        assert_eq!(Stage::sequence(JobMode::Audio), &[Stage::Probe, Stage::Download]);
        assert_eq!(Stage::sequence(JobMode::Video).last(), Some(&Stage::Mux));
    }

    #[test]
    fn test_artifact_paths() {
        let mut job = Job::new(request(JobMode::Video), PathBuf::from("/out/work"));
        job.title = Some("My: Clip".to_string());
        assert_eq!(job.downloaded_video_path(), PathBuf::from("/out/work/My Clip.mp4"));
        assert_eq!(job.translated_subtitles_path(), PathBuf::from("/out/work/My Clip_zh.srt"));
        assert_eq!(job.muxed_video_path(), PathBuf::from("/out/work/My Clip_translated.mp4"));
        assert_eq!(job.final_output_path(), PathBuf::from("/out/My Clip_translated.mp4"));

        let mut audio = Job::new(request(JobMode::Audio), PathBuf::from("/out/work"));
        audio.title = Some("Song".to_string());
        assert_eq!(audio.final_output_path(), PathBuf::from("/out/Song.mp3"));
        assert_eq!(audio.audio_stem(), PathBuf::from("/out/work/Song"));
    }

    #[test]
    fn test_artifact_ready() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.srt");
        std::fs::write(&empty, "").unwrap();
        let full = dir.path().join("full.srt");
        std::fs::write(&full, "1\n").unwrap();

        assert!(!artifact_ready(&empty));
        assert!(artifact_ready(&full));
        assert!(!artifact_ready(&dir.path().join("missing.srt")));
    }
}
