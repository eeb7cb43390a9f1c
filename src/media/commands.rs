use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::OnceLock;

use crate::command::ToolCommand;
use crate::config::MediaConfig;
use crate::error::{Result, SetmError};

/// ffmpeg specific argument helpers
impl ToolCommand {
    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").path_arg(path)
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }
}

/// Builder for the ffmpeg and ffprobe invocations the muxer needs
pub struct MediaCommandBuilder {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl MediaCommandBuilder {
    pub fn new<S1: Into<String>, S2: Into<String>>(ffmpeg_path: S1, ffprobe_path: S2) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Build subtitle burn-in command. Keeps the source bitrate when known,
    /// otherwise encodes at the configured CRF.
    pub fn burn_subtitles<P: AsRef<Path>>(
        &self,
        video_path: P,
        subtitle_filter: String,
        bitrate: Option<u64>,
        config: &MediaConfig,
        output_path: P,
    ) -> ToolCommand {
        let cmd = ToolCommand::new(&self.ffmpeg_path, "Subtitle burn-in")
            .input(video_path)
            .video_filter(subtitle_filter)
            .video_codec(&config.video_codec)
            .arg("-preset")
            .arg(&config.preset);

        let cmd = match bitrate {
            Some(bps) => cmd.arg("-b:v").arg(bps.to_string()),
            None => cmd.arg("-crf").arg(config.fallback_crf.to_string()),
        };

        cmd.copy_audio()
            .args(config.subtitle_options.iter().cloned())
            .overwrite()
            .path_arg(output_path)
    }

    /// `ffprobe` query for the container duration as JSON
    pub fn duration_probe<P: AsRef<Path>>(&self, media_path: P) -> ToolCommand {
        ToolCommand::new(&self.ffprobe_path, "Duration probe")
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .path_arg(media_path)
    }

    /// `ffprobe` query for the first video stream's bitrate
    pub fn stream_bitrate_probe<P: AsRef<Path>>(&self, media_path: P) -> ToolCommand {
        ToolCommand::new(&self.ffprobe_path, "Stream bitrate probe")
            .args(["-v", "error", "-select_streams", "v:0", "-show_entries", "stream=bit_rate"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .path_arg(media_path)
    }

    /// `ffprobe` query for the container bitrate
    pub fn format_bitrate_probe<P: AsRef<Path>>(&self, media_path: P) -> ToolCommand {
        ToolCommand::new(&self.ffprobe_path, "Format bitrate probe")
            .args(["-v", "error", "-show_entries", "format=bit_rate"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .path_arg(media_path)
    }

    pub fn version_check(&self) -> ToolCommand {
        ToolCommand::new(&self.ffmpeg_path, "Version check").arg("-version")
    }

    pub fn probe_version_check(&self) -> ToolCommand {
        ToolCommand::new(&self.ffprobe_path, "Version check").arg("-version")
    }
}

/// Value for ffmpeg's `subtitles=` filter. ffmpeg unescapes the text twice:
/// the filtergraph parser strips the outer quoting, then the option parser
/// treats backslash, `'` and `:` as special.
pub fn subtitles_filter(subtitle_path: &Path, windows: bool) -> String {
    let path = subtitle_path.to_string_lossy();
    let path = if windows { path.replace('\\', "/") } else { path.into_owned() };

    let mut option_level = String::with_capacity(path.len());
    for c in path.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            option_level.push('\\');
        }
        option_level.push(c);
    }

    format!("subtitles='{}'", option_level.replace('\'', "'\\''"))
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Duration from `ffprobe -show_entries format=duration -of json` output.
pub fn parse_duration_json(json: &str) -> Result<f64> {
    let output: ProbeOutput = serde_json::from_str(json)?;
    output
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .ok_or_else(|| SetmError::Config("ffprobe reported no duration".to_string()))
}

/// Bitrate from `default=noprint_wrappers=1:nokey=1` output. Only positive
/// integers count; ffprobe prints `N/A` when unknown.
pub fn parse_bitrate(output: &str) -> Option<u64> {
    output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .filter(|l| l.chars().all(|c| c.is_ascii_digit()))
        .and_then(|l| l.parse::<u64>().ok())
        .filter(|&bps| bps > 0)
}

/// Elapsed seconds from an ffmpeg progress line (`time=HH:MM:SS.cc`).
pub fn parse_ffmpeg_time(line: &str) -> Option<f64> {
    static TIME: OnceLock<Option<Regex>> = OnceLock::new();
    let re = TIME
        .get_or_init(|| Regex::new(r"time=(\d{2}):(\d{2}):(\d{2})\.(\d{2})").ok())
        .as_ref()?;
    let caps = re.captures(line)?;
    let field = |i: usize| -> Option<f64> { caps.get(i)?.as_str().parse::<f64>().ok() };

    Some(field(1)? * 3600.0 + field(2)? * 60.0 + field(3)? + field(4)? / 100.0)
}

/// Encoding progress in percent, if the total duration is known.
pub fn encode_progress(elapsed: f64, total_duration: f64) -> Option<f64> {
    if total_duration > 0.0 {
        Some(elapsed / total_duration * 100.0)
    } else {
        None
    }
}
