use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{Result, SetmError};

/// One timed SRT entry. Times are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    pub index: u32,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl SubtitleCue {
    /// Text lines joined with single spaces, as sent for translation.
    pub fn flattened_text(&self) -> String {
        non_empty_lines(&self.text).join(" ")
    }
}

fn non_empty_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Cue text with blank lines removed. A blank line inside a cue would end the
/// SRT block early.
pub fn compact_text(text: &str) -> String {
    non_empty_lines(text).join("\n")
}

/// Parse SRT content. Blocks without a timing line are skipped; a block
/// whose timing line is malformed is an error.
pub fn parse_srt(content: &str) -> Result<Vec<SubtitleCue>> {
    let content = content.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut cues = Vec::new();

    for block in content.split("\n\n") {
        let lines: Vec<&str> = block.lines().filter(|l| !l.trim().is_empty()).collect();
        let Some(timing_pos) = lines.iter().position(|l| l.contains("-->")) else {
            if !lines.is_empty() {
                debug!("Skipping SRT block without timing: {:?}", lines);
            }
            continue;
        };

        let index = lines[..timing_pos]
            .last()
            .and_then(|l| l.trim().parse::<u32>().ok())
            .unwrap_or(cues.len() as u32 + 1);

        let (start, end) = parse_timing_line(lines[timing_pos])?;
        let text = lines[timing_pos + 1..]
            .iter()
            .map(|l| l.trim())
            .collect::<Vec<_>>()
            .join("\n");

        cues.push(SubtitleCue { index, start, end, text });
    }

    Ok(cues)
}

fn parse_timing_line(line: &str) -> Result<(f64, f64)> {
    let (start, end) = line
        .split_once("-->")
        .ok_or_else(|| SetmError::Subtitle(format!("Invalid timing line: {}", line)))?;
    // Position hints such as "X1:40 X2:600" may follow the end time.
    let end = end.split_whitespace().next().unwrap_or("");
    Ok((parse_srt_time(start.trim())?, parse_srt_time(end)?))
}

/// Parse `HH:MM:SS,mmm` (a `.` separator is accepted too).
pub fn parse_srt_time(value: &str) -> Result<f64> {
    let invalid = || SetmError::Subtitle(format!("Invalid SRT timestamp: {}", value));

    let (hms, millis) = value
        .split_once([',', '.'])
        .ok_or_else(invalid)?;
    let parts: Vec<&str> = hms.split(':').collect();
    if parts.len() != 3 {
        return Err(invalid());
    }

    let hours: u64 = parts[0].parse().map_err(|_| invalid())?;
    let minutes: u64 = parts[1].parse().map_err(|_| invalid())?;
    let seconds: u64 = parts[2].parse().map_err(|_| invalid())?;
    let millis: u64 = millis.parse().map_err(|_| invalid())?;

    let total_ms = hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes.checked_mul(60)?))
        .and_then(|s| s.checked_add(seconds))
        .and_then(|s| s.checked_mul(1000))
        .and_then(|ms| ms.checked_add(millis))
        .ok_or_else(invalid)?;
    Ok(total_ms as f64 / 1000.0)
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
pub fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds * 1000.0).round() as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

pub fn format_srt(cues: &[SubtitleCue]) -> String {
    let mut srt_content = String::new();

    for cue in cues {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            format_srt_time(cue.start),
            format_srt_time(cue.end),
            compact_text(&cue.text)
        ));
    }

    srt_content
}

pub async fn read_srt<P: AsRef<Path>>(path: P) -> Result<Vec<SubtitleCue>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| SetmError::Subtitle(format!("Failed to read {}: {}", path.display(), e)))?;
    parse_srt(&content)
}

/// Generate SRT subtitle file from cues
pub async fn write_srt<P: AsRef<Path>>(cues: &[SubtitleCue], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Writing SRT file: {} ({} cues)", output_path.display(), cues.len());

    fs::write(output_path, format_srt(cues)).await?;
    Ok(())
}
