use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::MediaConfig;
use crate::error::Result;
use crate::progress::{percent_bar, to_position};
use super::{
    encode_progress, parse_bitrate, parse_duration_json, parse_ffmpeg_time, subtitles_filter,
    MediaCommandBuilder, MediaProcessorTrait,
};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path, &config.probe_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        info!(
            "Burning subtitles from {} into {} -> {}",
            subtitle_path.display(),
            video_path.display(),
            output_path.display()
        );

        let bitrate = self.probe_bitrate(video_path).await?;
        match bitrate {
            Some(bps) => info!("Detected original bitrate: {} bps. Using it for encoding.", bps),
            None => warn!(
                "Could not detect bitrate. Using CRF={} for encoding.",
                self.config.fallback_crf
            ),
        }

        let total_duration = self.probe_duration(video_path).await?;
        let absolute_srt = std::path::absolute(subtitle_path)?;
        let filter = subtitles_filter(&absolute_srt, cfg!(windows));

        let command = self.command_builder.burn_subtitles(
            video_path,
            filter,
            bitrate,
            &self.config,
            output_path,
        );
        info!("[CMD] {}", command.display_line());

        let pb = percent_bar("encode");
        let result = command
            .execute_streaming(|line| {
                match parse_ffmpeg_time(line).and_then(|t| encode_progress(t, total_duration)) {
                    Some(percent) => {
                        pb.set_position(to_position(percent));
                        pb.set_message(format!("{}% encoded", to_position(percent)));
                    }
                    None if !line.is_empty() => debug!("{}", line),
                    None => {}
                }
            })
            .await;

        match &result {
            Ok(()) => pb.finish_with_message("done"),
            Err(_) => pb.abandon_with_message("failed"),
        }
        result?;

        info!("Subtitle burn-in completed successfully");
        Ok(())
    }

    async fn probe_duration(&self, media_path: &Path) -> Result<f64> {
        let parsed = self
            .command_builder
            .duration_probe(media_path)
            .execute()
            .await
            .and_then(|output| parse_duration_json(&output.stdout));
        // Progress reporting degrades to none when the duration is unknown.
        match parsed {
            Ok(duration) => Ok(duration),
            Err(e) => {
                warn!("Error getting video duration: {}", e);
                Ok(0.0)
            }
        }
    }

    async fn probe_bitrate(&self, media_path: &Path) -> Result<Option<u64>> {
        if let Ok(output) = self.command_builder.stream_bitrate_probe(media_path).execute().await {
            if let Some(bps) = parse_bitrate(&output.stdout) {
                return Ok(Some(bps));
            }
        }

        match self.command_builder.format_bitrate_probe(media_path).execute().await {
            Ok(output) => Ok(parse_bitrate(&output.stdout)),
            Err(e) => {
                warn!("Could not determine bitrate: {}", e);
                Ok(None)
            }
        }
    }

    async fn check_availability(&self) -> Result<String> {
        let version = self.command_builder.version_check().version_line().await?;
        self.command_builder.probe_version_check().version_line().await?;
        Ok(version)
    }
}
