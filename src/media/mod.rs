// Media processing
//
// - Processor: ffmpeg/ffprobe backed implementation of `MediaProcessorTrait`
// - Commands: builders for the ffmpeg and ffprobe invocations and parsers
//   for their output

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Burn subtitles into the video, re-encoding the video stream
    async fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()>;

    /// Duration in seconds, 0.0 when it cannot be determined
    async fn probe_duration(&self, media_path: &Path) -> Result<f64>;

    /// Source video bitrate in bits per second, if detectable
    async fn probe_bitrate(&self, media_path: &Path) -> Result<Option<u64>>;

    /// Version line of ffmpeg and check that ffprobe runs
    async fn check_availability(&self) -> Result<String>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config))
    }
}
