use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::job::{JobMode, VideoQuality};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a video, add translated subtitles and burn them in
    Run {
        /// Video URL; prompted for when omitted
        #[arg(short, long)]
        url: Option<String>,

        /// Processing mode (video, audio); prompted for when omitted
        #[arg(short, long)]
        mode: Option<JobMode>,

        /// Video quality (best, 1080p, 720p, 480p)
        #[arg(short, long)]
        quality: Option<VideoQuality>,

        /// Spoken language of the video
        #[arg(short, long)]
        language: Option<String>,

        /// Whisper model name
        #[arg(long)]
        model: Option<String>,

        /// Output directory for the final file
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Download a video or its audio track only
    Download {
        /// Video URL
        #[arg(short, long)]
        url: String,

        /// Processing mode (video, audio)
        #[arg(short, long, default_value = "video")]
        mode: JobMode,

        /// Video quality (best, 1080p, 720p, 480p)
        #[arg(short, long)]
        quality: Option<VideoQuality>,

        /// Output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Transcribe a media file to SRT subtitles
    Transcribe {
        /// Input media file
        #[arg(short, long)]
        input: PathBuf,

        /// Directory the SRT file is written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Spoken language
        #[arg(short, long)]
        language: Option<String>,

        /// Whisper model name
        #[arg(long)]
        model: Option<String>,
    },

    /// Translate an SRT file into Chinese
    Translate {
        /// Input SRT file
        #[arg(short, long)]
        input: PathBuf,

        /// Output SRT file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Burn subtitles into a video file
    Embed {
        /// Input video file
        #[arg(short, long)]
        video: PathBuf,

        /// Subtitle file
        #[arg(short, long)]
        subtitles: PathBuf,

        /// Output video file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show or clear the processing history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Check that the external tools and the API key are usable
    Check,
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List processed jobs, newest first
    List {
        /// Maximum number of records to show
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete all history records
    Clear,
}
