//! setm - YouTube subtitle translation pipeline
//!
//! Downloads a video with yt-dlp, transcribes it with whisper, translates the
//! subtitles to Chinese with DeepSeek and burns them in with ffmpeg. Audio mode
//! stops after downloading the track as MP3.

pub mod cli;
pub mod command;
pub mod config;
pub mod download;
pub mod error;
pub mod history;
pub mod job;
pub mod media;
pub mod pipeline;
pub mod progress;
pub mod setup;
pub mod subtitle;
pub mod transcribe;
pub mod translate;
pub mod url;
