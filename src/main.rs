//! setm - YouTube subtitle translation pipeline
//!
//! Entry point for the `setm` binary: downloads a video with yt-dlp,
//! transcribes it with whisper, translates the subtitles through DeepSeek
//! and burns them in with ffmpeg.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use setm::cli::{Args, Commands, HistoryAction};
use setm::config::Config;
use setm::history::HistoryRecord;
use setm::job::JobMode;
use setm::pipeline::Pipeline;
use setm::setup::SetupManager;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let setup_manager = SetupManager::new(std::env::current_dir()?)?;
    setup_logging(&setup_manager.log_dir(), args.verbose)?;
    info!("Starting setm");

    let config = load_config(args.config.as_deref())?;
    let pipeline = Pipeline::new(config.clone())?;

    match args.command {
        Commands::Run {
            url,
            mode,
            quality,
            language,
            model,
            output_dir,
        } => {
            let url = match url {
                Some(url) => url,
                None => prompt_url()?,
            };
            let mode = match mode {
                Some(mode) => mode,
                None => prompt_mode()?,
            };

            let request = pipeline.build_request(&url, mode, quality, language, model, output_dir);
            let outcome = pipeline.run(request).await?;

            println!("\nDone: {}", outcome.title);
            println!("Output: {}", outcome.final_path.display());
            if let Some(work_dir) = outcome.work_dir {
                println!("Intermediate files: {}", work_dir.display());
            }
        }
        Commands::Download {
            url,
            mode,
            quality,
            output_dir,
        } => {
            let request = pipeline.build_request(&url, mode, quality, None, None, output_dir);
            let path = pipeline.download(&request).await?;
            println!("Downloaded: {}", path.display());
        }
        Commands::Transcribe {
            input,
            output_dir,
            language,
            model,
        } => {
            info!("Transcribing: {}", input.display());
            let srt = pipeline
                .transcribe_file(&input, output_dir.as_deref(), model.as_deref(), language.as_deref())
                .await?;
            println!("Subtitles: {}", srt.display());
        }
        Commands::Translate { input, output } => {
            info!("Translating subtitles: {}", input.display());
            let report = pipeline.translate_file(&input, &output).await?;
            println!(
                "Translated {}/{} cues ({} kept their original text): {}",
                report.translated,
                report.total,
                report.failed,
                output.display()
            );
        }
        Commands::Embed {
            video,
            subtitles,
            output,
        } => {
            info!("Embedding subtitles into video: {}", video.display());
            pipeline.embed(&video, &subtitles, &output).await?;
            println!("Output: {}", output.display());
        }
        Commands::History { action } => match action {
            HistoryAction::List { limit } => {
                let limit = limit.unwrap_or(config.history.limit);
                let records = pipeline.history().list(limit).await?;
                print_history(&records);
            }
            HistoryAction::Clear => {
                let count = pipeline.history().clear().await?;
                println!("Cleared {} history records", count);
            }
        },
        Commands::Check => {
            let statuses = pipeline.dependency_report().await;
            if !setup_manager.print_report(&statuses) {
                anyhow::bail!("Some dependencies are not available");
            }
        }
    }

    Ok(())
}

/// `--config`, else `./config.toml` when present, else defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Ok(Config::from_file("config.toml")?)
            } else {
                Ok(Config::default())
            }
        }
    }
}

/// Setup logging to both console and file
fn setup_logging(log_dir: &Path, verbose: bool) -> Result<()> {
    let file_appender = rolling::daily(log_dir, "setm.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // The guard flushes on drop; logging lives as long as the process.
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer().with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("setm.log").display()
    );
    Ok(())
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        anyhow::bail!("No input provided");
    }
    Ok(line.trim().to_string())
}

fn prompt_url() -> Result<String> {
    loop {
        let url = read_line("Enter the video URL: ")?;
        if !url.is_empty() {
            return Ok(url);
        }
        println!("The URL cannot be empty.");
    }
}

fn prompt_mode() -> Result<JobMode> {
    println!("Processing mode:");
    println!("  1) video - download, translate subtitles and burn them in");
    println!("  2) audio - download the audio track as MP3");
    loop {
        let answer = read_line("Choose [1/2]: ")?;
        let parsed = match answer.as_str() {
            "1" => Ok(JobMode::Video),
            "2" => Ok(JobMode::Audio),
            other => other.parse::<JobMode>(),
        };
        match parsed {
            Ok(mode) => return Ok(mode),
            Err(e) => println!("{}", e),
        }
    }
}

fn print_history(records: &[HistoryRecord]) {
    if records.is_empty() {
        println!("No history records found.");
        return;
    }

    println!("\nProcessing History:");
    println!(
        "{:<20} {:<6} {:<8} {:<10} {:<40} {}",
        "Processed", "Mode", "Quality", "Status", "Title", "Output"
    );
    println!("{}", "-".repeat(110));

    for record in records {
        let quality = record
            .quality
            .map(|q| q.to_string())
            .unwrap_or_else(|| "-".to_string());
        let title: String = if record.title.chars().count() > 38 {
            format!("{}..", record.title.chars().take(36).collect::<String>())
        } else {
            record.title.clone()
        };
        let output = match &record.error {
            Some(err) => err.lines().next().unwrap_or("").to_string(),
            None => record.final_path.clone(),
        };

        println!(
            "{:<20} {:<6} {:<8} {:<10} {:<40} {}",
            record.processed_at.format("%Y-%m-%d %H:%M:%S"),
            record.process_type,
            quality,
            record.status,
            title,
            output
        );
    }
}
