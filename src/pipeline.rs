use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::download::{Downloader, DownloaderFactory};
use crate::error::{Result, SetmError};
use crate::history::{HistoryRecord, HistoryStore, JobStatus};
use crate::job::{artifact_ready, Job, JobMode, JobRequest, Stage, VideoQuality};
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::setup::DependencyStatus;
use crate::transcribe::{Transcriber, TranscriberFactory};
use crate::translate::{translate_srt_file, TextTranslator, TranslationReport, TranslatorFactory};
use crate::url::clean_youtube_url;

/// Result of a finished job
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub title: String,
    pub final_path: PathBuf,
    /// Set when intermediates were kept
    pub work_dir: Option<PathBuf>,
}

/// Sequences downloader, transcriber, translator and muxer for one job
pub struct Pipeline {
    config: Config,
    downloader: Box<dyn Downloader>,
    transcriber: Box<dyn Transcriber>,
    translator: Box<dyn TextTranslator>,
    media: Box<dyn MediaProcessorTrait>,
    history: HistoryStore,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let downloader = DownloaderFactory::create_downloader(config.downloader.clone());
        let transcriber = TranscriberFactory::create_transcriber(config.transcriber.clone());
        let translator = TranslatorFactory::create_translator(config.translate.clone())?;
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        Ok(Self::with_components(config, downloader, transcriber, translator, media))
    }

    pub fn with_components(
        config: Config,
        downloader: Box<dyn Downloader>,
        transcriber: Box<dyn Transcriber>,
        translator: Box<dyn TextTranslator>,
        media: Box<dyn MediaProcessorTrait>,
    ) -> Self {
        let history = HistoryStore::new(&config.history.path);
        Self {
            config,
            downloader,
            transcriber,
            translator,
            media,
            history,
        }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Fill unset options from the configuration and clean the URL
    pub fn build_request(
        &self,
        url: &str,
        mode: JobMode,
        quality: Option<VideoQuality>,
        language: Option<String>,
        model: Option<String>,
        output_dir: Option<PathBuf>,
    ) -> JobRequest {
        JobRequest {
            url: clean_youtube_url(url),
            mode,
            quality: quality.unwrap_or(self.config.downloader.quality),
            language: language.unwrap_or_else(|| self.config.transcriber.language.clone()),
            model: model.unwrap_or_else(|| self.config.transcriber.model.clone()),
            output_dir: output_dir.unwrap_or_else(|| self.config.output.directory.clone()),
        }
    }

    /// Status of every external collaborator
    pub async fn dependency_report(&self) -> Vec<DependencyStatus> {
        vec![
            DependencyStatus::from_result("yt-dlp", self.downloader.check_availability().await),
            DependencyStatus::from_result("whisper", self.transcriber.check_availability().await),
            DependencyStatus::from_result("ffmpeg", self.media.check_availability().await),
            DependencyStatus::from_result(
                "api key",
                self.translator.check_availability().map(|_| "configured"),
            ),
        ]
    }

    /// Fail fast when a collaborator the mode needs is unusable
    pub async fn preflight(&self, mode: JobMode) -> Result<()> {
        self.downloader.check_availability().await?;
        self.media.check_availability().await?;
        if mode == JobMode::Video {
            self.transcriber.check_availability().await?;
            self.translator.check_availability()?;
        }
        Ok(())
    }

    /// Run a complete job. The outcome, success or failure, is recorded in
    /// the history.
    pub async fn run(&self, request: JobRequest) -> Result<JobOutcome> {
        info!("Starting new {} job for URL: {}", request.mode, request.url);
        self.preflight(request.mode).await?;

        fs::create_dir_all(&request.output_dir).await?;
        let work_dir = tempfile::Builder::new()
            .prefix(".setm-job-")
            .tempdir_in(&request.output_dir)?;

        let mut job = Job::new(request, work_dir.path().to_path_buf());
        info!("Job {} working directory: {}", job.id, job.work_dir.display());

        let result = self.execute(&mut job).await;
        self.record_history(&job, &result).await;

        let kept = if self.config.output.keep_intermediates {
            let path = work_dir.keep();
            info!("Intermediate files kept in {}", path.display());
            Some(path)
        } else {
            None
        };

        match result {
            Ok(final_path) => {
                info!("[SUCCESS] Output file: {}", final_path.display());
                Ok(JobOutcome {
                    title: job.title.clone().unwrap_or_default(),
                    final_path,
                    work_dir: kept,
                })
            }
            Err(e) => {
                error!("[ERROR] {}", e);
                Err(e)
            }
        }
    }

    async fn execute(&self, job: &mut Job) -> Result<PathBuf> {
        let stages = Stage::sequence(job.request.mode);
        for (idx, stage) in stages.iter().enumerate() {
            info!("Step {}/{}: {}", idx + 1, stages.len(), stage_label(*stage, job.request.mode));
            self.run_stage(*stage, job).await.map_err(|e| e.in_stage(*stage))?;
        }

        job.artifacts
            .output
            .clone()
            .ok_or_else(|| SetmError::MissingArtifact("final output".to_string()))
    }

    async fn run_stage(&self, stage: Stage, job: &mut Job) -> Result<()> {
        match stage {
            Stage::Probe => {
                let info = self.downloader.probe(&job.request.url).await?;
                job.title = Some(info.title);
            }
            Stage::Download => match job.request.mode {
                JobMode::Video => {
                    let target = job.downloaded_video_path();
                    let path = self
                        .downloader
                        .download_video(&job.request.url, job.request.quality, &target)
                        .await?;
                    job.artifacts.media = Some(require_artifact(&path)?);
                }
                JobMode::Audio => {
                    let path = self
                        .downloader
                        .download_audio(&job.request.url, &job.audio_stem())
                        .await?;
                    let downloaded = require_artifact(&path)?;
                    let final_path = job.final_output_path();
                    fs::rename(&downloaded, &final_path).await?;
                    job.artifacts.media = Some(final_path.clone());
                    job.artifacts.output = Some(final_path);
                }
            },
            Stage::Transcribe => {
                let media = require_input(job.artifacts.media.as_deref(), "downloaded media")?;
                let srt = self
                    .transcriber
                    .transcribe(&media, &job.request.model, &job.request.language, &job.work_dir)
                    .await?;
                job.artifacts.source_subtitles = Some(require_artifact(&srt)?);
            }
            Stage::Translate => {
                let source = require_input(job.artifacts.source_subtitles.as_deref(), "source subtitles")?;
                let target = job.translated_subtitles_path();
                translate_srt_file(self.translator.as_ref(), &source, &target).await?;
                job.artifacts.translated_subtitles = Some(require_artifact(&target)?);
            }
            Stage::Mux => {
                let video = require_input(job.artifacts.media.as_deref(), "downloaded media")?;
                let subtitles =
                    require_input(job.artifacts.translated_subtitles.as_deref(), "translated subtitles")?;
                let muxed = job.muxed_video_path();
                self.media.burn_subtitles(&video, &subtitles, &muxed).await?;
                let muxed = require_artifact(&muxed)?;
                let final_path = job.final_output_path();
                fs::rename(&muxed, &final_path).await?;
                job.artifacts.output = Some(final_path);
            }
        }
        Ok(())
    }

    async fn record_history(&self, job: &Job, result: &Result<PathBuf>) {
        let (status, final_path, error) = match result {
            Ok(path) => (JobStatus::Completed, path.display().to_string(), None),
            Err(e) => (JobStatus::Failed, String::new(), Some(e.to_string())),
        };

        let record = HistoryRecord {
            id: job.id,
            title: job.title.clone().unwrap_or_else(|| "Unknown Title".to_string()),
            url: job.request.url.clone(),
            process_type: job.request.mode,
            quality: match job.request.mode {
                JobMode::Video => Some(job.request.quality),
                JobMode::Audio => None,
            },
            final_path,
            processed_at: Utc::now(),
            status,
            error,
        };

        if let Err(e) = self.history.append(record).await {
            warn!("Error saving history record: {}", e);
        }
    }

    /// Download only, without the rest of the pipeline
    pub async fn download(&self, request: &JobRequest) -> Result<PathBuf> {
        fs::create_dir_all(&request.output_dir).await?;
        let info = self.downloader.probe(&request.url).await?;
        let mut job = Job::new(request.clone(), request.output_dir.clone());
        job.title = Some(info.title);

        match request.mode {
            JobMode::Video => {
                let target = request.output_dir.join(format!("{}.mp4", job.base_name()));
                self.downloader
                    .download_video(&request.url, request.quality, &target)
                    .await
            }
            JobMode::Audio => self.downloader.download_audio(&request.url, &job.audio_stem()).await,
        }
    }

    /// Transcribe a local media file. Without `output_dir` the SRT lands next
    /// to the media file.
    pub async fn transcribe_file(
        &self,
        media_path: &Path,
        output_dir: Option<&Path>,
        model: Option<&str>,
        language: Option<&str>,
    ) -> Result<PathBuf> {
        if !media_path.exists() {
            return Err(SetmError::FileNotFound(media_path.display().to_string()));
        }
        let output_dir = match output_dir {
            Some(dir) => dir.to_path_buf(),
            None => default_transcript_dir(media_path),
        };
        fs::create_dir_all(&output_dir).await?;

        let model = model.unwrap_or(&self.config.transcriber.model);
        let language = language.unwrap_or(&self.config.transcriber.language);
        self.transcriber
            .transcribe(media_path, model, language, &output_dir)
            .await
    }

    /// Translate a local SRT file
    pub async fn translate_file(&self, input: &Path, output: &Path) -> Result<TranslationReport> {
        if !input.exists() {
            return Err(SetmError::FileNotFound(input.display().to_string()));
        }
        self.translator.check_availability()?;
        translate_srt_file(self.translator.as_ref(), input, output).await
    }

    /// Burn a local SRT file into a local video
    pub async fn embed(&self, video: &Path, subtitles: &Path, output: &Path) -> Result<()> {
        for path in [video, subtitles] {
            if !path.exists() {
                return Err(SetmError::FileNotFound(path.display().to_string()));
            }
        }
        self.media.burn_subtitles(video, subtitles, output).await
    }
}

/// Directory of the media file; `.` for a bare file name.
fn default_transcript_dir(media_path: &Path) -> PathBuf {
    media_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn stage_label(stage: Stage, mode: JobMode) -> &'static str {
    match (stage, mode) {
        (Stage::Probe, _) => "Getting video information",
        (Stage::Download, JobMode::Video) => "Downloading Video",
        (Stage::Download, JobMode::Audio) => "Downloading Audio (MP3)",
        (Stage::Transcribe, _) => "Extracting Subtitles (Whisper)",
        (Stage::Translate, _) => "Translating Subtitles",
        (Stage::Mux, _) => "Encoding Final Video (FFmpeg)",
    }
}

/// A stage's output must exist and be non-empty before anything consumes it.
fn require_artifact(path: &Path) -> Result<PathBuf> {
    if artifact_ready(path) {
        Ok(path.to_path_buf())
    } else {
        Err(SetmError::MissingArtifact(path.display().to_string()))
    }
}

fn require_input(path: Option<&Path>, what: &str) -> Result<PathBuf> {
    match path {
        Some(p) => require_artifact(p),
        None => Err(SetmError::MissingArtifact(format!("{} was not produced", what))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::{MockDownloader, VideoInfo};
    use crate::media::MockMediaProcessorTrait;
    use crate::transcribe::MockTranscriber;
    use crate::translate::MockTextTranslator;
    use mockall::Sequence;

    const SOURCE_SRT: &str = "1\n00:00:00,000 --> 00:00:01,000\nHello\n\n";

    struct Fixture {
        _dir: assert_fs::TempDir,
        config: Config,
        output_dir: PathBuf,
    }

    fn fixture() -> Fixture {
        let dir = assert_fs::TempDir::new().unwrap();
        let output_dir = dir.path().join("out");
        let mut config = Config::default();
        config.history.path = dir.path().join("history.json");
        config.output.directory = output_dir.clone();
        Fixture {
            _dir: dir,
            config,
            output_dir,
        }
    }

    fn available_downloader() -> MockDownloader {
        let mut downloader = MockDownloader::new();
        downloader
            .expect_check_availability()
            .returning(|| Ok("2025.01.01".to_string()));
        downloader.expect_probe().returning(|_| {
            Ok(VideoInfo {
                title: "Talk: Part 1".to_string(),
                uploader: "someone".to_string(),
                thumbnail: String::new(),
                duration: 10.0,
            })
        });
        downloader
    }

    fn available_media() -> MockMediaProcessorTrait {
        let mut media = MockMediaProcessorTrait::new();
        media
            .expect_check_availability()
            .returning(|| Ok("ffmpeg version 6".to_string()));
        media
    }

    fn available_transcriber() -> MockTranscriber {
        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_check_availability()
            .returning(|| Ok("openai-whisper".to_string()));
        transcriber
    }

    fn available_translator() -> MockTextTranslator {
        let mut translator = MockTextTranslator::new();
        translator.expect_check_availability().returning(|| Ok(()));
        translator
    }

    fn request(pipeline: &Pipeline, mode: JobMode, output_dir: &Path) -> JobRequest {
        pipeline.build_request(
            "https://www.youtube.com/watch?v=abc123&list=PL1",
            mode,
            None,
            None,
            None,
            Some(output_dir.to_path_buf()),
        )
    }

    #[tokio::test]
    async fn test_video_job_runs_stages_in_order() {
        let fx = fixture();
        let mut seq = Sequence::new();

        let mut downloader = available_downloader();
        downloader
            .expect_download_video()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|url, quality, path| {
                url == "https://www.youtube.com/watch?v=abc123"
                    && *quality == VideoQuality::Best
                    && path.file_name().unwrap() == "Talk Part 1.mp4"
            })
            .returning(|_, _, path| {
                std::fs::write(path, b"mp4")?;
                Ok(path.to_path_buf())
            });

        let mut transcriber = available_transcriber();
        transcriber
            .expect_transcribe()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|media, model, language, _| {
                media.file_name().unwrap() == "Talk Part 1.mp4" && model == "small" && language == "en"
            })
            .returning(|_, _, _, out_dir| {
                let path = out_dir.join("Talk Part 1.srt");
                std::fs::write(&path, SOURCE_SRT)?;
                Ok(path)
            });

        let mut translator = available_translator();
        translator
            .expect_translate_text()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("你好".to_string()));

        let mut media = available_media();
        media
            .expect_burn_subtitles()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|_, subs, _| subs.file_name().unwrap() == "Talk Part 1_zh.srt")
            .returning(|_, subs, out| {
                assert!(std::fs::read_to_string(subs).unwrap().contains("你好"));
                std::fs::write(out, b"muxed")?;
                Ok(())
            });

        let pipeline = Pipeline::with_components(
            fx.config.clone(),
            Box::new(downloader),
            Box::new(transcriber),
            Box::new(translator),
            Box::new(media),
        );
        let req = request(&pipeline, JobMode::Video, &fx.output_dir);
        let outcome = pipeline.run(req).await.unwrap();

        assert_eq!(outcome.final_path, fx.output_dir.join("Talk Part 1_translated.mp4"));
        assert!(outcome.final_path.exists());
        assert!(outcome.work_dir.is_none());

        // Only the final output is left; the working directory is gone.
        let entries: Vec<_> = std::fs::read_dir(&fx.output_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);

        let history = pipeline.history().list(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, JobStatus::Completed);
        assert_eq!(history[0].quality, Some(VideoQuality::Best));
    }

    #[tokio::test]
    async fn test_failed_stage_aborts_and_is_reported() {
        let fx = fixture();

        let mut downloader = available_downloader();
        downloader.expect_download_video().returning(|_, _, path| {
            std::fs::write(path, b"mp4")?;
            Ok(path.to_path_buf())
        });

        let mut transcriber = available_transcriber();
        transcriber.expect_transcribe().returning(|_, _, _, _| {
            Err(SetmError::Tool {
                tool: "whisper".to_string(),
                status: "exit code 1".to_string(),
                stderr: "CUDA out of memory".to_string(),
            })
        });

        let mut translator = available_translator();
        translator.expect_translate_text().times(0);
        let mut media = available_media();
        media.expect_burn_subtitles().times(0);

        let pipeline = Pipeline::with_components(
            fx.config.clone(),
            Box::new(downloader),
            Box::new(transcriber),
            Box::new(translator),
            Box::new(media),
        );
        let req = request(&pipeline, JobMode::Video, &fx.output_dir);
        let err = pipeline.run(req).await.unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Transcribe));
        let message = err.to_string();
        assert!(message.contains("transcribe stage failed"));
        assert!(message.contains("exit code 1"));
        assert!(message.contains("CUDA out of memory"));

        let history = pipeline.history().list(10).await.unwrap();
        assert_eq!(history[0].status, JobStatus::Failed);
        assert_eq!(history[0].title, "Talk: Part 1");
        assert!(history[0].final_path.is_empty());
    }

    #[tokio::test]
    async fn test_missing_artifact_stops_before_next_stage() {
        let fx = fixture();

        let mut downloader = available_downloader();
        // Claims success without writing anything.
        downloader
            .expect_download_video()
            .returning(|_, _, path| Ok(path.to_path_buf()));

        let mut transcriber = available_transcriber();
        transcriber.expect_transcribe().times(0);

        let pipeline = Pipeline::with_components(
            fx.config.clone(),
            Box::new(downloader),
            Box::new(transcriber),
            Box::new(available_translator()),
            Box::new(available_media()),
        );
        let req = request(&pipeline, JobMode::Video, &fx.output_dir);
        let err = pipeline.run(req).await.unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Download));
        assert!(matches!(
            err,
            SetmError::Stage { ref source, .. } if matches!(**source, SetmError::MissingArtifact(_))
        ));
    }

    #[tokio::test]
    async fn test_audio_job_skips_later_stages() {
        let mut fx = fixture();
        fx.config.output.keep_intermediates = true;

        let mut downloader = available_downloader();
        downloader.expect_download_video().times(0);
        downloader
            .expect_download_audio()
            .times(1)
            .returning(|_, stem| {
                let path = PathBuf::from(format!("{}.mp3", stem.display()));
                std::fs::write(&path, b"ID3")?;
                Ok(path)
            });

        // Audio jobs never ask for whisper or the API key.
        let mut transcriber = MockTranscriber::new();
        transcriber.expect_check_availability().times(0);
        transcriber.expect_transcribe().times(0);
        let mut translator = MockTextTranslator::new();
        translator.expect_check_availability().times(0);
        let mut media = available_media();
        media.expect_burn_subtitles().times(0);

        let pipeline = Pipeline::with_components(
            fx.config.clone(),
            Box::new(downloader),
            Box::new(transcriber),
            Box::new(translator),
            Box::new(media),
        );
        let req = request(&pipeline, JobMode::Audio, &fx.output_dir);
        let outcome = pipeline.run(req).await.unwrap();

        assert_eq!(outcome.final_path, fx.output_dir.join("Talk Part 1.mp3"));
        assert_eq!(std::fs::read(&outcome.final_path).unwrap(), b"ID3");
        let kept = outcome.work_dir.expect("work dir kept");
        assert!(kept.is_dir());

        let history = pipeline.history().list(10).await.unwrap();
        assert_eq!(history[0].process_type, JobMode::Audio);
        assert_eq!(history[0].quality, None);
    }

    #[tokio::test]
    async fn test_preflight_fails_without_api_key() {
        let fx = fixture();

        let mut downloader = available_downloader();
        downloader.expect_download_video().times(0);
        let mut translator = MockTextTranslator::new();
        translator
            .expect_check_availability()
            .returning(|| Err(SetmError::Config("API key missing".to_string())));

        let pipeline = Pipeline::with_components(
            fx.config.clone(),
            Box::new(downloader),
            Box::new(available_transcriber()),
            Box::new(translator),
            Box::new(available_media()),
        );
        let req = request(&pipeline, JobMode::Video, &fx.output_dir);
        let err = pipeline.run(req).await.unwrap_err();

        assert!(matches!(err, SetmError::Config(_)));
        assert!(pipeline.history().list(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_mux_leaves_no_partial_output() {
        let fx = fixture();

        let mut downloader = available_downloader();
        downloader.expect_download_video().returning(|_, _, path| {
            std::fs::write(path, b"mp4")?;
            Ok(path.to_path_buf())
        });
        let mut transcriber = available_transcriber();
        transcriber.expect_transcribe().returning(|_, _, _, out_dir| {
            let path = out_dir.join("Talk Part 1.srt");
            std::fs::write(&path, SOURCE_SRT)?;
            Ok(path)
        });
        let mut translator = available_translator();
        translator
            .expect_translate_text()
            .returning(|_| Ok("你好".to_string()));

        // ffmpeg gets as far as writing part of the file, then fails.
        let mut media = available_media();
        media.expect_burn_subtitles().returning(|_, _, out| {
            std::fs::write(out, b"truncated")?;
            Err(SetmError::Tool {
                tool: "ffmpeg".to_string(),
                status: "exit code 1".to_string(),
                stderr: "Conversion failed!".to_string(),
            })
        });

        let pipeline = Pipeline::with_components(
            fx.config.clone(),
            Box::new(downloader),
            Box::new(transcriber),
            Box::new(translator),
            Box::new(media),
        );
        let req = request(&pipeline, JobMode::Video, &fx.output_dir);
        let err = pipeline.run(req).await.unwrap_err();

        assert_eq!(err.stage(), Some(Stage::Mux));
        assert!(!fx.output_dir.join("Talk Part 1_translated.mp4").exists());
        let entries: Vec<_> = std::fs::read_dir(&fx.output_dir).unwrap().collect();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_default_transcript_dir() {
        assert_eq!(default_transcript_dir(Path::new("clip.mp4")), PathBuf::from("."));
        assert_eq!(default_transcript_dir(Path::new("videos/clip.mp4")), PathBuf::from("videos"));
        assert_eq!(default_transcript_dir(Path::new("/data/clip.mp4")), PathBuf::from("/data"));
    }

    #[tokio::test]
    async fn test_transcribe_file_defaults_to_media_directory() {
        let fx = fixture();
        let media_dir = fx.output_dir.join("media");
        std::fs::create_dir_all(&media_dir).unwrap();
        let media_path = media_dir.join("clip.mp4");
        std::fs::write(&media_path, b"mp4").unwrap();

        let expected_dir = media_dir.clone();
        let mut transcriber = MockTranscriber::new();
        transcriber
            .expect_transcribe()
            .times(1)
            .withf(move |_, model, language, out_dir| {
                out_dir == expected_dir.as_path() && model == "small" && language == "ja"
            })
            .returning(|_, _, _, out_dir| Ok(out_dir.join("clip.srt")));

        let pipeline = Pipeline::with_components(
            fx.config.clone(),
            Box::new(MockDownloader::new()),
            Box::new(transcriber),
            Box::new(MockTextTranslator::new()),
            Box::new(MockMediaProcessorTrait::new()),
        );
        let srt = pipeline
            .transcribe_file(&media_path, None, None, Some("ja"))
            .await
            .unwrap();
        assert_eq!(srt, media_dir.join("clip.srt"));
    }

    #[tokio::test]
    #[ignore = "needs network access, yt-dlp and ffmpeg"]
    async fn test_audio_job_with_real_tools() {
        let dir = assert_fs::TempDir::new().unwrap();
        let mut config = Config::default();
        config.history.path = dir.path().join("history.json");
        let pipeline = Pipeline::new(config).unwrap();

        let req = pipeline.build_request(
            "https://www.youtube.com/watch?v=jNQXAC9IVRw",
            JobMode::Audio,
            None,
            None,
            None,
            Some(dir.path().to_path_buf()),
        );
        let outcome = pipeline.run(req).await.unwrap();

        assert!(artifact_ready(&outcome.final_path));
        assert_eq!(outcome.final_path.extension().unwrap(), "mp3");
    }

    #[test]
    fn test_build_request_uses_config_defaults() {
        let fx = fixture();
        let pipeline = Pipeline::with_components(
            fx.config.clone(),
            Box::new(MockDownloader::new()),
            Box::new(MockTranscriber::new()),
            Box::new(MockTextTranslator::new()),
            Box::new(MockMediaProcessorTrait::new()),
        );

        let req = pipeline.build_request(
            "https://youtu.be/xyz?t=10",
            JobMode::Video,
            Some(VideoQuality::P1080),
            Some("ja".to_string()),
            None,
            None,
        );
        assert_eq!(req.url, "https://youtu.be/xyz");
        assert_eq!(req.quality, VideoQuality::P1080);
        assert_eq!(req.language, "ja");
        assert_eq!(req.model, "small");
        assert_eq!(req.output_dir, fx.output_dir);
    }
}
