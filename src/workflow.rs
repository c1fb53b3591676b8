use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Result, SubburnError};
use crate::language::Language;
use crate::media::{MediaProcessorFactory, MediaProcessorTrait};
use crate::style::{StyleConfig, StyleResolver};
use crate::subtitle::generate_srt;
use crate::transcribe::{Segment, TranscriberFactory, TranscriberTrait};
use crate::translate::{ModelTable, Translator, TranslatorFactory, translate_segments};

/// One invocation of the pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineRequest {
    pub video_path: PathBuf,
    /// Existing subtitle file; when set only the burn-in stage runs
    pub subtitle_path: Option<PathBuf>,
    pub target_language: Option<Language>,
    /// Expected source language, enabling the pair check before any work
    pub source_language: Option<Language>,
    pub style: Option<StyleConfig>,
}

impl PipelineRequest {
    /// Check the input files exist; an existing subtitle selects burn-only.
    pub fn check_inputs(&self) -> Result<PipelineMode> {
        if !self.video_path.is_file() {
            return Err(SubburnError::FileNotFound(format!(
                "Video file not found at {}",
                self.video_path.display()
            )));
        }

        match &self.subtitle_path {
            Some(subtitle_path) if !subtitle_path.is_file() => Err(SubburnError::FileNotFound(format!(
                "Provided subtitle file not found at {}",
                subtitle_path.display()
            ))),
            Some(_) => Ok(PipelineMode::BurnOnly),
            None => Ok(PipelineMode::FullPipeline),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    FullPipeline,
    BurnOnly,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub mode: PipelineMode,
    pub output_path: PathBuf,
    pub subtitle_path: PathBuf,
    /// Language of the burned subtitles; unknown in burn-only mode
    pub language: Option<String>,
    pub translated: bool,
}

/// Artifact names derived from the video
struct VideoPaths {
    dir: PathBuf,
    stem: String,
}

impl VideoPaths {
    fn new(video_path: &Path) -> Result<Self> {
        let stem = video_path
            .file_stem()
            .ok_or_else(|| SubburnError::Config("Invalid video filename".to_string()))?
            .to_string_lossy()
            .to_string();
        let dir = video_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        Ok(Self { dir, stem })
    }

    fn audio(&self) -> PathBuf {
        self.dir.join(format!("{}_audio.wav", self.stem))
    }

    fn subtitle(&self, language: &str) -> PathBuf {
        self.dir.join(format!("{}.{}.srt", self.stem, language))
    }

    fn output(&self, language: Option<&str>) -> PathBuf {
        match language {
            Some(language) => self.dir.join(format!("{}_subtitled_{}.mp4", self.stem, language)),
            None => self.dir.join(format!("{}_subtitled.mp4", self.stem)),
        }
    }
}

pub struct Workflow {
    config: Config,
    transcriber: Box<dyn TranscriberTrait>,
    translator: Box<dyn Translator>,
    media: Box<dyn MediaProcessorTrait>,
    styles: StyleResolver,
    models: ModelTable,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let transcriber = TranscriberFactory::create_default(config.transcriber.clone());
        let translator = TranslatorFactory::create_translator(config.translate.clone())?;
        let media = MediaProcessorFactory::create_processor(config.media.clone());

        Self::with_components(config, transcriber, translator, media)
    }

    pub fn with_components(
        config: Config,
        transcriber: Box<dyn TranscriberTrait>,
        translator: Box<dyn Translator>,
        media: Box<dyn MediaProcessorTrait>,
    ) -> Result<Self> {
        config.validate()?;
        let models = ModelTable::from_config(&config.translate)?;
        let styles = StyleResolver::new(config.media.fonts_dir.clone());

        Ok(Self {
            config,
            transcriber,
            translator,
            media,
            styles,
            models,
        })
    }

    /// Check everything that can be checked before an external process runs.
    fn validate(&self, request: &PipelineRequest) -> Result<PipelineMode> {
        if request.check_inputs()? == PipelineMode::BurnOnly {
            return Ok(PipelineMode::BurnOnly);
        }

        if let Some(target) = request.target_language {
            self.models.check_target(target, request.source_language)?;
        }

        Ok(PipelineMode::FullPipeline)
    }

    /// Run the pipeline for one video
    pub async fn run(&self, request: &PipelineRequest) -> Result<PipelineOutcome> {
        let mode = self.validate(request)?;
        let paths = VideoPaths::new(&request.video_path)?;

        self.media.check_availability().await?;

        match (mode, &request.subtitle_path) {
            (PipelineMode::BurnOnly, Some(subtitle_path)) => {
                self.burn_only(request, &paths, subtitle_path).await
            }
            _ => self.full_pipeline(request, &paths).await,
        }
    }

    async fn burn_only(
        &self,
        request: &PipelineRequest,
        paths: &VideoPaths,
        subtitle_path: &Path,
    ) -> Result<PipelineOutcome> {
        info!("Subtitle file provided. Skipping transcription and burning subtitles directly...");

        let output_path = paths.output(None);
        let style_params = self.styles.resolve(request.style.as_ref(), None);
        self.media
            .burn_subtitles(&request.video_path, subtitle_path, &style_params, &output_path)
            .await?;

        Ok(PipelineOutcome {
            mode: PipelineMode::BurnOnly,
            output_path,
            subtitle_path: subtitle_path.to_path_buf(),
            language: None,
            translated: false,
        })
    }

    async fn full_pipeline(
        &self,
        request: &PipelineRequest,
        paths: &VideoPaths,
    ) -> Result<PipelineOutcome> {
        let audio_path = paths.audio();

        info!("Step 1: Extracting audio...");
        self.media.extract_audio(&request.video_path, &audio_path).await?;

        info!("Step 2: Transcribing audio...");
        let transcription = self.transcriber.transcribe(&audio_path).await?;
        info!(
            "Detected language '{}' with probability {:.2}",
            transcription.language, transcription.confidence
        );

        let (segments, language, translated) = match request.target_language {
            Some(target) if target.code() != transcription.language => {
                let (source, model) = self.models.resolve(&transcription.language, target)?;
                info!("Step 3: Translating from '{}' to '{}' with {}...", source, target, model);
                let segments = translate_segments(
                    self.translator.as_ref(),
                    &transcription.segments,
                    source,
                    target,
                    self.config.translate.batch_size,
                )
                .await?;
                (segments, target.code().to_string(), true)
            }
            _ => {
                info!("Step 3: Skipping translation.");
                (transcription.segments, transcription.language, false)
            }
        };

        let subtitle_path = paths.subtitle(&language);
        info!("Step 4: Writing subtitles to '{}'...", subtitle_path.display());
        write_subtitles(&segments, &subtitle_path).await?;

        info!("Step 5: Burning subtitles into video...");
        let output_path = paths.output(Some(&language));
        let style_params = self.styles.resolve(request.style.as_ref(), Some(&language));
        self.media
            .burn_subtitles(&request.video_path, &subtitle_path, &style_params, &output_path)
            .await?;

        if let Err(e) = fs::remove_file(&audio_path).await {
            warn!("Failed to remove intermediate audio {}: {}", audio_path.display(), e);
        }

        Ok(PipelineOutcome {
            mode: PipelineMode::FullPipeline,
            output_path,
            subtitle_path,
            language: Some(language),
            translated,
        })
    }
}

async fn write_subtitles(segments: &[Segment], path: &Path) -> Result<()> {
    if segments.is_empty() {
        warn!("No speech segments recognized; writing an empty subtitle file");
    }
    generate_srt(segments, path).await
}
