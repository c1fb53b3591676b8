use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, SubburnError};
use super::{MediaCommandBuilder, MediaProcessorTrait, ProcessRunner};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
    runner: ProcessRunner,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path, &config.probe_path);
        let runner = ProcessRunner::new(MediaCommandBuilder::new(
            &config.binary_path,
            &config.probe_path,
        ));

        Self {
            config,
            command_builder,
            runner,
        }
    }
}

/// Absolute form of `path`; only the parent has to exist.
fn absolute(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.canonicalize()?);
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| SubburnError::Media(format!("Invalid path: {}", path.display())))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.canonicalize()?,
        _ => std::env::current_dir()?,
    };
    Ok(parent.join(file_name))
}

/// `path` relative to `base`, with forward slashes.
fn relative_posix(path: &Path, base: &Path) -> Result<String> {
    let relative = pathdiff::diff_paths(path, base).ok_or_else(|| {
        SubburnError::Media(format!(
            "Cannot express {} relative to {}",
            path.display(),
            base.display()
        ))
    })?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();

    Ok(parts.join("/"))
}

/// Working directory and relative names for one invocation.
///
/// Commands run from the video's directory so the paths handed to the
/// filter expression are short relative names without characters that
/// would need escaping.
struct Workspace {
    dir: PathBuf,
    video: PathBuf,
}

impl Workspace {
    fn for_video(video_path: &Path) -> Result<Self> {
        let video = absolute(video_path)?;
        let dir = video
            .parent()
            .ok_or_else(|| SubburnError::Media(format!("Invalid video path: {}", video.display())))?
            .to_path_buf();
        Ok(Self { dir, video })
    }

    fn relative(&self, path: &Path) -> Result<String> {
        relative_posix(&absolute(path)?, &self.dir)
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()> {
        info!("Extracting audio from {} to {}", video_path.display(), audio_path.display());

        let workspace = Workspace::for_video(video_path)?;
        let command = self.command_builder.extract_audio(
            &workspace.relative(&workspace.video)?,
            &workspace.relative(audio_path)?,
            self.config.channels,
            self.config.sample_rate,
        );

        self.runner
            .run(&command, &workspace.video, Some(&workspace.dir))
            .await?;

        info!("Audio extraction completed");
        Ok(())
    }

    async fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        style_params: &str,
        output_path: &Path,
    ) -> Result<()> {
        info!(
            "Burning subtitles from {} into {} -> {}",
            subtitle_path.display(),
            video_path.display(),
            output_path.display()
        );

        let workspace = Workspace::for_video(video_path)?;
        let command = self.command_builder.burn_subtitles(
            &workspace.relative(&workspace.video)?,
            &workspace.relative(subtitle_path)?,
            style_params,
            &workspace.relative(output_path)?,
            &self.config.subtitle_options,
        );

        self.runner
            .run(&command, &workspace.video, Some(&workspace.dir))
            .await?;

        info!("Subtitle burn-in completed successfully");
        Ok(())
    }

    async fn check_availability(&self) -> Result<()> {
        let command = self.command_builder.version_check();
        debug!("Checking media processor: {:?}", command.command_line());

        let output = command
            .to_command(None)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SubburnError::Media(format!("Media processor not found: {}", e)))?;

        if output.status.success() {
            info!("Media processor is available");
            Ok(())
        } else {
            Err(SubburnError::Media("Media processor version check failed".to_string()))
        }
    }
}
