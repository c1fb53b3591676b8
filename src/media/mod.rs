// Media processing architecture
//
// - Commands: builders for the transcoding tool invocations
// - Runner: progress-tracked execution of those commands
// - Processor: the pipeline-facing implementation tying both together

pub mod commands;
pub mod processor;
pub mod runner;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;
pub use runner::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Extract mono, resampled audio from a video
    async fn extract_audio(&self, video_path: &Path, audio_path: &Path) -> Result<()>;

    /// Render subtitles into the video frames
    async fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        style_params: &str,
        output_path: &Path,
    ) -> Result<()>;

    /// Check if media processor is available
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config))
    }
}
