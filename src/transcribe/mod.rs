// Speech recognition seam
//
// The pipeline only needs ordered segments plus the detected language, so
// engines plug in behind `TranscriberTrait`:
// - Whisper: the whisper command line tool with JSON output

pub mod common;
pub mod whisper;

use async_trait::async_trait;
use std::path::Path;

pub use common::*;
use crate::config::TranscriberConfig;
use crate::error::Result;

/// Main trait for transcription operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriberTrait: Send + Sync {
    /// Transcribe audio file to timed segments, detecting the language
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription>;
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    /// Create with default implementation
    pub fn create_default(config: TranscriberConfig) -> Box<dyn TranscriberTrait> {
        Box::new(whisper::WhisperTranscriber::new(config))
    }
}
