use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::TranscriberConfig;
use crate::error::{Result, SubburnError};
use super::{Segment, TranscriberTrait, Transcription};

/// JSON document written by `whisper --output_format json`
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    segments: Vec<WhisperSegment>,
    language: Option<String>,
    language_probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
    avg_logprob: Option<f64>,
}

/// Map the whisper JSON document onto a [`Transcription`].
///
/// Confidence comes from `language_probability` when the tool reports it,
/// otherwise from the mean segment probability.
pub fn parse_whisper_json(content: &str) -> Result<Transcription> {
    let output: WhisperOutput = serde_json::from_str(content)
        .map_err(|e| SubburnError::Transcriber(format!("Failed to parse whisper JSON: {}", e)))?;

    let language = output
        .language
        .map(|lang| lang.trim().to_lowercase())
        .filter(|lang| !lang.is_empty())
        .ok_or_else(|| SubburnError::Transcriber("Whisper did not report a language".to_string()))?;

    let confidence = match output.language_probability {
        Some(p) => p,
        None => {
            let probs: Vec<f64> = output
                .segments
                .iter()
                .filter_map(|seg| seg.avg_logprob.map(f64::exp))
                .collect();
            if probs.is_empty() {
                0.0
            } else {
                probs.iter().sum::<f64>() / probs.len() as f64
            }
        }
    };

    let segments = output
        .segments
        .into_iter()
        .map(|seg| Segment::new(seg.start.max(0.0), seg.end.max(seg.start), seg.text.trim()))
        .collect();

    Ok(Transcription {
        segments,
        language,
        confidence: confidence.clamp(0.0, 1.0) as f32,
    })
}

/// Recognition through the whisper command line tool
pub struct WhisperTranscriber {
    config: TranscriberConfig,
}

impl WhisperTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TranscriberTrait for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription> {
        info!("Transcribing {} with model {}", audio_path.display(), self.config.model);

        let temp_dir = tempfile::tempdir()
            .map_err(|e| SubburnError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let output_dir = temp_dir.path();

        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg(audio_path)
            .arg("--model").arg(&self.config.model)
            .arg("--output_format").arg("json")
            .arg("--output_dir").arg(output_dir)
            .args(&self.config.extra_args)
            .stdin(Stdio::null());

        debug!("Executing whisper command: {:?}", cmd);

        let output = cmd.output().await.map_err(|e| {
            SubburnError::Transcriber(format!("Failed to execute {}: {}", self.config.binary_path, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubburnError::Transcriber(format!("Whisper failed: {}", stderr)));
        }

        let audio_stem = audio_path
            .file_stem()
            .ok_or_else(|| SubburnError::Transcriber("Invalid audio filename".to_string()))?;
        let json_file = output_dir.join(format!("{}.json", audio_stem.to_string_lossy()));

        let json_content = tokio::fs::read_to_string(&json_file)
            .await
            .map_err(|e| SubburnError::Transcriber(format!("Failed to read output: {}", e)))?;

        let transcription = parse_whisper_json(&json_content)?;
        info!(
            "Detected language '{}' with probability {:.2}, {} segments",
            transcription.language,
            transcription.confidence,
            transcription.segments.len()
        );

        Ok(transcription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_language_probability() {
        let json = r#"{
            "text": " Hello. World.",
            "language": "en",
            "language_probability": 0.97,
            "segments": [
                {"id": 0, "start": 0.0, "end": 1.5, "text": " Hello.", "avg_logprob": -0.2},
                {"id": 1, "start": 1.5, "end": 3.0, "text": " World.", "avg_logprob": -0.4}
            ]
        }"#;

        let transcription = parse_whisper_json(json).unwrap();
        assert_eq!(transcription.language, "en");
        assert!((transcription.confidence - 0.97).abs() < 1e-6);
        assert_eq!(
            transcription.segments,
            vec![Segment::new(0.0, 1.5, "Hello."), Segment::new(1.5, 3.0, "World.")]
        );
    }

    #[test]
    fn test_confidence_falls_back_to_segment_probabilities() {
        let json = r#"{"language": "he", "segments": [
            {"start": 0.0, "end": 1.0, "text": "a", "avg_logprob": 0.0},
            {"start": 1.0, "end": 2.0, "text": "b", "avg_logprob": 0.0}
        ]}"#;

        let transcription = parse_whisper_json(json).unwrap();
        assert_eq!(transcription.language, "he");
        assert!((transcription.confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_language_is_an_error() {
        let err = parse_whisper_json(r#"{"segments": []}"#).unwrap_err();
        assert!(matches!(err, SubburnError::Transcriber(_)));
    }

    #[test]
    fn test_empty_transcription_has_zero_confidence() {
        let transcription = parse_whisper_json(r#"{"language": "EN", "segments": []}"#).unwrap();
        assert_eq!(transcription.language, "en");
        assert!(transcription.segments.is_empty());
        assert_eq!(transcription.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_missing_binary_is_transcriber_error() {
        let transcriber = WhisperTranscriber::new(TranscriberConfig {
            binary_path: "/nonexistent/whisper".to_string(),
            ..TranscriberConfig::default()
        });

        let err = transcriber.transcribe(Path::new("clip_audio.wav")).await.unwrap_err();
        assert!(matches!(err, SubburnError::Transcriber(_)));
    }
}
