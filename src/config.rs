use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use crate::error::{Result, SubburnError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transcriber: TranscriberConfig,
    pub translate: TranslateConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Path to the whisper command line tool
    pub binary_path: String,
    /// Model passed to `--model`
    pub model: String,
    /// Extra arguments appended to every invocation
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Base URL of the inference endpoint; the model identifier is appended
    pub endpoint: String,
    /// Environment variable holding the bearer token, if any
    pub api_token_env: String,
    /// Number of segments sent per request
    pub batch_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Extra or overriding model identifiers keyed by `"src-tgt"`
    pub models: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary, used for progress reference durations
    pub probe_path: String,
    /// Sample rate of the extracted audio
    pub sample_rate: u32,
    /// Channel count of the extracted audio
    pub channels: u32,
    /// Directory with the bundled RTL typeface, relative to the video
    pub fonts_dir: String,
    /// Additional encoding options for subtitle burn-in
    /// Common options: ["-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p"]
    pub subtitle_options: Vec<String>,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            binary_path: "whisper".to_string(),
            model: "small".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            api_token_env: "HF_TOKEN".to_string(),
            batch_size: 8,
            timeout_secs: 300,
            models: BTreeMap::new(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            binary_path: "ffmpeg".to_string(),
            probe_path: "ffprobe".to_string(),
            sample_rate: 16000,
            channels: 1,
            fonts_dir: ".".to_string(),
            subtitle_options: vec![
                // "-preset".to_string(), "medium".to_string(),
                // "-crf".to_string(), "23".to_string(),
            ],
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SubburnError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| SubburnError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.translate.batch_size == 0 {
            return Err(SubburnError::Config("translate.batch_size must be at least 1".to_string()));
        }
        if self.media.channels == 0 || self.media.sample_rate == 0 {
            return Err(SubburnError::Config(
                "media.channels and media.sample_rate must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subburn.toml");
        std::fs::write(
            &path,
            "[translate]\nbatch_size = 4\n\n[translate.models]\n\"en-ja\" = \"custom/en-ja\"\n\n[media]\nbinary_path = \"/opt/ffmpeg\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.translate.batch_size, 4);
        assert_eq!(config.translate.models.get("en-ja").unwrap(), "custom/en-ja");
        assert_eq!(config.media.binary_path, "/opt/ffmpeg");
        assert_eq!(config.media.probe_path, "ffprobe");
        assert_eq!(config.media.sample_rate, 16000);
        assert_eq!(config.transcriber.model, "small");
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subburn.toml");
        std::fs::write(&path, "[translate]\nbatch_size = 0\n").unwrap();

        assert!(matches!(Config::from_file(&path), Err(SubburnError::Config(_))));
    }

    #[test]
    fn test_written_file_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subburn.toml");

        let mut config = Config::default();
        config.media.fonts_dir = "fonts".to_string();
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let reloaded = Config::from_file(&path).unwrap();
        assert_eq!(reloaded.media.fonts_dir, "fonts");
        assert_eq!(reloaded.translate.batch_size, 8);
    }
}
