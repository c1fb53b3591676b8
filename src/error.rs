use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubburnError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported language '{code}'. Supported codes: {supported}")]
    UnsupportedLanguage { code: String, supported: String },

    #[error("No translation model for '{from}' -> '{to}'. Supported codes: {supported}")]
    UnsupportedLanguagePair {
        from: String,
        to: String,
        supported: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Style configuration error: {0}")]
    Style(String),

    #[error("Transcription error: {0}")]
    Transcriber(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("{0}")]
    Process(ProcessFailure),
}

pub type Result<T> = std::result::Result<T, SubburnError>;

/// Record of an external command that exited with a non-zero status.
///
/// The captured output is kept verbatim and in arrival order so the
/// operator can see exactly what the tool printed before it gave up.
#[derive(Debug, Clone)]
pub struct ProcessFailure {
    pub description: String,
    pub command: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub exit_code: i32,
    pub output: Vec<String>,
}

impl ProcessFailure {
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }

    pub fn output_text(&self) -> String {
        self.output.join("\n")
    }
}

impl fmt::Display for ProcessFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed with exit code {}: {}",
            self.description,
            self.exit_code,
            self.command_line()
        )
    }
}
