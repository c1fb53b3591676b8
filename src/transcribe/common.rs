use serde::{Deserialize, Serialize};

/// A timed span of recognized or translated speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn new<S: Into<String>>(start: f64, end: f64, text: S) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Same timing, different text
    pub fn with_text<S: Into<String>>(&self, text: S) -> Self {
        Self {
            start: self.start,
            end: self.end,
            text: text.into(),
        }
    }
}

/// Output of one recognition run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub segments: Vec<Segment>,
    /// Detected language code as reported by the engine
    pub language: String,
    /// Detection confidence in `[0, 1]`
    pub confidence: f32,
}
