//! subburn - transcribe, translate and burn subtitles into video
//!
//! Chains audio extraction, speech recognition, optional machine
//! translation, SRT emission and styled burn-in through ffmpeg, with live
//! progress for the long-running external steps.

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod language;
pub mod media;
pub mod style;
pub mod subtitle;
pub mod transcribe;
pub mod translate;
pub mod workflow;
