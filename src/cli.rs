use clap::Parser;
use std::path::PathBuf;

use crate::language::Language;

fn languages_help() -> String {
    format!("Supported languages:\n{}", Language::describe_all())
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, after_help = languages_help())]
pub struct Args {
    /// Input video file
    #[arg(required_unless_present = "languages")]
    pub video: Option<PathBuf>,

    /// Existing subtitle file; only burns it into the video
    pub subtitle: Option<PathBuf>,

    /// Target language code for the subtitles (e.g. en, ar, he)
    #[arg(short = 't', long)]
    pub target_language: Option<String>,

    /// Expected source language code, checked against the target before processing
    #[arg(long)]
    pub source_language: Option<String>,

    /// JSON file with subtitle style settings
    #[arg(long)]
    pub style: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// List supported languages and exit
    #[arg(long)]
    pub languages: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_pipeline_arguments() {
        let args = Args::try_parse_from([
            "subburn",
            "clip.mp4",
            "-t",
            "ar",
            "--source-language",
            "en",
            "--style",
            "style.json",
        ])
        .unwrap();

        assert_eq!(args.video, Some(PathBuf::from("clip.mp4")));
        assert_eq!(args.subtitle, None);
        assert_eq!(args.target_language.as_deref(), Some("ar"));
        assert_eq!(args.source_language.as_deref(), Some("en"));
        assert_eq!(args.style, Some(PathBuf::from("style.json")));
    }

    #[test]
    fn test_burn_only_arguments() {
        let args = Args::try_parse_from(["subburn", "clip.mp4", "clip.srt"]).unwrap();
        assert_eq!(args.subtitle, Some(PathBuf::from("clip.srt")));
        assert!(!args.verbose);
    }

    #[test]
    fn test_video_is_required_unless_listing_languages() {
        assert!(Args::try_parse_from(["subburn"]).is_err());
        let args = Args::try_parse_from(["subburn", "--languages"]).unwrap();
        assert!(args.languages);
    }
}
