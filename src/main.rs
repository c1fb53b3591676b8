use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use tracing::{info, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subburn::cli::Args;
use subburn::config::Config;
use subburn::error::{ProcessFailure, SubburnError};
use subburn::language::Language;
use subburn::style::StyleConfig;
use subburn::workflow::{PipelineMode, PipelineRequest, Workflow};

const DEFAULT_CONFIG_FILE: &str = "subburn.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.languages {
        println!("Supported languages:");
        for lang in Language::ALL {
            println!("  {:<4} {}", lang.code(), lang.name());
        }
        return Ok(());
    }

    // Nothing is written to disk until the arguments check out
    let verbose = args.verbose;
    let (config, request) = prepare(args)?;
    let guard = setup_logging(verbose)?;

    let result = run(config, request).await;
    if let Err(e) = &result {
        if let Some(SubburnError::Process(failure)) = e.downcast_ref::<SubburnError>() {
            print_process_failure(failure);
            drop(guard);
            std::process::exit(1);
        }
    }
    result
}

/// Load configuration and style, parse languages and check the input files.
fn prepare(args: Args) -> Result<(Config, PipelineRequest)> {
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };

    let style = match &args.style {
        Some(style_path) => Some(
            StyleConfig::from_file(style_path)
                .with_context(|| format!("Failed to load style file {}", style_path.display()))?,
        ),
        None => None,
    };

    // The command line wins over the style file
    let target_language = match &args.target_language {
        Some(code) => Some(Language::from_code(code)?),
        None => style.as_ref().and_then(|style| style.target_language),
    };
    let source_language = args
        .source_language
        .as_deref()
        .map(Language::from_code)
        .transpose()?;

    let video_path = args.video.context("A video file is required")?;

    let request = PipelineRequest {
        video_path,
        subtitle_path: args.subtitle,
        target_language,
        source_language,
        style,
    };
    request.check_inputs()?;

    Ok((config, request))
}

async fn run(config: Config, request: PipelineRequest) -> Result<()> {
    let workflow = Workflow::new(config)?;
    let outcome = workflow.run(&request).await?;

    match outcome.mode {
        PipelineMode::BurnOnly => println!("Subtitles burned into {}", outcome.output_path.display()),
        PipelineMode::FullPipeline => {
            println!("Subtitles written to {}", outcome.subtitle_path.display());
            println!("Output video: {}", outcome.output_path.display());
        }
    }

    info!("subburn completed successfully");
    Ok(())
}

fn print_process_failure(failure: &ProcessFailure) {
    eprintln!("Error: {} failed.", failure.description);
    eprintln!("Command: {}", failure.command_line());
    if let Some(dir) = &failure.working_dir {
        eprintln!("Working directory: {}", dir.display());
    }
    eprintln!("Return code: {}", failure.exit_code);
    eprintln!("Output:\n{}", failure.output_text());
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<WorkerGuard> {
    let log_dir = std::env::current_dir()?.join(".subburn").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "subburn.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("subburn.log").display()
    );

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("subburn").chain(extra.iter().copied())).unwrap()
    }

    #[test]
    fn test_prepare_rejects_bad_invocations() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        let video_arg = video.to_string_lossy().to_string();

        let err = prepare(args(&[&video_arg])).unwrap_err();
        assert!(matches!(err.downcast_ref::<SubburnError>(), Some(SubburnError::FileNotFound(_))));

        std::fs::write(&video, b"video").unwrap();
        let err = prepare(args(&[&video_arg, "-t", "xx"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SubburnError>(),
            Some(SubburnError::UnsupportedLanguage { .. })
        ));

        let missing_subtitle = dir.path().join("clip.srt").to_string_lossy().to_string();
        assert!(prepare(args(&[&video_arg, &missing_subtitle])).is_err());
    }

    #[test]
    fn test_prepare_takes_target_from_style_file() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"video").unwrap();
        let style = dir.path().join("style.json");
        std::fs::write(&style, r#"{"target_language": "ar"}"#).unwrap();

        let video_arg = video.to_string_lossy().to_string();
        let style_arg = style.to_string_lossy().to_string();

        let (_, request) = prepare(args(&[&video_arg, "--style", &style_arg])).unwrap();
        assert_eq!(request.target_language, Some(Language::Arabic));

        let (_, request) = prepare(args(&[&video_arg, "--style", &style_arg, "-t", "en"])).unwrap();
        assert_eq!(request.target_language, Some(Language::English));
    }
}
