use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{ProcessFailure, Result, SubburnError};
use super::{MediaCommand, MediaCommandBuilder};

/// Status lines of the transcoding tool report progress as `time=HH:MM:SS.ff`.
static PROGRESS_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"time=(\d{2}):(\d{2}):(\d{2})\.(\d{2})").expect("progress time pattern is valid")
});

const READ_CHUNK: usize = 4096;

/// Outcome of an external command that exited successfully
#[derive(Debug, Clone)]
pub struct ProcessRecord {
    pub command: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub output: Vec<String>,
    pub exit_code: i32,
}

/// Whole seconds from the first `time=` marker in a status line.
/// The hundredths field must be present but is not used.
pub fn parse_progress_time(line: &str) -> Option<u64> {
    let caps = PROGRESS_TIME.captures(line)?;
    let hours: u64 = caps[1].parse().ok()?;
    let minutes: u64 = caps[2].parse().ok()?;
    let seconds: u64 = caps[3].parse().ok()?;
    Some(hours * 3600 + minutes * 60 + seconds)
}

/// Tracks the furthest timestamp seen so far.
///
/// Only forward movement is reported; repeated or earlier timestamps
/// leave the counter untouched.
#[derive(Debug, Default)]
pub struct ElapsedTracker {
    elapsed: u64,
}

impl ElapsedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the positive delta to advance the indicator by, if any.
    pub fn observe(&mut self, line: &str) -> Option<u64> {
        let current = parse_progress_time(line)?;
        if current > self.elapsed {
            let delta = current - self.elapsed;
            self.elapsed = current;
            Some(delta)
        } else {
            None
        }
    }
}

/// Splits a byte stream into lines on `\n`, `\r` or `\r\n`.
///
/// The transcoding tool rewrites its status line in place with bare
/// carriage returns, so `\r` has to end a line too.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
    last_was_cr: bool,
}

impl LineSplitter {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in bytes {
            match byte {
                b'\n' if self.last_was_cr => {
                    self.last_was_cr = false;
                }
                b'\n' | b'\r' => {
                    self.last_was_cr = byte == b'\r';
                    lines.push(String::from_utf8_lossy(&self.pending).into_owned());
                    self.pending.clear();
                }
                _ => {
                    self.last_was_cr = false;
                    self.pending.push(byte);
                }
            }
        }
        lines
    }

    /// Flush a trailing line without terminator.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(line)
    }
}

/// Forward lines from both output pipes, in arrival order, until both close.
async fn pump_output<O, E>(
    mut stdout: O,
    mut stderr: E,
    lines: mpsc::UnboundedSender<String>,
) -> io::Result<()>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut out_buf = [0u8; READ_CHUNK];
    let mut err_buf = [0u8; READ_CHUNK];
    let mut out_lines = LineSplitter::default();
    let mut err_lines = LineSplitter::default();
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_buf), if out_open => {
                let n = read?;
                if n == 0 {
                    out_open = false;
                    if let Some(line) = out_lines.finish() {
                        let _ = lines.send(line);
                    }
                } else {
                    for line in out_lines.push(&out_buf[..n]) {
                        let _ = lines.send(line);
                    }
                }
            }
            read = stderr.read(&mut err_buf), if err_open => {
                let n = read?;
                if n == 0 {
                    err_open = false;
                    if let Some(line) = err_lines.finish() {
                        let _ = lines.send(line);
                    }
                } else {
                    for line in err_lines.push(&err_buf[..n]) {
                        let _ = lines.send(line);
                    }
                }
            }
        }
    }

    Ok(())
}

fn exit_code(status: std::process::ExitStatus) -> i32 {
    // Signal-terminated children have no code
    status.code().unwrap_or(-1)
}

fn spawn_error(command: &MediaCommand, e: io::Error) -> SubburnError {
    SubburnError::Media(format!("Failed to execute {}: {}", command.binary_path, e))
}

/// Runs external commands, driving a progress bar from their status output
/// when the reference media duration is known.
pub struct ProcessRunner {
    builder: MediaCommandBuilder,
}

impl ProcessRunner {
    pub fn new(builder: MediaCommandBuilder) -> Self {
        Self { builder }
    }

    /// Duration of `media` in seconds, or `None` if the probe fails or
    /// prints anything other than a non-negative number.
    pub async fn probe_duration(&self, media: &Path) -> Option<f64> {
        let probe = self.builder.probe_duration(media);
        debug!("Probing duration: {:?}", probe.command_line());

        let output = match probe.to_command(None).stdin(Stdio::null()).output().await {
            Ok(output) => output,
            Err(e) => {
                warn!("Could not run duration probe {}: {}", probe.binary_path, e);
                return None;
            }
        };

        if !output.status.success() {
            warn!("Duration probe failed for {}", media.display());
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match stdout.trim().parse::<f64>() {
            Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Some(seconds),
            _ => {
                warn!("Could not determine duration of {}", media.display());
                None
            }
        }
    }

    /// Run `command` with progress measured against `reference`'s duration.
    ///
    /// When the duration is unknown the command still runs to completion,
    /// just without a progress bar. Either way a non-zero exit is returned
    /// as [`SubburnError::Process`] carrying every captured output line.
    pub async fn run(
        &self,
        command: &MediaCommand,
        reference: &Path,
        working_dir: Option<&Path>,
    ) -> Result<ProcessRecord> {
        match self.probe_duration(reference).await {
            Some(duration) => {
                let progress = progress_bar(duration, &command.description);
                let result = self.run_streaming(command, working_dir, &progress).await;
                match &result {
                    Ok(_) => progress.finish(),
                    Err(_) => progress.abandon(),
                }
                result
            }
            None => self.run_blocking(command, working_dir).await,
        }
    }

    /// Stream the merged output line by line, advancing `progress` by each
    /// forward step of the reported time.
    pub async fn run_streaming(
        &self,
        command: &MediaCommand,
        working_dir: Option<&Path>,
        progress: &ProgressBar,
    ) -> Result<ProcessRecord> {
        info!("{}", command.description);
        self.capture(command, working_dir, Some(progress)).await
    }

    /// Run to completion without progress, still capturing the output.
    pub async fn run_blocking(
        &self,
        command: &MediaCommand,
        working_dir: Option<&Path>,
    ) -> Result<ProcessRecord> {
        info!("{} (no progress available)", command.description);
        self.capture(command, working_dir, None).await
    }

    /// Collect stdout and stderr as one stream of lines in arrival order.
    async fn capture(
        &self,
        command: &MediaCommand,
        working_dir: Option<&Path>,
        progress: Option<&ProgressBar>,
    ) -> Result<ProcessRecord> {
        debug!("Executing {:?} in {:?}", command.command_line(), working_dir);

        let mut child = command
            .to_command(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(command, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SubburnError::Media("Child stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SubburnError::Media("Child stderr was not captured".to_string()))?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(pump_output(stdout, stderr, tx));

        let mut tracker = ElapsedTracker::new();
        let mut output = Vec::new();
        while let Some(line) = rx.recv().await {
            if let Some(progress) = progress {
                if let Some(delta) = tracker.observe(&line) {
                    progress.inc(delta);
                }
            }
            output.push(line);
        }

        let status = child.wait().await?;
        match reader.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Reading output of {} failed: {}", command.binary_path, e),
            Err(e) => warn!("Output reader for {} panicked: {}", command.binary_path, e),
        }

        self.finish(command, working_dir, exit_code(status), output)
    }

    fn finish(
        &self,
        command: &MediaCommand,
        working_dir: Option<&Path>,
        exit_code: i32,
        output: Vec<String>,
    ) -> Result<ProcessRecord> {
        if exit_code != 0 {
            return Err(SubburnError::Process(ProcessFailure {
                description: command.description.clone(),
                command: command.command_line(),
                working_dir: working_dir.map(Path::to_path_buf),
                exit_code,
                output,
            }));
        }

        debug!("{} finished with {} output lines", command.description, output.len());
        Ok(ProcessRecord {
            command: command.command_line(),
            working_dir: working_dir.map(Path::to_path_buf),
            output,
            exit_code,
        })
    }
}

fn progress_bar(duration: f64, description: &str) -> ProgressBar {
    let pb = ProgressBar::new(duration.round() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}s ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(description.to_string());
    pb
}
