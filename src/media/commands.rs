use std::path::Path;
use tokio::process::Command;

/// Abstract media processing command representation
#[derive(Debug, Clone, PartialEq)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Add input file
    pub fn input<S: Into<String>>(self, path: S) -> Self {
        self.arg("-i").arg(path)
    }

    /// Add output file
    pub fn output<S: Into<String>>(self, path: S) -> Self {
        self.arg(path)
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Set audio sample rate
    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.arg("-ar").arg(rate.to_string())
    }

    /// Set audio channels
    pub fn audio_channels(self, channels: u32) -> Self {
        self.arg("-ac").arg(channels.to_string())
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }

    /// Program followed by its arguments, as recorded in diagnostics
    pub fn command_line(&self) -> Vec<String> {
        std::iter::once(self.binary_path.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Build the process, optionally pinned to a working directory
    pub fn to_command(&self, working_dir: Option<&Path>) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(&self.args);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Builder for the transcoding tool invocations the pipeline needs.
///
/// Paths are taken as already-relative strings: callers run these commands
/// from the video's directory so the filter syntax never sees an absolute
/// path with characters it would need escaped.
pub struct MediaCommandBuilder {
    binary_path: String,
    probe_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, probe_path: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            probe_path: probe_path.into(),
        }
    }

    /// Build subtitle burn-in command
    pub fn burn_subtitles(
        &self,
        video: &str,
        subtitle: &str,
        style_params: &str,
        output: &str,
        additional_options: &[String],
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Burning subtitles")
            .overwrite()
            .input(video)
            .video_filter(format!("subtitles=filename='{}':{}", subtitle, style_params))
            .copy_audio()
            .args(additional_options.iter().cloned())
            .output(output)
    }

    /// Build audio extraction command
    pub fn extract_audio(
        &self,
        video: &str,
        audio: &str,
        channels: u32,
        sample_rate: u32,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Extracting audio")
            .overwrite()
            .input(video)
            .audio_channels(channels)
            .audio_sample_rate(sample_rate)
            .output(audio)
    }

    /// Build duration probe command; prints the duration in seconds on stdout
    pub fn probe_duration(&self, media: &Path) -> MediaCommand {
        MediaCommand::new(&self.probe_path, "Probing duration")
            .args(["-v", "error", "-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(media.to_string_lossy().to_string())
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").arg("-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> MediaCommandBuilder {
        MediaCommandBuilder::new("ffmpeg", "ffprobe")
    }

    #[test]
    fn test_extract_audio_command() {
        let cmd = builder().extract_audio("clip.mp4", "clip_audio.wav", 1, 16000);
        assert_eq!(
            cmd.command_line(),
            vec!["ffmpeg", "-y", "-i", "clip.mp4", "-ac", "1", "-ar", "16000", "clip_audio.wav"]
        );
        assert_eq!(cmd.description, "Extracting audio");
    }

    #[test]
    fn test_burn_subtitles_command() {
        let options = vec!["-crf".to_string(), "23".to_string()];
        let cmd = builder().burn_subtitles(
            "clip.mp4",
            "clip.en.srt",
            "charenc=UTF-8:force_style='FontSize=20'",
            "clip_subtitled_en.mp4",
            &options,
        );

        assert_eq!(
            cmd.command_line(),
            vec![
                "ffmpeg",
                "-y",
                "-i",
                "clip.mp4",
                "-vf",
                "subtitles=filename='clip.en.srt':charenc=UTF-8:force_style='FontSize=20'",
                "-c:a",
                "copy",
                "-crf",
                "23",
                "clip_subtitled_en.mp4",
            ]
        );
    }

    #[test]
    fn test_probe_duration_command() {
        let cmd = builder().probe_duration(Path::new("/videos/clip.mp4"));
        assert_eq!(cmd.binary_path, "ffprobe");
        assert_eq!(cmd.args.last().unwrap(), "/videos/clip.mp4");
        assert!(cmd.args.contains(&"format=duration".to_string()));
    }
}
