use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::codec::seconds_to_timestamp;
use crate::error::Result;
use crate::transcribe::Segment;

/// Render segments as an SRT document
pub fn render_srt(segments: &[Segment]) -> String {
    let mut srt_content = String::new();

    for (index, segment) in segments.iter().enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            seconds_to_timestamp(segment.start),
            seconds_to_timestamp(segment.end),
            segment.text.trim()
        ));
    }

    srt_content
}

/// Generate SRT subtitle file from segments
pub async fn generate_srt<P: AsRef<Path>>(segments: &[Segment], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating SRT file: {}", output_path.display());

    fs::write(output_path, render_srt(segments)).await?;

    info!("SRT file generated with {} entries", segments.len());
    Ok(())
}
