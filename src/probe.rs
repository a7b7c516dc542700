//! Audio duration probing via ffprobe.

use std::path::Path;
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::tool::run_tool;

/// Read the exact duration of an audio file, in seconds.
pub(crate) async fn audio_duration(audio_path: &Path) -> Result<f64> {
    let args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "default=noprint_wrappers=1:nokey=1".to_string(),
        audio_path.to_string_lossy().to_string(),
    ];

    let output = run_tool("ffprobe", &args).await.map_err(|e| {
        error!("ffprobe failed: {}", e);
        e
    })?;

    let duration = output.stdout.trim().parse::<f64>().map_err(|_| {
        error!("Could not parse ffprobe duration output: {:?}", output.stdout);
        Error::DurationParse(output.stdout.clone())
    })?;

    info!("Audio duration: {:.2} seconds", duration);
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn garbage_file_fails() {
        // Either ffprobe is absent, rejects the file, or emits nothing
        // parseable as a duration; a bare text file is never valid audio.
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("not-audio.mp3");
        std::fs::write(&fake, b"plain text").unwrap();

        let err = audio_duration(&fake).await.unwrap_err();
        assert!(matches!(
            err,
            Error::ToolNotFound(_) | Error::ToolFailed { .. } | Error::DurationParse(_)
        ));
    }
}
