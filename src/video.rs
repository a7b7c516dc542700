//! Final video composition via ffmpeg.

use std::path::Path;
use tokio::fs;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::tool::run_tool;

const VIDEO_WIDTH: u32 = 720;
const VIDEO_HEIGHT: u32 = 1280;
const FONT_NAME: &str = "Arial-Bold";

/// Composite the background image, caption overlay, and narration audio
/// into the output MP4, trimmed to the measured duration. The temporary
/// audio file is removed once the encoder invocation has been attempted,
/// whether or not it succeeded.
pub(crate) async fn compose(
    audio_path: &Path,
    duration: f64,
    caption: &str,
    background_path: &Path,
    output_path: &Path,
) -> Result<()> {
    info!("Creating video with ffmpeg: {}", output_path.display());

    if !background_path.exists() {
        error!("Background image not found: {}", background_path.display());
        return Err(Error::BackgroundMissing(background_path.to_path_buf()));
    }

    let args = encoder_args(audio_path, duration, caption, background_path, output_path);
    let result = run_tool("ffmpeg", &args).await;

    cleanup_temp_audio(audio_path).await;

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            if let Error::ToolFailed {
                exit_code,
                stdout,
                stderr,
                ..
            } = &e
            {
                error!("ffmpeg failed with exit code {:?}", exit_code);
                error!("ffmpeg stdout:\n{}", stdout);
                error!("ffmpeg stderr:\n{}", stderr);
            } else {
                error!("ffmpeg invocation failed: {}", e);
            }
            return Err(e);
        }
    };

    info!("ffmpeg stdout:\n{}", output.stdout);
    info!("ffmpeg stderr:\n{}", output.stderr);
    info!("Video saved successfully to {}", output_path.display());
    Ok(())
}

/// Build the full ffmpeg argument list for one composition.
fn encoder_args(
    audio_path: &Path,
    duration: f64,
    caption: &str,
    background_path: &Path,
    output_path: &Path,
) -> Vec<String> {
    vec![
        "-loop".to_string(),
        "1".to_string(),
        "-i".to_string(),
        background_path.to_string_lossy().into_owned(),
        "-i".to_string(),
        audio_path.to_string_lossy().into_owned(),
        "-filter_complex".to_string(),
        caption_filtergraph(caption),
        "-map".to_string(),
        "[outv]".to_string(),
        "-map".to_string(),
        "1:a".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "fast".to_string(),
        "-tune".to_string(),
        "stillimage".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-b:a".to_string(),
        "192k".to_string(),
        "-shortest".to_string(),
        "-t".to_string(),
        duration.to_string(),
        "-y".to_string(),
        output_path.to_string_lossy().into_owned(),
    ]
}

/// Letterbox the background into the 720x1280 frame, then overlay the
/// caption near the top with a semi-opaque box.
fn caption_filtergraph(caption: &str) -> String {
    let safe_caption = escape_caption(caption);
    format!(
        "[0:v]scale={VIDEO_WIDTH}:{VIDEO_HEIGHT}:force_original_aspect_ratio=decrease,\
         pad={VIDEO_WIDTH}:{VIDEO_HEIGHT}:(ow-iw)/2:(oh-ih)/2,\
         format=yuv420p[bg];\
         [bg]drawtext=font='{FONT_NAME}':\
         text='{safe_caption}':fontsize=60:fontcolor=white:x=(w-text_w)/2:y=h*0.1:\
         box=1:boxcolor=black@0.5:boxborderw=5[outv]"
    )
}

/// Quotes, colons, and commas are syntax inside a drawtext expression.
fn escape_caption(caption: &str) -> String {
    caption
        .replace('\'', "\\'")
        .replace(':', "\\:")
        .replace(',', "\\,")
}

async fn cleanup_temp_audio(audio_path: &Path) {
    if audio_path.exists() {
        match fs::remove_file(audio_path).await {
            Ok(()) => info!("Cleaned up temp audio: {}", audio_path.display()),
            Err(e) => warn!(
                "Could not remove temp audio {}: {}",
                audio_path.display(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_escaping() {
        assert_eq!(
            escape_caption("Don't panic: it's fine, really"),
            "Don\\'t panic\\: it\\'s fine\\, really"
        );
    }

    #[test]
    fn filtergraph_contains_escaped_caption_and_frame_size() {
        let graph = caption_filtergraph("Notes: a, b");
        assert!(graph.contains("text='Notes\\: a\\, b'"));
        assert!(graph.contains("scale=720:1280"));
        assert!(graph.contains("pad=720:1280"));
        assert!(graph.contains("boxcolor=black@0.5"));
    }

    #[test]
    fn encoder_args_trim_to_exact_duration() {
        let args = encoder_args(
            Path::new("audio.mp3"),
            42.37,
            "My Note",
            Path::new("bg.png"),
            Path::new("out.mp4"),
        );
        let t_pos = args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(args[t_pos + 1], "42.37");
        assert_eq!(args.last().unwrap(), "out.mp4");
        assert!(args.contains(&"-shortest".to_string()));
    }

    #[tokio::test]
    async fn missing_background_fails_before_any_subprocess() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("narration_temp.mp3");
        std::fs::write(&audio, b"mp3").unwrap();

        let err = compose(
            &audio,
            10.0,
            "caption",
            Path::new("/nonexistent/background.png"),
            &dir.path().join("out.mp4"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::BackgroundMissing(_)));
        // The encoder was never invoked, so the audio artifact survives.
        assert!(audio.exists());
    }

    #[test]
    fn encoder_failure_is_logged_before_propagating() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("narration_temp.mp3");
        std::fs::write(&audio, b"mp3").unwrap();
        let background = dir.path().join("background.png");
        std::fs::write(&background, b"not an image").unwrap();

        let logs = crate::test_log::CapturedLogs::new();
        let result = tracing::subscriber::with_default(logs.subscriber(), || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(compose(
                &audio,
                10.0,
                "caption",
                &background,
                &dir.path().join("out.mp4"),
            ))
        });

        assert!(result.is_err());
        let output = logs.contents();
        assert!(output.contains("ERROR"));
        assert!(output.contains("ffmpeg"));
    }

    #[tokio::test]
    async fn temp_audio_is_removed_when_the_encoder_fails() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("narration_temp.mp3");
        std::fs::write(&audio, b"mp3").unwrap();
        // Present on disk but not a decodable image, so ffmpeg (when
        // installed) exits non-zero; when absent the lookup fails instead.
        let background = dir.path().join("background.png");
        std::fs::write(&background, b"not an image").unwrap();

        let result = compose(
            &audio,
            10.0,
            "caption",
            &background,
            &dir.path().join("out.mp4"),
        )
        .await;

        assert!(result.is_err());
        assert!(!audio.exists(), "temp audio must be removed unconditionally");
    }
}
