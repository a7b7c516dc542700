mod config;
mod error;
#[cfg(test)]
mod test_log;
mod note;
mod probe;
mod script;
mod speech;
mod tool;
mod video;

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::{Config, Model};
use error::{Error, Result};
use script::ScriptGenerator;
use speech::Synthesizer;

const OUTPUT_DIR: &str = "output";
const DEFAULT_BACKGROUND: &str = "assets/background.png";

#[derive(Parser)]
#[command(name = "notereel")]
#[command(about = "Generate a narrated vertical video from a markdown note", long_about = None)]
struct Cli {
    /// Path to the input markdown note.
    note_file: PathBuf,
    /// Output video file name (without extension). Defaults to the note name.
    #[arg(short, long)]
    output: Option<String>,
    /// Path to the background image.
    #[arg(short, long, default_value = DEFAULT_BACKGROUND)]
    background: PathBuf,
    /// Generative model to use.
    #[arg(short, long, default_value_t = Model::Gemini20Flash)]
    model: Model,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli).await {
        error!("{} error: {}", e.category(), e);
        info!("--- Process Failed ---");
        std::process::exit(1);
    }

    info!("--- Process Completed Successfully ---");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_model_flag_is_rejected_at_parse_time() {
        let result = Cli::try_parse_from(["notereel", "note.md", "-m", "gpt-4o"]);
        let err = result.err().expect("parse should fail");
        assert!(err.to_string().contains("not supported"));
    }

    #[test]
    fn default_model_is_the_single_supported_one() {
        let cli = Cli::try_parse_from(["notereel", "note.md"]).unwrap();
        assert_eq!(cli.model, Model::Gemini20Flash);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = Config::from_env()?;

    let note_basename = cli
        .note_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "note".to_string());
    let output_basename = cli.output.clone().unwrap_or_else(|| note_basename.clone());

    let output_dir = Path::new(OUTPUT_DIR);
    fs::create_dir_all(output_dir)?;
    let video_path = output_dir.join(format!("{output_basename}.mp4"));
    let temp_audio_path = output_dir.join(format!("{output_basename}_temp.mp3"));

    let note_content = note::read_note(&cli.note_file)?;
    if note_content.is_empty() {
        return Err(Error::EmptyNote);
    }

    let script_text = ScriptGenerator::new(&config)
        .generate(&note_content, cli.model)
        .await?;

    Synthesizer::new()
        .synthesize(&script_text, &temp_audio_path)
        .await?;

    let duration = probe::audio_duration(&temp_audio_path).await?;

    video::compose(
        &temp_audio_path,
        duration,
        &note_basename,
        &cli.background,
        &video_path,
    )
    .await
}
