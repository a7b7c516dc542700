//! Error types for the pipeline.

use std::path::PathBuf;
use thiserror::Error;

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// Everything that can halt a run.
#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("note file not found: {0}")]
    NoteNotFound(PathBuf),

    #[error("failed to read note {path}: {source}")]
    NoteRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("note content is empty")]
    EmptyNote,

    #[error("GOOGLE_API_KEY not set in environment or .env file")]
    MissingApiKey,

    #[error("background image not found: {0}")]
    BackgroundMissing(PathBuf),

    #[error("{0} not found in PATH")]
    ToolNotFound(&'static str),

    #[error("{tool} exited with {exit_code:?}\nstdout: {stdout}\nstderr: {stderr}")]
    ToolFailed {
        tool: &'static str,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("could not parse ffprobe duration output: {0:?}")]
    DurationParse(String),

    #[error("script generation failed: response was empty or blocked (reason: {reason})")]
    GenerationBlocked { reason: String },

    #[error("generative API returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Coarse category for the driver's final log line.
    pub(crate) fn category(&self) -> &'static str {
        match self {
            Error::NoteNotFound(_) | Error::BackgroundMissing(_) | Error::ToolNotFound(_) => {
                "missing input"
            }
            Error::EmptyNote | Error::MissingApiKey => "configuration",
            Error::GenerationBlocked { .. }
            | Error::UpstreamStatus { .. }
            | Error::Synthesis(_)
            | Error::Http(_) => "upstream service",
            Error::ToolFailed { .. } | Error::DurationParse(_) => "subprocess",
            Error::NoteRead { .. } | Error::Io(_) => "missing input",
        }
    }
}
