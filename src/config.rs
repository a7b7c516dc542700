//! Run configuration and the allowed-model set.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Generative models this tool knows how to drive. Currently a single
/// Google model; adding a backend means adding a variant here. The CLI
/// parses `-m` through `FromStr`, so rejection happens before any
/// network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Model {
    /// gemini-2.0-flash via the Google generative-language API.
    Gemini20Flash,
}

impl Model {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Model::Gemini20Flash => "gemini-2.0-flash",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "gemini-2.0-flash" => Ok(Model::Gemini20Flash),
            other => Err(format!("model '{other}' is not supported")),
        }
    }
}

/// Explicit configuration handed to the script generator, instead of the
/// backend library's process-wide ambient setup.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) api_key: String,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").map_err(|_| Error::MissingApiKey)?;
        Ok(Self { api_key })
    }
}
