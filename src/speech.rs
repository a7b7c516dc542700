//! Speech synthesis via the Google Translate TTS endpoint.

use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info};

use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://translate.google.com";

/// The endpoint rejects requests longer than this many characters.
const MAX_CHUNK_CHARS: usize = 100;

const LANGUAGE: &str = "en";

pub(crate) struct Synthesizer {
    client: reqwest::Client,
    base_url: String,
}

impl Synthesizer {
    pub(crate) fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub(crate) fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Synthesize `text` as English speech at normal speed, writing MP3
    /// data to `output_path`. Longer texts are fetched in chunks and the
    /// MP3 streams appended in order.
    pub(crate) async fn synthesize(&self, text: &str, output_path: &Path) -> Result<()> {
        info!("Synthesizing audio to {}...", output_path.display());

        match self.fetch_and_write(text, output_path).await {
            Ok(()) => {
                info!("Audio synthesis complete.");
                Ok(())
            }
            Err(e) => {
                error!("Error during audio synthesis: {}", e);
                Err(e)
            }
        }
    }

    async fn fetch_and_write(&self, text: &str, output_path: &Path) -> Result<()> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(Error::Synthesis("no text to synthesize".to_string()));
        }

        let mut file = File::create(output_path).await?;
        for (i, chunk) in chunks.iter().enumerate() {
            debug!("Fetching TTS chunk {}/{}", i + 1, chunks.len());
            let audio = self.fetch_chunk(chunk).await?;
            file.write_all(&audio).await?;
        }
        file.flush().await?;
        Ok(())
    }

    async fn fetch_chunk(&self, chunk: &str) -> Result<Vec<u8>> {
        let url = format!("{}/translate_tts", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", LANGUAGE),
                ("ttsspeed", "1"),
                ("q", chunk),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Synthesis(format!(
                "TTS endpoint returned {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Split text at whitespace into pieces of at most `max_chars` characters.
/// A single word longer than the limit is hard-split at character
/// boundaries so no chunk ever exceeds the request cap.
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    let words = text
        .split_whitespace()
        .flat_map(|word| hard_split(word, max_chars));
    for word in words {
        if current.is_empty() {
            current.push_str(&word);
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(&word);
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(&word);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Break a single overlong word into `max_chars`-sized pieces.
fn hard_split(word: &str, max_chars: usize) -> Vec<String> {
    if word.chars().count() <= max_chars {
        return vec![word.to_string()];
    }
    word.chars()
        .collect::<Vec<char>>()
        .chunks(max_chars)
        .map(|piece| piece.iter().collect())
        .collect()
}
