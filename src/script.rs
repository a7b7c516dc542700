//! Script generation via the Google generative-language API.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::{Config, Model};
use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Hard cap on the script length; short-form narration only.
const MAX_OUTPUT_TOKENS: u32 = 300;

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// Client for the generateContent endpoint. Holds the API key explicitly
/// rather than configuring a process-wide backend.
pub(crate) struct ScriptGenerator {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ScriptGenerator {
    pub(crate) fn new(config: &Config) -> Self {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    pub(crate) fn with_base_url(config: &Config, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: base_url.into(),
        }
    }

    /// Generate a short-form narration script from note text.
    pub(crate) async fn generate(&self, note_content: &str, model: Model) -> Result<String> {
        if note_content.trim().is_empty() {
            return Err(Error::EmptyNote);
        }

        info!("Generating script via {}...", model);

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            model.as_str(),
            self.api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(note_content),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.8,
                top_p: 1.0,
                top_k: 1,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
            safety_settings: safety_settings(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!("Generative API returned {}: {}", status, body);
            return Err(Error::UpstreamStatus { status, body });
        }

        let generated: GenerateResponse = response.json().await?;

        let script = generated
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .map(|p| p.text.clone());

        match script {
            Some(text) if !text.is_empty() => {
                info!("Generated script: {:.100}...", text.replace('\n', " "));
                Ok(text)
            }
            _ => {
                let reason = block_reason(&generated);
                error!("Generation failed or was blocked. Reason: {}", reason);
                Err(Error::GenerationBlocked { reason })
            }
        }
    }
}

/// Fixed instructional prompt embedding the note content.
fn build_prompt(note_content: &str) -> String {
    format!(
        "Transform the following note content into a short, chaotic, slightly unhinged, \
         but still educational script for a 30-60 second TikTok/YouTube Short video. \
         Use a 'brainrot' style: fast-paced, maybe hyperbolic, meme-adjacent humor, but \
         ensure the core concepts from the note are mentioned. Keep it concise and \
         engaging for a short-form video format.\n\n\
         Note Content:\n---\n{note_content}\n---\n\n\
         Generated Script:\n"
    )
}

/// All harm categories relaxed; the note author owns the content.
fn safety_settings() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: "BLOCK_NONE",
    })
    .collect()
}

fn block_reason(response: &GenerateResponse) -> String {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return reason.to_string();
    }
    if let Some(finish) = response
        .candidates
        .first()
        .and_then(|c| c.finish_reason.as_deref())
    {
        if finish != "STOP" {
            return format!("candidate finish reason: {finish}");
        }
    }
    "unknown".to_string()
}
