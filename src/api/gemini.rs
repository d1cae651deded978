//! Gemini REST API provider.
//!
//! Calls `models/{model}:generateContent` directly over HTTPS. The
//! credential comes from the `GEMINI_API_KEY` environment variable; without
//! one every request fails fast with
//! [`CommentaryError::MissingCredential`] and no network traffic happens.
//! Requests carry no client-side timeout.

use super::prompts::{analysis_prompt, chat_prompt, entertainment_prompt};
use super::{CommentaryError, CommentaryProvider};
use crate::libs::config::{self, CommentaryConfig, API_KEY_VAR};
use crate::libs::messages::Message;
use crate::libs::record::Category;
use crate::libs::session::Preference;
use crate::msg_debug;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
    analysis_temperature: f32,
}

impl GeminiProvider {
    pub fn new(api_key: Option<String>, config: &CommentaryConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            analysis_temperature: config.analysis_temperature,
        }
    }

    /// Reads the credential from the environment.
    pub fn from_env(config: &CommentaryConfig) -> Self {
        let api_key = config::api_key();
        if api_key.is_none() {
            msg_debug!(Message::CredentialMissing(API_KEY_VAR.to_string()));
        }
        Self::new(api_key, config)
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, prompt: String, temperature: Option<f32>) -> Result<String, CommentaryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CommentaryError::MissingCredential(API_KEY_VAR.to_string()))?;

        let url = format!("{}/{}:generateContent", self.api_url, self.model);
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: temperature.map(|temperature| GenerationConfig { temperature }),
        };

        let response = self.client.post(url).header(API_KEY_HEADER, api_key).json(&body).send().await?;

        let status = response.status();
        let body_text = response.text().await?;
        if !status.is_success() {
            return Err(http_error(status, &body_text));
        }

        parse_generated_text(&body_text)
    }
}

#[async_trait]
impl CommentaryProvider for GeminiProvider {
    async fn analyze(&self, category: Category, color_tag: &str, duration_seconds: u64, notes: &str) -> Result<String, CommentaryError> {
        let prompt = analysis_prompt(category, color_tag, duration_seconds, notes);
        self.generate(prompt, Some(self.analysis_temperature)).await
    }

    async fn entertain(&self, preference: Preference) -> Result<String, CommentaryError> {
        self.generate(entertainment_prompt(preference), None).await
    }

    async fn chat(&self, message: &str, history: &[String]) -> Result<String, CommentaryError> {
        self.generate(chat_prompt(message, history), None).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Extracts the concatenated text of the first candidate from a
/// `generateContent` response body. A response without text yields an empty
/// string; a body that is not a response at all is an error.
pub fn parse_generated_text(body: &str) -> Result<String, CommentaryError> {
    let response: GenerateContentResponse = serde_json::from_str(body).map_err(|err| CommentaryError::Malformed(err.to_string()))?;
    Ok(response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect::<String>())
        .unwrap_or_default())
}

/// Maps a non-success response to an error, preferring the service's own
/// error message over the raw body.
pub fn http_error(status: StatusCode, body: &str) -> CommentaryError {
    let message = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.to_string());

    CommentaryError::Status {
        status: status.as_u16(),
        message,
    }
}
