//! Gemini (Google) image generation provider.

use crate::error::{sanitize_error_message, ChimeraError, Result};
use crate::image::provider::ImageProvider;
use crate::image::types::{GeneratedImage, GenerationMetadata, ImageProviderKind, ImageResult};
use crate::secret::{FileSecretStore, MemorySecretStore, SecretStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variable consulted when no credential store is configured.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

const MISSING_KEY_MESSAGE: &str = "Gemini API key is not configured. \
     Save one with `chimeragen key set <KEY>` or switch to Pollinations AI.";

const NO_IMAGE_MESSAGE: &str =
    "Gemini did not return an image. Try a different prompt or use Pollinations AI instead.";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.0 Flash experimental, text + image output.
    #[default]
    Flash2Exp,
    /// Gemini 2.5 Flash Image.
    Flash25Image,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flash2Exp => "gemini-2.0-flash-exp",
            Self::Flash25Image => "gemini-2.5-flash-image",
        }
    }
}

/// Builder for GeminiProvider.
#[derive(Default)]
pub struct GeminiProviderBuilder {
    store: Option<Arc<dyn SecretStore>>,
    model: GeminiModel,
    base_url: Option<String>,
}

impl GeminiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the credential store.
    ///
    /// Falls back to `GEMINI_API_KEY`, then to the user config file.
    pub fn secret_store(mut self, store: Arc<dyn SecretStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API root (used against local mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the provider.
    ///
    /// A missing credential is not an error here; it is reported per request.
    pub fn build(self) -> Result<GeminiProvider> {
        let store = match self.store {
            Some(store) => store,
            None => default_store(std::env::var(GEMINI_API_KEY_ENV).ok())?,
        };

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GeminiProvider {
            client: reqwest::Client::new(),
            store,
            model: self.model,
            base_url,
        })
    }
}

fn default_store(env_key: Option<String>) -> Result<Arc<dyn SecretStore>> {
    if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
        return Ok(Arc::new(MemorySecretStore::with_value(key)));
    }
    let file = FileSecretStore::default_location().ok_or_else(|| {
        ChimeraError::InvalidRequest("no user config directory for the Gemini credential file".into())
    })?;
    Ok(Arc::new(file))
}

/// Gemini image generation provider (key-based, inline image data).
pub struct GeminiProvider {
    client: reqwest::Client,
    store: Arc<dyn SecretStore>,
    model: GeminiModel,
    base_url: String,
}

impl GeminiProvider {
    /// Creates a new `GeminiProviderBuilder`.
    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    fn model_url(&self) -> String {
        format!("{}/v1beta/models/{}", self.base_url, self.model.as_str())
    }

    async fn generate_impl(&self, prompt: &str) -> Result<GeneratedImage> {
        let credential = self
            .store
            .get()
            .ok_or_else(|| ChimeraError::MissingCredential(MISSING_KEY_MESSAGE.into()))?;

        let start = Instant::now();
        let url = format!("{}:generateContent", self.model_url());
        let body = GeminiRequest::from_prompt(prompt);

        tracing::debug!(model = self.model.as_str(), "sending Gemini generateContent request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", credential.expose())])
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(transport_error)?;
        let result = extract_image(gemini_response)?;

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(duration_ms, "Gemini image received");

        Ok(GeneratedImage::new(
            result,
            ImageProviderKind::Gemini,
            GenerationMetadata {
                model: Some(self.model.as_str().to_string()),
                seed: None,
                duration_ms: Some(duration_ms),
            },
        ))
    }
}

/// Drops the request URL, which carries the key as a query parameter.
fn transport_error(err: reqwest::Error) -> ChimeraError {
    ChimeraError::Transport(err.without_url())
}

/// Maps a non-success response to a rejection, preferring the API's own message.
fn parse_error(status: u16, text: &str) -> ChimeraError {
    let message = serde_json::from_str::<GeminiErrorEnvelope>(text)
        .ok()
        .and_then(|e| e.error)
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .map(|m| sanitize_error_message(&m))
        .unwrap_or_else(|| format!("Gemini API error: {status}"));

    ChimeraError::ProviderRejected { status, message }
}

/// Picks the first inline image part of the first candidate.
fn extract_image(response: GeminiResponse) -> Result<ImageResult> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ChimeraError::NoImageReturned(format!(
            "Gemini blocked the prompt ({reason}). Try a different prompt or use Pollinations AI instead."
        )));
    }

    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| {
            content.parts.into_iter().find_map(|p| {
                let inline = p.inline_data?;
                match (inline.mime_type, inline.data) {
                    (Some(mime_type), Some(payload)) if !payload.is_empty() => {
                        Some(ImageResult::InlineData { payload, mime_type })
                    }
                    _ => None,
                }
            })
        })
        .ok_or_else(|| ChimeraError::NoImageReturned(NO_IMAGE_MESSAGE.into()))
}

#[async_trait]
impl ImageProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage> {
        self.generate_impl(prompt).await
    }

    fn kind(&self) -> ImageProviderKind {
        ImageProviderKind::Gemini
    }

    async fn health_check(&self) -> Result<()> {
        let credential = self
            .store
            .get()
            .ok_or_else(|| ChimeraError::MissingCredential(MISSING_KEY_MESSAGE.into()))?;

        let response = self
            .client
            .get(self.model_url())
            .query(&[("key", credential.expose())])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text));
        }
        Ok(())
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiTextPart>,
}

#[derive(Debug, Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiTextPart {
                    text: format!("Generate an image: {prompt}"),
                }],
            }],
            generation_config: GeminiConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    #[serde(default)]
    error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: Option<String>,
}
