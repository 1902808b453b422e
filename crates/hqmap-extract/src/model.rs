//! Model boundary
//!
//! [`ModelClient`] is the single seam to the text generator. The pipeline
//! treats every [`ModelError`] the same way (degrade to a fallback record),
//! so implementations only need to classify failures for logging.

use crate::error::ModelError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default Gemini API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model name
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Text generator
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Generate text for a prompt
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Model connection settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// API base URL
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// API key; usually supplied through the environment
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 30,
            api_key: None,
        }
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ModelConfig {
    /// With API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// With model name
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// With endpoint
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Non-blank API key, if any
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

/// Build the client for a configuration
///
/// Without an API key this is an [`UnconfiguredModel`], which fails every
/// call without network I/O.
///
/// # Errors
/// `ModelError::Transport` if the HTTP client cannot be constructed
pub fn connect(config: &ModelConfig) -> Result<Arc<dyn ModelClient>, ModelError> {
    if config.api_key().is_none() {
        tracing::warn!("no model API key configured; every query will degrade");
        return Ok(Arc::new(UnconfiguredModel));
    }
    Ok(Arc::new(GeminiClient::new(config.clone())?))
}

/// Stand-in used when no API key is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredModel;

#[async_trait]
impl ModelClient for UnconfiguredModel {
    async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        Err(ModelError::MissingApiKey)
    }

    fn name(&self) -> &'static str {
        "unconfigured"
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// First non-blank text part of the first candidate
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .find(|t| !t.trim().is_empty())
    }
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient").field("url", &self.url).finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create client
    ///
    /// # Errors
    /// `ModelError::MissingApiKey` without a key, `ModelError::Transport` if
    /// the HTTP client cannot be built
    pub fn new(config: ModelConfig) -> Result<Self, ModelError> {
        let api_key = config.api_key().ok_or(ModelError::MissingApiKey)?.to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );
        Ok(Self {
            client,
            url,
            api_key,
        })
    }

    /// Request URL (the key travels in a header, never in the URL)
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let request = GenerateRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::from_status(status.as_u16()));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.without_url().to_string()))?;

        body.into_text().ok_or(ModelError::EmptyResponse)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
