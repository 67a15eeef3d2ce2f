//! generateContent REST client for the hosted LLM gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tpost_models::ImageArtifact;

use crate::error::{GatewayError, GatewayResult};

/// Default request timeout for text generation calls.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gateway client configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// API key for the generateContent endpoint.
    pub api_key: String,
    /// Base URL of the service.
    pub base_url: String,
    /// Model used for all text stages.
    pub text_model: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Create config from environment variables.
    ///
    /// `GEMINI_API_KEY` is required; everything else has defaults.
    pub fn from_env() -> Result<Self, String> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| "GEMINI_API_KEY not set".to_string())?;
        if api_key.is_empty() {
            return Err("GEMINI_API_KEY cannot be empty".to_string());
        }

        Ok(Self {
            api_key,
            base_url: std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }),
            text_model: std::env::var("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            timeout: Duration::from_secs(
                std::env::var("GEMINI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        })
    }
}

/// A media attachment forwarded to the gateway alongside a prompt.
///
/// Used by the transcript stage to hand the model the video itself.
#[derive(Debug, Clone)]
pub struct MediaRef {
    pub url: String,
    pub content_type: String,
}

impl MediaRef {
    /// A YouTube video reference.
    pub fn video(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_type: "video/mp4".to_string(),
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    file_uri: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}

// ============================================================================
// Client
// ============================================================================

/// Seam for the remote LLM gateway.
///
/// The pipeline talks to this trait so tests can substitute canned
/// responses without a network.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// One prompt/response round trip expecting a structured JSON body.
    ///
    /// Returns the raw JSON value; callers perform their own typed
    /// validation on it.
    async fn generate_value(
        &self,
        prompt: &str,
        media: Option<&MediaRef>,
    ) -> GatewayResult<serde_json::Value>;

    /// One round trip against an image-capable model.
    ///
    /// `Ok(None)` means the model answered but produced no image part.
    async fn generate_image(&self, model: &str, prompt: &str)
        -> GatewayResult<Option<ImageArtifact>>;
}

/// Client for the generateContent REST API.
pub struct GatewayClient {
    http: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    /// Create a new gateway client.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("tpost-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let config = GatewayConfig::from_env()?;
        Self::new(config).map_err(|e| e.to_string())
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, model, self.config.api_key
        )
    }

    async fn call(&self, model: &str, request: &GenerateRequest) -> GatewayResult<GenerateResponse> {
        let response = self
            .http
            .post(self.endpoint(model))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(model, status = status.as_u16(), "Gateway call failed");
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl LlmGateway for GatewayClient {
    async fn generate_value(
        &self,
        prompt: &str,
        media: Option<&MediaRef>,
    ) -> GatewayResult<serde_json::Value> {
        let mut parts = vec![Part {
            text: Some(prompt.to_string()),
            file_data: None,
        }];
        if let Some(media) = media {
            parts.push(Part {
                text: None,
                file_data: Some(FileData {
                    file_uri: media.url.clone(),
                    mime_type: media.content_type.clone(),
                }),
            });
        }

        let request = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_modalities: None,
            }),
        };

        let response = self.call(&self.config.text_model, &request).await?;

        let text = response
            .candidates
            .first()
            .and_then(|c| c.content.parts.iter().find_map(|p| p.text.as_deref()))
            .ok_or(GatewayError::MissingContent)?;

        let text = strip_code_fences(text);
        debug!(len = text.len(), "Gateway returned structured text");

        serde_json::from_str(text)
            .map_err(|e| GatewayError::invalid_payload(format!("not valid JSON: {}", e)))
    }

    async fn generate_image(
        &self,
        model: &str,
        prompt: &str,
    ) -> GatewayResult<Option<ImageArtifact>> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                    file_data: None,
                }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: None,
                response_modalities: Some(vec!["TEXT".to_string(), "IMAGE".to_string()]),
            }),
        };

        let response = self.call(model, &request).await?;

        let image = response
            .candidates
            .first()
            .and_then(|c| c.content.parts.iter().find_map(|p| p.inline_data.as_ref()))
            .map(|d| ImageArtifact {
                data: d.data.clone(),
                mime_type: d.mime_type.clone(),
            });

        Ok(image)
    }
}

/// Strip a surrounding markdown code fence from model output.
///
/// Models occasionally wrap JSON-mode responses anyway.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}
