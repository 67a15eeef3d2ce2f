//! Client for the web-search agent service.
//!
//! The enrichment stage hands the three search terms to a remote
//! tool-running agent, which replies over an SSE stream. The final
//! event carries the agent's structured answer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tpost_models::{SearchEnrichment, SearchTermSet};

use crate::client::strip_code_fences;
use crate::error::{GatewayError, GatewayResult};
use crate::sse::decode_all;

/// Transport timeout for the agent call.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Search agent configuration.
#[derive(Debug, Clone)]
pub struct SearchAgentConfig {
    /// Base URL of the agent service.
    pub agent_url: String,
    /// Application identifier the agent expects.
    pub app_name: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl SearchAgentConfig {
    /// Create config from environment variables.
    ///
    /// `SEARCH_AGENT_URL` and `SEARCH_AGENT_APP_NAME` are required.
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            agent_url: std::env::var("SEARCH_AGENT_URL")
                .map_err(|_| "SEARCH_AGENT_URL not set".to_string())?,
            app_name: std::env::var("SEARCH_AGENT_APP_NAME")
                .map_err(|_| "SEARCH_AGENT_APP_NAME not set".to_string())?,
            timeout: Duration::from_secs(
                std::env::var("SEARCH_AGENT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        })
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct RunRequest {
    app_name: String,
    user_id: String,
    session_id: String,
    new_message: AgentMessage,
    streaming: bool,
}

#[derive(Debug, Serialize)]
struct AgentMessage {
    role: String,
    parts: Vec<AgentPart>,
}

#[derive(Debug, Serialize)]
struct AgentPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct AgentEvent {
    #[serde(default)]
    content: Option<AgentEventContent>,
}

#[derive(Debug, Deserialize)]
struct AgentEventContent {
    #[serde(default)]
    parts: Vec<AgentEventPart>,
}

#[derive(Debug, Deserialize)]
struct AgentEventPart {
    #[serde(default)]
    text: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Seam for the enrichment capability.
#[async_trait]
pub trait EnrichmentSource: Send + Sync {
    /// Fetch web enrichment for exactly three search terms.
    async fn fetch(&self, terms: &SearchTermSet) -> GatewayResult<SearchEnrichment>;
}

/// HTTP client for the search agent's `run_sse` endpoint.
pub struct SearchAgentClient {
    http: Client,
    config: SearchAgentConfig,
}

impl SearchAgentClient {
    /// Create a new search agent client.
    pub fn new(config: SearchAgentConfig) -> GatewayResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("tpost-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let config = SearchAgentConfig::from_env()?;
        Self::new(config).map_err(|e| e.to_string())
    }
}

#[async_trait]
impl EnrichmentSource for SearchAgentClient {
    async fn fetch(&self, terms: &SearchTermSet) -> GatewayResult<SearchEnrichment> {
        let request = RunRequest {
            app_name: self.config.app_name.clone(),
            user_id: "tpost-pipeline".to_string(),
            session_id: "tpost-pipeline".to_string(),
            new_message: AgentMessage {
                role: "user".to_string(),
                parts: vec![AgentPart {
                    text: serde_json::to_string(&terms.search_terms)
                        .map_err(|e| GatewayError::invalid_payload(e.to_string()))?,
                }],
            },
            streaming: false,
        };

        let url = format!("{}/run_sse", self.config.agent_url.trim_end_matches('/'));
        let response = self.http.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let events = decode_all(&body);
        debug!(events = events.len(), "Search agent stream decoded");

        // The agent emits intermediate tool-call events first; the last
        // event carries the final answer.
        let last = events
            .last()
            .ok_or_else(|| GatewayError::stream("agent stream ended without any event"))?;

        let event: AgentEvent = serde_json::from_str(&last.data)
            .map_err(|e| GatewayError::stream(format!("final agent event is not JSON: {}", e)))?;

        let text = event
            .content
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .ok_or(GatewayError::MissingContent)?;

        let enrichment: SearchEnrichment = serde_json::from_str(strip_code_fences(&text))
            .map_err(|e| {
                GatewayError::invalid_payload(format!("enrichment shape mismatch: {}", e))
            })?;

        if !enrichment.is_complete() {
            return Err(GatewayError::invalid_payload(
                "enrichment left one or more terms empty",
            ));
        }

        Ok(enrichment)
    }
}
