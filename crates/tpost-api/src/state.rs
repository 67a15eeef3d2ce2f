//! Application state.

use std::sync::Arc;

use tpost_firestore::{FirestoreClient, FirestorePostRepository, PostStore};
use tpost_gateway::{EnrichmentSource, GatewayClient, LlmGateway, SearchAgentClient};
use tpost_pipeline::{PipelineOrchestrator, DEFAULT_IMAGE_MODELS};
use tpost_storage::{MediaStore, R2Client};

use crate::config::ApiConfig;
use crate::quota::QuotaCache;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub orchestrator: Arc<PipelineOrchestrator>,
    pub posts: Arc<dyn PostStore>,
    pub user_quota: Arc<QuotaCache>,
    pub ip_quota: Arc<QuotaCache>,
}

impl AppState {
    /// Create application state with production clients.
    ///
    /// Every remote client is constructed here and injected; a missing
    /// credential surfaces as a startup error.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let gateway: Arc<dyn LlmGateway> = Arc::new(GatewayClient::from_env()?);
        let enrichment: Arc<dyn EnrichmentSource> = Arc::new(SearchAgentClient::from_env()?);
        let storage: Arc<dyn MediaStore> = Arc::new(R2Client::from_env()?);
        let posts: Arc<dyn PostStore> =
            Arc::new(FirestorePostRepository::new(FirestoreClient::from_env()?));

        Ok(Self::with_components(config, gateway, enrichment, storage, posts))
    }

    /// Assemble state from explicit components.
    ///
    /// This is the seam tests use to drop in fakes.
    pub fn with_components(
        config: ApiConfig,
        gateway: Arc<dyn LlmGateway>,
        enrichment: Arc<dyn EnrichmentSource>,
        storage: Arc<dyn MediaStore>,
        posts: Arc<dyn PostStore>,
    ) -> Self {
        let image_models = DEFAULT_IMAGE_MODELS.iter().map(|m| m.to_string()).collect();
        let orchestrator = Arc::new(PipelineOrchestrator::new(
            gateway,
            enrichment,
            storage,
            image_models,
        ));

        let user_quota = Arc::new(QuotaCache::new(config.user_rate_limit));
        let ip_quota = Arc::new(QuotaCache::new(config.ip_rate_limit));

        Self {
            config,
            orchestrator,
            posts,
            user_quota,
            ip_quota,
        }
    }
}
