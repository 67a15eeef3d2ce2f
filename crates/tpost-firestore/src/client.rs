//! Firestore REST API client.
//!
//! A slim client covering the two operations the post store needs:
//! creating a document and listing a collection. Expired-token
//! responses invalidate the cache and retry once.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::{FirestoreError, FirestoreResult};
use crate::token_cache::TokenCache;
use crate::types::{Document, ListDocumentsResponse, Value};

/// Firestore client configuration.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// GCP project ID
    pub project_id: String,
    /// Database ID (usually "(default)")
    pub database_id: String,
    /// Request timeout
    pub timeout: Duration,
}

impl FirestoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> FirestoreResult<Self> {
        let project_id = std::env::var("GCP_PROJECT_ID")
            .or_else(|_| std::env::var("FIREBASE_PROJECT_ID"))
            .map_err(|_| {
                FirestoreError::auth_error("GCP_PROJECT_ID or FIREBASE_PROJECT_ID must be set")
            })?;

        if project_id.is_empty() {
            return Err(FirestoreError::auth_error("GCP_PROJECT_ID cannot be empty"));
        }

        Ok(Self {
            project_id,
            database_id: std::env::var("FIRESTORE_DATABASE_ID")
                .unwrap_or_else(|_| "(default)".to_string()),
            timeout: Duration::from_secs(30),
        })
    }
}

/// Firestore REST API client.
pub struct FirestoreClient {
    http: Client,
    base_url: String,
    token_cache: Arc<TokenCache>,
}

impl Clone for FirestoreClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token_cache: Arc::clone(&self.token_cache),
        }
    }
}

impl FirestoreClient {
    /// Create a new Firestore client.
    pub fn new(config: FirestoreConfig) -> FirestoreResult<Self> {
        let auth = Self::create_auth_provider()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("tpost-firestore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FirestoreError::Network)?;

        let base_url = format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/{}/documents",
            config.project_id, config.database_id
        );

        Ok(Self {
            http,
            base_url,
            token_cache: Arc::new(TokenCache::new(auth)),
        })
    }

    fn create_auth_provider() -> FirestoreResult<Arc<dyn TokenProvider>> {
        let service_account = CustomServiceAccount::from_env().map_err(|e| {
            FirestoreError::auth_error(format!("Failed to load service account: {}", e))
        })?;

        match service_account {
            Some(sa) => Ok(Arc::new(sa)),
            None => Err(FirestoreError::auth_error(
                "GOOGLE_APPLICATION_CREDENTIALS not set",
            )),
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> FirestoreResult<Self> {
        Self::new(FirestoreConfig::from_env()?)
    }

    fn is_access_token_expired(body: &str) -> bool {
        body.contains("ACCESS_TOKEN_EXPIRED") || body.contains("\"UNAUTHENTICATED\"")
    }

    /// Create a document with an explicit id.
    pub async fn create_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
    ) -> FirestoreResult<Document> {
        let url = format!("{}/{}?documentId={}", self.base_url, collection, doc_id);
        let body = Document::new(fields);

        let send = |token: String| {
            let url = url.clone();
            let body = body.clone();
            async move { self.http.post(&url).bearer_auth(token).json(&body).send().await }
        };

        let mut token = self.token_cache.get_token().await?;
        let mut response = send(token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let text = response.text().await.unwrap_or_default();
            if !Self::is_access_token_expired(&text) {
                return Err(FirestoreError::from_http_status(401, text));
            }
            self.token_cache.invalidate().await;
            token = self.token_cache.get_token().await?;
            response = send(token).await?;
        }

        let status = response.status();
        match status {
            StatusCode::OK | StatusCode::CREATED => {
                debug!(collection, doc_id, "Created document");
                Ok(response.json().await?)
            }
            StatusCode::CONFLICT => Err(FirestoreError::AlreadyExists(format!(
                "{}/{}",
                collection, doc_id
            ))),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(FirestoreError::from_http_status(status.as_u16(), body))
            }
        }
    }

    /// List all documents in a collection.
    pub async fn list_documents(&self, collection: &str) -> FirestoreResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}/{}?pageSize=100", self.base_url, collection);
            if let Some(ref token) = page_token {
                url.push_str("&pageToken=");
                url.push_str(token);
            }

            let mut token = self.token_cache.get_token().await?;
            let mut response = self.http.get(&url).bearer_auth(&token).send().await?;

            if response.status() == StatusCode::UNAUTHORIZED {
                let text = response.text().await.unwrap_or_default();
                if !Self::is_access_token_expired(&text) {
                    return Err(FirestoreError::from_http_status(401, text));
                }
                self.token_cache.invalidate().await;
                token = self.token_cache.get_token().await?;
                response = self.http.get(&url).bearer_auth(&token).send().await?;
            }

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(FirestoreError::from_http_status(status.as_u16(), body));
            }

            let page: ListDocumentsResponse = response.json().await?;
            documents.extend(page.documents.unwrap_or_default());

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(documents)
    }
}
