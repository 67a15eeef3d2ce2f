//! Typed repository for generated posts.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use tpost_models::{PersistedPost, PostId, PostImage};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{Document, FromFirestoreValue, ToFirestoreValue, Value};

/// Seam for the persistence boundary.
///
/// The pipeline creates each post exactly once; the dashboard reads
/// them back newest first.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_post(&self, post: &PersistedPost) -> FirestoreResult<()>;
    async fn list_posts(&self, author_id: &str) -> FirestoreResult<Vec<PersistedPost>>;
}

/// Firestore-backed post repository.
#[derive(Clone)]
pub struct FirestorePostRepository {
    client: FirestoreClient,
}

impl FirestorePostRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    fn collection(author_id: &str) -> String {
        format!("users/{}/posts", author_id)
    }
}

#[async_trait]
impl PostStore for FirestorePostRepository {
    async fn create_post(&self, post: &PersistedPost) -> FirestoreResult<()> {
        let fields = post_to_fields(post);
        self.client
            .create_document(&Self::collection(&post.author_id), post.id.as_str(), fields)
            .await?;
        info!(post_id = %post.id, author_id = %post.author_id, "Created post record");
        Ok(())
    }

    async fn list_posts(&self, author_id: &str) -> FirestoreResult<Vec<PersistedPost>> {
        let documents = self
            .client
            .list_documents(&Self::collection(author_id))
            .await?;

        let mut posts = documents
            .iter()
            .map(|doc| document_to_post(doc, author_id))
            .collect::<FirestoreResult<Vec<_>>>()?;

        // Newest first
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }
}

fn post_to_fields(post: &PersistedPost) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("author_id".to_string(), post.author_id.to_firestore_value());
    fields.insert("title".to_string(), post.title.to_firestore_value());
    fields.insert("content".to_string(), post.content.to_firestore_value());
    fields.insert("video_url".to_string(), post.video_url.to_firestore_value());
    fields.insert("tone".to_string(), post.tone.as_str().to_firestore_value());
    fields.insert("length".to_string(), post.length.as_str().to_firestore_value());
    fields.insert(
        "content_type".to_string(),
        post.content_type.as_str().to_firestore_value(),
    );
    fields.insert(
        "generated_image".to_string(),
        post.generated_image.to_firestore_value(),
    );
    let image_urls: Vec<String> = post.images.iter().map(|i| i.url.clone()).collect();
    fields.insert("image_urls".to_string(), image_urls.to_firestore_value());
    fields.insert("created_at".to_string(), post.created_at.to_firestore_value());
    fields
}

fn document_to_post(doc: &Document, author_id: &str) -> FirestoreResult<PersistedPost> {
    let id = doc
        .doc_id()
        .ok_or_else(|| FirestoreError::invalid_document("document has no resource name"))?;
    let fields = doc
        .fields
        .as_ref()
        .ok_or_else(|| FirestoreError::invalid_document("document has no fields"))?;

    fn required<T: FromFirestoreValue>(
        fields: &HashMap<String, Value>,
        key: &str,
    ) -> FirestoreResult<T> {
        fields
            .get(key)
            .and_then(T::from_firestore_value)
            .ok_or_else(|| FirestoreError::invalid_document(format!("missing field: {key}")))
    }

    let tone: String = required(fields, "tone")?;
    let length: String = required(fields, "length")?;
    let content_type: String = required(fields, "content_type")?;

    let image_urls: Vec<String> = fields
        .get("image_urls")
        .and_then(Vec::<String>::from_firestore_value)
        .unwrap_or_default();

    Ok(PersistedPost {
        id: PostId::from(id),
        author_id: author_id.to_string(),
        title: required(fields, "title")?,
        content: required(fields, "content")?,
        video_url: required(fields, "video_url")?,
        tone: tone
            .parse()
            .map_err(|e| FirestoreError::invalid_document(format!("tone: {e}")))?,
        length: length
            .parse()
            .map_err(|e| FirestoreError::invalid_document(format!("length: {e}")))?,
        content_type: content_type
            .parse()
            .map_err(|e| FirestoreError::invalid_document(format!("content_type: {e}")))?,
        generated_image: required(fields, "generated_image")?,
        images: image_urls.into_iter().map(|url| PostImage { url }).collect(),
        created_at: required::<DateTime<Utc>>(fields, "created_at")?,
    })
}
