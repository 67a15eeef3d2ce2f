//! Persisted blog post records.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::request::{BlogContentType, BlogLength, BlogTone};

/// Unique identifier for a persisted post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PostId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An image attached to a persisted post.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PostImage {
    pub url: String,
}

/// A generated blog post as stored for the dashboard.
///
/// Created exactly once per successful pipeline run and never mutated
/// by the pipeline afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersistedPost {
    pub id: PostId,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub video_url: String,
    pub tone: BlogTone,
    pub length: BlogLength,
    pub content_type: BlogContentType,
    pub generated_image: bool,
    /// Zero or one attached images.
    #[serde(default)]
    pub images: Vec<PostImage>,
    pub created_at: DateTime<Utc>,
}

impl PersistedPost {
    /// The attached image URL, when one exists.
    pub fn image_url(&self) -> Option<&str> {
        self.images.first().map(|i| i.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post(images: Vec<PostImage>) -> PersistedPost {
        PersistedPost {
            id: PostId::generate(),
            author_id: "user-1".into(),
            title: "Title".into(),
            content: "Content".into(),
            video_url: "https://youtu.be/dQw4w9WgXcQ".into(),
            tone: BlogTone::Neutral,
            length: BlogLength::Medium,
            content_type: BlogContentType::Informative,
            generated_image: !images.is_empty(),
            images,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_image_url_accessor() {
        assert_eq!(sample_post(vec![]).image_url(), None);

        let post = sample_post(vec![PostImage {
            url: "https://cdn.example.com/a.png".into(),
        }]);
        assert_eq!(post.image_url(), Some("https://cdn.example.com/a.png"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(sample_post(vec![])).unwrap();
        assert!(value.get("authorId").is_some());
        assert!(value.get("videoUrl").is_some());
        assert!(value.get("contentType").is_some());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_post_ids_are_unique() {
        assert_ne!(PostId::generate(), PostId::generate());
    }
}
