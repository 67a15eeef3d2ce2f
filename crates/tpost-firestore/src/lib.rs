//! Firestore REST persistence for generated posts.
//!
//! Posts live under `users/{uid}/posts`. The pipeline creates each
//! post exactly once; the dashboard lists them newest first.

pub mod client;
pub mod error;
pub mod posts_repo;
pub mod token_cache;
pub mod types;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use posts_repo::{FirestorePostRepository, PostStore};
