//! Blob storage for generated blog images.
//!
//! Provides an S3-compatible (Cloudflare R2) client that uploads image
//! bytes and exposes them through a public base URL, plus the
//! [`MediaStore`] seam the pipeline consumes.

pub mod client;
pub mod error;

pub use client::{MediaStore, R2Client, R2Config};
pub use error::{StorageError, StorageResult};
