//! Image-generation branch.
//!
//! The branch walks an explicit ordered list of image-capable models;
//! the first usable image wins and every failure mode degrades to
//! `None`. Nothing in this module can fail a pipeline run.

use std::sync::Arc;

use base64::Engine;
use tracing::{info, warn};

use tpost_gateway::LlmGateway;
use tpost_models::ImageArtifact;

use crate::prompts;

/// Image-capable models tried in order.
pub const DEFAULT_IMAGE_MODELS: &[&str] = &[
    "gemini-2.0-flash-preview-image-generation",
    "imagen-3.0-generate-002",
];

/// The pipeline's image branch.
#[derive(Clone)]
pub struct ImageBranch {
    gateway: Arc<dyn LlmGateway>,
    models: Vec<String>,
}

impl ImageBranch {
    pub fn new(gateway: Arc<dyn LlmGateway>, models: Vec<String>) -> Self {
        Self { gateway, models }
    }

    /// Generate a header image for the given draft.
    ///
    /// Tries each configured model in order; returns the first inline
    /// image produced, or `None` when every attempt fails or produces
    /// no image part.
    pub async fn generate(&self, summary: &str) -> Option<ImageArtifact> {
        let prompt = prompts::image_prompt(summary);

        for model in &self.models {
            match self.gateway.generate_image(model, &prompt).await {
                Ok(Some(image)) => {
                    info!(model = %model, "Image generated");
                    return Some(image);
                }
                Ok(None) => {
                    warn!(model = %model, "Model answered without an image part, trying next");
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "Image generation failed, trying next");
                }
            }
        }

        info!("No image produced by any configured model");
        None
    }
}

/// Decode a transport-encoded image payload into raw bytes.
///
/// Accepts plain base64 or a `data:` URI. Returns `None` for anything
/// undecodable or empty; callers treat that as "no image".
pub fn decode_image_payload(data: &str) -> Option<Vec<u8>> {
    let data = data.trim();

    // Strip a data-URI prefix: data:image/png;base64,....
    let encoded = if data.starts_with("data:") {
        data.split_once(',')?.1
    } else {
        data
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;

    if bytes.is_empty() {
        return None;
    }
    Some(bytes)
}
