//! The blog generation pipeline.
//!
//! Five stages, run as a linear sequence with one fork/join:
//!
//! ```text
//! SUMMARIZE → [SEARCH_TERMS → ENRICH → COMPOSE] ∥ [IMAGE (if requested)] → JOIN
//! ```
//!
//! Text stages are fatal on failure; the image branch always degrades
//! to "no image".

pub mod error;
pub mod image;
pub mod orchestrator;
pub mod prompts;
pub mod stage;

pub use error::{PipelineResult, Stage, StageError};
pub use image::{decode_image_payload, ImageBranch, DEFAULT_IMAGE_MODELS};
pub use orchestrator::{PipelineOrchestrator, PipelineOutput};
pub use stage::StageRunner;
