//! Pipeline error types.

use std::fmt;

use thiserror::Error;
use tpost_gateway::GatewayError;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, StageError>;

/// The stages of the generation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Summarize,
    SearchTerms,
    Enrich,
    Compose,
    ImageGenerate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Summarize => "summarize",
            Stage::SearchTerms => "search_terms",
            Stage::Enrich => "enrich",
            Stage::Compose => "compose",
            Stage::ImageGenerate => "image_generate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single stage's failure.
///
/// The two variants carry different recovery policies: a transport
/// failure means the remote call never produced an answer; a
/// validation failure means it answered with something structurally
/// unusable. Which stages treat either as fatal is the orchestrator's
/// decision, not this type's.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{stage} stage produced an invalid payload: {reason}")]
    Validation { stage: Stage, reason: String },

    #[error("{stage} stage transport failure: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: GatewayError,
    },
}

impl StageError {
    pub fn validation(stage: Stage, reason: impl Into<String>) -> Self {
        Self::Validation {
            stage,
            reason: reason.into(),
        }
    }

    /// Classify a gateway error for the given stage.
    pub fn from_gateway(stage: Stage, err: GatewayError) -> Self {
        if err.is_validation() {
            Self::Validation {
                stage,
                reason: err.to_string(),
            }
        } else {
            Self::Transport { stage, source: err }
        }
    }

    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            StageError::Validation { stage, .. } | StageError::Transport { stage, .. } => *stage,
        }
    }
}
