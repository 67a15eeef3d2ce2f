//! Single-stage execution against the LLM gateway.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use tpost_gateway::{LlmGateway, MediaRef};

use crate::error::{PipelineResult, Stage, StageError};

/// Runs one prompt/response round trip with contract enforcement.
///
/// The runner builds the prompt from the stage's typed input, invokes
/// the gateway, then deserializes the raw JSON value into the stage's
/// output type. A payload that does not fit the output shape is a
/// [`StageError::Validation`]; a failed remote call is a
/// [`StageError::Transport`]. Stateless between invocations.
#[derive(Clone)]
pub struct StageRunner {
    gateway: Arc<dyn LlmGateway>,
}

impl StageRunner {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self { gateway }
    }

    /// Execute one stage.
    pub async fn run<I, O>(
        &self,
        stage: Stage,
        input: &I,
        prompt: impl FnOnce(&I) -> String,
        media: Option<&MediaRef>,
    ) -> PipelineResult<O>
    where
        O: DeserializeOwned,
    {
        let prompt = prompt(input);
        debug!(stage = %stage, prompt_len = prompt.len(), "Running stage");

        let value = self
            .gateway
            .generate_value(&prompt, media)
            .await
            .map_err(|e| StageError::from_gateway(stage, e))?;

        serde_json::from_value(value).map_err(|e| {
            StageError::validation(stage, format!("output schema mismatch: {}", e))
        })
    }
}
