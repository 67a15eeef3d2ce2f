//! Gateway error types.

use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur while talking to the remote AI services.
///
/// [`GatewayError::is_validation`] separates "the call succeeded but the
/// payload is structurally unusable" from transport-level failures; the
/// pipeline applies different recovery policies to the two classes.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Response carried no usable content")]
    MissingContent,

    #[error("Invalid response payload: {0}")]
    InvalidPayload(String),

    #[error("Event stream error: {0}")]
    Stream(String),
}

impl GatewayError {
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }

    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }

    /// Whether the remote call itself succeeded but returned a payload
    /// that failed schema validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GatewayError::MissingContent | GatewayError::InvalidPayload(_)
        )
    }
}
