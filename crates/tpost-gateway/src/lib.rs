//! Outbound AI adapters for the TubePost backend.
//!
//! This crate provides:
//! - A generateContent REST client for the hosted LLM gateway
//!   (structured-JSON text generation and inline image generation)
//! - A server-sent-events decoder
//! - A client for the web-search agent service used by the
//!   enrichment stage

pub mod client;
pub mod error;
pub mod search;
pub mod sse;

pub use client::{GatewayClient, GatewayConfig, LlmGateway, MediaRef};
pub use error::{GatewayError, GatewayResult};
pub use search::{EnrichmentSource, SearchAgentClient, SearchAgentConfig};
pub use sse::{SseDecoder, SseEvent};
