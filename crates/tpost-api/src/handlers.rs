//! HTTP handlers.

pub mod generate;
pub mod health;
pub mod posts;

pub use health::{health, ready};
