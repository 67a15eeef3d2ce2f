//! Generation request and blog style enums.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Target length for a generated blog post.
///
/// Word budgets: short 250-400, medium 500-800, long 900+.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlogLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl BlogLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogLength::Short => "short",
            BlogLength::Medium => "medium",
            BlogLength::Long => "long",
        }
    }

    /// Human-readable word budget used in prompts.
    pub fn word_budget(&self) -> &'static str {
        match self {
            BlogLength::Short => "250-400 words",
            BlogLength::Medium => "500-800 words",
            BlogLength::Long => "at least 900 words",
        }
    }
}

impl fmt::Display for BlogLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BlogLength {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(BlogLength::Short),
            "medium" => Ok(BlogLength::Medium),
            "long" => Ok(BlogLength::Long),
            _ => Err(StyleParseError::new("length", s)),
        }
    }
}

/// Writing tone for a generated blog post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlogTone {
    Conversational,
    Professional,
    Formal,
    Casual,
    Engaging,
    Persuasive,
    Expository,
    #[default]
    Neutral,
}

impl BlogTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogTone::Conversational => "conversational",
            BlogTone::Professional => "professional",
            BlogTone::Formal => "formal",
            BlogTone::Casual => "casual",
            BlogTone::Engaging => "engaging",
            BlogTone::Persuasive => "persuasive",
            BlogTone::Expository => "expository",
            BlogTone::Neutral => "neutral",
        }
    }
}

impl fmt::Display for BlogTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BlogTone {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conversational" => Ok(BlogTone::Conversational),
            "professional" => Ok(BlogTone::Professional),
            "formal" => Ok(BlogTone::Formal),
            "casual" => Ok(BlogTone::Casual),
            "engaging" => Ok(BlogTone::Engaging),
            "persuasive" => Ok(BlogTone::Persuasive),
            "expository" => Ok(BlogTone::Expository),
            "neutral" => Ok(BlogTone::Neutral),
            _ => Err(StyleParseError::new("tone", s)),
        }
    }
}

/// Content format for a generated blog post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlogContentType {
    #[default]
    Informative,
    Tutorial,
    Opinion,
    Summary,
    Narrative,
}

impl BlogContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogContentType::Informative => "informative",
            BlogContentType::Tutorial => "tutorial",
            BlogContentType::Opinion => "opinion",
            BlogContentType::Summary => "summary",
            BlogContentType::Narrative => "narrative",
        }
    }
}

impl fmt::Display for BlogContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BlogContentType {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "informative" => Ok(BlogContentType::Informative),
            "tutorial" => Ok(BlogContentType::Tutorial),
            "opinion" => Ok(BlogContentType::Opinion),
            "summary" => Ok(BlogContentType::Summary),
            "narrative" => Ok(BlogContentType::Narrative),
            _ => Err(StyleParseError::new("content type", s)),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown {kind}: {value}")]
pub struct StyleParseError {
    kind: &'static str,
    value: String,
}

impl StyleParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// A validated request to generate a blog post from a YouTube video.
///
/// Immutable once accepted; constructed at the API boundary from
/// untrusted input and validated before it reaches the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// YouTube video URL.
    pub video_reference: String,
    #[serde(default)]
    pub length: BlogLength,
    #[serde(default)]
    pub tone: BlogTone,
    #[serde(default)]
    pub content_type: BlogContentType,
    #[serde(default)]
    pub generate_image: bool,
    /// Extra free-text instructions folded into the summarize prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_prompt: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_round_trip() {
        for (s, v) in [
            ("short", BlogLength::Short),
            ("medium", BlogLength::Medium),
            ("long", BlogLength::Long),
        ] {
            assert_eq!(s.parse::<BlogLength>().unwrap(), v);
            assert_eq!(v.to_string(), s);
        }
        assert!("huge".parse::<BlogLength>().is_err());
    }

    #[test]
    fn test_tone_parse() {
        assert_eq!("Engaging".parse::<BlogTone>().unwrap(), BlogTone::Engaging);
        assert!("sarcastic".parse::<BlogTone>().is_err());
    }

    #[test]
    fn test_request_defaults_from_minimal_json() {
        let req: GenerationRequest = serde_json::from_str(
            r#"{"videoReference": "https://youtube.com/watch?v=dQw4w9WgXcQ"}"#,
        )
        .unwrap();
        assert_eq!(req.length, BlogLength::Medium);
        assert_eq!(req.tone, BlogTone::Neutral);
        assert_eq!(req.content_type, BlogContentType::Informative);
        assert!(!req.generate_image);
        assert!(req.additional_prompt.is_none());
    }

    #[test]
    fn test_request_rejects_unknown_enum_value() {
        let result: Result<GenerationRequest, _> = serde_json::from_str(
            r#"{"videoReference": "https://youtu.be/dQw4w9WgXcQ", "tone": "angry"}"#,
        );
        assert!(result.is_err());
    }
}
