//! Input validation and sanitization.
//!
//! This module provides:
//! - Video URL validation (scheme, length, SSRF blocklist, YouTube id)
//! - Sanitization for user-supplied prompt text

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;
use url::Url;

use tpost_models::youtube;

/// Maximum URL length to prevent DoS attacks.
const MAX_URL_LENGTH: usize = 2048;

/// Maximum additional-prompt length.
pub const MAX_PROMPT_LENGTH: usize = 2000;

/// Blocked URL patterns (internal IPs, cloud metadata endpoints).
static BLOCKED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"^https?://127\.").unwrap(),
        Regex::new(r"^https?://localhost").unwrap(),
        Regex::new(r"^https?://10\.").unwrap(),
        Regex::new(r"^https?://172\.(1[6-9]|2[0-9]|3[0-1])\.").unwrap(),
        Regex::new(r"^https?://192\.168\.").unwrap(),
        Regex::new(r"^https?://169\.254\.").unwrap(),
        Regex::new(r"^https?://\[::1\]").unwrap(),
        Regex::new(r"^https?://\[fd").unwrap(),
        Regex::new(r"^https?://\[fe80").unwrap(),
        Regex::new(r"^https?://metadata\.").unwrap(),
    ]
});

/// Validate a submitted video reference.
///
/// Checks length, protocol and the SSRF blocklist, then requires a
/// structurally valid YouTube URL with an extractable video id.
/// Returns the trimmed URL on success, a caller-facing message on
/// failure.
pub fn validate_video_reference(url: &str) -> Result<String, String> {
    if url.len() > MAX_URL_LENGTH {
        return Err(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        ));
    }

    let url = url.trim();
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    let parsed = Url::parse(url).map_err(|e| format!("Invalid URL format: {}", e))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(format!(
                "Invalid protocol '{}'. Only HTTP and HTTPS are allowed.",
                scheme
            ))
        }
    }

    for pattern in BLOCKED_PATTERNS.iter() {
        if pattern.is_match(url) {
            warn!(url = %url, "Blocked URL pattern detected");
            return Err("URL appears to target an internal or restricted endpoint".to_string());
        }
    }

    youtube::extract_video_id(url)
        .map_err(|e| format!("Not a usable YouTube video URL: {}", e))?;

    Ok(url.to_string())
}

/// Sanitize user-provided prompt text for safe logging and prompting.
///
/// Strips control characters (except newline/tab) and caps the length.
pub fn sanitize_prompt(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(MAX_PROMPT_LENGTH)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_youtube_urls() {
        assert!(validate_video_reference("https://www.youtube.com/watch?v=dQw4w9WgXcQ").is_ok());
        assert!(validate_video_reference("https://youtu.be/dQw4w9WgXcQ").is_ok());
        assert!(validate_video_reference("https://youtube.com/shorts/dQw4w9WgXcQ").is_ok());
    }

    #[test]
    fn test_non_youtube_urls_rejected() {
        assert!(validate_video_reference("https://vimeo.com/123456789").is_err());
        assert!(validate_video_reference("https://example.com/video.mp4").is_err());
    }

    #[test]
    fn test_malformed_urls_rejected() {
        assert!(validate_video_reference("not-a-url").is_err());
        assert!(validate_video_reference("").is_err());
        assert!(validate_video_reference("https://youtube.com/watch?v=short").is_err());
    }

    #[test]
    fn test_blocked_internal_targets() {
        assert!(validate_video_reference("http://127.0.0.1/watch?v=dQw4w9WgXcQ").is_err());
        assert!(validate_video_reference("http://localhost/watch?v=dQw4w9WgXcQ").is_err());
        assert!(validate_video_reference("http://192.168.1.1/watch?v=dQw4w9WgXcQ").is_err());
        assert!(
            validate_video_reference("http://169.254.169.254/latest/meta-data/?v=dQw4w9WgXcQ")
                .is_err()
        );
    }

    #[test]
    fn test_invalid_protocols_rejected() {
        assert!(validate_video_reference("ftp://youtube.com/watch?v=dQw4w9WgXcQ").is_err());
        assert!(validate_video_reference("javascript:alert(1)").is_err());
    }

    #[test]
    fn test_overlong_url_rejected() {
        let url = format!("https://youtube.com/watch?v=dQw4w9WgXcQ&x={}", "a".repeat(3000));
        assert!(validate_video_reference(&url).is_err());
    }

    #[test]
    fn test_sanitize_prompt_strips_control_chars() {
        assert_eq!(sanitize_prompt("hello\x00world"), "helloworld");
        assert_eq!(sanitize_prompt("keep\nnewlines\tand tabs"), "keep\nnewlines\tand tabs");
    }

    #[test]
    fn test_sanitize_prompt_caps_length() {
        let long = "a".repeat(MAX_PROMPT_LENGTH + 100);
        assert_eq!(sanitize_prompt(&long).len(), MAX_PROMPT_LENGTH);
    }
}
