//! YouTube video reference parsing.
//!
//! The pipeline only ever hands the gateway a canonical YouTube URL, so
//! the id is extracted and validated up front at the API boundary.

/// Errors that can occur while extracting a video id from a reference URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoRefError {
    /// URL does not point at a YouTube host.
    NotYoutube,
    /// A candidate id was found but has an invalid format.
    InvalidId,
    /// No video id present in the URL.
    IdNotFound,
}

impl std::fmt::Display for VideoRefError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoRefError::NotYoutube => write!(f, "URL is not a YouTube URL"),
            VideoRefError::InvalidId => write!(f, "video id has an invalid format"),
            VideoRefError::IdNotFound => write!(f, "no video id found in URL"),
        }
    }
}

impl std::error::Error for VideoRefError {}

pub type VideoRefResult<T> = Result<T, VideoRefError>;

/// YouTube video ids are exactly 11 characters.
const ID_LEN: usize = 11;

/// Markers after which a video id may appear, in order of preference.
const ID_MARKERS: &[&str] = &[
    "?v=", "&v=", "youtu.be/", "/embed/", "/shorts/", "/live/", "/v/",
];

/// Extract the 11-character video id from a YouTube URL.
///
/// Handles watch, short-link, embed, shorts, live and `/v/` forms, with
/// or without trailing query parameters and fragments.
pub fn extract_video_id(url: &str) -> VideoRefResult<String> {
    let url = url.trim();

    let lowered = url.to_ascii_lowercase();
    if !lowered.contains("youtube.com") && !lowered.contains("youtu.be") {
        return Err(VideoRefError::NotYoutube);
    }

    for marker in ID_MARKERS {
        if let Some(pos) = url.find(marker) {
            let tail = &url[pos + marker.len()..];
            let id = take_id_segment(tail);
            if id.is_empty() {
                continue;
            }
            return validate_id(id);
        }
    }

    Err(VideoRefError::IdNotFound)
}

/// Cut the candidate id off at the first delimiter.
fn take_id_segment(tail: &str) -> &str {
    let end = tail
        .find(['&', '#', '?', '/'])
        .unwrap_or(tail.len());
    tail[..end].trim()
}

fn validate_id(id: &str) -> VideoRefResult<String> {
    if id.len() != ID_LEN {
        return Err(VideoRefError::InvalidId);
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(VideoRefError::InvalidId);
    }
    Ok(id.to_string())
}
