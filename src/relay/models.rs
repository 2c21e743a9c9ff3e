// Common data models for the relay pipeline

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;

use super::errors::RelayError;

/// Forward-only sequence of media chunks handed to the HTTP layer.
///
/// A read failure after the first chunk surfaces as `RelayError::Transport`.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, RelayError>> + Send>>;

/// A single incoming download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    url: String,
}

impl ContentRequest {
    pub fn new(url: impl Into<String>) -> Result<Self, RelayError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(RelayError::Validation("URL is required".to_string()));
        }
        Ok(Self { url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Metadata produced by the extractor or the fallback scraper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMetadata {
    /// File extension reported by the source (mp4, jpg, ...)
    pub extension: String,
    pub title: String,
    /// Fully-qualified URL of the media itself
    pub source_url: String,
}

/// Outcome of one extraction attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Metadata(MediaMetadata),
    Failure { reason: String },
}

impl ExtractionResult {
    pub fn failure(reason: impl Into<String>) -> Self {
        Self::Failure {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Image,
    Video,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the streamed bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteSource {
    /// Plain HTTP GET of an already-resolved media URL
    Remote { url: String },
    /// yt-dlp writing the media for this page URL to stdout
    Extractor { page_url: String },
}

/// Everything the streaming stage needs, decided once per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamPlan {
    pub kind: ContentKind,
    /// Sanitized title, not yet percent-encoded
    pub filename: String,
    pub extension: String,
    pub media_type: String,
    pub source: ByteSource,
}

impl StreamPlan {
    /// `Content-Disposition` value with RFC 5987 UTF-8 filename
    pub fn content_disposition(&self) -> String {
        format!(
            "attachment; filename*=UTF-8''{}.{}",
            urlencoding::encode(&self.filename),
            self.extension
        )
    }
}
