// Error taxonomy for the relay pipeline

use thiserror::Error;

/// Everything that can stop a download request.
///
/// Only `Validation`, `PlatformRejected` and `FallbackNotFound` carry text that is
/// safe to show the caller; the rest are logged and reported generically.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// URL belongs to a platform the relay refuses to serve
    #[error("{0}")]
    PlatformRejected(String),

    /// Extractor failed and the platform has no fallback path
    #[error("ไม่สามารถดึงข้อมูลได้: {0}")]
    ExtractionFailed(String),

    /// Fallback scrape found nothing usable (private post, placeholder image, ...)
    #[error("{0}")]
    FallbackNotFound(String),

    /// Remote HTTP request failed before any byte reached the client
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// External process could not be started or supervised
    #[error("Process error: {0}")]
    Process(String),

    /// Read failure while bytes were already flowing
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),
}

impl RelayError {
    /// Whether the message may be echoed back to the client verbatim
    pub fn is_client_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::PlatformRejected(_) | Self::FallbackNotFound(_)
        )
    }
}
