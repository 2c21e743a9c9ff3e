// Failure diagnostics - classifies extractor stderr for the server log
//
// The classification never changes what the client sees; it only makes the
// log line for a failed extraction readable at a glance.

/// Why the extractor most likely failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Platform wants a logged-in session
    LoginRequired,

    /// Post or account is private
    PrivateContent,

    /// Deleted, removed, or never existed
    ContentUnavailable,

    /// yt-dlp has no extractor for this URL
    UnsupportedUrl,

    /// 429 or similar throttling
    RateLimited,

    /// HTTP 403 Forbidden
    Http403Forbidden,

    /// Timed out, connection refused, DNS
    NetworkTimeout,

    /// Post has no downloadable media (text-only tweet, image post)
    NoMedia,

    Unknown,
}

impl FailureReason {
    /// Whether the Open Graph scrape has a realistic chance after this failure
    pub fn scrape_might_help(&self) -> bool {
        matches!(
            self,
            Self::LoginRequired | Self::NoMedia | Self::Http403Forbidden | Self::Unknown
        )
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::LoginRequired => "Login required",
            Self::PrivateContent => "Private content",
            Self::ContentUnavailable => "Content unavailable",
            Self::UnsupportedUrl => "Unsupported URL",
            Self::RateLimited => "Rate limited",
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::NetworkTimeout => "Network timeout",
            Self::NoMedia => "No video in post",
            Self::Unknown => "Unknown error",
        }
    }
}

/// Analyze extractor diagnostic text and return the likely reason
pub fn diagnose_failure(error: &str) -> Option<FailureReason> {
    let lower = error.to_lowercase();

    if lower.contains("unsupported url") {
        return Some(FailureReason::UnsupportedUrl);
    }

    if lower.contains("no video could be found")
        || lower.contains("no video formats found")
        || lower.contains("there's no video in this post")
    {
        return Some(FailureReason::NoMedia);
    }

    if lower.contains("login required")
        || lower.contains("log in")
        || lower.contains("login")
        || lower.contains("cookies")
        || lower.contains("authentication")
    {
        return Some(FailureReason::LoginRequired);
    }

    if lower.contains("private") || lower.contains("protected tweets") {
        return Some(FailureReason::PrivateContent);
    }

    if lower.contains("not found")
        || lower.contains("404")
        || lower.contains("unavailable")
        || lower.contains("has been removed")
        || lower.contains("does not exist")
    {
        return Some(FailureReason::ContentUnavailable);
    }

    if lower.contains("429") || lower.contains("rate limit") || lower.contains("too many requests")
    {
        return Some(FailureReason::RateLimited);
    }

    if lower.contains("403") || lower.contains("forbidden") {
        return Some(FailureReason::Http403Forbidden);
    }

    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network unreachable")
        || lower.contains("name or service not known")
    {
        return Some(FailureReason::NetworkTimeout);
    }

    if !error.trim().is_empty() {
        return Some(FailureReason::Unknown);
    }

    None
}
