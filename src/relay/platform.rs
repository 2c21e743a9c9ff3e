// Platform policy: which URLs are refused, which get the scrape fallback

use std::fmt;

const REJECTED_DOMAINS: [&str; 2] = ["youtube.com", "youtu.be"];
const TWITTER_DOMAINS: [&str; 2] = ["twitter.com", "x.com"];
const INSTAGRAM_DOMAINS: [&str; 1] = ["instagram.com"];

pub const REJECTED_PLATFORM_MESSAGE: &str = "YouTube is not supported in this version.";

const TWITTER_NOT_FOUND: &str = "ไม่พบรูปภาพในลิงก์ X/Twitter นี้ (อาจเป็น Private)";
const INSTAGRAM_NOT_FOUND: &str = "ไม่พบรูปภาพ (IG อาจเป็น Private หรือต้อง Login)";
const GENERIC_NOT_FOUND: &str = "ไม่พบรูปภาพในลิงก์นี้";

/// Coarse classification of an input URL.
///
/// Matching is plain substring search on the raw URL, so `netflix.com` also
/// reads as twitter-like. That only widens which failures get a scrape attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformHint {
    RejectedVideoPlatform,
    TwitterLike,
    InstagramLike,
    Generic,
}

impl PlatformHint {
    pub fn from_url(url: &str) -> Self {
        let matches_any = |domains: &[&str]| domains.iter().any(|d| url.contains(d));

        if matches_any(&REJECTED_DOMAINS) {
            Self::RejectedVideoPlatform
        } else if matches_any(&TWITTER_DOMAINS) {
            Self::TwitterLike
        } else if matches_any(&INSTAGRAM_DOMAINS) {
            Self::InstagramLike
        } else {
            Self::Generic
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::RejectedVideoPlatform)
    }

    /// Platforms where a failed extraction is retried as an Open Graph scrape
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(self, Self::TwitterLike | Self::InstagramLike)
    }

    /// Short name used in logs and fallback titles
    pub fn label(&self) -> &'static str {
        match self {
            Self::RejectedVideoPlatform => "youtube",
            Self::TwitterLike => "twitter",
            Self::InstagramLike => "instagram",
            Self::Generic => "generic",
        }
    }

    /// User-facing message when the fallback scrape comes back empty
    pub fn not_found_message(&self) -> &'static str {
        match self {
            Self::TwitterLike => TWITTER_NOT_FOUND,
            Self::InstagramLike => INSTAGRAM_NOT_FOUND,
            _ => GENERIC_NOT_FOUND,
        }
    }
}

impl fmt::Display for PlatformHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
