// Page scraper - Open Graph / Twitter Card fallback when yt-dlp gives up
//
// Matching is a first-occurrence regex scan over raw HTML, not a parser.
// Attribute order matters: `content="..." property="og:image"` is not found.
// Everything tag-related sits behind `find_meta_content` so a structural
// parser can replace it without touching callers.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};
use url::Url;

use super::http::RemoteHttp;
use super::models::MediaMetadata;
use super::platform::PlatformHint;

/// Path fragments of X's default avatar / logo images
const PLACEHOLDER_MARKERS: [&str; 2] = ["default_profile_images", "abs.twimg.com"];

const IMAGE_CDN_MARKER: &str = "twimg.com";
const ORIGINAL_SIZE_QUERY: &str = "format=jpg&name=orig";

const FALLBACK_EXTENSION: &str = "jpg";

lazy_static! {
    static ref TWITTER_IMAGE_RE: Regex =
        Regex::new(r#"name="twitter:image"\s+content="([^"]+)""#).unwrap();
    static ref OG_IMAGE_RE: Regex =
        Regex::new(r#"property="og:image"\s+content="([^"]+)""#).unwrap();
}

/// Meta tags the scraper knows how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaTag {
    TwitterImage,
    OgImage,
}

/// First `content` value of `tag` in `html`
pub fn find_meta_content(html: &str, tag: MetaTag) -> Option<&str> {
    let re = match tag {
        MetaTag::TwitterImage => &*TWITTER_IMAGE_RE,
        MetaTag::OgImage => &*OG_IMAGE_RE,
    };
    re.captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Tag priority per platform
fn tag_priority(hint: PlatformHint) -> &'static [MetaTag] {
    match hint {
        PlatformHint::TwitterLike => &[MetaTag::TwitterImage, MetaTag::OgImage],
        _ => &[MetaTag::OgImage],
    }
}

/// Best image candidate in `html` for this platform
pub fn find_image_candidate(html: &str, hint: PlatformHint) -> Option<&str> {
    tag_priority(hint)
        .iter()
        .find_map(|tag| find_meta_content(html, *tag))
}

pub fn is_placeholder(image_url: &str) -> bool {
    PLACEHOLDER_MARKERS.iter().any(|m| image_url.contains(m))
}

/// Ask the image CDN for the original-size variant. Idempotent.
pub fn normalize_cdn_url(image_url: &str) -> String {
    if !image_url.contains(IMAGE_CDN_MARKER) {
        return image_url.to_string();
    }
    let base = image_url.split('?').next().unwrap_or(image_url);
    format!("{}?{}", base, ORIGINAL_SIZE_QUERY)
}

/// Only `&amp;` is decoded; other entities pass through untouched
pub fn decode_amp(image_url: &str) -> String {
    image_url.replace("&amp;", "&")
}

/// Make a relative or protocol-relative candidate absolute against the page
fn absolutize(candidate: &str, page_url: &str) -> Option<String> {
    if candidate.starts_with("http://") || candidate.starts_with("https://") {
        return Some(candidate.to_string());
    }
    let base = Url::parse(page_url).ok()?;
    base.join(candidate).ok().map(|u| u.to_string())
}

/// Pure part of the fallback: HTML in, metadata out
pub fn extract_fallback(html: &str, page_url: &str, hint: PlatformHint) -> Option<MediaMetadata> {
    let candidate = find_image_candidate(html, hint)?;

    if is_placeholder(candidate) {
        warn!(platform = %hint, candidate, "found default/placeholder image, skipping");
        return None;
    }

    let normalized = decode_amp(&normalize_cdn_url(candidate));
    let source_url = absolutize(&normalized, page_url)?;

    Some(MediaMetadata {
        extension: FALLBACK_EXTENSION.to_string(),
        title: format!("{}_image_fallback", hint.label()),
        source_url,
    })
}

/// Fallback tag extractor over a remote page
pub struct PageScraper {
    http: Arc<dyn RemoteHttp>,
}

impl PageScraper {
    pub fn new(http: Arc<dyn RemoteHttp>) -> Self {
        Self { http }
    }

    /// Never fails hard: network and parse problems both come back as `None`
    pub async fn scrape(&self, url: &str, hint: PlatformHint) -> Option<MediaMetadata> {
        info!(platform = %hint, "attempting image fallback (crawler mode)");

        let html = match self.http.fetch_page(url).await {
            Ok(html) => html,
            Err(e) => {
                error!(platform = %hint, error = %e, "fallback failed");
                return None;
            }
        };

        let found = extract_fallback(&html, url, hint);
        match &found {
            Some(meta) => info!(platform = %hint, image = %meta.source_url, "fallback success"),
            None => warn!(platform = %hint, "fallback found no usable image"),
        }
        found
    }
}
