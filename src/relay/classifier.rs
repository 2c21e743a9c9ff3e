// Content classifier - image or video, filename, media type

use tracing::info;

use super::models::{ByteSource, ContentKind, MediaMetadata, StreamPlan};

/// Extensions served as images; anything else is streamed as video
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

pub const MAX_FILENAME_CHARS: usize = 50;
pub const FALLBACK_FILENAME: &str = "content";

const DEFAULT_IMAGE_EXTENSION: &str = "jpg";
const VIDEO_EXTENSION: &str = "mp4";
const VIDEO_MEDIA_TYPE: &str = "video/mp4";

pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}

/// Reduce a title to a safe download name.
///
/// Keeps Unicode `Alphabetic`/`Numeric` chars (combining vowel marks such as
/// U+0E34 included) plus space, `-`, `_` and `.`; at most
/// `MAX_FILENAME_CHARS` characters. Idempotent.
pub fn sanitize_filename(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.'))
        .collect();

    // Trim again after the cut so a space at position 50 does not survive
    let truncated: String = kept.trim().chars().take(MAX_FILENAME_CHARS).collect();
    let name = truncated.trim();

    if name.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        name.to_string()
    }
}

/// Turn resolved metadata into the one plan the streamer will execute.
///
/// Fallback results are always images; otherwise the extension decides.
pub fn plan(metadata: MediaMetadata, page_url: &str, is_fallback: bool) -> StreamPlan {
    let filename = sanitize_filename(&metadata.title);

    if is_fallback || is_image_extension(&metadata.extension) {
        info!(fallback = is_fallback, "detected: IMAGE");
        let extension = if is_image_extension(&metadata.extension) {
            metadata.extension
        } else {
            DEFAULT_IMAGE_EXTENSION.to_string()
        };
        StreamPlan {
            kind: ContentKind::Image,
            media_type: format!("image/{}", extension),
            filename,
            extension,
            source: ByteSource::Remote {
                url: metadata.source_url,
            },
        }
    } else {
        info!("detected: VIDEO");
        StreamPlan {
            kind: ContentKind::Video,
            media_type: VIDEO_MEDIA_TYPE.to_string(),
            filename,
            extension: VIDEO_EXTENSION.to_string(),
            source: ByteSource::Extractor {
                page_url: page_url.to_string(),
            },
        }
    }
}
