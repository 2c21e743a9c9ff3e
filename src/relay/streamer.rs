// Byte streamer - opens the source a StreamPlan points at

use std::sync::Arc;

use tracing::debug;

use super::errors::RelayError;
use super::extractors::MediaExtractor;
use super::http::RemoteHttp;
use super::models::{ByteSource, ByteStream, StreamPlan};

pub struct ByteStreamer {
    extractor: Arc<dyn MediaExtractor>,
    http: Arc<dyn RemoteHttp>,
}

impl ByteStreamer {
    pub fn new(extractor: Arc<dyn MediaExtractor>, http: Arc<dyn RemoteHttp>) -> Self {
        Self { extractor, http }
    }

    /// Open the plan's source.
    ///
    /// Errors here happen before the first byte and can still become a 500;
    /// errors inside the returned stream cannot.
    pub async fn open(&self, plan: &StreamPlan) -> Result<ByteStream, RelayError> {
        match &plan.source {
            ByteSource::Remote { url } => {
                debug!(url = %url, "streaming image over HTTP");
                self.http.open_media(url).await
            }
            ByteSource::Extractor { page_url } => {
                debug!(extractor = self.extractor.name(), "streaming video from extractor");
                self.extractor.open_stream(page_url).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::models::{ContentKind, ExtractionResult};
    use crate::relay::testing::{collect, FakeExtractor, FakeHttp};

    fn image_plan(url: &str) -> StreamPlan {
        StreamPlan {
            kind: ContentKind::Image,
            filename: "pic".to_string(),
            extension: "jpg".to_string(),
            media_type: "image/jpg".to_string(),
            source: ByteSource::Remote {
                url: url.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_image_goes_to_http() {
        let extractor = Arc::new(FakeExtractor::new(ExtractionResult::failure("unused")));
        let http = Arc::new(FakeHttp::with_media(b"jpegbytes".to_vec()));
        let streamer = ByteStreamer::new(extractor.clone(), http.clone());

        let body = streamer
            .open(&image_plan("https://cdn.example.com/a.jpg"))
            .await
            .unwrap();
        assert_eq!(collect(body).await.unwrap(), b"jpegbytes");
        assert_eq!(
            http.last_media_url().as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
        assert_eq!(extractor.stream_calls(), 0);
    }

    #[tokio::test]
    async fn test_http_error_surfaces_before_bytes() {
        let extractor = Arc::new(FakeExtractor::new(ExtractionResult::failure("unused")));
        let http = Arc::new(FakeHttp::default());
        let streamer = ByteStreamer::new(extractor, http);

        let err = streamer
            .open(&image_plan("https://cdn.example.com/gone.jpg"))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RelayError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_video_goes_to_extractor() {
        let extractor = Arc::new(
            FakeExtractor::new(ExtractionResult::failure("unused")).with_payload(b"mp4data".to_vec()),
        );
        let http = Arc::new(FakeHttp::default());
        let streamer = ByteStreamer::new(extractor.clone(), http.clone());

        let plan = StreamPlan {
            kind: ContentKind::Video,
            filename: "clip".to_string(),
            extension: "mp4".to_string(),
            media_type: "video/mp4".to_string(),
            source: ByteSource::Extractor {
                page_url: "https://example.com/v/1".to_string(),
            },
        };
        let body = streamer.open(&plan).await.unwrap();
        assert_eq!(collect(body).await.unwrap(), b"mp4data");
        assert_eq!(extractor.stream_calls(), 1);
        assert_eq!(http.media_calls(), 0);
    }
}
