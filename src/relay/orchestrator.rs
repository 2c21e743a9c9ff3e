// Relay orchestrator - deny-list, extract, fallback, classify, open stream
//
// Received -> deny-list -> extract -> [fallback] -> classify -> stream
// Each collaborator is called at most once per request; extract-then-scrape
// is two different methods, not a retry.

use std::sync::Arc;

use tracing::{info, warn};

use super::classifier;
use super::errors::RelayError;
use super::extractors::{diagnose_failure, MediaExtractor};
use super::http::RemoteHttp;
use super::models::{ByteStream, ContentRequest, ExtractionResult, MediaMetadata, StreamPlan};
use super::platform::{PlatformHint, REJECTED_PLATFORM_MESSAGE};
use super::scraper::PageScraper;
use super::streamer::ByteStreamer;

/// A plan plus its already-opened byte source
pub struct PreparedDownload {
    pub plan: StreamPlan,
    pub body: ByteStream,
}

pub struct Relay {
    extractor: Arc<dyn MediaExtractor>,
    scraper: PageScraper,
    streamer: ByteStreamer,
}

impl Relay {
    pub fn new(extractor: Arc<dyn MediaExtractor>, http: Arc<dyn RemoteHttp>) -> Self {
        Self {
            scraper: PageScraper::new(http.clone()),
            streamer: ByteStreamer::new(extractor.clone(), http),
            extractor,
        }
    }

    /// Run everything up to (not including) the first byte
    pub async fn resolve(&self, request: &ContentRequest) -> Result<StreamPlan, RelayError> {
        let url = request.url();
        info!(url, "analyzing content");

        let hint = PlatformHint::from_url(url);
        if hint.is_rejected() {
            info!(url, "rejected platform");
            return Err(RelayError::PlatformRejected(
                REJECTED_PLATFORM_MESSAGE.to_string(),
            ));
        }

        let (metadata, is_fallback) = match self.extractor.describe(url).await {
            ExtractionResult::Metadata(metadata) => (metadata, false),
            ExtractionResult::Failure { reason } => {
                (self.fallback(url, hint, reason).await?, true)
            }
        };

        Ok(classifier::plan(metadata, url, is_fallback))
    }

    /// Extraction failed: scrape if the platform allows it, otherwise give up
    async fn fallback(
        &self,
        url: &str,
        hint: PlatformHint,
        reason: String,
    ) -> Result<MediaMetadata, RelayError> {
        let diagnosis = diagnose_failure(&reason);
        warn!(
            extractor = self.extractor.name(),
            platform = %hint,
            diagnosis = diagnosis.map(|d| d.description()).unwrap_or("none"),
            scrape_promising = diagnosis.map(|d| d.scrape_might_help()).unwrap_or(false),
            error = %reason,
            "extractor failed/empty"
        );

        if !hint.is_fallback_eligible() {
            return Err(RelayError::ExtractionFailed(reason));
        }

        self.scraper
            .scrape(url, hint)
            .await
            .ok_or_else(|| RelayError::FallbackNotFound(hint.not_found_message().to_string()))
    }

    /// Resolve and open the byte source
    pub async fn prepare(&self, request: &ContentRequest) -> Result<PreparedDownload, RelayError> {
        let plan = self.resolve(request).await?;
        let body = self.streamer.open(&plan).await?;
        Ok(PreparedDownload { plan, body })
    }
}
