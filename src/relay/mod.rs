// Relay module - extraction-and-fallback pipeline behind /api/download

pub mod classifier;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod models;
pub mod orchestrator;
pub mod platform;
pub mod scraper;
pub mod streamer;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::RelayError;
pub use models::{ContentKind, ContentRequest, ExtractionResult, MediaMetadata, StreamPlan};
pub use orchestrator::{PreparedDownload, Relay};
pub use platform::PlatformHint;
