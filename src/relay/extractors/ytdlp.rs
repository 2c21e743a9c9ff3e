// YtDlpExtractor - metadata dump and media streaming through yt-dlp

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::command::ExtractorCommand;
use super::traits::MediaExtractor;
use crate::relay::errors::RelayError;
use crate::relay::models::{ByteStream, ExtractionResult, MediaMetadata};
use crate::relay::utils::{run_output_with_timeout, spawn_stdout_stream};

/// Chunk size for media read from yt-dlp stdout
pub const VIDEO_CHUNK_SIZE: usize = 64 * 1024;

const DEFAULT_EXTENSION: &str = "mp4";
const DEFAULT_TITLE: &str = "downloaded_content";

/// The subset of `--dump-json` output the relay consumes
#[derive(Debug, Deserialize)]
struct DumpedInfo {
    ext: Option<String>,
    title: Option<String>,
    url: Option<String>,
}

pub struct YtDlpExtractor {
    command: ExtractorCommand,
    timeout_seconds: u64,
}

impl YtDlpExtractor {
    pub fn new(command: ExtractorCommand, timeout_seconds: u64) -> Self {
        Self {
            command,
            timeout_seconds,
        }
    }

    /// Parse the JSON document printed by `--dump-json`
    fn parse_metadata(stdout: &str, page_url: &str) -> Result<MediaMetadata, String> {
        let info: DumpedInfo = serde_json::from_str(stdout.trim())
            .map_err(|e| format!("Invalid JSON from extractor: {}", e))?;

        Ok(MediaMetadata {
            extension: info
                .ext
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
            title: info.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            source_url: info
                .url
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| page_url.to_string()),
        })
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    fn name(&self) -> &'static str {
        match self.command {
            ExtractorCommand::Python { .. } => "python-yt-dlp",
            ExtractorCommand::Cli { .. } => "cli-yt-dlp",
        }
    }

    async fn describe(&self, url: &str) -> ExtractionResult {
        let args = self.command.describe_args(url);
        debug!(extractor = self.name(), url, "dumping metadata");

        let output =
            match run_output_with_timeout(self.command.program(), args, self.timeout_seconds).await
            {
                Ok(out) => out,
                Err(e) => {
                    warn!(extractor = self.name(), error = %e, "extractor did not complete");
                    return ExtractionResult::failure(e.to_string());
                }
            };

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() || stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                extractor = self.name(),
                status = %output.status,
                "extractor failed or returned nothing"
            );
            return ExtractionResult::failure(stderr);
        }

        match Self::parse_metadata(&stdout, url) {
            Ok(metadata) => {
                info!(
                    extractor = self.name(),
                    ext = %metadata.extension,
                    "metadata extracted"
                );
                ExtractionResult::Metadata(metadata)
            }
            Err(e) => {
                warn!(extractor = self.name(), error = %e, "extractor output unusable");
                ExtractionResult::failure(e)
            }
        }
    }

    async fn open_stream(&self, url: &str) -> Result<ByteStream, RelayError> {
        let args = self.command.stream_args(url);
        debug!(extractor = self.name(), url, "starting media stream");
        let stream = spawn_stdout_stream(self.command.program(), args, VIDEO_CHUNK_SIZE)?;
        Ok(Box::pin(stream))
    }
}
