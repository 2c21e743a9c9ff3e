// MediaExtractor trait and extractor configuration

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::relay::errors::RelayError;
use crate::relay::models::{ByteStream, ExtractionResult};

/// How the external yt-dlp is launched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractorMode {
    /// `python3 -m yt_dlp`
    Python,
    /// Native `yt-dlp` binary
    Cli,
    /// Python when the module is importable, CLI otherwise
    #[default]
    Auto,
}

impl fmt::Display for ExtractorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Cli => write!(f, "cli"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for ExtractorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "python" => Ok(Self::Python),
            "cli" => Ok(Self::Cli),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown extractor mode: {}", other)),
        }
    }
}

/// Configuration for the external extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub mode: ExtractorMode,
    /// Interpreter used in Python mode
    pub python: String,
    /// Explicit yt-dlp binary; discovered from common paths when unset
    pub binary: Option<String>,
    /// Hard limit for the metadata dump, in seconds
    pub timeout_seconds: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            mode: ExtractorMode::Auto,
            python: "python3".to_string(),
            binary: None,
            timeout_seconds: 30,
        }
    }
}

impl ExtractorConfig {
    pub fn with_mode(mut self, mode: ExtractorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_python(mut self, python: impl Into<String>) -> Self {
        self.python = python.into();
        self
    }

    pub fn with_binary(mut self, binary: Option<String>) -> Self {
        self.binary = binary;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// The external metadata/media tool, seen as one collaborator with two modes.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Dump metadata for `url`. Never errors: failures come back as `Failure`.
    async fn describe(&self, url: &str) -> ExtractionResult;

    /// Start writing the media for `url` and expose it as a byte stream
    async fn open_stream(&self, url: &str) -> Result<ByteStream, RelayError>;
}
