// ExtractorCommand - how yt-dlp gets launched and with which flags
//
// Both operations (metadata dump and byte streaming) share the same program
// and identity flags; only the mode-specific flags differ.

use std::process::Command as StdCommand;

use tracing::{debug, info};

use super::traits::{ExtractorConfig, ExtractorMode};
use crate::relay::http::BROWSER_USER_AGENT;

const ACCEPT_LANGUAGE_HEADER: &str = "Accept-Language:th-TH,th;q=0.9,en;q=0.8";

/// Prefer an mp4 container, otherwise whatever yt-dlp rates best
const STREAM_FORMAT: &str = "best[ext=mp4]/best";

/// Resolved launcher for yt-dlp
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractorCommand {
    /// `<interpreter> -m yt_dlp ...`
    Python { interpreter: String },
    /// `<binary> ...`
    Cli { binary: String },
}

impl ExtractorCommand {
    /// Pick the launcher once, at startup.
    ///
    /// Probing spawns processes, so this must not run per request.
    pub fn resolve(config: &ExtractorConfig) -> Self {
        let cli = || Self::Cli {
            binary: config.binary.clone().unwrap_or_else(find_ytdlp),
        };
        let python = || Self::Python {
            interpreter: config.python.clone(),
        };

        let command = match config.mode {
            ExtractorMode::Python => python(),
            ExtractorMode::Cli => cli(),
            ExtractorMode::Auto => {
                if python_has_ytdlp(&config.python) {
                    python()
                } else {
                    debug!(
                        interpreter = %config.python,
                        "yt_dlp module not importable, using native binary"
                    );
                    cli()
                }
            }
        };

        info!(mode = %config.mode, command = %command.describe_self(), "extractor resolved");
        command
    }

    pub fn program(&self) -> &str {
        match self {
            Self::Python { interpreter } => interpreter,
            Self::Cli { binary } => binary,
        }
    }

    fn prefix_args(&self) -> Vec<String> {
        match self {
            Self::Python { .. } => vec!["-m".to_string(), "yt_dlp".to_string()],
            Self::Cli { .. } => Vec::new(),
        }
    }

    fn describe_self(&self) -> String {
        let mut parts = vec![self.program().to_string()];
        parts.extend(self.prefix_args());
        parts.join(" ")
    }

    /// Arguments for a single-document JSON metadata dump
    pub fn describe_args(&self, url: &str) -> Vec<String> {
        let mut args = self.prefix_args();
        args.extend(
            [
                "--dump-json",
                "--quiet",
                "--no-warnings",
                "--no-playlist",
                "--add-header",
                ACCEPT_LANGUAGE_HEADER,
                "--user-agent",
                BROWSER_USER_AGENT,
                "--ignore-no-formats-error",
                url,
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args
    }

    /// Arguments that make yt-dlp write the raw media to stdout
    pub fn stream_args(&self, url: &str) -> Vec<String> {
        let mut args = self.prefix_args();
        args.extend(
            [
                "--format",
                STREAM_FORMAT,
                "--output",
                "-",
                "--quiet",
                "--no-warnings",
                "--no-playlist",
                "--user-agent",
                BROWSER_USER_AGENT,
                url,
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args
    }
}

/// Check if the interpreter can import yt_dlp
fn python_has_ytdlp(interpreter: &str) -> bool {
    match StdCommand::new(interpreter)
        .args(["-c", "import yt_dlp"])
        .output()
    {
        Ok(out) => out.status.success(),
        Err(_) => false,
    }
}

/// Find yt-dlp binary
fn find_ytdlp() -> String {
    let common_paths = [
        "/usr/local/bin/yt-dlp",
        "/usr/bin/yt-dlp",
        "/opt/homebrew/bin/yt-dlp",
    ];

    for path in common_paths {
        if std::path::Path::new(path).exists() {
            return path.to_string();
        }
    }

    if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
        if output.status.success() {
            if let Ok(path) = String::from_utf8(output.stdout) {
                let trimmed = path.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }
    }

    "yt-dlp".to_string()
}
