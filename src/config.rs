// Relay config - process-wide settings, read once from the environment

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::relay::extractors::{ExtractorConfig, ExtractorMode};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_SCRAPE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub extractor: ExtractorConfig,
    pub scrape_timeout_seconds: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            extractor: ExtractorConfig::default(),
            scrape_timeout_seconds: DEFAULT_SCRAPE_TIMEOUT_SECS,
        }
    }
}

impl RelayConfig {
    /// Build from `PORT`, `HOST`, `RELAY_EXTRACTOR_MODE`, `YTDLP_PYTHON`,
    /// `YTDLP_PATH`, `RELAY_EXTRACT_TIMEOUT_SECS`, `RELAY_SCRAPE_TIMEOUT_SECS`.
    /// Bad values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let mut extractor = defaults
            .extractor
            .with_mode(parse_var(&lookup, "RELAY_EXTRACTOR_MODE").unwrap_or(ExtractorMode::Auto))
            .with_binary(lookup("YTDLP_PATH").filter(|v| !v.trim().is_empty()));
        if let Some(python) = lookup("YTDLP_PYTHON").filter(|v| !v.trim().is_empty()) {
            extractor = extractor.with_python(python);
        }
        if let Some(secs) =
            parse_var(&lookup, "RELAY_EXTRACT_TIMEOUT_SECS").filter(|s: &u64| *s > 0)
        {
            extractor = extractor.with_timeout(secs);
        }

        Self {
            host: lookup("HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT").unwrap_or(defaults.port),
            extractor,
            scrape_timeout_seconds: parse_var(&lookup, "RELAY_SCRAPE_TIMEOUT_SECS")
                .filter(|s: &u64| *s > 0)
                .unwrap_or(defaults.scrape_timeout_seconds),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout_seconds)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "ignoring invalid environment value");
            None
        }
    }
}
