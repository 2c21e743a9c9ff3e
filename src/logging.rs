// Logging - structured `tracing` output to stderr

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "media_relay=info,media_relay_lib=info,tower_http=info";

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
