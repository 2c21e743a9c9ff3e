pub mod config;
pub mod logging;
pub mod relay;
pub mod server;

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use config::RelayConfig;
use relay::extractors::{ExtractorCommand, YtDlpExtractor};
use relay::http::ReqwestHttp;
use relay::Relay;

/// Wire the collaborators together and serve until the listener fails
pub async fn run(config: RelayConfig) -> anyhow::Result<()> {
    let extractor_config = config.extractor.clone();
    let command = tokio::task::spawn_blocking(move || ExtractorCommand::resolve(&extractor_config))
        .await
        .context("extractor probe panicked")?;

    let extractor = Arc::new(YtDlpExtractor::new(
        command,
        config.extractor.timeout_seconds,
    ));
    let http = Arc::new(ReqwestHttp::new(config.scrape_timeout()).context("building HTTP client")?);
    let relay = Arc::new(Relay::new(extractor, http));

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {}", address))?;
    info!(address = %address, "media relay listening");

    axum::serve(listener, server::router(relay))
        .await
        .context("server terminated")?;
    Ok(())
}
