use media_relay_lib::config::RelayConfig;
use media_relay_lib::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    media_relay_lib::run(RelayConfig::from_env()).await
}
