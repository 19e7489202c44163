use anyhow::Context;
use tracing_subscriber::EnvFilter;

use skycast::{SkycastConfig, cache, web};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = SkycastConfig::from_env().context("Failed to load configuration")?;
    cache::init(&config).context("Failed to open page cache")?;

    web::run(config).await
}
