use std::net::SocketAddr;

use anyhow::Context;
use portfolio_blog::{
    build_state, logging, run_app,
    utils::{format_megabytes, read_memory_usage},
    Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    logging::init(config.log_format);

    match read_memory_usage() {
        Some(usage) => tracing::info!(
            rss = %format_megabytes(usage.rss),
            virtual_memory = %format_megabytes(usage.virtual_memory),
            "Initial memory usage"
        ),
        None => tracing::info!("Initial memory usage unavailable"),
    }

    let address: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;
    let state = build_state(config).await?;
    if let Err(error) = run_app(state, address).await {
        tracing::error!("Server error: {:#}", error);
        return Err(error);
    }
    Ok(())
}
