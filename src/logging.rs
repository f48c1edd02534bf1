use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

const DEFAULT_FILTER: &str = "portfolio_blog=debug,tower_http=debug";

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    // a subscriber may already be installed when several servers share a process
    let result = match format {
        LogFormat::Json => subscriber
            .with(fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Pretty => subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .try_init(),
    };

    if result.is_ok() {
        tracing::info!(?format, "Logging initialized");
    }
}
