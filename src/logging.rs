//! Logging setup
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to this
//! crate and `tower_http`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Build the filter for `config`, preferring `RUST_LOG`
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&config.level))
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("dentalchain={level},tower_http={level}"))
        .unwrap_or_else(|_| EnvFilter::new("dentalchain=info,tower_http=info"))
}

/// Install the global subscriber (`pretty` or `json` output)
pub fn init_logging(config: &LoggingConfig) {
    let filter = env_filter(config);

    let registry = tracing_subscriber::registry().with(filter);
    if config.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
