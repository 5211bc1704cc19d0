//! Console logging for the workspace binaries.
//!
//! Output is a compact human-readable line per event unless
//! `RUST_LOG_FORMAT=json` is set. `RUST_LOG` overrides the default level.

use std::env::var;

use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging at `info`, or `debug` when `verbose` is set.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    initialize_tracing(level);
}

fn initialize_tracing(level: LevelFilter) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_format = var("RUST_LOG_FORMAT").unwrap_or_default();

    let log_layer = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(log_layer).init();

    if !matches!(log_format.as_str(), "" | "json" | "compact") {
        warn!(format = %log_format, "Unknown RUST_LOG_FORMAT, using compact output");
    }
}
