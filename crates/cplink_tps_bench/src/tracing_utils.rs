use tracing::metadata::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LEVEL: LevelFilter = LevelFilter::INFO;

/// Installs the global subscriber. `directives` takes precedence over `RUST_LOG`.
pub fn configure_tracing(directives: Option<&str>) {
    let fmt_layer = fmt::layer().compact().with_target(true);
    let builder = EnvFilter::builder().with_default_directive(DEFAULT_LEVEL.into());
    let level_filter_layer = match directives {
        Some(directives) => builder.parse_lossy(directives),
        None => builder.from_env_lossy(),
    };

    tracing_subscriber::registry().with(fmt_layer).with(level_filter_layer).init();
}
