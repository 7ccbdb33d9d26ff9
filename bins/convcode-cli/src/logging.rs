use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT_LOG: Once = Once::new();

/// Installs a `tracing-subscriber::fmt` subscriber. `-v` bumps the default
/// filter level; `RUST_LOG` always takes precedence when set.
pub fn setup(verbosity: u8) {
    INIT_LOG.call_once(|| {
        let default_level = match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
    });
}
