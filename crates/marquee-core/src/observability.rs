//! Tracing setup shared by binaries.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber.
///
/// `default_level` ("info", "debug", ...) applies unless `RUST_LOG` says
/// otherwise. Calling this twice is harmless.
pub fn init_tracing(default_level: &str) {
    let (level, rejected) = match default_level.parse::<LevelFilter>() {
        Ok(level) => (level, None),
        Err(_) => (LevelFilter::INFO, Some(default_level)),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();

    if installed && let Some(raw) = rejected {
        tracing::warn!(level = raw, "unknown log level, using info");
    }
}
