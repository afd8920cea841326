//! Tracing subscriber setup for binaries and embedding hosts.

use tracing_subscriber::EnvFilter;

/// Install a stderr fmt subscriber.
///
/// `RUST_LOG` wins over `level`; `verbose` forces debug. Calling this more
/// than once is harmless: later calls leave the first subscriber in place.
pub fn init(level: &str, verbose: bool) {
    let default_level = if verbose { "debug" } else { level };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
