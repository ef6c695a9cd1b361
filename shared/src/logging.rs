use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. With `debug` off the level is pinned to
/// `info` so a stray `RUST_LOG` cannot flood the output; with it on,
/// `RUST_LOG` may override the `debug` default.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
