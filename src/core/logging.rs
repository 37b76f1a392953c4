use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber, filtered by `RUST_LOG` (default `info`).
/// Reports go to stdout, so logs must stay off it.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
