use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Output goes to stderr so stdout stays
/// free for protocol responses.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
